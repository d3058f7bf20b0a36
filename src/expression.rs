//! Expressions: ordered multisets of species, the left/right-hand sides of
//! a [`crate::reaction::Reaction`].

use indexmap::IndexMap;
use std::fmt;
use std::ops::{Add, Mul, Shr};

use crate::reaction::Reaction;
use crate::species::Species;

/// An ordered multiset of species with positive integer coefficients.
///
/// Insertion order is preserved (backed by [`indexmap::IndexMap`]) because
/// §4.F requires schema-reactant enumeration to proceed in a stable
/// position order derived from how reactants were written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    species: IndexMap<Species, i64>,
}

impl Expression {
    /// An empty expression (no species).
    pub fn empty() -> Self {
        Expression {
            species: IndexMap::new(),
        }
    }

    /// A single species with coefficient 1.
    pub fn single(species: Species) -> Self {
        let mut map = IndexMap::new();
        map.insert(species, 1);
        Expression { species: map }
    }

    /// The coefficient of `species` in this expression, or 0 if absent.
    pub fn coeff(&self, species: &Species) -> i64 {
        self.species.get(species).copied().unwrap_or(0)
    }

    /// Iterates over (species, coefficient) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Species, i64)> {
        self.species.iter().map(|(s, &c)| (s, c))
    }

    /// The set of species referenced by this expression.
    pub fn get_species(&self) -> std::collections::HashSet<Species> {
        self.species.keys().cloned().collect()
    }

    /// True if any species in this expression is a schema.
    pub fn is_schema(&self) -> bool {
        self.species.keys().any(Species::is_schema)
    }

    /// True if this expression is empty.
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    fn merge_add(mut self, other: &Expression) -> Self {
        for (s, c) in other.iter() {
            *self.species.entry(s.clone()).or_insert(0) += c;
        }
        self
    }

    fn scaled(&self, n: i64) -> Self {
        Expression {
            species: self.species.iter().map(|(s, &c)| (s.clone(), c * n)).collect(),
        }
    }
}

impl From<Species> for Expression {
    fn from(s: Species) -> Self {
        Expression::single(s)
    }
}

impl From<&Species> for Expression {
    fn from(s: &Species) -> Self {
        Expression::single(s.clone())
    }
}

impl Add<Expression> for Expression {
    type Output = Expression;
    fn add(self, rhs: Expression) -> Expression {
        self.merge_add(&rhs)
    }
}

impl Add<Species> for Expression {
    type Output = Expression;
    fn add(self, rhs: Species) -> Expression {
        self.merge_add(&Expression::single(rhs))
    }
}

impl Add<Expression> for Species {
    type Output = Expression;
    fn add(self, rhs: Expression) -> Expression {
        Expression::single(self).merge_add(&rhs)
    }
}

impl Add<Species> for Species {
    type Output = Expression;
    fn add(self, rhs: Species) -> Expression {
        Expression::single(self).merge_add(&Expression::single(rhs))
    }
}

/// Scales every coefficient in the expression by `n`. Only `Expression * n`
/// is provided, not `n * Expression`: the latter would mean implementing
/// the foreign trait `Mul` for the foreign type `i64`, which the orphan
/// rule forbids.
impl Mul<i64> for Expression {
    type Output = Expression;
    fn mul(self, n: i64) -> Expression {
        self.scaled(n)
    }
}

impl Mul<i64> for Species {
    type Output = Expression;
    fn mul(self, n: i64) -> Expression {
        Expression::single(self).scaled(n)
    }
}

impl Shr<Expression> for Expression {
    type Output = Reaction;
    fn shr(self, rhs: Expression) -> Reaction {
        Reaction::new(self, rhs)
    }
}

impl Shr<Species> for Expression {
    type Output = Reaction;
    fn shr(self, rhs: Species) -> Reaction {
        Reaction::new(self, Expression::single(rhs))
    }
}

impl Shr<Expression> for Species {
    type Output = Reaction;
    fn shr(self, rhs: Expression) -> Reaction {
        Reaction::new(Expression::single(self), rhs)
    }
}

impl Shr<Species> for Species {
    type Output = Reaction;
    fn shr(self, rhs: Species) -> Reaction {
        Reaction::new(Expression::single(self), Expression::single(rhs))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .species
            .iter()
            .map(|(s, c)| if *c == 1 { s.to_string() } else { format!("{c}{s}") })
            .collect();
        write!(f, "{}", parts.join(" + "))
    }
}
