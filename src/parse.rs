//! Parses the text-format CRN description (`A = 50; A + B -> C : 2;`) into
//! a [`Crn`] and its initial species counts.

use std::collections::HashMap;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric0, digit0, multispace0},
    combinator::{map, opt, recognize},
    multi::{many0, separated_list0},
    number::complete::double,
    sequence::{delimited, pair, separated_pair, terminated},
    IResult,
};

use crate::crn::Crn;
use crate::error::Error;
use crate::expression::Expression;
use crate::reaction::Reaction;
use crate::species::Species;

fn species_name(input: &str) -> IResult<&str, &str> {
    delimited(
        multispace0,
        recognize(pair(alpha1, alphanumeric0)),
        multispace0,
    )(input)
}

fn parse_count(input: &str) -> IResult<&str, (&str, f64)> {
    delimited(
        multispace0,
        terminated(
            separated_pair(
                species_name,
                separated_pair(multispace0, tag("="), multispace0),
                double,
            ),
            tag(";"),
        ),
        multispace0,
    )(input)
}

fn parse_reactant(input: &str) -> IResult<&str, (&str, &str)> {
    delimited(multispace0, pair(digit0, species_name), multispace0)(input)
}

fn parse_reactants(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    delimited(
        multispace0,
        separated_list0(
            delimited(multispace0, tag("+"), multispace0),
            parse_reactant,
        ),
        multispace0,
    )(input)
}

type ReactionTokens<'a> = ((Vec<(&'a str, &'a str)>, Vec<(&'a str, &'a str)>), Option<f64>);

fn parse_reaction(input: &str) -> IResult<&str, ReactionTokens> {
    terminated(
        pair(
            separated_pair(parse_reactants, tag("->"), parse_reactants),
            opt(delimited(pair(tag(":"), multispace0), double, multispace0)),
        ),
        tag(";"),
    )(input)
}

enum Statement<'a> {
    Count(&'a str, f64),
    Reaction(ReactionTokens<'a>),
}

fn parse_statement(input: &str) -> IResult<&str, Statement> {
    alt((
        map(parse_count, |(name, count)| Statement::Count(name, count)),
        map(parse_reaction, Statement::Reaction),
    ))(input)
}

fn parse_statements(input: &str) -> IResult<&str, Vec<Statement>> {
    delimited(multispace0, many0(parse_statement), multispace0)(input)
}

fn build_expression(tokens: &[(&str, &str)]) -> Result<Expression, Error> {
    let mut expr = Expression::empty();
    for &(count_str, name) in tokens {
        let coeff: i64 = if count_str.is_empty() {
            1
        } else {
            count_str
                .parse()
                .map_err(|_| Error::Parse(format!("invalid reactant coefficient '{count_str}'")))?
        };
        let species = Species::new(name)?;
        expr = expr + (species * coeff);
    }
    Ok(expr)
}

/// Parses `input` into a [`Crn`] and a map of each named species to the
/// initial count given for it (species not assigned a count default to 0
/// via the normal simulator conventions, so they're simply absent here).
///
/// # Errors
/// Returns [`Error::Parse`] if `input` doesn't match the grammar, or
/// [`Error::Input`] if a statement names the reserved species `time`.
pub fn parse(input: &str) -> Result<(Crn, HashMap<String, f64>), Error> {
    let (remaining, statements) =
        parse_statements(input).map_err(|e| Error::Parse(format!("{e:?}")))?;
    if !remaining.trim().is_empty() {
        return Err(Error::Parse(format!(
            "unparsed trailing input: '{remaining}'"
        )));
    }

    let mut counts = HashMap::new();
    let mut reactions = Vec::new();
    for statement in statements {
        match statement {
            Statement::Count(name, count) => {
                counts.insert(name.to_string(), count);
            }
            Statement::Reaction(((reactants, products), rate)) => {
                let reactants = build_expression(&reactants)?;
                let products = build_expression(&products)?;
                let mut rxn = Reaction::new(reactants, products);
                if let Some(rate) = rate {
                    rxn = rxn.with_k(rate);
                }
                reactions.push(rxn);
            }
        }
    }

    let crn = Crn::new(reactions)?;
    Ok((crn, counts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_counts_and_reactions() {
        let (crn, counts) = parse("A = 50; B = 10; A + B -> C : 2;").unwrap();
        assert_eq!(counts.get("A"), Some(&50.0));
        assert_eq!(crn.reactions().len(), 1);
        assert_eq!(crn.reactions()[0].k(), 2.0);
    }

    #[test]
    fn default_rate_is_one() {
        let (crn, _) = parse("A -> B;").unwrap();
        assert_eq!(crn.reactions()[0].k(), 1.0);
    }

    #[test]
    fn coefficients_and_empty_sides_parse() {
        let (crn, _) = parse("2A + B -> 3A;").unwrap();
        let a = Species::new("A").unwrap();
        assert_eq!(crn.reactions()[0].reactants().coeff(&a), 2);
    }

    #[test]
    fn rejects_unparseable_trailing_garbage() {
        assert!(parse("A = 50; !!!").is_err());
    }
}
