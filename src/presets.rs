//! Example CRNs and tile systems, ready to simulate.

use std::collections::HashMap;

use crate::error::Error;
use crate::species::{species, Species};
use crate::tile::{Tile, TileSystem};

/// The molecules play rock paper scissors. The winner transforms the loser into a copy of itself.
pub const ROCK_PAPER_SCISSORS: &str = "
    r=50;
    p=50;
    s=50;
    r+p->2p;
    p+s->2s;
    s+r->2r;
    ";
/// A is the prey and B is the predator.
pub const PREDATOR_PREY: &str = "
    a=100;
    b=100;
    a+b->2b:0.005;
    a->2a;
    b->;
    ";
/// Polya's urn. Draw a marble from the urn, then put two marbles of the same color back in.
pub const POLYA: &str = "
    A = 1;
    B = 1;
    A -> 2A;
    B -> 2B;
    ";
/// Same as the rock paper scissors CRN, but with two more players.
pub const RPSLS: &str = "
    a = 100;
    b = 100;
    c = 100;
    d = 100;
    e = 100;
    a+b->2a;
    b+c->2b;
    c+d->2c;
    d+e->2d;
    e+a->2e;
    a+d->2a;
    b+e->2b;
    c+a->2c;
    d+b->2d;
    e+c->2e;
    ";
/// Determines which of A and B is more abundant.
pub const MAJORITY: &str = "
    A = 30;
    B = 20;
    2A + B -> 3A;
    A + 2B -> 3B;
    ";
/// The majority CRN, but with catalysts that transform into one another.
pub const MAJORITY_CATALYZED: &str = "
    A = 5120;
    B = 4880;
    C = 100;
    D = 100;
    2A + B + C -> 3A + C;
    A + 2B + D -> 3B + D;
    C -> D : 1000000000;
    D -> C : 1000000000;
    ";
/// Approximately calculates the product of A and B. A deterministic simulation will approach it asymptotically.
pub const MULTIPLY: &str = "
    A = 30;
    B = 20;
    C = 0;
    A + B -> A + B + C;
    C ->;
    ";
/// Calculates the product with some random perturbations of catalysts.
pub const MULTIPLY_CATALYZED: &str = "
    A = 30;
    B = 20;
    C = 0;
    D = 5;
    E = 5;
    A + B + D -> A + B + C + D;
    C + E -> E;
    D -> E : 1000000000;
    E -> D : 1000000000;
    ";
/// A basic CRN with two reactions that reach equilibrium.
pub const EQUILIBRIUM: &str = "
    A = 10000;
    B = 10000;
    C = 10000;
    D = 10000;
    A + 2B -> 4C + 3D;
    4C + 3D -> A + 2B;
    ";
/// Looks cool.
pub const CHAIN: &str = "
    A = 100;
    A -> B;
    B -> C;
    C -> D;
    D -> E;
    E -> F;
    F -> G;
    G -> H;
    H -> I;
    I -> J;
    J -> K;
    K -> L;
    ";

/// A schema-reaction CRN that transfers a binary stack, one bit at a time,
/// from `Stack1` to `Stack2`, halting once `Stack1` is empty. Built from
/// schema reactions (`{rest}`/`{top}` placeholders) rather than the text
/// DSL, since the text grammar has no schema syntax.
///
/// Returns the [`crate::reaction::Reaction`] list (suitable for
/// [`crate::crn::Crn::new`]) and the initial species counts keyed by name.
pub fn two_stack_transfer() -> Result<(Vec<crate::reaction::Reaction>, HashMap<String, i64>), Error>
{
    let [s1, s2, s3, halt] = species("s1 s2 s3 halt")?.try_into().unwrap();
    let rest = || [("rest".to_string(), "[01]*".to_string())];

    // Pop the top bit off Stack1, remembering which bit it was via s2/s3.
    let stack1_top_1 = Species::schema("Stack1<{rest}1>", rest())?;
    let stack1_top_0 = Species::schema("Stack1<{rest}0>", rest())?;
    let stack1_popped = Species::schema("Stack1<{rest}>", rest())?;
    let stack1_empty = Species::new("Stack1<>")?;

    // Push the remembered bit onto Stack2.
    let stack2_any = Species::schema("Stack2<{rest}>", rest())?;
    let stack2_pushed_1 = Species::schema("Stack2<{rest}1>", rest())?;
    let stack2_pushed_0 = Species::schema("Stack2<{rest}0>", rest())?;

    let reactions = vec![
        s1.clone() + stack1_empty.clone() >> halt + stack1_empty,
        s1.clone() + stack1_top_1 >> s2.clone() + stack1_popped.clone(),
        s1.clone() + stack1_top_0 >> s3.clone() + stack1_popped,
        s2 + stack2_any.clone() >> s1.clone() + stack2_pushed_1,
        s3 + stack2_any >> s1 + stack2_pushed_0,
    ];

    let mut initial = HashMap::new();
    initial.insert("s1".to_string(), 1);
    initial.insert("Stack1<101010>".to_string(), 1);
    initial.insert("Stack2<>".to_string(), 1);

    Ok((reactions, initial))
}

/// A binary-increment tile set: a seed of three tiles grows a counter that
/// increments on each pass of a "carry" tile along the bottom row. Grounded
/// directly on the original tile example's edge labels and bond strengths.
pub fn binary_increment_tiles() -> (TileSystem, HashMap<(i64, i64), Tile>) {
    let zero = Tile::new("0", Some("0".into()), Some("0".into()), Some("nop".into()), Some("nop".into()));
    let one = Tile::new("1", Some("1".into()), Some("1".into()), Some("nop".into()), Some("nop".into()));
    let carry = Tile::new("0", Some("0".into()), Some("1".into()), Some("inc".into()), Some("inc".into()));
    let increment = Tile::new("1", Some("1".into()), Some("0".into()), Some("inc".into()), None);
    let v_bus = Tile::new("V", Some("B".into()), Some("B".into()), Some("inc".into()), None);
    let h_bus = Tile::new("H", Some("0".into()), None, Some("B".into()), Some("B".into()));
    let base = Tile::new("B", Some("B".into()), None, Some("B".into()), None);

    let mut bonds = HashMap::new();
    bonds.insert("0".to_string(), 1.0);
    bonds.insert("1".to_string(), 1.0);
    bonds.insert("B".to_string(), 2.0);
    bonds.insert("inc".to_string(), 1.0);
    bonds.insert("nop".to_string(), 1.0);

    let system = TileSystem::new(
        vec![zero, one, carry, increment, v_bus.clone(), h_bus.clone(), base.clone()],
        bonds,
        2.0,
    );

    let mut seed = HashMap::new();
    seed.insert((0, 0), base);
    seed.insert((-1, 0), h_bus);
    seed.insert((0, 1), v_bus);

    (system, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crn::Crn;
    use crate::parse;
    use crate::reaction::Reaction;

    #[test]
    fn presets_parse_into_valid_crns() {
        for preset in [
            ROCK_PAPER_SCISSORS,
            PREDATOR_PREY,
            POLYA,
            RPSLS,
            MAJORITY,
            MAJORITY_CATALYZED,
            MULTIPLY,
            MULTIPLY_CATALYZED,
            EQUILIBRIUM,
            CHAIN,
        ] {
            let (crn, _) = parse::parse(preset).unwrap();
            assert!(!crn.is_empty());
        }
    }

    #[test]
    fn two_stack_transfer_builds_a_crn() {
        let (reactions, initial) = two_stack_transfer().unwrap();
        let crn = Crn::new(reactions).unwrap();
        assert_eq!(initial.get("s1"), Some(&1));
        assert!(crn.reactions().iter().any(Reaction::is_schema));
    }

    #[test]
    fn binary_increment_tiles_has_a_three_tile_seed() {
        let (_system, seed) = binary_increment_tiles();
        assert_eq!(seed.len(), 3);
    }
}
