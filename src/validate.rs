//! Probabilistic property checking: does a [`Crn`] actually compute a given
//! function of its input species' initial concentrations? §6, §9 Open
//! Question 1, `DESIGN.md` decision 2.

use std::collections::HashMap;

use rand::Rng;

use crate::crn::Crn;
use crate::det::{self, DetOptions};
use crate::error::Error;

/// Bounds for a [`validate`] run.
#[derive(Debug, Clone, Copy)]
pub struct ValidateOptions {
    /// Number of random trials to run before declaring success.
    pub n: usize,
    /// Maximum allowed absolute difference between the CRN's simulated
    /// output and `func`'s theoretical output.
    pub eps: f64,
    /// Simulation end time for each trial.
    pub t: f64,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        ValidateOptions {
            n: 100,
            eps: 1e-2,
            t: 500.0,
        }
    }
}

/// The result of a [`validate`] run.
#[derive(Debug, Clone)]
pub enum ValidateOutcome {
    /// `func` and the CRN agreed, within `eps`, on every trial.
    Success,
    /// A trial disagreed: `inputs` produced `expected` by `func` but the
    /// CRN's simulated `output_species` converged to `got`.
    Counterexample {
        inputs: HashMap<String, f64>,
        expected: f64,
        got: f64,
    },
}

/// Runs `opts.n` random trials, each drawing `input_species`' initial
/// concentrations uniformly from `[0, 10)`, simulating `crn` out to
/// `opts.t`, and comparing the final value of `output_species` against
/// `func`'s output on the same inputs. Returns the first disagreement
/// found, or [`ValidateOutcome::Success`] if none is.
///
/// # Errors
/// Propagates any [`Error`] from [`crate::det::simulate`] (e.g.
/// `output_species` or an entry of `input_species` unknown to `crn`).
pub fn validate(
    crn: &Crn,
    func: impl Fn(&HashMap<String, f64>) -> f64,
    input_species: &[String],
    output_species: &str,
    opts: ValidateOptions,
) -> Result<ValidateOutcome, Error> {
    let mut rng = rand::thread_rng();

    for _ in 0..opts.n {
        let inputs: HashMap<String, f64> = input_species
            .iter()
            .map(|s| (s.clone(), rng.gen::<f64>() * 10.0))
            .collect();

        let expected = func(&inputs);
        let result = det::simulate(crn, &inputs, opts.t, DetOptions::default())?;
        let series = result.species(output_species).ok_or_else(|| {
            Error::Input(format!(
                "'{output_species}' is not a species of this reaction network"
            ))
        })?;
        let got = *series.last().expect("a simulation result always has samples");

        if (expected - got).abs() > opts.eps {
            return Ok(ValidateOutcome::Counterexample {
                inputs,
                expected,
                got,
            });
        }
    }

    Ok(ValidateOutcome::Success)
}
