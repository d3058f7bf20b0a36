//! Deterministic, concentration-continuous simulation of a [`Crn`]. §4.E.

use std::collections::HashMap;

use nalgebra::DVector;
use ode_solvers::{Dopri5, System};

use crate::crn::Crn;
use crate::error::Error;
use crate::result::DetResult;

/// Absolute tolerance passed to the adaptive integrator, per §4.E.
const ABS_TOL: f64 = 1e-8;
/// Relative tolerance passed to the adaptive integrator, per §4.E.
const REL_TOL: f64 = 1e-6;

type Vector = DVector<f64>;

/// Wraps a [`Crn`]'s compiled rate law as an [`ode_solvers::System`]. The
/// closure returned by [`Crn::rate_law`] is itself pure and
/// allocation-light; this adapter only has to shuttle values in and out of
/// `nalgebra`'s vector type at the solver boundary.
struct RateLawSystem<'a> {
    law: Box<dyn Fn(&[f64]) -> Vec<f64> + 'a>,
}

impl System<f64, Vector> for RateLawSystem<'_> {
    fn system(&self, _t: f64, y: &Vector, dy: &mut Vector) {
        let dv = (self.law)(y.as_slice());
        for (i, d) in dv.into_iter().enumerate() {
            dy[i] = d;
        }
    }
}

/// Options controlling a deterministic simulation run, beyond the required
/// end time and initial concentrations. See §4.E.
#[derive(Debug, Clone, Copy)]
pub struct DetOptions {
    /// Number of samples in the returned time grid, `t_k = k*T/(R-1)`.
    /// Must be at least 2.
    pub resolution: usize,
}

impl Default for DetOptions {
    fn default() -> Self {
        DetOptions { resolution: 100 }
    }
}

/// Runs the deterministic simulator on `crn` from `initial` concentrations
/// (species omitted from the map default to 0.0) out to time `end_time`,
/// sampling at `opts.resolution` evenly spaced points.
///
/// # Errors
/// Returns [`Error::Input`] if `end_time` is not positive, `resolution` is
/// less than 2, `initial` names a species unknown to `crn`, or any initial
/// concentration is negative. Returns [`Error::Numeric`] if the ODE
/// backend fails to integrate to `end_time`.
pub fn simulate(
    crn: &Crn,
    initial: &HashMap<String, f64>,
    end_time: f64,
    opts: DetOptions,
) -> Result<DetResult, Error> {
    if end_time <= 0.0 {
        return Err(Error::Input(format!(
            "deterministic simulation end time must be positive, got {end_time}"
        )));
    }
    if opts.resolution < 2 {
        return Err(Error::Input(format!(
            "resolution must be at least 2, got {}",
            opts.resolution
        )));
    }
    for (name, &conc) in initial {
        if conc < 0.0 {
            return Err(Error::Input(format!(
                "initial concentration for '{name}' must be nonnegative, got {conc}"
            )));
        }
    }

    log::debug!(
        "deterministic simulation: {} species, end_time={end_time}, resolution={}",
        crn.len(),
        opts.resolution
    );

    let v0 = crn.index_vector(initial, 0.0)?;
    let y0 = Vector::from_vec(v0);

    let law = crn.rate_law();
    let system = RateLawSystem { law: Box::new(law) };

    let dx_guess = end_time / (opts.resolution as f64 - 1.0);
    let mut stepper = Dopri5::new(system, 0.0, end_time, dx_guess, y0, REL_TOL, ABS_TOL);

    stepper
        .integrate()
        .map_err(|e| Error::Numeric(format!("ODE integration failed: {e}")))?;

    let x_out = stepper.x_out();
    let y_out = stepper.y_out();

    let mut times = Vec::with_capacity(opts.resolution);
    let mut series: Vec<Vec<f64>> = vec![Vec::with_capacity(opts.resolution); crn.len()];
    for k in 0..opts.resolution {
        let t_k = k as f64 * end_time / (opts.resolution as f64 - 1.0);
        let v_k = sample_at(x_out, y_out, t_k);
        times.push(t_k);
        for (i, row) in series.iter_mut().enumerate() {
            row.push(v_k[i]);
        }
    }

    Ok(DetResult::new(crn, times, series))
}

/// Linear interpolation of the integrator's internal (possibly unevenly
/// spaced) solution points onto `t`.
fn sample_at(x_out: &[f64], y_out: &[Vector], t: f64) -> Vector {
    if x_out.is_empty() {
        return Vector::zeros(0);
    }
    if t <= x_out[0] {
        return y_out[0].clone();
    }
    if t >= *x_out.last().unwrap() {
        return y_out.last().unwrap().clone();
    }
    let i = match x_out.binary_search_by(|probe| probe.partial_cmp(&t).unwrap()) {
        Ok(idx) => return y_out[idx].clone(),
        Err(idx) => idx,
    };
    let (t0, t1) = (x_out[i - 1], x_out[i]);
    let (y0, y1) = (&y_out[i - 1], &y_out[i]);
    let frac = (t - t0) / (t1 - t0);
    y0 + (y1 - y0) * frac
}
