mod adam;
mod gradient_descent;
mod momentum;
mod rmsprop;

use rand::Rng;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::objective::Objective;

/// One iteration of an update rule, applied in place.
///
/// Implementations own their auxiliary accumulators (velocity, moment
/// estimates) and size them on first use. A value is meant to drive a single
/// run; build a fresh one per run.
pub trait Optimizer {
    fn update(&mut self, x: &mut [f64], gradient: &[f64]);
}

/// The outcome of a [`minimize`] run.
///
/// The trajectory holds `steps + 1` points, the starting point first. No
/// numerical stabilization is applied along the way, so a diverging run shows
/// up as infinities or NaNs in the trajectory rather than as an error.
#[derive(Debug, Clone, Serialize)]
pub struct Run {
    pub trajectory: Vec<Vec<f64>>,
    pub x: Vec<f64>,
    pub value: f64,
}

impl Run {
    /// True if any coordinate anywhere along the trajectory is non-finite.
    pub fn diverged(&self) -> bool {
        self.trajectory
            .iter()
            .any(|point| point.iter().any(|v| !v.is_finite()))
    }
}

/// Iterates `optimizer` for `steps` updates of `objective` starting at `x0`.
///
/// Fails with [`Error::Dimension`] if the supplied gradient does not have one
/// component per coordinate of `x0`. With `steps = 0` the trajectory is just
/// `[x0]` and the reported value is `f(x0)`.
pub fn minimize<O, Opt>(objective: &O, optimizer: &mut Opt, x0: &[f64], steps: usize) -> Result<Run>
where
    O: Objective,
    Opt: Optimizer,
{
    let mut x = x0.to_vec();
    let mut trajectory = Vec::with_capacity(steps + 1);
    trajectory.push(x.clone());

    for _ in 0..steps {
        let gradient = objective.gradient(&x);
        if gradient.len() != x.len() {
            return Err(Error::Dimension(format!(
                "gradient has {} components, point has {}",
                gradient.len(),
                x.len()
            )));
        }

        optimizer.update(&mut x, &gradient);
        trajectory.push(x.clone());
    }

    let value = objective.value(&x);

    Ok(Run { trajectory, x, value })
}

#[derive(Debug, Clone)]
pub struct RestartConfig {
    pub restarts: usize,
    pub steps: usize,
    /// Each starting coordinate is drawn uniformly from `low..=high`.
    pub low: f64,
    pub high: f64,
}

/// Runs [`minimize`] from `config.restarts` random starting points and keeps
/// the finite run with the lowest final value (first occurrence wins ties).
///
/// Diverged runs are skipped; `None` means every restart diverged.
pub fn best_of_restarts<O, Opt, B, R>(
    objective: &O,
    mut make_optimizer: B,
    dim: usize,
    config: &RestartConfig,
    rng: &mut R,
) -> Result<Option<Run>>
where
    O: Objective,
    Opt: Optimizer,
    B: FnMut() -> Opt,
    R: Rng + ?Sized,
{
    let mut best: Option<Run> = None;

    for _ in 0..config.restarts {
        let x0: Vec<f64> = (0..dim)
            .map(|_| rng.gen_range(config.low..=config.high))
            .collect();

        let run = minimize(objective, &mut make_optimizer(), &x0, config.steps)?;

        if run.diverged() || !run.value.is_finite() {
            continue;
        }

        match &best {
            Some(current) if run.value >= current.value => {}
            _ => best = Some(run),
        }
    }

    Ok(best)
}

pub use adam::Adam;
pub use gradient_descent::GradientDescent;
pub use momentum::Momentum;
pub use rmsprop::RmsProp;
