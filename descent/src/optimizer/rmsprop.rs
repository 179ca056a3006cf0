use super::Optimizer;

/// RMSProp: a running average of squared gradients rescales each coordinate.
///
/// `s ← ρ·s + (1-ρ)·g²`, `x ← x - lr·g / (√s + δ)`, all elementwise.
pub struct RmsProp {
    learning_rate: f64,
    rho: f64,
    delta: f64,
    accumulator: Vec<f64>,
}

pub const DEFAULT_RHO: f64 = 0.9;
pub const DEFAULT_DELTA: f64 = 1e-6;

impl RmsProp {
    pub fn new(learning_rate: f64, rho: f64, delta: f64) -> Self {
        assert!(learning_rate.is_finite() && learning_rate > 0.0);
        assert!(rho.is_finite() && (0.0..1.0).contains(&rho));
        assert!(delta.is_finite() && delta > 0.0);
        RmsProp {
            learning_rate,
            rho,
            delta,
            accumulator: Vec::new(),
        }
    }

    pub fn with_defaults(learning_rate: f64) -> Self {
        RmsProp::new(learning_rate, DEFAULT_RHO, DEFAULT_DELTA)
    }
}

impl Optimizer for RmsProp {
    fn update(&mut self, x: &mut [f64], gradient: &[f64]) {
        if self.accumulator.is_empty() {
            self.accumulator = vec![0.0; gradient.len()];
        }

        for i in 0..x.len() {
            let g = gradient[i];
            self.accumulator[i] = self.rho * self.accumulator[i] + (1.0 - self.rho) * g * g;
            x[i] -= self.learning_rate * g / (self.accumulator[i].sqrt() + self.delta);
        }
    }
}
