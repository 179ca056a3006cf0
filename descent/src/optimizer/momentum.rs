use super::Optimizer;

/// Gradient descent with momentum: `v ← α·v - lr·∇f(x)`, `x ← x + v`.
pub struct Momentum {
    learning_rate: f64,
    alpha: f64,
    velocity: Vec<f64>,
}

pub const DEFAULT_ALPHA: f64 = 0.9;

impl Momentum {
    pub fn new(learning_rate: f64, alpha: f64) -> Self {
        assert!(learning_rate.is_finite() && learning_rate > 0.0);
        assert!(alpha.is_finite() && (0.0..1.0).contains(&alpha));
        Momentum {
            learning_rate,
            alpha,
            velocity: Vec::new(),
        }
    }

    pub fn with_defaults(learning_rate: f64) -> Self {
        Momentum::new(learning_rate, DEFAULT_ALPHA)
    }
}

impl Optimizer for Momentum {
    fn update(&mut self, x: &mut [f64], gradient: &[f64]) {
        if self.velocity.is_empty() {
            self.velocity = vec![0.0; gradient.len()];
        }

        for i in 0..x.len() {
            self.velocity[i] = self.alpha * self.velocity[i] - self.learning_rate * gradient[i];
            x[i] += self.velocity[i];
        }
    }
}
