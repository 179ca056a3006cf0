use super::Optimizer;

/// Plain gradient descent: `x ← x - lr·∇f(x)`.
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    pub fn new(learning_rate: f64) -> Self {
        assert!(learning_rate.is_finite() && learning_rate > 0.0);
        GradientDescent { learning_rate }
    }
}

impl Default for GradientDescent {
    fn default() -> Self {
        GradientDescent::new(1e-2)
    }
}

impl Optimizer for GradientDescent {
    fn update(&mut self, x: &mut [f64], gradient: &[f64]) {
        for (xi, gi) in x.iter_mut().zip(gradient) {
            *xi -= self.learning_rate * gi;
        }
    }
}
