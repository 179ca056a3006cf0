use super::Optimizer;

/// Adam: exponentially decayed first and second moment estimates with bias
/// correction, 1-indexed step counter.
pub struct Adam {
    learning_rate: f64,
    rho1: f64,
    rho2: f64,
    epsilon: f64,
    first_moment: Vec<f64>,
    second_moment: Vec<f64>,
    t: u32,
}

pub const DEFAULT_RHO1: f64 = 0.9;
pub const DEFAULT_RHO2: f64 = 0.999;
pub const DEFAULT_EPSILON: f64 = 1e-8;

impl Adam {
    pub fn new(learning_rate: f64, rho1: f64, rho2: f64, epsilon: f64) -> Self {
        assert!(learning_rate.is_finite() && learning_rate > 0.0);
        assert!(rho1.is_finite() && (0.0..1.0).contains(&rho1));
        assert!(rho2.is_finite() && (0.0..1.0).contains(&rho2));
        assert!(epsilon.is_finite() && epsilon > 0.0);
        Adam {
            learning_rate,
            rho1,
            rho2,
            epsilon,
            first_moment: Vec::new(),
            second_moment: Vec::new(),
            t: 0,
        }
    }

    pub fn with_defaults(learning_rate: f64) -> Self {
        Adam::new(learning_rate, DEFAULT_RHO1, DEFAULT_RHO2, DEFAULT_EPSILON)
    }
}

impl Optimizer for Adam {
    fn update(&mut self, x: &mut [f64], gradient: &[f64]) {
        if self.first_moment.is_empty() {
            self.first_moment = vec![0.0; gradient.len()];
            self.second_moment = vec![0.0; gradient.len()];
        }

        self.t += 1;
        let corr1 = 1.0 - self.rho1.powi(self.t as i32);
        let corr2 = 1.0 - self.rho2.powi(self.t as i32);

        for i in 0..x.len() {
            let g = gradient[i];
            self.first_moment[i] = self.rho1 * self.first_moment[i] + (1.0 - self.rho1) * g;
            self.second_moment[i] = self.rho2 * self.second_moment[i] + (1.0 - self.rho2) * g * g;

            let m_hat = self.first_moment[i] / corr1;
            let v_hat = self.second_moment[i] / corr2;

            x[i] -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }
}
