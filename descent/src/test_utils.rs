use crate::objective::Objective;

/// The reference quartic from the documented scenarios:
/// `f(x₁,x₂) = x₁⁴ + x₂⁴ + x₁²x₂ + x₁x₂² - 20x₁² - 15x₂²`.
pub struct Quartic;

impl Objective for Quartic {
    fn value(&self, x: &[f64]) -> f64 {
        let (a, b) = (x[0], x[1]);
        a.powi(4) + b.powi(4) + a.powi(2) * b + a * b.powi(2) - 20.0 * a.powi(2) - 15.0 * b.powi(2)
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        let (a, b) = (x[0], x[1]);
        vec![
            4.0 * a.powi(3) + 2.0 * a * b + b.powi(2) - 40.0 * a,
            4.0 * b.powi(3) + a.powi(2) + 2.0 * a * b - 30.0 * b,
        ]
    }
}

/// `f(x) = x·x`, gradient `2x`, gradient Lipschitz constant 2.
pub struct Quadratic;

impl Objective for Quadratic {
    fn value(&self, x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|v| 2.0 * v).collect()
    }
}

pub fn grad_norm<O: Objective>(objective: &O, x: &[f64]) -> f64 {
    objective
        .gradient(x)
        .iter()
        .map(|v| v * v)
        .sum::<f64>()
        .sqrt()
}

pub fn assert_close(a: f64, b: f64, tolerance: f64) {
    assert!(
        (a - b).abs() < tolerance,
        "{a} and {b} differ by more than {tolerance}"
    );
}
