/// A scalar function of a real vector, together with its gradient.
///
/// The optimizer engine never differentiates anything itself; callers supply
/// the pair. The gradient must return one component per input coordinate,
/// which `minimize` checks at run time.
pub trait Objective {
    fn value(&self, x: &[f64]) -> f64;
    fn gradient(&self, x: &[f64]) -> Vec<f64>;
}

/// Adapter so a plain `(f, ∇f)` closure pair can be used as an [`Objective`].
pub struct FnObjective<F, G> {
    f: F,
    grad: G,
}

impl<F, G> FnObjective<F, G>
where
    F: Fn(&[f64]) -> f64,
    G: Fn(&[f64]) -> Vec<f64>,
{
    pub fn new(f: F, grad: G) -> Self {
        FnObjective { f, grad }
    }
}

impl<F, G> Objective for FnObjective<F, G>
where
    F: Fn(&[f64]) -> f64,
    G: Fn(&[f64]) -> Vec<f64>,
{
    fn value(&self, x: &[f64]) -> f64 {
        (self.f)(x)
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        (self.grad)(x)
    }
}
