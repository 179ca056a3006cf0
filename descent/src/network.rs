use rand::Rng;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::matrix::DMatrix;
use crate::optimizer::{GradientDescent, Optimizer};

/// Number of trainable parameters of the fixed 2-2-1 architecture.
///
/// Flattening convention, which `forward` and `backward` must agree on:
/// - `θ[0..4]`: first-layer weights, row-major; `θ[2i + j]` connects input `j`
///   to hidden unit `i`
/// - `θ[4..6]`: second-layer weights, one per hidden unit
/// - `θ[6..8]`: first-layer biases
/// - `θ[8]`: second-layer bias
pub const PARAM_COUNT: usize = 9;

pub const INPUT_DIM: usize = 2;
pub const HIDDEN_DIM: usize = 2;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn mask_entry<R: Rng + ?Sized>(rng: &mut R, p: f64) -> f64 {
    if rng.gen_bool(p) {
        1.0
    } else {
        0.0
    }
}

fn check_probability(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::InvalidProbability(format!(
            "keep probability must lie in [0, 1], got {p}"
        )));
    }
    Ok(())
}

/// Structured view over a flat parameter vector.
#[derive(Debug, Clone, PartialEq)]
pub struct NetParams {
    pub w1: DMatrix<2, 2>,
    pub w2: DMatrix<2, 1>,
    pub b1: DMatrix<2, 1>,
    pub b2: f64,
}

impl NetParams {
    pub fn from_flat(theta: &[f64]) -> Result<Self> {
        if theta.len() != PARAM_COUNT {
            return Err(Error::Dimension(format!(
                "theta has {} entries, the 2-2-1 network needs {PARAM_COUNT}",
                theta.len()
            )));
        }

        let mut w1 = DMatrix::<2, 2>::default();
        let mut w2 = DMatrix::<2, 1>::default();
        let mut b1 = DMatrix::<2, 1>::default();

        for i in 0..HIDDEN_DIM {
            for j in 0..INPUT_DIM {
                w1[(i, j)] = theta[i * INPUT_DIM + j];
            }
            w2[(i, 0)] = theta[4 + i];
            b1[(i, 0)] = theta[6 + i];
        }

        Ok(NetParams {
            w1,
            w2,
            b1,
            b2: theta[8],
        })
    }

    pub fn to_flat(&self) -> [f64; PARAM_COUNT] {
        let mut theta = [0.0; PARAM_COUNT];
        for i in 0..HIDDEN_DIM {
            for j in 0..INPUT_DIM {
                theta[i * INPUT_DIM + j] = self.w1[(i, j)];
            }
            theta[4 + i] = self.w2[(i, 0)];
            theta[6 + i] = self.b1[(i, 0)];
        }
        theta[8] = self.b2;
        theta
    }

    /// Weight-scaling view: both weight matrices multiplied by the keep
    /// probability, biases untouched.
    fn scaled(&self, p: f64) -> NetParams {
        let mut out = self.clone();
        out.w1.scalar_mul_ip(p);
        out.w2.scalar_mul_ip(p);
        out
    }
}

/// Everything `backward` needs from the forward pass that produced an output:
/// the (possibly masked) inputs the first layer saw, the sigmoid outputs, the
/// hidden mask, and the second-layer weights.
///
/// Returning this bundle instead of caching it on an instance keeps
/// forward/backward pairs explicit and reentrant.
#[derive(Debug, Clone)]
pub struct ForwardTrace {
    inputs: Vec<[f64; 2]>,
    s1: Vec<[f64; 2]>,
    hidden_mask: Option<[f64; 2]>,
    w2: DMatrix<2, 1>,
}

impl ForwardTrace {
    pub fn batch_len(&self) -> usize {
        self.inputs.len()
    }

    #[cfg(test)]
    pub(crate) fn masked_inputs(&self) -> &[[f64; 2]] {
        &self.inputs
    }

    #[cfg(test)]
    pub(crate) fn hidden_mask(&self) -> Option<[f64; 2]> {
        self.hidden_mask
    }
}

fn forward_masked(
    x: &[[f64; 2]],
    params: &NetParams,
    input_mask: Option<&[[f64; 2]]>,
    hidden_mask: Option<[f64; 2]>,
) -> (Vec<f64>, ForwardTrace) {
    let keep_hidden = hidden_mask.unwrap_or([1.0, 1.0]);

    let mut inputs = Vec::with_capacity(x.len());
    let mut s1 = Vec::with_capacity(x.len());
    let mut y_hat = Vec::with_capacity(x.len());

    for (k, example) in x.iter().enumerate() {
        let masked = match input_mask {
            Some(masks) => [example[0] * masks[k][0], example[1] * masks[k][1]],
            None => *example,
        };

        let xv = DMatrix::<2, 1>::from([[masked[0]], [masked[1]]]);
        let mut a1 = params.w1.mul(&xv);
        a1.add_ip(&params.b1);

        let s = [sigmoid(a1[(0, 0)]), sigmoid(a1[(1, 0)])];
        let h = [s[0] * keep_hidden[0], s[1] * keep_hidden[1]];

        let out = params.w2[(0, 0)] * h[0] + params.w2[(1, 0)] * h[1] + params.b2;

        inputs.push(masked);
        s1.push(s);
        y_hat.push(out);
    }

    let trace = ForwardTrace {
        inputs,
        s1,
        hidden_mask,
        w2: params.w2.clone(),
    };

    (y_hat, trace)
}

/// Plain forward pass: `ŷ = φ(X·W₁ + b₁)·W₂ + b₂`, no masking.
pub fn forward(x: &[[f64; 2]], theta: &[f64]) -> Result<(Vec<f64>, ForwardTrace)> {
    let params = NetParams::from_flat(theta)?;
    Ok(forward_masked(x, &params, None, None))
}

/// Forward pass with dropout: a fresh Bernoulli(p) keep-mask per input feature
/// per example, and one keep-mask per hidden unit shared across the batch.
pub fn forward_with_dropout<R: Rng + ?Sized>(
    x: &[[f64; 2]],
    theta: &[f64],
    p: f64,
    rng: &mut R,
) -> Result<(Vec<f64>, ForwardTrace)> {
    check_probability(p)?;
    let params = NetParams::from_flat(theta)?;

    let input_mask: Vec<[f64; 2]> = x
        .iter()
        .map(|_| [mask_entry(rng, p), mask_entry(rng, p)])
        .collect();
    let hidden_mask = [mask_entry(rng, p), mask_entry(rng, p)];

    Ok(forward_masked(
        x,
        &params,
        Some(&input_mask),
        Some(hidden_mask),
    ))
}

/// Deterministic inference-time approximation to dropout: scales both weight
/// matrices by `p` instead of sampling masks.
pub fn forward_with_weight_scaling(x: &[[f64; 2]], theta: &[f64], p: f64) -> Result<Vec<f64>> {
    check_probability(p)?;
    let params = NetParams::from_flat(theta)?.scaled(p);
    Ok(forward_masked(x, &params, None, None).0)
}

/// Mean squared error over a batch.
pub fn mse(y_hat: &[f64], y: &[f64]) -> Result<f64> {
    if y_hat.len() != y.len() {
        return Err(Error::Dimension(format!(
            "predictions have {} entries, targets have {}",
            y_hat.len(),
            y.len()
        )));
    }

    let m = y_hat.len() as f64;
    Ok(y_hat
        .iter()
        .zip(y)
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        / m)
}

/// Gradient of [`mse`] with respect to the predictions: `2(ŷ - y)/m`.
pub fn mse_gradient(y_hat: &[f64], y: &[f64]) -> Result<Vec<f64>> {
    if y_hat.len() != y.len() {
        return Err(Error::Dimension(format!(
            "predictions have {} entries, targets have {}",
            y_hat.len(),
            y.len()
        )));
    }

    let m = y_hat.len() as f64;
    Ok(y_hat
        .iter()
        .zip(y)
        .map(|(a, b)| 2.0 * (a - b) / m)
        .collect())
}

/// Backpropagates the MSE loss through the trace of a prior forward call.
///
/// The returned gradient uses the same flattening as θ. The output must be
/// the one the trace was produced with; a batch-size mismatch means the pair
/// is broken and fails with [`Error::UnpairedBackward`].
pub fn backward(y_hat: &[f64], y: &[f64], trace: &ForwardTrace) -> Result<[f64; PARAM_COUNT]> {
    if y_hat.len() != trace.batch_len() {
        return Err(Error::UnpairedBackward(format!(
            "output has {} entries but the forward trace covers {} examples",
            y_hat.len(),
            trace.batch_len()
        )));
    }

    let d_out = mse_gradient(y_hat, y)?;
    let keep_hidden = trace.hidden_mask.unwrap_or([1.0, 1.0]);

    let mut dw1 = DMatrix::<2, 2>::default();
    let mut dw2 = DMatrix::<2, 1>::default();
    let mut db1 = DMatrix::<2, 1>::default();
    let mut db2 = 0.0;

    for k in 0..y_hat.len() {
        let dy = d_out[k];
        let s = trace.s1[k];

        db2 += dy;

        for i in 0..HIDDEN_DIM {
            let h = s[i] * keep_hidden[i];
            dw2[(i, 0)] += dy * h;

            // Through the output weights, the hidden mask and the sigmoid.
            let da = dy * trace.w2[(i, 0)] * keep_hidden[i] * s[i] * (1.0 - s[i]);

            db1[(i, 0)] += da;
            for j in 0..INPUT_DIM {
                dw1[(i, j)] += da * trace.inputs[k][j];
            }
        }
    }

    let grads = NetParams {
        w1: dw1,
        w2: dw2,
        b1: db1,
        b2: db2,
    };
    Ok(grads.to_flat())
}

#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    /// Keep probability used for the dropout forward passes.
    pub dropout: f64,
}

/// Outcome of [`train`]: the parameters with the lowest observed training
/// loss (not necessarily the final iterate) and the full loss curve.
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub theta: Vec<f64>,
    pub loss: f64,
    pub epoch_losses: Vec<f64>,
}

/// Full-batch training with dropout: each epoch runs
/// {dropout forward → loss → backward → `θ ← θ - lr·g`}.
///
/// Parameters start uniform in `-1..=1` from the caller's RNG. The best θ is
/// tracked by strict improvement, so ties keep the first occurrence.
pub fn train<R: Rng + ?Sized>(
    x: &[[f64; 2]],
    y: &[f64],
    config: &TrainConfig,
    rng: &mut R,
) -> Result<TrainReport> {
    if x.len() != y.len() {
        return Err(Error::Dimension(format!(
            "{} examples but {} targets",
            x.len(),
            y.len()
        )));
    }
    check_probability(config.dropout)?;

    let mut theta: Vec<f64> = (0..PARAM_COUNT).map(|_| rng.gen_range(-1.0..=1.0)).collect();
    let mut opt = GradientDescent::new(config.learning_rate);

    let mut best_theta = theta.clone();
    let mut best_loss = f64::INFINITY;
    let mut epoch_losses = Vec::with_capacity(config.epochs);

    for _ in 0..config.epochs {
        let (y_hat, trace) = forward_with_dropout(x, &theta, config.dropout, rng)?;
        let loss = mse(&y_hat, y)?;
        epoch_losses.push(loss);

        if loss < best_loss {
            best_loss = loss;
            best_theta = theta.clone();
        }

        let gradient = backward(&y_hat, y, &trace)?;
        opt.update(&mut theta, &gradient);
    }

    Ok(TrainReport {
        theta: best_theta,
        loss: best_loss,
        epoch_losses,
    })
}
