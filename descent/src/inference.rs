use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use crate::error::Result;
use crate::network;

const Z_95: f64 = 1.96;

/// A point prediction with a 95% confidence interval around its mean.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Prediction {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Monte-Carlo averaging settings: `samples` stochastic forward passes, each
/// through a copy of θ perturbed with `N(0, noise_std)` noise, each with a
/// fresh Bernoulli(`dropout`) mask pair.
#[derive(Debug, Clone, Copy)]
pub struct McConfig {
    pub samples: usize,
    pub noise_std: f64,
    pub dropout: f64,
}

impl Default for McConfig {
    fn default() -> Self {
        McConfig {
            samples: 100,
            noise_std: 0.05,
            dropout: 0.9,
        }
    }
}

/// Plain forward pass over the whole batch, one output per example.
pub fn predict(x: &[[f64; 2]], theta: &[f64]) -> Result<Vec<f64>> {
    Ok(network::forward(x, theta)?.0)
}

/// Same as [`predict`], processing the examples in fixed-size chunks.
///
/// Purely a throughput knob: outputs keep the input order and match
/// [`predict`] exactly for any chunk size.
pub fn predict_in_batches(x: &[[f64; 2]], theta: &[f64], batch_size: usize) -> Result<Vec<f64>> {
    assert!(batch_size > 0);

    let mut out = Vec::with_capacity(x.len());
    for chunk in x.chunks(batch_size) {
        out.extend(network::forward(chunk, theta)?.0);
    }
    Ok(out)
}

/// Single deterministic pass with both weight matrices scaled by `p`.
///
/// O(1) forward passes per example and no uncertainty estimate; the cheap
/// counterpart to [`predict_mc`].
pub fn predict_weight_scaled(x: &[[f64; 2]], theta: &[f64], p: f64) -> Result<Vec<f64>> {
    network::forward_with_weight_scaling(x, theta, p)
}

/// Monte-Carlo averaged prediction: `samples` perturbed dropout passes per
/// example, reporting the sample mean and a `z = 1.96` interval on it.
///
/// Strictly more expensive than weight scaling but the only mode that yields
/// an uncertainty estimate.
pub fn predict_mc<R: Rng + ?Sized>(
    x: &[[f64; 2]],
    theta: &[f64],
    config: &McConfig,
    rng: &mut R,
) -> Result<Vec<Prediction>> {
    assert!(config.samples > 0);
    assert!(config.noise_std.is_finite() && config.noise_std >= 0.0);

    let normal = Normal::new(0.0, config.noise_std).unwrap();

    let mut sums = vec![0.0; x.len()];
    let mut sq_sums = vec![0.0; x.len()];

    for _ in 0..config.samples {
        let perturbed: Vec<f64> = theta.iter().map(|w| w + normal.sample(rng)).collect();
        let (y_hat, _) = network::forward_with_dropout(x, &perturbed, config.dropout, rng)?;

        for (k, v) in y_hat.iter().enumerate() {
            sums[k] += v;
            sq_sums[k] += v * v;
        }
    }

    let n = config.samples as f64;
    Ok((0..x.len())
        .map(|k| {
            let mean = sums[k] / n;
            let variance = if config.samples > 1 {
                ((sq_sums[k] - n * mean * mean) / (n - 1.0)).max(0.0)
            } else {
                0.0
            };
            let half_width = Z_95 * (variance / n).sqrt();

            Prediction {
                mean,
                lower: mean - half_width,
                upper: mean + half_width,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;

    use super::{predict, predict_in_batches, predict_mc, predict_weight_scaled, McConfig};
    use crate::network::PARAM_COUNT;

    #[test]
    fn batched_prediction_matches_the_plain_one() {
        let theta = [0.2; PARAM_COUNT];
        let x: Vec<[f64; 2]> = (0..13).map(|k| [k as f64 * 0.1, 1.0 - k as f64 * 0.1]).collect();

        let plain = predict(&x, &theta).unwrap();

        for batch_size in [1, 2, 5, 13, 64] {
            let batched = predict_in_batches(&x, &theta, batch_size).unwrap();
            assert_eq!(plain, batched, "batch_size = {batch_size}");
        }
    }

    #[test]
    fn mc_interval_brackets_its_own_mean() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(17);
        let theta = [0.1; PARAM_COUNT];
        let x = [[1.0, 1.0], [0.5, -0.5]];

        let config = McConfig {
            samples: 200,
            noise_std: 0.05,
            dropout: 0.9,
        };
        let predictions = predict_mc(&x, &theta, &config, &mut rng).unwrap();

        assert_eq!(predictions.len(), 2);
        for p in &predictions {
            assert!(p.lower <= p.mean && p.mean <= p.upper);
            assert!(p.upper - p.lower > 0.0);
        }
    }

    #[test]
    fn mc_and_weight_scaling_agree_on_average() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(99);
        let theta = [0.1; PARAM_COUNT];
        let x: Vec<[f64; 2]> = (0..8).map(|k| [k as f64 * 0.25 - 1.0, 0.5]).collect();
        let p = 0.9;

        let scaled = predict_weight_scaled(&x, &theta, p).unwrap();
        let config = McConfig {
            samples: 2000,
            noise_std: 0.01,
            dropout: p,
        };
        let mc = predict_mc(&x, &theta, &config, &mut rng).unwrap();

        let avg_gap = scaled
            .iter()
            .zip(&mc)
            .map(|(ws, m)| (ws - m.mean).abs())
            .sum::<f64>()
            / scaled.len() as f64;

        assert!(avg_gap < 0.01, "average gap was {avg_gap}");
    }

    #[test]
    fn mc_is_reproducible_for_a_fixed_seed() {
        let theta = [0.25; PARAM_COUNT];
        let x = [[0.3, 0.7]];
        let config = McConfig::default();

        let run = |seed: u64| {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
            predict_mc(&x, &theta, &config, &mut rng).unwrap()
        };

        let a = run(3);
        let b = run(3);
        assert_eq!(a[0].mean, b[0].mean);
        assert_eq!(a[0].lower, b[0].lower);
        assert_eq!(a[0].upper, b[0].upper);
    }

    #[test]
    fn zero_noise_single_sample_has_a_degenerate_interval() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(11);
        let theta = [0.1; PARAM_COUNT];
        let config = McConfig {
            samples: 1,
            noise_std: 0.0,
            dropout: 1.0,
        };

        let predictions = predict_mc(&[[1.0, 1.0]], &theta, &config, &mut rng).unwrap();
        let plain = predict(&[[1.0, 1.0]], &theta).unwrap();

        assert_eq!(predictions[0].mean, plain[0]);
        assert_eq!(predictions[0].lower, predictions[0].upper);
    }

    proptest! {
        #[test]
        fn any_chunk_size_preserves_order(batch_size in 1_usize..32) {
            let theta = [0.15; PARAM_COUNT];
            let x: Vec<[f64; 2]> = (0..21).map(|k| [k as f64 * 0.05, -0.4]).collect();

            let plain = predict(&x, &theta).unwrap();
            let batched = predict_in_batches(&x, &theta, batch_size).unwrap();

            prop_assert_eq!(plain, batched);
        }
    }
}
