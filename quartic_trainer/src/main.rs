use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rand::{Rng, SeedableRng};
use serde::Serialize;

use descent::dataset::{Dataset, Split};
use descent::inference::{self, McConfig};
use descent::network::{self, TrainConfig};
use descent::optimizer::{Adam, GradientDescent, Momentum, RestartConfig, RmsProp, Run};
use descent::{best_of_restarts, minimize, FnObjective};

const OUT_ROOT: &str = "./out";

const RESTART_SEED: u64 = 123;
const DATA_SEED: u64 = 89;

fn quartic() -> FnObjective<impl Fn(&[f64]) -> f64, impl Fn(&[f64]) -> Vec<f64>> {
    FnObjective::new(
        |x: &[f64]| {
            let (a, b) = (x[0], x[1]);
            a.powi(4) + b.powi(4) + a.powi(2) * b + a * b.powi(2)
                - 20.0 * a.powi(2)
                - 15.0 * b.powi(2)
        },
        |x: &[f64]| {
            let (a, b) = (x[0], x[1]);
            vec![
                4.0 * a.powi(3) + 2.0 * a * b + b.powi(2) - 40.0 * a,
                4.0 * b.powi(3) + a.powi(2) + 2.0 * a * b - 30.0 * b,
            ]
        },
    )
}

#[derive(Serialize)]
struct SweepEntry {
    lr: f64,
    diverged: bool,
    run: Run,
}

fn save_json<T: Serialize>(file_name: &str, value: &T) {
    let mut w = BufWriter::new(File::create(file_name).unwrap());
    serde_json::to_writer(&mut w, value).unwrap();
    w.flush().unwrap();
}

fn main() {
    if !Path::new(OUT_ROOT).exists() {
        std::fs::create_dir_all(OUT_ROOT).unwrap();
    }

    let objective = quartic();
    let x0 = [0.0, 5.0];
    const STEPS: usize = 100;

    println!("========= GRADIENT DESCENT LEARNING RATE SWEEP ======");

    let mut sweep = Vec::new();
    for lr in [1.0, 0.1, 0.01, 0.001, 0.0001] {
        let run = minimize(&objective, &mut GradientDescent::new(lr), &x0, STEPS).unwrap();
        let diverged = run.diverged();

        println!(
            "lr = {:>7}: {}",
            lr,
            if diverged {
                "diverged".to_string()
            } else {
                format!("f = {:.6} at ({:.4}, {:.4})", run.value, run.x[0], run.x[1])
            }
        );

        sweep.push(SweepEntry { lr, diverged, run });
    }
    save_json(&format!("{}/gd-sweep.json", OUT_ROOT), &sweep);

    println!("========= OPTIMIZER COMPARISON (lr = 0.01) ==========");

    let gd = minimize(&objective, &mut GradientDescent::new(0.01), &x0, STEPS).unwrap();
    let momentum = minimize(&objective, &mut Momentum::with_defaults(0.01), &x0, STEPS).unwrap();
    let rmsprop = minimize(&objective, &mut RmsProp::with_defaults(0.01), &x0, STEPS).unwrap();
    let adam = minimize(&objective, &mut Adam::with_defaults(0.01), &x0, STEPS).unwrap();

    for (name, run) in [
        ("gradient descent", &gd),
        ("momentum", &momentum),
        ("rmsprop", &rmsprop),
        ("adam", &adam),
    ] {
        println!(
            "{:>16}: f = {:.6} at ({:.4}, {:.4})",
            name, run.value, run.x[0], run.x[1]
        );
        save_json(
            &format!("{}/trajectory-{}.json", OUT_ROOT, name.replace(' ', "-")),
            run,
        );
    }

    println!(
        "========= RANDOM RESTARTS (seed {}) ================",
        RESTART_SEED
    );

    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(RESTART_SEED);
    let config = RestartConfig {
        restarts: 20,
        steps: STEPS,
        low: -5.0,
        high: 5.0,
    };
    let best = best_of_restarts(&objective, || GradientDescent::new(0.01), 2, &config, &mut rng)
        .unwrap()
        .expect("every restart diverged");

    println!(
        "best of {} restarts: f = {:.6} at ({:.4}, {:.4})",
        config.restarts, best.value, best.x[0], best.x[1]
    );
    save_json(&format!("{}/restarts-best.json", OUT_ROOT), &best);

    println!("========= NETWORK TRAINING WITH DROPOUT =============");

    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(DATA_SEED);

    let inputs: Vec<[f64; 2]> = (0..200)
        .map(|_| [rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)])
        .collect();
    let targets: Vec<f64> = inputs
        .iter()
        .map(|v| 0.5 * (v[0] + v[1]) + 0.05 * rng.gen_range(-1.0..=1.0))
        .collect();
    let ds = Dataset::new(inputs, targets).unwrap();
    let split = Split::by_fraction(ds.len(), 0.8, 0.1);

    println!(
        "{} samples: {} train / {} validation / {} test",
        ds.len(),
        split.train.len(),
        split.validation.len(),
        split.test.len()
    );

    let keep_probability = 0.8;
    let (train_x, train_y) = ds.select(&split.train);
    let report = network::train(
        train_x,
        train_y,
        &TrainConfig {
            learning_rate: 0.1,
            epochs: 2000,
            dropout: keep_probability,
        },
        &mut rng,
    )
    .unwrap();

    println!("best training loss: {:.6}", report.loss);
    save_json(&format!("{}/train-report.json", OUT_ROOT), &report);

    let (val_x, val_y) = ds.select(&split.validation);
    let val_predictions = inference::predict(val_x, &report.theta).unwrap();
    println!(
        "validation MSE: {:.6}",
        network::mse(&val_predictions, val_y).unwrap()
    );

    println!("========= INFERENCE MODE COMPARISON =================");

    let (test_x, test_y) = ds.select(&split.test);

    let plain = inference::predict_in_batches(test_x, &report.theta, 8).unwrap();
    let scaled = inference::predict_weight_scaled(test_x, &report.theta, keep_probability).unwrap();
    let mc = inference::predict_mc(
        test_x,
        &report.theta,
        &McConfig {
            samples: 500,
            noise_std: 0.05,
            dropout: keep_probability,
        },
        &mut rng,
    )
    .unwrap();

    let mc_means: Vec<f64> = mc.iter().map(|p| p.mean).collect();

    println!(
        "test MSE: plain = {:.6}, weight-scaled = {:.6}, mc = {:.6}",
        network::mse(&plain, test_y).unwrap(),
        network::mse(&scaled, test_y).unwrap(),
        network::mse(&mc_means, test_y).unwrap()
    );

    for (k, p) in mc.iter().take(5).enumerate() {
        println!(
            "example {}: mc = {:.4} [{:.4}, {:.4}], weight-scaled = {:.4}, target = {:.4}",
            k, p.mean, p.lower, p.upper, scaled[k], test_y[k]
        );
    }

    save_json(&format!("{}/predictions-mc.json", OUT_ROOT), &mc);
    save_json(
        &format!("{}/predictions-weight-scaled.json", OUT_ROOT),
        &scaled,
    );

    println!("Done. Artifacts written to {}", OUT_ROOT);
}
