pub mod dataset;
pub mod error;
pub mod inference;
pub mod matrix;
pub mod network;
pub mod objective;
pub mod optimizer;

pub use error::{Error, Result};
pub use objective::{FnObjective, Objective};
pub use optimizer::{
    best_of_restarts, minimize, Adam, GradientDescent, Momentum, Optimizer, RestartConfig, RmsProp,
    Run,
};

#[cfg(test)]
mod test_utils;
