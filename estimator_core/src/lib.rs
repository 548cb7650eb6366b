//! `estimator_core` — Unscented CTRV estimation engine for lidar/radar fusion.
//!
//! # Module layout
//! - [`types`]   — Fundamental types (state/covariance aliases, measurements)
//! - [`error`]   — Numerical fault taxonomy
//! - [`angles`]  — Angle normalization into (−π, π]
//! - [`sigma`]   — Augmented sigma-point generation and weights
//! - [`motion`]  — CTRV propagation and predicted-moment recombination
//! - [`ukf`]     — The `StateEstimator` step function and both updates
//! - [`metrics`] — RMSE and NIS consistency accumulation

pub mod angles;
pub mod error;
pub mod metrics;
pub mod motion;
pub mod sigma;
pub mod types;
pub mod ukf;

pub use error::EstimatorError;
pub use types::{
    MeasurementPackage, SensorKind, SensorReading, StateCov, StateVec,
};
pub use ukf::{StateEstimator, UkfConfig};
