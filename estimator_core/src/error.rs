//! Error types for the estimator.
//!
//! Numerical faults abort the current step and leave the last valid state
//! and covariance untouched; they are never retried internally, since the
//! same corrupted inputs would reproduce the fault.

use crate::types::SensorKind;
use thiserror::Error;

/// Fatal numerical faults surfaced by [`crate::ukf::StateEstimator::step`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EstimatorError {
    /// The augmented covariance failed its Cholesky factorization during
    /// prediction. This signals state corruption: the covariance is no
    /// longer positive definite.
    #[error("augmented covariance not positive definite in prediction (dt = {dt:.6} s)")]
    CovarianceNotPositiveDefinite { dt: f64 },

    /// The innovation covariance needed for the Kalman gain is singular.
    #[error("singular innovation covariance in {sensor} update")]
    SingularInnovationCovariance { sensor: SensorKind },
}
