//! Fundamental types used across the entire workspace.

use nalgebra::{Matrix5, SMatrix, SVector, Vector5};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Scalar type: use f64 throughout for numerical precision in the filter.
// ---------------------------------------------------------------------------

/// Dimension of the tracked state.
pub const N_X: usize = 5;

/// Dimension of the augmented state (state + 2 process-noise components).
pub const N_AUG: usize = 7;

/// Number of sigma points: 2·n_aug + 1.
pub const N_SIG: usize = 2 * N_AUG + 1;

/// Sigma-point spreading parameter λ = 3 − n_aug.
pub const LAMBDA: f64 = 3.0 - N_AUG as f64;

/// 5-DOF CTRV state vector: [px, py, v, yaw, yawd]
pub type StateVec = Vector5<f64>;

/// 5×5 state covariance matrix
pub type StateCov = Matrix5<f64>;

/// Augmented mean: state plus zero-mean [nu_a, nu_yawdd]
pub type AugVec = SVector<f64, N_AUG>;

/// 7×7 augmented covariance (block-diagonal: P, std_a², std_yawdd²)
pub type AugCov = SMatrix<f64, N_AUG, N_AUG>;

/// Sigma points in augmented space, one per column
pub type AugSigmaPoints = SMatrix<f64, N_AUG, N_SIG>;

/// Propagated sigma points in state space, one per column
pub type SigmaPoints = SMatrix<f64, N_X, N_SIG>;

/// Sigma-point weight vector (fixed for the life of the estimator)
pub type Weights = SVector<f64, N_SIG>;

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

/// Which sensor modality produced a measurement. Used for diagnostics and
/// error reporting; dispatch itself matches on [`SensorReading`] payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Lidar,
    Radar,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Lidar => write!(f, "lidar"),
            SensorKind::Radar => write!(f, "radar"),
        }
    }
}

/// The raw observation carried by a [`MeasurementPackage`].
///
/// A closed enum: every update path matches exhaustively, so a package can
/// never reach the estimator with an unhandled sensor tag. Replay logs use
/// the serde tag, and deserializing an unknown tag fails loudly there.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum SensorReading {
    /// Direct position measurement (meters)
    Lidar { x: f64, y: f64 },
    /// Polar measurement: range (m), bearing (rad), range-rate (m/s)
    Radar {
        range: f64,
        bearing: f64,
        range_rate: f64,
    },
}

impl SensorReading {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorReading::Lidar { .. } => SensorKind::Lidar,
            SensorReading::Radar { .. } => SensorKind::Radar,
        }
    }
}

/// One timestamped sensor observation, immutable once received.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MeasurementPackage {
    /// Timestamp in microseconds, non-decreasing across the stream
    pub timestamp_us: i64,
    pub reading: SensorReading,
}
