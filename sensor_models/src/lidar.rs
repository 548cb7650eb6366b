//! Lidar sensor parameters.

use serde::{Deserialize, Serialize};

/// Physical configuration of the lidar sensor. The lidar reports object
/// position directly in cartesian coordinates.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LidarParams {
    /// Measurement noise: position x standard deviation (meters)
    pub px_noise_std: f64,
    /// Measurement noise: position y standard deviation (meters)
    pub py_noise_std: f64,
    /// Update rate (Hz) — time between scans = 1.0 / refresh_rate
    pub refresh_rate: f64,
}

impl Default for LidarParams {
    fn default() -> Self {
        Self {
            px_noise_std: 0.15,
            py_noise_std: 0.15,
            refresh_rate: 10.0,
        }
    }
}
