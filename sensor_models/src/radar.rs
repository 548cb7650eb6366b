//! Radar sensor parameters.

use serde::{Deserialize, Serialize};

/// Physical configuration of the radar sensor.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RadarParams {
    /// Measurement noise: range standard deviation (meters)
    pub range_noise_std: f64,
    /// Measurement noise: bearing standard deviation (radians)
    pub bearing_noise_std: f64,
    /// Measurement noise: range-rate standard deviation (m/s)
    pub range_rate_noise_std: f64,
    /// Update rate (Hz) — time between scans = 1.0 / refresh_rate
    pub refresh_rate: f64,
}

impl Default for RadarParams {
    fn default() -> Self {
        Self {
            range_noise_std: 0.3,      // 30 cm
            bearing_noise_std: 0.03,   // ~1.7°
            range_rate_noise_std: 0.3, // 30 cm/s
            refresh_rate: 10.0,
        }
    }
}
