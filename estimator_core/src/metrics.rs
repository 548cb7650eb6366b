//! Estimation metrics: RMSE against ground truth, NIS consistency counting.

use crate::types::StateVec;
use serde::{Deserialize, Serialize};

/// χ²(0.95) critical values indexed by degrees of freedom [0..=6].
/// ~95% of NIS samples should fall below the value for their dof when the
/// noise parameters are tuned consistently.
pub const CHI2_95: [f64; 7] = [0.0, 3.84, 5.99, 7.81, 9.49, 11.07, 12.59];

/// Ground-truth state of the tracked object at a given time.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GroundTruth {
    pub time: f64,
    /// True CTRV state [px, py, v, yaw, yawd]
    pub state: [f64; 5],
}

impl GroundTruth {
    /// True cartesian [px, py, vx, vy] derived from the CTRV state.
    pub fn cartesian(&self) -> [f64; 4] {
        let [px, py, v, yaw, _] = self.state;
        [px, py, v * yaw.cos(), v * yaw.sin()]
    }
}

/// Accumulated estimation-error and NIS statistics.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EstimationMetrics {
    /// Number of (estimate, ground truth) pairs evaluated
    pub n_samples: u64,
    /// Sums of squared errors for [px, py, vx, vy]
    pub sum_sq_err: [f64; 4],
    /// Lidar NIS samples below / total
    pub nis_lidar_below: u64,
    pub nis_lidar_total: u64,
    /// Radar NIS samples below / total
    pub nis_radar_below: u64,
    pub nis_radar_total: u64,
}

impl EstimationMetrics {
    /// Accumulate one estimate against the matching ground truth.
    pub fn accumulate(&mut self, estimate: &StateVec, truth: &GroundTruth) {
        let est = [
            estimate[0],
            estimate[1],
            estimate[2] * estimate[3].cos(),
            estimate[2] * estimate[3].sin(),
        ];
        let tru = truth.cartesian();
        for i in 0..4 {
            let e = est[i] - tru[i];
            self.sum_sq_err[i] += e * e;
        }
        self.n_samples += 1;
    }

    /// Record one lidar NIS sample (2 dof).
    pub fn record_nis_lidar(&mut self, nis: f64) {
        self.nis_lidar_total += 1;
        if nis < CHI2_95[2] {
            self.nis_lidar_below += 1;
        }
    }

    /// Record one radar NIS sample (3 dof).
    pub fn record_nis_radar(&mut self, nis: f64) {
        self.nis_radar_total += 1;
        if nis < CHI2_95[3] {
            self.nis_radar_below += 1;
        }
    }

    /// Per-component RMSE [px, py, vx, vy].
    pub fn rmse(&self) -> [f64; 4] {
        if self.n_samples == 0 {
            return [0.0; 4];
        }
        let n = self.n_samples as f64;
        self.sum_sq_err.map(|s| (s / n).sqrt())
    }

    /// Fraction of lidar NIS samples below χ²(0.95, 2).
    pub fn nis_lidar_consistency(&self) -> f64 {
        if self.nis_lidar_total == 0 {
            return 1.0;
        }
        self.nis_lidar_below as f64 / self.nis_lidar_total as f64
    }

    /// Fraction of radar NIS samples below χ²(0.95, 3).
    pub fn nis_radar_consistency(&self) -> f64 {
        if self.nis_radar_total == 0 {
            return 1.0;
        }
        self.nis_radar_below as f64 / self.nis_radar_total as f64
    }
}
