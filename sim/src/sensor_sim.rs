//! Measurement simulator.
//!
//! Generates timestamped lidar and radar packages from the true target
//! state, with Gaussian measurement noise and independent per-sensor scan
//! schedules. The radar schedule is staggered by half a scan interval so
//! the two streams interleave the way the real sensors do.

use crate::target::Target;
use estimator_core::types::{MeasurementPackage, SensorReading};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use sensor_models::observation::state_to_polar;
use sensor_models::{LidarParams, RadarParams};

/// Generates the fused measurement stream for one target.
pub struct SensorSimulator {
    pub lidar: LidarParams,
    pub radar: RadarParams,
    rng: ChaCha8Rng,
    next_lidar_scan: f64,
    next_radar_scan: f64,
}

impl SensorSimulator {
    pub fn new(lidar: LidarParams, radar: RadarParams, seed: u64) -> Self {
        Self {
            lidar,
            radar,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_lidar_scan: 0.0,
            next_radar_scan: 0.5 / radar.refresh_rate,
        }
    }

    /// Generate all packages whose scan time has been reached at `sim_time`,
    /// in timestamp order.
    pub fn generate(&mut self, target: &Target, sim_time: f64) -> Vec<MeasurementPackage> {
        let mut packages = Vec::new();

        if sim_time >= self.next_lidar_scan {
            let scan_time = self.next_lidar_scan;
            self.next_lidar_scan += 1.0 / self.lidar.refresh_rate;
            packages.push(self.lidar_package(target, scan_time));
        }
        if sim_time >= self.next_radar_scan {
            let scan_time = self.next_radar_scan;
            self.next_radar_scan += 1.0 / self.radar.refresh_rate;
            packages.push(self.radar_package(target, scan_time));
        }

        packages.sort_by_key(|p| p.timestamp_us);
        packages
    }

    fn lidar_package(&mut self, target: &Target, scan_time: f64) -> MeasurementPackage {
        let [px, py, ..] = target.state;
        MeasurementPackage {
            timestamp_us: (scan_time * 1e6).round() as i64,
            reading: SensorReading::Lidar {
                x: px + self.gauss(self.lidar.px_noise_std),
                y: py + self.gauss(self.lidar.py_noise_std),
            },
        }
    }

    fn radar_package(&mut self, target: &Target, scan_time: f64) -> MeasurementPackage {
        let (range, bearing, range_rate) = state_to_polar(&target.state);
        MeasurementPackage {
            timestamp_us: (scan_time * 1e6).round() as i64,
            reading: SensorReading::Radar {
                range: range + self.gauss(self.radar.range_noise_std),
                bearing: bearing + self.gauss(self.radar.bearing_noise_std),
                range_rate: range_rate + self.gauss(self.radar.range_rate_noise_std),
            },
        }
    }

    fn gauss(&mut self, std: f64) -> f64 {
        if std == 0.0 {
            return 0.0;
        }
        Normal::new(0.0, std)
            .expect("std must be finite and non-negative")
            .sample(&mut self.rng)
    }
}
