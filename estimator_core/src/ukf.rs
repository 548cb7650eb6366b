//! Unscented Kalman filter over the CTRV motion model.
//!
//! One [`StateEstimator`] instance tracks exactly one object. Every call to
//! [`StateEstimator::step`] is a single synchronous read-modify-write of the
//! private state; the caller serializes calls, no internal locking exists.
//!
//! # Processing per measurement
//! 1. First measurement only: initialize state/covariance and return
//! 2. Δt from the microsecond timestamps
//! 3. Augmented sigma points → CTRV propagation → predicted mean/covariance
//! 4. Exhaustive dispatch on the sensor payload: linear lidar update or
//!    sigma-point radar update, each producing its NIS diagnostic
//!
//! All step outputs are computed into temporaries and committed only once
//! the whole step succeeded, so a numerical fault leaves the last valid
//! state, covariance and timestamp intact.

use crate::angles::normalize_angle;
use crate::error::EstimatorError;
use crate::motion;
use crate::sigma;
use crate::types::{
    MeasurementPackage, SensorKind, SensorReading, SigmaPoints, StateCov, StateVec, Weights, N_SIG,
};
use nalgebra::{Matrix2, Matrix2x5, Matrix3, Matrix5x3, SMatrix, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Floor for the computed range in the radar observation function. Below it
/// the range is clamped and the bearing forced to zero so the range-rate
/// denominator stays usable.
const RANGE_FLOOR: f64 = 0.001;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Tuning and sensor-noise configuration, fixed at construction.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct UkfConfig {
    /// Process noise std: longitudinal acceleration (m/s²)
    pub std_a: f64,
    /// Process noise std: yaw acceleration (rad/s²)
    pub std_yawdd: f64,
    /// Lidar noise std: position x (m)
    pub std_laspx: f64,
    /// Lidar noise std: position y (m)
    pub std_laspy: f64,
    /// Radar noise std: range (m)
    pub std_radr: f64,
    /// Radar noise std: bearing (rad)
    pub std_radphi: f64,
    /// Radar noise std: range rate (m/s)
    pub std_radrd: f64,
    /// Process lidar measurements (disabled: step is a no-op, NIS reset to 0)
    pub use_lidar: bool,
    /// Process radar measurements (disabled: step is a no-op, NIS reset to 0)
    pub use_radar: bool,
}

impl Default for UkfConfig {
    fn default() -> Self {
        Self {
            std_a: 1.0,
            std_yawdd: 1.0,
            std_laspx: 0.15,
            std_laspy: 0.15,
            std_radr: 0.3,
            std_radphi: 0.03,
            std_radrd: 0.3,
            use_lidar: true,
            use_radar: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Estimator
// ---------------------------------------------------------------------------

/// Recursive CTRV state estimator fusing lidar and radar measurements.
#[derive(Clone, Debug)]
pub struct StateEstimator {
    pub config: UkfConfig,
    /// Current state estimate [px, py, v, yaw, yawd]
    pub x: StateVec,
    /// Current state covariance (symmetric PSD after every successful step)
    pub p: StateCov,
    /// Normalized innovation squared of the last lidar update (2 dof)
    pub nis_lidar: f64,
    /// Normalized innovation squared of the last radar update (3 dof)
    pub nis_radar: f64,
    weights: Weights,
    time_us: i64,
    initialized: bool,
}

impl StateEstimator {
    pub fn new(config: UkfConfig) -> Self {
        Self {
            config,
            x: StateVec::zeros(),
            p: StateCov::identity(),
            nis_lidar: 0.0,
            nis_radar: 0.0,
            weights: sigma::weights(),
            time_us: 0,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Timestamp of the last accepted measurement (microseconds).
    pub fn last_timestamp_us(&self) -> i64 {
        self.time_us
    }

    /// Process one measurement: initialize on the first call, otherwise
    /// predict to the measurement time and run the matching update.
    ///
    /// A returned error means the step was aborted with no state mutation.
    pub fn step(&mut self, m: &MeasurementPackage) -> Result<(), EstimatorError> {
        if !self.initialized {
            // both sensors seed the filter even when disabled for updates
            self.initialize(m);
            return Ok(());
        }

        match m.reading {
            SensorReading::Lidar { .. } if !self.config.use_lidar => {
                self.nis_lidar = 0.0;
                return Ok(());
            }
            SensorReading::Radar { .. } if !self.config.use_radar => {
                self.nis_radar = 0.0;
                return Ok(());
            }
            _ => {}
        }

        let dt = (m.timestamp_us - self.time_us) as f64 / 1e6;
        let (x_pred, p_pred, xsig_pred) = self.predict(dt)?;

        match m.reading {
            SensorReading::Lidar { x, y } => {
                let (x_new, p_new, nis) =
                    self.update_lidar(&x_pred, &p_pred, Vector2::new(x, y))?;
                self.x = x_new;
                self.p = p_new;
                self.nis_lidar = nis;
            }
            SensorReading::Radar {
                range,
                bearing,
                range_rate,
            } => {
                let z = Vector3::new(range, bearing, range_rate);
                let (x_new, p_new, nis) =
                    self.update_radar(&x_pred, &p_pred, &xsig_pred, z)?;
                self.x = x_new;
                self.p = p_new;
                self.nis_radar = nis;
            }
        }
        self.time_us = m.timestamp_us;
        Ok(())
    }

    /// Seed state and covariance from the first measurement.
    fn initialize(&mut self, m: &MeasurementPackage) {
        self.x = StateVec::from_column_slice(&[0.0, 0.0, 3.0, 0.0, 0.1]);
        self.p = StateCov::identity();
        self.p[(2, 2)] = 1.0;
        self.p[(3, 3)] = PI * PI / 64.0;
        self.p[(4, 4)] = PI * PI / 640.0;

        match m.reading {
            SensorReading::Radar { range, bearing, .. } => {
                self.x[0] = range * bearing.cos();
                self.x[1] = range * bearing.sin();
                let var = self.config.std_radr * self.config.std_radr * 0.5;
                self.p[(0, 0)] = var;
                self.p[(1, 1)] = var;
                self.nis_radar = 0.0;
            }
            SensorReading::Lidar { x, y } => {
                self.x[0] = x;
                self.x[1] = y;
                self.p[(0, 0)] = self.config.std_laspx * self.config.std_laspx;
                self.p[(1, 1)] = self.config.std_laspy * self.config.std_laspy;
                self.nis_lidar = 0.0;
            }
        }
        self.time_us = m.timestamp_us;
        self.initialized = true;
        debug!(sensor = %m.reading.kind(), "estimator initialized from first measurement");
    }

    /// Predict state, covariance and the propagated sigma points over `dt`.
    fn predict(&self, dt: f64) -> Result<(StateVec, StateCov, SigmaPoints), EstimatorError> {
        let xsig_aug = sigma::augmented_sigma_points(
            &self.x,
            &self.p,
            self.config.std_a,
            self.config.std_yawdd,
        )
        .ok_or(EstimatorError::CovarianceNotPositiveDefinite { dt })?;

        let mut xsig_pred = SigmaPoints::zeros();
        for i in 0..N_SIG {
            let col = motion::propagate(&xsig_aug.column(i).into_owned(), dt);
            xsig_pred.set_column(i, &col);
        }

        let (x, p) = motion::predict_mean_and_covariance(&xsig_pred, &self.weights);
        Ok((x, p, xsig_pred))
    }

    /// Linear update: a fixed 2×5 selection matrix observes [px, py].
    fn update_lidar(
        &self,
        x: &StateVec,
        p: &StateCov,
        z: Vector2<f64>,
    ) -> Result<(StateVec, StateCov, f64), EstimatorError> {
        #[rustfmt::skip]
        let h = Matrix2x5::new(
            1.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0, 0.0,
        );
        let r = Matrix2::from_diagonal(&Vector2::new(
            self.config.std_laspx * self.config.std_laspx,
            self.config.std_laspy * self.config.std_laspy,
        ));

        let innovation = z - h * x;
        let s = h * p * h.transpose() + r;
        let s_inv = s
            .try_inverse()
            .ok_or(EstimatorError::SingularInnovationCovariance {
                sensor: SensorKind::Lidar,
            })?;

        let k = p * h.transpose() * s_inv;
        let x_new = x + k * innovation;
        let p_new = p - k * h * p;
        let nis = innovation.dot(&(s_inv * innovation));
        Ok((x_new, p_new, nis))
    }

    /// Sigma-point update: transform the predicted sigma points into
    /// (range, bearing, range-rate) space, then apply the unscented update.
    fn update_radar(
        &self,
        x: &StateVec,
        p: &StateCov,
        xsig_pred: &SigmaPoints,
        z: Vector3<f64>,
    ) -> Result<(StateVec, StateCov, f64), EstimatorError> {
        let mut zsig = SMatrix::<f64, 3, N_SIG>::zeros();
        for i in 0..N_SIG {
            let px = xsig_pred[(0, i)];
            let py = xsig_pred[(1, i)];
            let v = xsig_pred[(2, i)];
            let yaw = xsig_pred[(3, i)];

            let vx = yaw.cos() * v;
            let vy = yaw.sin() * v;

            let mut range = (px * px + py * py).sqrt();
            let bearing = if range < RANGE_FLOOR {
                // clamp: keeps the range-rate denominator away from zero,
                // at the cost of a discontinuity right at the floor
                range = RANGE_FLOOR;
                0.0
            } else {
                py.atan2(px)
            };
            zsig[(0, i)] = range;
            zsig[(1, i)] = bearing;
            zsig[(2, i)] = (px * vx + py * vy) / range;
        }

        let mut z_pred = Vector3::zeros();
        for i in 0..N_SIG {
            z_pred += zsig.column(i) * self.weights[i];
        }

        let mut s = Matrix3::zeros();
        let mut tc = Matrix5x3::zeros();
        for i in 0..N_SIG {
            let mut dz: Vector3<f64> = zsig.column(i) - z_pred;
            dz[1] = normalize_angle(dz[1]);

            let mut dx: StateVec = xsig_pred.column(i) - x;
            dx[3] = normalize_angle(dx[3]);

            s += dz * dz.transpose() * self.weights[i];
            tc += dx * dz.transpose() * self.weights[i];
        }
        s[(0, 0)] += self.config.std_radr * self.config.std_radr;
        s[(1, 1)] += self.config.std_radphi * self.config.std_radphi;
        s[(2, 2)] += self.config.std_radrd * self.config.std_radrd;

        let s_inv = s
            .try_inverse()
            .ok_or(EstimatorError::SingularInnovationCovariance {
                sensor: SensorKind::Radar,
            })?;

        let k = tc * s_inv;
        let mut innovation = z - z_pred;
        innovation[1] = normalize_angle(innovation[1]);

        let x_new = x + k * innovation;
        let p_new = p - tc * k.transpose();
        let nis = innovation.dot(&(s_inv * innovation));
        Ok((x_new, p_new, nis))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AugVec;
    use approx::assert_abs_diff_eq;

    fn lidar(t_us: i64, x: f64, y: f64) -> MeasurementPackage {
        MeasurementPackage {
            timestamp_us: t_us,
            reading: SensorReading::Lidar { x, y },
        }
    }

    fn radar(t_us: i64, range: f64, bearing: f64, range_rate: f64) -> MeasurementPackage {
        MeasurementPackage {
            timestamp_us: t_us,
            reading: SensorReading::Radar {
                range,
                bearing,
                range_rate,
            },
        }
    }

    #[test]
    fn radar_first_measurement_initializes_position() {
        let mut est = StateEstimator::new(UkfConfig::default());
        est.step(&radar(0, 5.0, 0.0, 0.0)).unwrap();
        assert!(est.is_initialized());
        assert_abs_diff_eq!(est.x[0], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(est.x[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(est.x[2], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(est.nis_radar, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn lidar_first_measurement_initializes_position() {
        let mut est = StateEstimator::new(UkfConfig::default());
        est.step(&lidar(0, 2.0, 3.0)).unwrap();
        assert_abs_diff_eq!(est.x[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(est.x[1], 3.0, epsilon = 1e-12);
        let cfg = UkfConfig::default();
        assert_abs_diff_eq!(est.p[(0, 0)], cfg.std_laspx * cfg.std_laspx, epsilon = 1e-12);
    }

    #[test]
    fn disabled_sensor_is_a_no_op() {
        let mut est = StateEstimator::new(UkfConfig {
            use_lidar: false,
            ..UkfConfig::default()
        });
        est.step(&radar(0, 5.0, 0.0, 0.0)).unwrap();
        est.nis_lidar = 1.7; // stale value from nowhere, must be zeroed
        let x_before = est.x;
        let p_before = est.p;
        let t_before = est.last_timestamp_us();

        est.step(&lidar(100_000, 5.1, 0.1)).unwrap();
        assert_eq!(est.x, x_before);
        assert_eq!(est.p, p_before);
        assert_eq!(est.last_timestamp_us(), t_before);
        assert_eq!(est.nis_lidar, 0.0);
    }

    #[test]
    fn failed_step_leaves_state_untouched() {
        let mut est = StateEstimator::new(UkfConfig::default());
        est.step(&lidar(0, 1.0, 1.0)).unwrap();
        // corrupt the covariance so the augmented Cholesky must fail
        est.p = StateCov::identity() * -1.0;
        let x_before = est.x;
        let t_before = est.last_timestamp_us();

        let err = est.step(&lidar(50_000, 1.1, 1.0)).unwrap_err();
        assert!(matches!(
            err,
            EstimatorError::CovarianceNotPositiveDefinite { .. }
        ));
        assert_eq!(est.x, x_before);
        assert_eq!(est.last_timestamp_us(), t_before);
    }

    #[test]
    fn singular_innovation_covariance_is_reported_per_sensor() {
        // zero measurement noise plus a zero covariance makes S exactly
        // singular on both update paths
        let cfg = UkfConfig {
            std_laspx: 0.0,
            std_laspy: 0.0,
            std_radr: 0.0,
            std_radphi: 0.0,
            std_radrd: 0.0,
            ..UkfConfig::default()
        };
        let est = StateEstimator::new(cfg);
        let x = StateVec::new(1.0, 1.0, 3.0, 0.0, 0.0);
        let p = StateCov::zeros();

        let err = est
            .update_lidar(&x, &p, Vector2::new(1.0, 1.0))
            .unwrap_err();
        assert_eq!(
            err,
            EstimatorError::SingularInnovationCovariance {
                sensor: SensorKind::Lidar,
            }
        );

        // all sigma points in one place → zero spread in measurement space
        let mut xsig = SigmaPoints::zeros();
        for i in 0..N_SIG {
            xsig.set_column(i, &x);
        }
        let err = est
            .update_radar(&x, &p, &xsig, Vector3::new(1.4, 0.8, 0.0))
            .unwrap_err();
        assert_eq!(
            err,
            EstimatorError::SingularInnovationCovariance {
                sensor: SensorKind::Radar,
            }
        );

        // the fault never reaches the committed fields
        assert_eq!(est.x, StateVec::zeros());
        assert_eq!(est.last_timestamp_us(), 0);
    }

    #[test]
    fn converges_on_noise_free_turning_trajectory() {
        // truth generated exactly by the CTRV model the filter assumes
        let mut truth = AugVec::from_column_slice(&[0.0, 10.0, 5.0, 0.0, 0.3, 0.0, 0.0]);
        let dt = 0.05;
        let mut est = StateEstimator::new(UkfConfig::default());

        for step in 0..200 {
            if step > 0 {
                let next = motion::propagate(&truth, dt);
                truth.fixed_rows_mut::<5>(0).copy_from(&next);
            }
            let t_us = (step as f64 * dt * 1e6) as i64;
            let px = truth[0];
            let py = truth[1];
            let v = truth[2];
            let yaw = truth[3];

            let m = if step % 2 == 0 {
                lidar(t_us, px, py)
            } else {
                let range = (px * px + py * py).sqrt();
                let bearing = py.atan2(px);
                let range_rate = (px * yaw.cos() * v + py * yaw.sin() * v) / range;
                radar(t_us, range, bearing, range_rate)
            };
            est.step(&m).unwrap();
        }
        // truth is now at the time of the last processed measurement

        let pos_err =
            ((est.x[0] - truth[0]).powi(2) + (est.x[1] - truth[1]).powi(2)).sqrt();
        assert!(pos_err < 0.1, "position error {pos_err} too large");
        assert!((est.x[2] - truth[2]).abs() < 0.3, "speed off: {}", est.x[2]);
        assert!(
            (normalize_angle(est.x[3] - truth[3])).abs() < 0.1,
            "heading off"
        );
        assert!((est.x[4] - truth[4]).abs() < 0.1, "turn rate off");
    }

    #[test]
    fn covariance_stays_symmetric_after_updates() {
        let mut est = StateEstimator::new(UkfConfig::default());
        est.step(&lidar(0, 1.0, 1.0)).unwrap();
        est.step(&radar(50_000, 1.5, 0.8, 0.4)).unwrap();
        est.step(&lidar(100_000, 1.1, 1.05)).unwrap();
        for r in 0..5 {
            for c in 0..5 {
                assert_abs_diff_eq!(est.p[(r, c)], est.p[(c, r)], epsilon = 1e-9);
            }
        }
    }
}
