//! CTRV motion model: nonlinear propagation of sigma points and weighted
//! recombination into a predicted mean and covariance.
//!
//! # State vector
//! x = [px, py, v, yaw, yawd]ᵀ  (5-dimensional)
//!
//! # Propagation
//! Constant turn rate and velocity: position follows a circular arc when
//! |yawd| is meaningful, otherwise the straight-line limit is used to avoid
//! dividing by a near-zero turn rate. Process noise (nu_a, nu_yawdd) enters
//! as the usual second-order correction terms.

use crate::angles::normalize_angle;
use crate::types::{AugVec, SigmaPoints, StateCov, StateVec, Weights, N_SIG};

/// Below this turn-rate magnitude the straight-line limit applies.
pub const YAWD_EPS: f64 = 1e-3;

/// Advance one augmented sigma point through the CTRV model over `dt` seconds.
pub fn propagate(point: &AugVec, dt: f64) -> StateVec {
    let px = point[0];
    let py = point[1];
    let v = point[2];
    let yaw = point[3];
    let yawd = point[4];
    let nu_a = point[5];
    let nu_yawdd = point[6];

    let (mut px_p, mut py_p) = if yawd.abs() > YAWD_EPS {
        (
            px + v / yawd * ((yaw + yawd * dt).sin() - yaw.sin()),
            py + v / yawd * (yaw.cos() - (yaw + yawd * dt).cos()),
        )
    } else {
        (px + v * dt * yaw.cos(), py + v * dt * yaw.sin())
    };

    let mut v_p = v;
    let mut yaw_p = yaw + yawd * dt;
    let mut yawd_p = yawd;

    // process-noise correction terms
    px_p += 0.5 * nu_a * dt * dt * yaw.cos();
    py_p += 0.5 * nu_a * dt * dt * yaw.sin();
    v_p += nu_a * dt;
    yaw_p += 0.5 * nu_yawdd * dt * dt;
    yawd_p += nu_yawdd * dt;

    StateVec::new(px_p, py_p, v_p, yaw_p, yawd_p)
}

/// Recombine propagated sigma points into the predicted mean and covariance.
/// The yaw component of every difference is wrapped into (−π, π] first.
pub fn predict_mean_and_covariance(
    xsig_pred: &SigmaPoints,
    weights: &Weights,
) -> (StateVec, StateCov) {
    let mut x = StateVec::zeros();
    for i in 0..N_SIG {
        x += xsig_pred.column(i) * weights[i];
    }

    let mut p = StateCov::zeros();
    for i in 0..N_SIG {
        let mut dx: StateVec = xsig_pred.column(i) - x;
        dx[3] = normalize_angle(dx[3]);
        p += dx * dx.transpose() * weights[i];
    }
    (x, p)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigma;
    use crate::types::AugVec;
    use approx::assert_abs_diff_eq;

    #[test]
    fn straight_line_matches_constant_velocity() {
        // yawd = 0 → exact constant-velocity displacement along the heading
        let yaw = 0.4_f64;
        let v = 8.0;
        let dt = 0.7;
        let point = AugVec::from_column_slice(&[1.0, 2.0, v, yaw, 0.0, 0.0, 0.0]);
        let out = propagate(&point, dt);
        assert_abs_diff_eq!(out[0], 1.0 + v * dt * yaw.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], 2.0 + v * dt * yaw.sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(out[2], v, epsilon = 1e-12);
        assert_abs_diff_eq!(out[3], yaw, epsilon = 1e-12);
        assert_abs_diff_eq!(out[4], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn turning_keeps_speed_and_advances_heading() {
        let point = AugVec::from_column_slice(&[0.0, 0.0, 5.0, 0.0, 0.5, 0.0, 0.0]);
        let out = propagate(&point, 1.0);
        assert_abs_diff_eq!(out[2], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[3], 0.5, epsilon = 1e-12);
        // arc chord: px = v/yawd * sin(yawd·dt)
        assert_abs_diff_eq!(out[0], 5.0 / 0.5 * (0.5_f64).sin(), epsilon = 1e-12);
    }

    #[test]
    fn recombination_preserves_deterministic_points() {
        // With zero covariance spread every sigma point propagates to the same
        // place, so the recombined covariance must be (numerically) zero.
        let x = StateVec::new(3.0, -1.0, 4.0, 0.2, 0.05);
        let p = StateCov::identity() * 1e-12;
        let xsig = sigma::augmented_sigma_points(&x, &p, 1e-9, 1e-9).unwrap();
        let mut xsig_pred = SigmaPoints::zeros();
        for i in 0..N_SIG {
            xsig_pred.set_column(i, &propagate(&xsig.column(i).into_owned(), 0.1));
        }
        let (mean, cov) = predict_mean_and_covariance(&xsig_pred, &sigma::weights());
        let reference = propagate(
            &AugVec::from_column_slice(&[3.0, -1.0, 4.0, 0.2, 0.05, 0.0, 0.0]),
            0.1,
        );
        for r in 0..5 {
            assert_abs_diff_eq!(mean[r], reference[r], epsilon = 1e-6);
            assert!(cov[(r, r)].abs() < 1e-6);
        }
    }
}
