//! Angle normalization for circular quantities (yaw, bearing).
//!
//! Heading and bearing differences must be wrapped before entering any
//! covariance sum: near the ±π seam a naive difference can be close to 2π
//! and would dominate the weighted statistics.

use std::f64::consts::{PI, TAU};

/// Wrap an angle into (−π, π]. Idempotent.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn wraps_into_half_open_interval() {
        for k in -20..=20 {
            let a = 0.3 + k as f64 * TAU;
            assert_abs_diff_eq!(normalize_angle(a), 0.3, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(normalize_angle(PI + 0.1), -PI + 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(normalize_angle(-PI - 0.1), PI - 0.1, epsilon = 1e-9);
    }

    #[test]
    fn boundary_maps_to_positive_pi() {
        // (−π, π] is half-open: both ±π inputs land on +π
        assert_abs_diff_eq!(normalize_angle(PI), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle(-PI), PI, epsilon = 1e-12);
    }

    #[test]
    fn idempotent() {
        for &a in &[-7.5, -PI, -0.2, 0.0, 1.0, PI, 4.0, 123.456] {
            let once = normalize_angle(a);
            let twice = normalize_angle(once);
            assert_abs_diff_eq!(once, twice, epsilon = 1e-12);
            assert!(once > -PI && once <= PI, "out of range for input {a}");
        }
    }
}
