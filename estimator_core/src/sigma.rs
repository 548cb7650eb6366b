//! Augmented sigma-point generation.
//!
//! The state is augmented with the two zero-mean process-noise components
//! (longitudinal acceleration, yaw acceleration) so that their effect runs
//! through the same unscented transform as the motion model itself.

use crate::types::{AugCov, AugSigmaPoints, AugVec, StateCov, StateVec, LAMBDA, N_AUG, N_X};
use nalgebra::Cholesky;

/// Sigma-point weights. weight[0] = λ/(λ+n_aug), the rest 0.5/(λ+n_aug).
/// The weights sum to 1 by construction.
pub fn weights() -> crate::types::Weights {
    let denom = LAMBDA + N_AUG as f64;
    let mut w = crate::types::Weights::from_element(0.5 / denom);
    w[0] = LAMBDA / denom;
    w
}

/// Build the augmented mean/covariance and derive the 2·n_aug+1 sigma points.
///
/// Returns `None` when the augmented covariance admits no Cholesky
/// factorization, i.e. it is not positive definite. The caller must treat
/// that as a fatal fault — the sigma points would be meaningless.
pub fn augmented_sigma_points(
    x: &StateVec,
    p: &StateCov,
    std_a: f64,
    std_yawdd: f64,
) -> Option<AugSigmaPoints> {
    let mut x_aug = AugVec::zeros();
    x_aug.fixed_rows_mut::<N_X>(0).copy_from(x);

    let mut p_aug = AugCov::zeros();
    p_aug.fixed_view_mut::<N_X, N_X>(0, 0).copy_from(p);
    p_aug[(N_X, N_X)] = std_a * std_a;
    p_aug[(N_X + 1, N_X + 1)] = std_yawdd * std_yawdd;

    let l = Cholesky::new(p_aug)?.l();
    let scale = (LAMBDA + N_AUG as f64).sqrt();

    let mut xsig = AugSigmaPoints::zeros();
    xsig.set_column(0, &x_aug);
    for i in 0..N_AUG {
        let offset = l.column(i) * scale;
        xsig.set_column(i + 1, &(x_aug + &offset));
        xsig.set_column(i + 1 + N_AUG, &(x_aug - &offset));
    }
    Some(xsig)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
