//! Ground-truth target trajectory.
//!
//! The target carries a true 5-DOF CTRV state [px, py, v, yaw, yawd] and is
//! stepped with the exact closed-form arc (or the straight-line limit), so a
//! noise-free measurement stream matches the estimator's motion model
//! exactly.

use serde::{Deserialize, Serialize};

/// Below this turn-rate magnitude the straight-line limit applies (same
/// threshold as the estimator's motion model).
const YAWD_EPS: f64 = 1e-3;

/// Describes how the target's turn rate evolves over the scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MotionSpec {
    /// Keep the turn rate carried in the state for the whole run.
    ConstantTurn,
    /// Piecewise-constant turn rate. `segments` is sorted by time ascending:
    /// [(t_start, yawd), ...]; the active rate is the last one whose
    /// t_start <= current time.
    Segmented { segments: Vec<(f64, f64)> },
}

/// A simulated target with ground-truth state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Target {
    /// True state [px, py, v, yaw, yawd]
    pub state: [f64; 5],
    /// Turn-rate schedule
    pub motion: MotionSpec,
}

impl Target {
    pub fn new(state: [f64; 5], motion: MotionSpec) -> Self {
        Self { state, motion }
    }

    /// Propagate the true state by `dt` seconds.
    pub fn step(&mut self, t: f64, dt: f64) {
        if let MotionSpec::Segmented { segments } = &self.motion {
            if let Some((_, yawd)) = segments.iter().filter(|(ts, _)| *ts <= t).last() {
                self.state[4] = *yawd;
            }
        }

        let [px, py, v, yaw, yawd] = self.state;
        let (px_n, py_n) = if yawd.abs() > YAWD_EPS {
            (
                px + v / yawd * ((yaw + yawd * dt).sin() - yaw.sin()),
                py + v / yawd * (yaw.cos() - (yaw + yawd * dt).cos()),
            )
        } else {
            (px + v * dt * yaw.cos(), py + v * dt * yaw.sin())
        };
        self.state = [px_n, py_n, v, yaw + yawd * dt, yawd];
    }

    /// 2D position
    pub fn pos_2d(&self) -> (f64, f64) {
        (self.state[0], self.state[1])
    }
}
