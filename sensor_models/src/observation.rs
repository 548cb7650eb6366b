//! Observation helpers: CTRV state → measurement space, polar↔cartesian.
//!
//! Used by the simulator to produce noise-free observations and by tests to
//! build reference measurements.

/// Convert a polar (range, bearing) pair to cartesian (x, y).
pub fn polar_to_cartesian(range: f64, bearing: f64) -> (f64, f64) {
    (range * bearing.cos(), range * bearing.sin())
}

/// Map a CTRV state [px, py, v, yaw, yawd] to the radar observation
/// (range, bearing, range-rate).
pub fn state_to_polar(state: &[f64; 5]) -> (f64, f64, f64) {
    let [px, py, v, yaw, _] = *state;
    let range = (px * px + py * py).sqrt();
    let bearing = py.atan2(px);
    let range_rate = (px * yaw.cos() * v + py * yaw.sin() * v) / range;
    (range, bearing, range_rate)
}
