//! `sensor_models` — Lidar/radar sensor parameters and observation helpers.

pub mod lidar;
pub mod observation;
pub mod radar;

pub use lidar::LidarParams;
pub use radar::RadarParams;
