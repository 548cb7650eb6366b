//! Scenario definitions.
//!
//! Each scenario is a named configuration of one target and the two
//! sensors. All scenarios are deterministic given the same seed.

use crate::target::{MotionSpec, Target};
use sensor_models::{LidarParams, RadarParams};
use serde::{Deserialize, Serialize};

/// Which pre-defined scenario to load.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioKind {
    /// Constant velocity, no turning — baseline sanity run
    StraightLine,
    /// Alternating left/right turns at constant speed
    FigureTurn,
    /// Long constant-turn run for NIS consistency statistics
    NoiseConsistency,
}

/// A fully configured simulation scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub duration: f64, // seconds
    pub sim_dt: f64,   // simulation heartbeat (s)
    pub target: Target,
    pub lidar: LidarParams,
    pub radar: RadarParams,
}

impl Scenario {
    /// Build the named scenario. Uses `seed` for repeatability.
    pub fn build(kind: ScenarioKind, seed: u64) -> Self {
        match kind {
            ScenarioKind::StraightLine => Self {
                name: "straight_line".into(),
                seed,
                duration: 30.0,
                sim_dt: 0.01,
                target: Target::new(
                    [0.0, 0.0, 5.0, std::f64::consts::FRAC_PI_4, 0.0],
                    MotionSpec::ConstantTurn,
                ),
                lidar: LidarParams::default(),
                radar: RadarParams::default(),
            },
            ScenarioKind::FigureTurn => Self {
                name: "figure_turn".into(),
                seed,
                duration: 30.0,
                sim_dt: 0.01,
                target: Target::new(
                    [0.0, 10.0, 5.0, 0.0, 0.3],
                    MotionSpec::Segmented {
                        segments: vec![(0.0, 0.3), (10.0, -0.3), (20.0, 0.3)],
                    },
                ),
                lidar: LidarParams::default(),
                radar: RadarParams::default(),
            },
            ScenarioKind::NoiseConsistency => Self {
                name: "noise_consistency".into(),
                seed,
                duration: 120.0,
                sim_dt: 0.01,
                target: Target::new([5.0, 0.0, 4.0, 0.0, 0.2], MotionSpec::ConstantTurn),
                lidar: LidarParams::default(),
                radar: RadarParams::default(),
            },
        }
    }
}
