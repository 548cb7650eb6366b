//! Replay: serialize/deserialize simulation logs for offline reruns.

use estimator_core::metrics::GroundTruth;
use estimator_core::types::MeasurementPackage;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A full recorded simulation log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayLog {
    pub scenario_name: String,
    pub seed: u64,
    pub sim_dt: f64,
    pub duration: f64,
    /// All measurement packages in chronological order
    pub packages: Vec<MeasurementPackage>,
    /// Ground-truth states, sampled every `sim_dt`
    pub ground_truth: Vec<GroundTruth>,
}

/// Save a replay log to a JSON file.
pub fn save_replay(log: &ReplayLog, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, log)?;
    Ok(())
}

/// Load a replay log from a JSON file. Packages with an unknown sensor tag
/// fail deserialization here, before anything reaches the estimator.
pub fn load_replay(path: &Path) -> anyhow::Result<ReplayLog> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let log: ReplayLog = serde_json::from_reader(reader)?;
    Ok(log)
}
