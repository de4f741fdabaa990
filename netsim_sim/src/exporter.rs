//! JSON exporter for external renderers.
//!
//! Exports topology snapshots for every frame on which something happened.

use crate::error::SimError;
use netsim_core::TopologySnapshot;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single exported frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Frame number
    pub frame: u64,

    /// Simulation time in seconds
    pub time_sec: f64,

    /// Whether the simulation was paused on this frame
    pub paused: bool,

    /// Topology state after the frame's actions
    pub topology: TopologySnapshot,

    /// Events fired on this frame
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<String>,
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used (0 when entropy-seeded)
    pub seed: u64,

    /// Host frame rate
    pub fps: u32,

    /// Duration in seconds
    pub duration_sec: f64,

    /// All frames
    pub frames: Vec<SimFrame>,

    /// Final result
    pub passed: bool,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64, fps: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            fps,
            duration_sec: 0.0,
            frames: Vec::new(),
            passed: false,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool) {
        self.passed = passed;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
