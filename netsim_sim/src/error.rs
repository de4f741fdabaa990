//! Error types for the simulation harness.

use netsim_core::{BlueprintError, TopologyError};
use thiserror::Error;

/// Errors raised while setting up or exporting a simulation.
///
/// Ticking itself never fails; everything that can go wrong is caught when
/// the controller is built.
#[derive(Debug, Error)]
pub enum SimError {
    /// A cadence of zero ticks would never fire
    #[error("Invalid cadence: {0}")]
    InvalidCadence(String),

    /// Custom topology could not be loaded
    #[error("Blueprint error: {0}")]
    Blueprint(#[from] BlueprintError),

    /// Blueprint describes an invalid topology
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    /// Writing an export or starting the pacing runtime failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding an export failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
