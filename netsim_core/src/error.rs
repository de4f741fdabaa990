//! Error types for the topology model and routing engine.

use netsim_env::NodeId;
use thiserror::Error;

/// Rejected topology mutations.
///
/// These are caller programming errors: the canonical layout never triggers
/// them, but a custom blueprint can.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    /// The referenced node is not registered
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// A node cannot be linked to itself
    #[error("Self-link rejected on node {0}")]
    SelfLink(NodeId),

    /// Weights must be finite and non-negative
    #[error("Invalid link weight: {0}")]
    InvalidWeight(f64),

    /// At most one link per unordered pair
    #[error("Duplicate link between {0} and {1}")]
    DuplicateLink(NodeId, NodeId),

    /// Adjacency maps and edge list disagree
    #[error("Inconsistent topology: {0}")]
    Inconsistent(String),
}

/// Outcomes of a shortest-path query that produce no route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Start or end is not in the topology
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// The endpoints are in disconnected components
    #[error("No path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },
}

/// Errors loading or building a topology blueprint.
#[derive(Debug, Error)]
pub enum BlueprintError {
    /// Reading the blueprint file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blueprint is not valid JSON for the expected schema
    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The blueprint describes an invalid topology
    #[error("Invalid blueprint: {0}")]
    Topology(#[from] TopologyError),
}
