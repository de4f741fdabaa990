//! netsim Core - Network Topology Model and Routing Engine
//!
//! A small network modeled as an undirected weighted graph of clients and
//! routers:
//! 1. **Topology**: nodes, links, and failure removal that keeps adjacency
//!    and the edge list consistent
//! 2. **PathFinder**: minimum-weight routes with deterministic tie-breaking
//! 3. **Blueprints**: the canonical layout and JSON-loadable custom layouts
//!
//! Renderers read state through [`TopologySnapshot`] and never hold a
//! reference into the live graph.

pub mod blueprint;
pub mod edge;
pub mod error;
pub mod node;
pub mod pathfinder;
pub mod snapshot;
pub mod topology;

// Re-export key types for convenience
pub use blueprint::{LinkSpec, NodeSpec, TopologyBlueprint};
pub use edge::{Edge, EdgeStatus};
pub use error::{BlueprintError, PathError, TopologyError};
pub use netsim_env::{NodeId, NodeKind};
pub use node::{Node, NodeStatus, Position, Weight};
pub use pathfinder::{PathFinder, Route};
pub use snapshot::{EdgeView, NodeView, TopologySnapshot};
pub use topology::Topology;
