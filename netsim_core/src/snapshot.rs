//! Read-only views handed to renderers.
//!
//! Renderers get owned copies of the display-relevant fields, never a handle
//! into the live topology.

use crate::edge::{Edge, EdgeStatus};
use crate::node::{Node, NodeStatus, Position};
use netsim_env::{NodeId, NodeKind};
use serde::{Deserialize, Serialize};

/// Display data for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Position,
    pub status: NodeStatus,
}

impl From<&Node> for NodeView {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            kind: node.kind,
            position: node.position,
            status: node.status,
        }
    }
}

/// Display data for one link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeView {
    pub a: NodeId,
    pub b: NodeId,
    pub weight: f64,
    pub status: EdgeStatus,
}

impl From<&Edge> for EdgeView {
    fn from(edge: &Edge) -> Self {
        let (a, b) = edge.endpoints();
        Self {
            a: a.clone(),
            b: b.clone(),
            weight: edge.weight().value(),
            status: edge.status,
        }
    }
}

/// Everything a renderer needs to draw one frame of the topology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    /// Live nodes in identity order
    pub nodes: Vec<NodeView>,

    /// Live edges in drawing order
    pub edges: Vec<EdgeView>,

    /// Last failed node, drawn on top of the graph
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline: Option<NodeView>,
}

impl TopologySnapshot {
    /// Nodes currently highlighted as part of a route.
    pub fn route_nodes(&self) -> impl Iterator<Item = &NodeView> {
        self.nodes.iter().filter(|n| n.status == NodeStatus::OnRoute)
    }

    /// Edges currently highlighted as part of a route.
    pub fn route_edges(&self) -> impl Iterator<Item = &EdgeView> {
        self.edges.iter().filter(|e| e.status == EdgeStatus::OnRoute)
    }
}
