//! Undirected links between nodes.

use crate::node::Weight;
use netsim_env::NodeId;
use serde::{Deserialize, Serialize};

/// Display status of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStatus {
    /// Not highlighted
    #[default]
    Default,

    /// Part of the currently highlighted route
    OnRoute,
}

/// An undirected weighted link. Identity is the unordered endpoint pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    a: NodeId,
    b: NodeId,
    weight: Weight,

    /// Display status
    pub status: EdgeStatus,
}

impl Edge {
    pub(crate) fn new(a: NodeId, b: NodeId, weight: Weight) -> Self {
        Self {
            a,
            b,
            weight,
            status: EdgeStatus::Default,
        }
    }

    /// Endpoints in the order they were linked.
    pub fn endpoints(&self) -> (&NodeId, &NodeId) {
        (&self.a, &self.b)
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    /// True if this edge joins `x` and `y`, in either order.
    pub fn connects(&self, x: &NodeId, y: &NodeId) -> bool {
        (&self.a == x && &self.b == y) || (&self.a == y && &self.b == x)
    }

    /// True if `id` is one of the endpoints.
    pub fn touches(&self, id: &NodeId) -> bool {
        &self.a == id || &self.b == id
    }
}
