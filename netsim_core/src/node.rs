//! Nodes, link weights, and node status markers.

use crate::error::TopologyError;
use netsim_env::{NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Add;

/// Cost of traversing a link.
///
/// Always finite and non-negative, so it is totally ordered and can key the
/// routing frontier directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Weight(f64);

impl Weight {
    /// Zero cost (distance from a node to itself)
    pub const ZERO: Weight = Weight(0.0);

    /// Unit cost used by every canonical link
    pub const UNIT: Weight = Weight(1.0);

    /// Validates a raw weight.
    pub fn new(value: f64) -> Result<Self, TopologyError> {
        if value.is_finite() && value >= 0.0 {
            // Normalizes -0.0 so the total order agrees with `==`
            Ok(Self(value + 0.0))
        } else {
            Err(TopologyError::InvalidWeight(value))
        }
    }

    /// Returns the raw value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Eq for Weight {}

impl PartialOrd for Weight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Weight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for Weight {
    type Output = Weight;

    fn add(self, rhs: Weight) -> Weight {
        Weight(self.0 + rhs.0)
    }
}

impl TryFrom<f64> for Weight {
    type Error = TopologyError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Weight::new(value)
    }
}

impl From<Weight> for f64 {
    fn from(weight: Weight) -> f64 {
        weight.0
    }
}

impl From<u32> for Weight {
    fn from(value: u32) -> Self {
        Weight(value as f64)
    }
}

impl std::fmt::Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Screen position of a node, consumed only by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Display status of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Idle
    #[default]
    Normal,

    /// Part of the currently highlighted route
    OnRoute,

    /// Removed by failure injection
    Failed,

    /// Endpoint of a route that could not be found
    Unreachable,
}

/// A simulated network device.
///
/// The adjacency map is only mutated through `Topology`, which keeps it
/// symmetric and in step with the edge list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identity
    pub id: NodeId,

    /// Device class (client or router)
    pub kind: NodeKind,

    /// Display position
    pub position: Position,

    /// Display status
    pub status: NodeStatus,

    /// Neighbor identity -> link weight
    neighbors: BTreeMap<NodeId, Weight>,
}

impl Node {
    /// Creates an unlinked node with `Normal` status.
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            status: NodeStatus::Normal,
            neighbors: BTreeMap::new(),
        }
    }

    /// Shorthand for a client node.
    pub fn client(id: impl Into<NodeId>, x: i32, y: i32) -> Self {
        Self::new(id, NodeKind::Client, Position::new(x, y))
    }

    /// Shorthand for a router node.
    pub fn router(id: impl Into<NodeId>, x: i32, y: i32) -> Self {
        Self::new(id, NodeKind::Router, Position::new(x, y))
    }

    /// Neighbors in identity order.
    pub fn neighbors(&self) -> impl Iterator<Item = (&NodeId, Weight)> {
        self.neighbors.iter().map(|(id, w)| (id, *w))
    }

    /// Weight of the link to `other`, if adjacent.
    pub fn weight_to(&self, other: &NodeId) -> Option<Weight> {
        self.neighbors.get(other).copied()
    }

    pub fn is_adjacent(&self, other: &NodeId) -> bool {
        self.neighbors.contains_key(other)
    }

    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    pub(crate) fn attach(&mut self, other: NodeId, weight: Weight) {
        self.neighbors.insert(other, weight);
    }

    pub(crate) fn detach(&mut self, other: &NodeId) -> Option<Weight> {
        self.neighbors.remove(other)
    }

    pub(crate) fn detach_all(&mut self) {
        self.neighbors.clear();
    }
}
