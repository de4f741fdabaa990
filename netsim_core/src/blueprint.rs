//! Topology blueprints: the declarative description a topology is rebuilt
//! from.
//!
//! The canonical blueprint is the fixed 4-client / 7-router layout. Custom
//! layouts load from JSON:
//!
//! ```json
//! {
//!   "nodes": [
//!     { "name": "C1", "kind": "client", "x": 5, "y": 5 },
//!     { "name": "R1", "kind": "router", "x": 50, "y": 20 }
//!   ],
//!   "links": [
//!     { "a": "C1", "b": "R1", "weight": 1 }
//!   ]
//! }
//! ```

use crate::error::BlueprintError;
use crate::error::TopologyError;
use crate::node::{Node, Position};
use crate::topology::Topology;
use netsim_env::{NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One node in a blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: NodeId,
    pub kind: NodeKind,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

/// One link in a blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub a: NodeId,
    pub b: NodeId,
    #[serde(default = "unit_weight")]
    pub weight: f64,
}

fn unit_weight() -> f64 {
    1.0
}

/// Declarative topology description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyBlueprint {
    pub nodes: Vec<NodeSpec>,
    pub links: Vec<LinkSpec>,
}

impl TopologyBlueprint {
    /// The fixed layout: clients C1-C4 at the corners, routers R1-R7
    /// between them, every link weight 1.
    pub fn canonical() -> Self {
        let node = |name: &str, kind, x, y| NodeSpec {
            name: name.into(),
            kind,
            x,
            y,
        };
        let client = |name, x, y| node(name, NodeKind::Client, x, y);
        let router = |name, x, y| node(name, NodeKind::Router, x, y);
        let link = |a: &str, b: &str| LinkSpec {
            a: a.into(),
            b: b.into(),
            weight: 1.0,
        };

        Self {
            nodes: vec![
                client("C1", 5, 5),
                client("C2", 108, 5),
                client("C3", 5, 108),
                client("C4", 108, 108),
                router("R1", 50, 20),
                router("R2", 15, 50),
                router("R3", 15, 80),
                router("R4", 55, 60),
                router("R5", 90, 40),
                router("R6", 95, 75),
                router("R7", 60, 100),
            ],
            links: vec![
                // Client uplinks
                link("C1", "R1"),
                link("C2", "R5"),
                link("C3", "R3"),
                link("C4", "R7"),
                // Backbone
                link("R1", "R2"),
                link("R1", "R4"),
                link("R1", "R5"),
                link("R2", "R3"),
                link("R3", "R4"),
                link("R3", "R7"),
                link("R4", "R6"),
                link("R5", "R7"),
                link("R6", "R7"),
            ],
        }
    }

    /// Parses a blueprint from JSON.
    pub fn from_json(json: &str) -> Result<Self, BlueprintError> {
        let blueprint: Self = serde_json::from_str(json)?;
        blueprint.build()?;
        Ok(blueprint)
    }

    /// Reads and validates a blueprint file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BlueprintError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serializes the blueprint to pretty JSON.
    pub fn to_json(&self) -> Result<String, BlueprintError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds a fresh topology.
    ///
    /// Duplicate node names are rejected here even though
    /// `Topology::insert_node` would overwrite silently.
    pub fn build(&self) -> Result<Topology, TopologyError> {
        let mut topology = Topology::new();

        for node in &self.nodes {
            if topology.contains(&node.name) {
                return Err(TopologyError::Inconsistent(format!(
                    "node {} declared twice",
                    node.name
                )));
            }
            topology.insert_node(Node::new(
                node.name.clone(),
                node.kind,
                Position::new(node.x, node.y),
            ));
        }
        for link in &self.links {
            topology.link(&link.a, &link.b, link.weight)?;
        }

        Ok(topology)
    }

    /// Names of nodes of the given class, in declaration order.
    pub fn names_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.kind == kind)
            .map(|node| node.name.clone())
            .collect()
    }
}

impl Default for TopologyBlueprint {
    fn default() -> Self {
        Self::canonical()
    }
}
