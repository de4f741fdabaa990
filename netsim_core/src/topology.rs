//! The live network graph.
//!
//! `Topology` exclusively owns every node and edge. The adjacency maps on the
//! nodes and the edge list are two views of the same links; only the methods
//! here mutate them, and they always update both together.
//!
//! A failed node leaves the graph but is kept in a single "offline" slot so a
//! renderer can still draw it. The slot is never consulted by routing.

use crate::edge::{Edge, EdgeStatus};
use crate::error::TopologyError;
use crate::node::{Node, NodeStatus, Weight};
use crate::snapshot::{EdgeView, NodeView, TopologySnapshot};
use netsim_env::{NodeId, NodeKind};
use std::collections::BTreeMap;

/// Graph container for nodes and links.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    /// Identity -> node
    nodes: BTreeMap<NodeId, Node>,

    /// Links in insertion order (drawing order)
    edges: Vec<Edge>,

    /// Most recently removed node, kept for display only
    offline: Option<Node>,
}

impl Topology {
    /// Creates an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node by identity.
    ///
    /// An existing node with the same identity is replaced silently; its
    /// links are dropped with it so no adjacency entry points at the new
    /// record by accident. Returns the replaced node, if any.
    pub fn insert_node(&mut self, node: Node) -> Option<Node> {
        if self.nodes.contains_key(&node.id) {
            self.unlink_all(&node.id);
        }
        self.nodes.insert(node.id.clone(), node)
    }

    /// Removes a node and records it as the last offline node.
    ///
    /// Does not touch edges: call [`Topology::unlink_all`] first, or use
    /// [`Topology::fail_node`] which does both.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<&Node> {
        let node = self.nodes.remove(id)?;
        self.offline = Some(node);
        self.offline.as_ref()
    }

    /// Links two registered nodes with a symmetric weight.
    pub fn link(&mut self, a: &NodeId, b: &NodeId, weight: f64) -> Result<(), TopologyError> {
        let weight = Weight::new(weight)?;

        if a == b {
            return Err(TopologyError::SelfLink(a.clone()));
        }
        for id in [a, b] {
            if !self.nodes.contains_key(id) {
                return Err(TopologyError::NodeNotFound(id.clone()));
            }
        }
        if self.find_edge(a, b).is_some() {
            return Err(TopologyError::DuplicateLink(a.clone(), b.clone()));
        }

        if let Some(node) = self.nodes.get_mut(a) {
            node.attach(b.clone(), weight);
        }
        if let Some(node) = self.nodes.get_mut(b) {
            node.attach(a.clone(), weight);
        }
        self.edges.push(Edge::new(a.clone(), b.clone(), weight));

        Ok(())
    }

    /// Removes every link touching `id`. Returns the number removed.
    pub fn unlink_all(&mut self, id: &NodeId) -> usize {
        let mut removed = 0;

        for (other_id, other) in self.nodes.iter_mut() {
            if other_id != id && other.detach(id).is_some() {
                removed += 1;
            }
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.detach_all();
        }
        self.edges.retain(|edge| !edge.touches(id));

        removed
    }

    /// Fails a node: unlinks it, removes it, and marks it `Failed` in the
    /// offline slot. Returns `None` if the node is not in the graph.
    pub fn fail_node(&mut self, id: &NodeId) -> Option<&Node> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        self.unlink_all(id);
        let mut node = self.nodes.remove(id)?;
        node.status = NodeStatus::Failed;
        Some(&*self.offline.insert(node))
    }

    pub fn find_node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn find_node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Finds the edge joining `a` and `b`, in either order.
    pub fn find_edge(&self, a: &NodeId, b: &NodeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.connects(a, b))
    }

    pub fn find_edge_mut(&mut self, a: &NodeId, b: &NodeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|edge| edge.connects(a, b))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Live nodes in identity order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Live edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The last node removed from the graph, if any.
    pub fn offline(&self) -> Option<&Node> {
        self.offline.as_ref()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Identities of live nodes of the given class, in identity order.
    pub fn ids_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|node| node.kind == kind)
            .map(|node| node.id.clone())
            .collect()
    }

    /// Resets route markers on live nodes and edges.
    ///
    /// `Failed` lives only on the offline slot and is left alone.
    pub fn clear_highlights(&mut self) {
        for node in self.nodes.values_mut() {
            if matches!(node.status, NodeStatus::OnRoute | NodeStatus::Unreachable) {
                node.status = NodeStatus::Normal;
            }
        }
        for edge in &mut self.edges {
            edge.status = EdgeStatus::Default;
        }
    }

    /// Checks that adjacency maps and the edge list describe the same links.
    pub fn verify(&self) -> Result<(), TopologyError> {
        for edge in &self.edges {
            let (a, b) = edge.endpoints();
            let node_a = self.nodes.get(a).ok_or_else(|| {
                TopologyError::Inconsistent(format!("edge {a}-{b} names missing node {a}"))
            })?;
            let node_b = self.nodes.get(b).ok_or_else(|| {
                TopologyError::Inconsistent(format!("edge {a}-{b} names missing node {b}"))
            })?;
            if node_a.weight_to(b) != Some(edge.weight())
                || node_b.weight_to(a) != Some(edge.weight())
            {
                return Err(TopologyError::Inconsistent(format!(
                    "edge {a}-{b} does not match adjacency weights"
                )));
            }
            if self.edges.iter().filter(|other| other.connects(a, b)).count() > 1 {
                return Err(TopologyError::Inconsistent(format!(
                    "duplicate edge {a}-{b}"
                )));
            }
        }

        for node in self.nodes.values() {
            for (neighbor, _) in node.neighbors() {
                if neighbor == &node.id {
                    return Err(TopologyError::Inconsistent(format!(
                        "{neighbor} lists itself"
                    )));
                }
                if self.find_edge(&node.id, neighbor).is_none() {
                    return Err(TopologyError::Inconsistent(format!(
                        "{} lists {neighbor} without an edge",
                        node.id
                    )));
                }
            }
        }

        Ok(())
    }

    /// Read-only view for renderers.
    pub fn snapshot(&self) -> TopologySnapshot {
        TopologySnapshot {
            nodes: self.nodes.values().map(NodeView::from).collect(),
            edges: self.edges.iter().map(EdgeView::from).collect(),
            offline: self.offline.as_ref().map(NodeView::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(name: &str) -> NodeId {
        NodeId::from(name)
    }

    fn triangle() -> Topology {
        let mut topology = Topology::new();
        topology.insert_node(Node::client("C1", 0, 0));
        topology.insert_node(Node::router("R1", 10, 0));
        topology.insert_node(Node::router("R2", 0, 10));
        topology.link(&id("C1"), &id("R1"), 1.0).unwrap();
        topology.link(&id("R1"), &id("R2"), 1.0).unwrap();
        topology.link(&id("R2"), &id("C1"), 2.0).unwrap();
        topology
    }

    #[test]
    fn test_link_is_symmetric() {
        let topology = triangle();

        let c1 = topology.find_node(&id("C1")).unwrap();
        let r2 = topology.find_node(&id("R2")).unwrap();
        assert_eq!(c1.weight_to(&id("R2")), Some(Weight::from(2)));
        assert_eq!(r2.weight_to(&id("C1")), Some(Weight::from(2)));
        assert_eq!(topology.edge_count(), 3);
        assert!(topology.verify().is_ok());
    }

    #[test]
    fn test_find_edge_either_order() {
        let topology = triangle();
        assert!(topology.find_edge(&id("R1"), &id("C1")).is_some());
        assert!(topology.find_edge(&id("C1"), &id("R1")).is_some());
        assert!(topology.find_edge(&id("C1"), &id("C9")).is_none());
    }

    #[test]
    fn test_link_rejections() {
        let mut topology = triangle();

        assert_eq!(
            topology.link(&id("R1"), &id("R1"), 1.0),
            Err(TopologyError::SelfLink(id("R1")))
        );
        assert_eq!(
            topology.link(&id("R1"), &id("R9"), 1.0),
            Err(TopologyError::NodeNotFound(id("R9")))
        );
        assert_eq!(
            topology.link(&id("R1"), &id("R2"), -1.0),
            Err(TopologyError::InvalidWeight(-1.0))
        );
        assert_eq!(
            topology.link(&id("R2"), &id("R1"), 1.0),
            Err(TopologyError::DuplicateLink(id("R2"), id("R1")))
        );

        // Nothing leaked from the rejected calls
        assert_eq!(topology.edge_count(), 3);
        assert!(topology.verify().is_ok());
    }

    #[test]
    fn test_unlink_all_removes_edges_and_adjacency() {
        let mut topology = triangle();

        let removed = topology.unlink_all(&id("R1"));
        assert_eq!(removed, 2);
        assert_eq!(topology.edge_count(), 1);
        let r1 = id("R1");
        assert!(!topology.find_node(&id("C1")).unwrap().is_adjacent(&r1));
        assert!(!topology.find_node(&id("R2")).unwrap().is_adjacent(&r1));
        assert_eq!(topology.find_node(&id("R1")).unwrap().degree(), 0);
        assert!(topology.verify().is_ok());
    }

    #[test]
    fn test_remove_node_records_offline() {
        let mut topology = triangle();
        topology.unlink_all(&id("R2"));

        let offline = topology.remove_node(&id("R2")).unwrap();
        assert_eq!(offline.id, id("R2"));
        assert!(!topology.contains(&id("R2")));
        assert_eq!(topology.offline().map(|n| n.id.clone()), Some(id("R2")));

        // Only one remembered at a time
        topology.unlink_all(&id("R1"));
        topology.remove_node(&id("R1"));
        assert_eq!(topology.offline().map(|n| n.id.clone()), Some(id("R1")));
        assert!(topology.remove_node(&id("R9")).is_none());
    }

    #[test]
    fn test_fail_node() {
        let mut topology = triangle();

        let failed = topology.fail_node(&id("R1")).unwrap();
        assert_eq!(failed.status, NodeStatus::Failed);
        assert_eq!(failed.degree(), 0);

        assert_eq!(topology.node_count(), 2);
        assert!(topology.edges().iter().all(|e| !e.touches(&id("R1"))));
        assert!(topology.nodes().all(|n| !n.is_adjacent(&id("R1"))));
        assert!(topology.verify().is_ok());

        // Already gone
        assert!(topology.fail_node(&id("R1")).is_none());
    }

    #[test]
    fn test_insert_node_overwrite_drops_links() {
        let mut topology = triangle();

        let replaced = topology.insert_node(Node::router("R1", 99, 99));
        assert!(replaced.is_some());
        assert_eq!(topology.node_count(), 3);
        assert_eq!(topology.find_node(&id("R1")).unwrap().position.x, 99);
        assert!(topology.find_edge(&id("C1"), &id("R1")).is_none());
        assert!(topology.verify().is_ok());
    }

    #[test]
    fn test_clear_highlights() {
        let mut topology = triangle();
        topology.find_node_mut(&id("C1")).unwrap().status = NodeStatus::Unreachable;
        topology.find_node_mut(&id("R1")).unwrap().status = NodeStatus::OnRoute;
        let edge = topology.find_edge_mut(&id("C1"), &id("R1")).unwrap();
        edge.status = EdgeStatus::OnRoute;
        topology.fail_node(&id("R2"));

        topology.clear_highlights();

        assert!(topology.nodes().all(|n| n.status == NodeStatus::Normal));
        let edges = topology.edges();
        assert!(edges.iter().all(|e| e.status == EdgeStatus::Default));
        assert_eq!(topology.offline().unwrap().status, NodeStatus::Failed);
    }

    #[test]
    fn test_ids_of_kind() {
        let topology = triangle();
        assert_eq!(topology.ids_of_kind(NodeKind::Client), vec![id("C1")]);
        assert_eq!(
            topology.ids_of_kind(NodeKind::Router),
            vec![id("R1"), id("R2")]
        );
    }

    #[test]
    fn test_verify_detects_dangling_edge() {
        let mut topology = triangle();
        // Removing without unlinking breaks the invariant
        topology.remove_node(&id("R1"));
        assert!(matches!(
            topology.verify(),
            Err(TopologyError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_snapshot() {
        let mut topology = triangle();
        topology.fail_node(&id("R2"));

        let snapshot = topology.snapshot();
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.edges.len(), 1);
        let offline = snapshot.offline.as_ref().map(|n| n.status);
        assert_eq!(offline, Some(NodeStatus::Failed));
    }

    proptest! {
        #[test]
        fn prop_fail_node_leaves_no_trace(
            n in 2usize..10,
            links in proptest::collection::vec((0usize..10, 0usize..10), 0..30),
            victim in 0usize..10,
        ) {
            let mut topology = Topology::new();
            for i in 0..n {
                topology.insert_node(Node::router(format!("N{i}"), 0, 0));
            }
            for (a, b) in links {
                let (a, b) = (id(&format!("N{}", a % n)), id(&format!("N{}", b % n)));
                let _ = topology.link(&a, &b, 1.0);
            }

            let victim = id(&format!("N{}", victim % n));
            prop_assert!(topology.fail_node(&victim).is_some());

            prop_assert!(topology.verify().is_ok());
            prop_assert!(!topology.contains(&victim));
            prop_assert!(topology.edges().iter().all(|e| !e.touches(&victim)));
            prop_assert!(topology.nodes().all(|n| !n.is_adjacent(&victim)));
            prop_assert_eq!(topology.offline().map(|n| &n.id), Some(&victim));
        }
    }
}
