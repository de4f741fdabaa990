//! Shortest-path routing over a topology.
//!
//! Single-source shortest path with a binary-heap frontier and lazy deletion:
//! improved distances push a fresh frontier entry and stale entries are
//! skipped when popped. Weights are non-negative, so the first time the
//! destination is popped its distance is final.
//!
//! Frontier ties on distance are broken by push order, which makes the chosen
//! path deterministic for a given topology.

use crate::error::PathError;
use crate::node::Weight;
use crate::topology::Topology;
use netsim_env::NodeId;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

/// A minimum-weight path, inclusive of both endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    nodes: Vec<NodeId>,
    distance: Weight,
}

impl Route {
    /// Nodes from start to end.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Total weight of the path.
    pub fn distance(&self) -> Weight {
        self.distance
    }

    /// Number of links traversed.
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Consecutive node pairs, one per traversed link.
    pub fn links(&self) -> impl Iterator<Item = (&NodeId, &NodeId)> {
        self.nodes.windows(2).map(|pair| (&pair[0], &pair[1]))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains(id)
    }

    pub fn start(&self) -> &NodeId {
        &self.nodes[0]
    }

    pub fn end(&self) -> &NodeId {
        &self.nodes[self.nodes.len() - 1]
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.nodes.iter().map(NodeId::as_str).collect();
        write!(f, "{} (cost {})", names.join(" -> "), self.distance)
    }
}

/// Frontier entry ordered by (distance, push sequence).
#[derive(Debug, PartialEq, Eq)]
struct FrontierEntry<'a> {
    distance: Weight,
    seq: u64,
    node: &'a NodeId,
}

impl Ord for FrontierEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for FrontierEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest-path search bound to one topology.
pub struct PathFinder<'a> {
    topology: &'a Topology,
}

impl<'a> PathFinder<'a> {
    pub fn new(topology: &'a Topology) -> Self {
        Self { topology }
    }

    /// Finds the minimum-weight path from `start` to `end`.
    ///
    /// Returns [`PathError::NoPath`] when the endpoints are disconnected and
    /// [`PathError::UnknownNode`] when either is not in the topology.
    pub fn shortest_path(&self, start: &NodeId, end: &NodeId) -> Result<Route, PathError> {
        let (start, end) = (self.resolve(start)?, self.resolve(end)?);

        // Absent from `best` means infinite distance
        let mut best: HashMap<&NodeId, Weight> = HashMap::with_capacity(self.topology.node_count());
        let mut previous: HashMap<&NodeId, &NodeId> = HashMap::new();
        let mut frontier = BinaryHeap::new();
        let mut seq = 0u64;

        best.insert(start, Weight::ZERO);
        frontier.push(Reverse(FrontierEntry {
            distance: Weight::ZERO,
            seq,
            node: start,
        }));

        while let Some(Reverse(FrontierEntry { distance, node, .. })) = frontier.pop() {
            if node == end {
                return Ok(Route {
                    nodes: Self::unwind(&previous, start, end),
                    distance,
                });
            }

            if best.get(node).is_some_and(|known| distance > *known) {
                continue;
            }

            let Some(current) = self.topology.find_node(node) else {
                continue;
            };

            for (neighbor_id, weight) in current.neighbors() {
                // Adjacency may only name live nodes; resolve through the graph
                let Some(neighbor) = self.topology.find_node(neighbor_id) else {
                    continue;
                };
                let neighbor = &neighbor.id;
                let candidate = distance + weight;

                if best.get(neighbor).map_or(true, |known| candidate < *known) {
                    best.insert(neighbor, candidate);
                    previous.insert(neighbor, node);
                    seq += 1;
                    frontier.push(Reverse(FrontierEntry {
                        distance: candidate,
                        seq,
                        node: neighbor,
                    }));
                }
            }
        }

        Err(PathError::NoPath {
            from: start.clone(),
            to: end.clone(),
        })
    }

    fn resolve(&self, id: &NodeId) -> Result<&'a NodeId, PathError> {
        self.topology
            .find_node(id)
            .map(|node| &node.id)
            .ok_or_else(|| PathError::UnknownNode(id.clone()))
    }

    fn unwind<'n>(
        previous: &HashMap<&'n NodeId, &'n NodeId>,
        start: &NodeId,
        end: &'n NodeId,
    ) -> Vec<NodeId> {
        let mut path = vec![end.clone()];
        let mut cursor = end;
        while cursor != start {
            match previous.get(cursor) {
                Some(&prev) => {
                    path.push(prev.clone());
                    cursor = prev;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}
