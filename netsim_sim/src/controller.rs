//! SimulationController - the periodic rebuild / failure / routing policy.
//!
//! One call to [`SimulationController::tick`] per host frame. While running,
//! two independently cadenced actions fire on the frame counter:
//!
//! - every `rebuild_every` ticks the topology is replaced by a fresh copy of
//!   the blueprint, clearing failures and highlights
//! - every `route_every` ticks a route cycle runs: a failure roll that may
//!   remove one router, then a random client pair is routed and highlighted
//!
//! When both fall on the same frame the rebuild runs first. The frame counter
//! advances while paused, so paused time still counts toward the next action.

use crate::config::ControllerConfig;
use crate::error::SimError;
use netsim_core::{
    EdgeStatus, NodeId, NodeKind, NodeStatus, PathError, PathFinder, Route, Topology,
    TopologySnapshot,
};
use netsim_env::SimulationContext;
use tracing::{debug, info, warn};

/// Running or paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
}

/// Result of routing the chosen client pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Path found and highlighted
    Routed(Route),

    /// Endpoints disconnected; both marked unreachable
    Unreachable,
}

/// One failure roll + route selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCycle {
    /// Router removed by this cycle's roll, if any
    pub failed: Option<NodeId>,
    pub start: NodeId,
    pub end: NodeId,
    pub outcome: RouteOutcome,
}

/// An action fired during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleEvent {
    /// Topology rebuilt from the blueprint
    Rebuilt,

    /// Route cycle completed
    Route(RouteCycle),

    /// Route cycle ran its failure roll but fewer than two clients remain
    RouteSkipped { failed: Option<NodeId> },
}

impl std::fmt::Display for CycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleEvent::Rebuilt => write!(f, "rebuilt topology"),
            CycleEvent::Route(cycle) => {
                if let Some(failed) = &cycle.failed {
                    write!(f, "{failed} failed; ")?;
                }
                match &cycle.outcome {
                    RouteOutcome::Routed(route) => write!(f, "route {route}"),
                    RouteOutcome::Unreachable => {
                        write!(f, "{} unreachable from {}", cycle.end, cycle.start)
                    }
                }
            }
            CycleEvent::RouteSkipped { failed } => {
                if let Some(failed) = failed {
                    write!(f, "{failed} failed; ")?;
                }
                write!(f, "route skipped: fewer than two clients")
            }
        }
    }
}

/// Everything that happened during one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Frame number this tick ran as
    pub frame: u64,

    /// Actions fired, in order (empty when paused or off-cadence)
    pub events: Vec<CycleEvent>,
}

impl TickReport {
    pub fn is_idle(&self) -> bool {
        self.events.is_empty()
    }
}

/// Owns the live topology and drives it frame by frame.
pub struct SimulationController<C: SimulationContext> {
    config: ControllerConfig,

    /// Source of every random draw
    ctx: C,

    /// Pristine topology built once from the blueprint
    template: Topology,

    /// Live topology
    topology: Topology,

    /// Failure pool, in blueprint order
    routers: Vec<NodeId>,

    /// Endpoint pool, in blueprint order
    clients: Vec<NodeId>,

    state: RunState,

    /// Next frame to run
    frame: u64,
}

impl<C: SimulationContext> SimulationController<C> {
    /// Validates the configuration and builds the initial topology.
    pub fn new(config: ControllerConfig, ctx: C) -> Result<Self, SimError> {
        config.validate()?;
        let template = config.blueprint.build()?;
        let routers = config.blueprint.names_of_kind(NodeKind::Router);
        let clients = config.blueprint.names_of_kind(NodeKind::Client);

        Ok(Self {
            topology: template.clone(),
            template,
            routers,
            clients,
            config,
            ctx,
            state: RunState::Running,
            frame: 0,
        })
    }

    /// Advances one frame.
    pub fn tick(&mut self) -> TickReport {
        let frame = self.frame;
        let mut events = Vec::new();

        if self.state == RunState::Running {
            if frame % self.config.rebuild_every == 0 {
                self.rebuild();
                events.push(CycleEvent::Rebuilt);
            }
            if frame % self.config.route_every == 0 {
                events.push(self.route_cycle());
            }
        }

        self.frame += 1;
        TickReport { frame, events }
    }

    /// Flips between running and paused. Returns the new state.
    pub fn toggle(&mut self) -> RunState {
        self.state = match self.state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
        };
        info!(frame = self.frame, state = ?self.state, "Toggled simulation");
        self.state
    }

    /// Replaces the live topology with a fresh copy of the blueprint.
    pub fn rebuild(&mut self) {
        self.topology = self.template.clone();
        debug!(frame = self.frame, "Rebuilt topology");
    }

    /// Runs one failure roll + route selection + highlight.
    pub fn route_cycle(&mut self) -> CycleEvent {
        self.topology.clear_highlights();
        let failed = self.inject_failure();

        let Some((start, end)) = self.pick_endpoints() else {
            warn!(
                frame = self.frame,
                "Fewer than two clients left; skipping route"
            );
            return CycleEvent::RouteSkipped { failed };
        };

        let outcome = match PathFinder::new(&self.topology).shortest_path(&start, &end) {
            Ok(route) => {
                self.highlight(&route);
                info!(frame = self.frame, "Route {}", route);
                RouteOutcome::Routed(route)
            }
            Err(err @ (PathError::NoPath { .. } | PathError::UnknownNode(_))) => {
                for id in [&start, &end] {
                    if let Some(node) = self.topology.find_node_mut(id) {
                        node.status = NodeStatus::Unreachable;
                    }
                }
                warn!(frame = self.frame, "{}", err);
                RouteOutcome::Unreachable
            }
        };

        CycleEvent::Route(RouteCycle {
            failed,
            start,
            end,
            outcome,
        })
    }

    /// Rolls the failure die; on a 1, fails a random live router.
    fn inject_failure(&mut self) -> Option<NodeId> {
        if self.config.failure_odds == 0 {
            return None;
        }
        if self.ctx.roll(self.config.failure_odds) != 1 {
            return None;
        }

        let live: Vec<NodeId> = self
            .routers
            .iter()
            .filter(|id| self.topology.contains(id))
            .cloned()
            .collect();
        let Some(victim) = self.ctx.choose(&live).cloned() else {
            warn!(frame = self.frame, "Failure rolled but no routers remain");
            return None;
        };

        self.topology.fail_node(&victim)?;
        info!(frame = self.frame, router = %victim, "Router failed");
        Some(victim)
    }

    /// Picks two distinct live clients, resampling the end until it differs.
    fn pick_endpoints(&mut self) -> Option<(NodeId, NodeId)> {
        let live: Vec<NodeId> = self
            .clients
            .iter()
            .filter(|id| self.topology.contains(id))
            .cloned()
            .collect();
        if live.len() < 2 {
            return None;
        }

        let start = self.ctx.choose(&live)?.clone();
        let mut end = self.ctx.choose(&live)?.clone();
        while end == start {
            end = self.ctx.choose(&live)?.clone();
        }
        Some((start, end))
    }

    fn highlight(&mut self, route: &Route) {
        for id in route.nodes() {
            if let Some(node) = self.topology.find_node_mut(id) {
                node.status = NodeStatus::OnRoute;
            }
        }
        for (a, b) in route.links() {
            if let Some(edge) = self.topology.find_edge_mut(a, b) {
                edge.status = EdgeStatus::OnRoute;
            }
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Read-only view of the live topology for renderers.
    pub fn snapshot(&self) -> TopologySnapshot {
        self.topology.snapshot()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    /// Next frame number to run.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.ctx.seed()
    }
}
