//! Controller configuration.

use crate::error::SimError;
use netsim_core::TopologyBlueprint;

/// Default host frame rate.
pub const DEFAULT_FPS: u32 = 30;

/// Configuration for a simulation controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Ticks between topology rebuilds (R)
    pub rebuild_every: u64,

    /// Ticks between failure roll + route selection cycles (F)
    pub route_every: u64,

    /// Faces of the failure die; a roll of 1 fails a router (0 = never)
    pub failure_odds: u32,

    /// Layout the topology is rebuilt from
    pub blueprint: TopologyBlueprint,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::at_fps(DEFAULT_FPS)
    }
}

impl ControllerConfig {
    /// Rebuild every 3 s and route every 2 s at the given frame rate.
    pub fn at_fps(fps: u32) -> Self {
        let fps = u64::from(fps.max(1));
        Self {
            rebuild_every: 3 * fps,
            route_every: 2 * fps,
            failure_odds: 5,
            blueprint: TopologyBlueprint::canonical(),
        }
    }

    pub fn with_rebuild_every(mut self, ticks: u64) -> Self {
        self.rebuild_every = ticks;
        self
    }

    pub fn with_route_every(mut self, ticks: u64) -> Self {
        self.route_every = ticks;
        self
    }

    pub fn with_failure_odds(mut self, odds: u32) -> Self {
        self.failure_odds = odds;
        self
    }

    pub fn with_blueprint(mut self, blueprint: TopologyBlueprint) -> Self {
        self.blueprint = blueprint;
        self
    }

    /// Rejects cadences that would never fire, and routing that runs no
    /// more often than the rebuild.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.rebuild_every == 0 {
            return Err(SimError::InvalidCadence(
                "rebuild_every must be at least 1 tick".into(),
            ));
        }
        if self.route_every == 0 {
            return Err(SimError::InvalidCadence(
                "route_every must be at least 1 tick".into(),
            ));
        }
        if self.route_every >= self.rebuild_every {
            return Err(SimError::InvalidCadence(format!(
                "route_every ({}) must be shorter than rebuild_every ({})",
                self.route_every, self.rebuild_every
            )));
        }
        Ok(())
    }
}
