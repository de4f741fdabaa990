//! netsim simulation harness
//!
//! Drives a [`netsim_core::Topology`] frame by frame: periodic rebuilds from
//! a blueprint, random router failures, and shortest-path routing between
//! random client pairs.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │               ScenarioRunner                  │
//! │  ┌─────────────────────────────────────────┐  │
//! │  │ SimulationController                    │  │
//! │  │   tick() ─► rebuild ─► route cycle      │  │
//! │  │               │            │            │  │
//! │  │          Topology ◄── PathFinder        │  │
//! │  └─────────────────────────────────────────┘  │
//! │        ▲                         │            │
//! │  SimulationContext          SimExport         │
//! │  (seeded / scripted)        (JSON frames)     │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Every random draw goes through a [`netsim_env::SimulationContext`], so a
//! [`SeededContext`] replays a run exactly.
//!
//! # Usage
//!
//! ```ignore
//! use netsim_sim::{ControllerConfig, SeededContext, SimulationController};
//!
//! let mut controller = SimulationController::new(ControllerConfig::default(), SeededContext::new(42))?;
//! for _ in 0..300 {
//!     let report = controller.tick();
//!     for event in &report.events {
//!         println!("{}: {}", report.frame, event);
//!     }
//! }
//! ```

mod config;
mod context;
mod controller;
mod error;
mod exporter;
mod runner;
pub mod scenarios;

pub use config::{ControllerConfig, DEFAULT_FPS};
pub use context::{ScriptedContext, SeededContext};
pub use controller::{
    CycleEvent, RouteCycle, RouteOutcome, RunState, SimulationController, TickReport,
};
pub use error::SimError;
pub use exporter::{SimExport, SimFrame};
pub use runner::{json_summary, ScenarioMetrics, ScenarioResult, ScenarioRunner};
