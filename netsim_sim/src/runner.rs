//! Scenario runner - drives a controller headless for a fixed duration and
//! checks the topology after every tick.

use crate::config::ControllerConfig;
use crate::context::SeededContext;
use crate::controller::{CycleEvent, RouteOutcome, SimulationController};
use crate::error::SimError;
use crate::exporter::{SimExport, SimFrame};
use crate::scenarios::ScenarioId;

use netsim_core::{NodeStatus, TopologyBlueprint};
use netsim_env::SimulationContext;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used (0 when entropy-seeded)
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Total ticks executed
    pub total_ticks: u64,

    /// Final simulation time in seconds
    pub final_time_secs: f64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioMetrics {
    /// Topology rebuilds
    pub rebuilds: u64,

    /// Route cycles run (found + unreachable + skipped)
    pub route_cycles: u64,

    /// Routes found and highlighted
    pub routes_found: u64,

    /// Routes whose endpoints were disconnected
    pub unreachable_routes: u64,

    /// Route cycles with fewer than two clients
    pub skipped_routes: u64,

    /// Routers failed by injection
    pub failures: u64,

    /// Sum of hop counts over found routes
    pub total_hops: u64,

    /// Ticks spent paused
    pub paused_ticks: u64,
}

impl ScenarioMetrics {
    /// Mean hop count of found routes.
    pub fn mean_hops(&self) -> f64 {
        if self.routes_found == 0 {
            0.0
        } else {
            self.total_hops as f64 / self.routes_found as f64
        }
    }
}

/// Machine-readable summary of a batch of runs, as printed by `--json`.
pub fn json_summary(results: &[ScenarioResult]) -> serde_json::Value {
    let failed = results.iter().filter(|r| !r.passed).count();

    serde_json::json!({
        "total": results.len(),
        "passed": results.len() - failed,
        "failed": failed,
        "results": results.iter().map(|r| {
            serde_json::json!({
                "scenario": r.scenario.name(),
                "seed": r.seed,
                "passed": r.passed,
                "ticks": r.total_ticks,
                "time_secs": r.final_time_secs,
                "failure_reason": r.failure_reason,
                "metrics": {
                    "rebuilds": r.metrics.rebuilds,
                    "route_cycles": r.metrics.route_cycles,
                    "routes_found": r.metrics.routes_found,
                    "unreachable": r.metrics.unreachable_routes,
                    "skipped": r.metrics.skipped_routes,
                    "failures": r.metrics.failures,
                    "mean_hops": r.metrics.mean_hops(),
                    "paused_ticks": r.metrics.paused_ticks,
                },
            })
        }).collect::<Vec<_>>(),
    })
}

/// Runs scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Host frame rate
    fps: u32,

    /// Maximum duration in seconds
    max_duration_secs: f64,

    /// Layout to simulate
    blueprint: TopologyBlueprint,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            fps: crate::config::DEFAULT_FPS,
            max_duration_secs: 30.0,
            blueprint: TopologyBlueprint::canonical(),
        }
    }

    /// Sets the frame rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    /// Sets the maximum duration.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.max_duration_secs = secs.max(0.0);
        self
    }

    /// Sets a custom layout.
    pub fn with_blueprint(mut self, blueprint: TopologyBlueprint) -> Self {
        self.blueprint = blueprint;
        self
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Controller configuration for a scenario.
    pub fn config_for(&self, scenario: ScenarioId) -> ControllerConfig {
        let config = ControllerConfig::at_fps(self.fps).with_blueprint(self.blueprint.clone());
        match scenario.failure_odds() {
            Some(odds) => config.with_failure_odds(odds),
            None => config,
        }
    }

    /// Runs a scenario with a context seeded from the runner's seed.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, SimError> {
        self.run_with_context(scenario, SeededContext::new(self.seed), None)
    }

    /// Runs a scenario as fast as possible with the given context.
    pub fn run_with_context<C: SimulationContext>(
        &self,
        scenario: ScenarioId,
        ctx: C,
        mut export: Option<&mut SimExport>,
    ) -> Result<ScenarioResult, SimError> {
        let mut session = Session::new(self, scenario, ctx)?;
        while !session.is_done() {
            session.step(export.as_deref_mut());
        }
        Ok(session.finish())
    }

    /// Runs a scenario paced at the runner's frame rate.
    pub async fn run_paced<C: SimulationContext>(
        &self,
        scenario: ScenarioId,
        ctx: C,
        mut export: Option<&mut SimExport>,
    ) -> Result<ScenarioResult, SimError> {
        let mut session = Session::new(self, scenario, ctx)?;
        let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / self.fps as f64));
        while !session.is_done() {
            interval.tick().await;
            session.step(export.as_deref_mut());
        }
        Ok(session.finish())
    }
}

/// One scenario in progress.
struct Session<C: SimulationContext> {
    scenario: ScenarioId,
    controller: SimulationController<C>,
    metrics: ScenarioMetrics,
    failure_reason: Option<String>,
    target_ticks: u64,
    fps: u32,

    /// Frames at which to pause and resume
    pause_window: Option<(u64, u64)>,

    /// Route cycles that fired after resuming
    cycles_after_resume: u64,
}

impl<C: SimulationContext> Session<C> {
    fn new(runner: &ScenarioRunner, scenario: ScenarioId, ctx: C) -> Result<Self, SimError> {
        let controller = SimulationController::new(runner.config_for(scenario), ctx)?;
        let target_ticks = (runner.max_duration_secs * runner.fps as f64) as u64;

        let pause_window = match scenario {
            ScenarioId::PauseResume if target_ticks >= 3 => {
                Some((target_ticks / 3, 2 * target_ticks / 3))
            }
            _ => None,
        };

        info!(
            "Starting scenario: {} (seed={}, ticks={})",
            scenario.name(),
            controller.seed(),
            target_ticks
        );

        Ok(Self {
            scenario,
            controller,
            metrics: ScenarioMetrics::default(),
            failure_reason: None,
            target_ticks,
            fps: runner.fps,
            pause_window,
            cycles_after_resume: 0,
        })
    }

    fn is_done(&self) -> bool {
        self.controller.frame() >= self.target_ticks
    }

    fn fail(&mut self, reason: String) {
        warn!("{}: {}", self.scenario.name(), reason);
        if self.failure_reason.is_none() {
            self.failure_reason = Some(reason);
        }
    }

    fn step(&mut self, export: Option<&mut SimExport>) {
        let frame = self.controller.frame();
        if let Some((pause_at, resume_at)) = self.pause_window {
            if frame == pause_at || frame == resume_at {
                self.controller.toggle();
            }
        }

        let paused = self.controller.is_paused();
        let report = self.controller.tick();

        if paused {
            self.metrics.paused_ticks += 1;
            if !report.is_idle() {
                self.fail(format!("actions fired on paused frame {frame}"));
            }
        }

        for event in &report.events {
            self.record(frame, event);
        }
        self.check_topology(frame);

        if let Some(export) = export {
            if !report.is_idle() {
                export.add_frame(SimFrame {
                    frame,
                    time_sec: frame as f64 / self.fps as f64,
                    paused,
                    topology: self.controller.snapshot(),
                    events: report.events.iter().map(ToString::to_string).collect(),
                });
            }
        }

        if frame % u64::from(self.fps) == 0 {
            debug!(
                "  t={:.1}s | nodes={} | routes={} | failures={}",
                frame as f64 / self.fps as f64,
                self.controller.topology().node_count(),
                self.metrics.routes_found,
                self.metrics.failures
            );
        }
    }

    fn record(&mut self, frame: u64, event: &CycleEvent) {
        match event {
            CycleEvent::Rebuilt => self.metrics.rebuilds += 1,
            CycleEvent::RouteSkipped { failed } => {
                self.metrics.route_cycles += 1;
                self.metrics.skipped_routes += 1;
                self.metrics.failures += u64::from(failed.is_some());
            }
            CycleEvent::Route(cycle) => {
                self.metrics.route_cycles += 1;
                self.metrics.failures += u64::from(cycle.failed.is_some());
                if self.pause_window.is_some_and(|(_, resume_at)| frame >= resume_at) {
                    self.cycles_after_resume += 1;
                }

                match &cycle.outcome {
                    RouteOutcome::Routed(route) => {
                        self.metrics.routes_found += 1;
                        self.metrics.total_hops += route.hops() as u64;

                        if route.start() != &cycle.start || route.end() != &cycle.end {
                            let (start, end) = (&cycle.start, &cycle.end);
                            self.fail(format!("route {route} does not join {start} and {end}"));
                        }
                        if let Some(failed) = &cycle.failed {
                            if route.contains(failed) {
                                self.fail(format!("route {route} passes through failed {failed}"));
                            }
                        }
                    }
                    RouteOutcome::Unreachable => self.metrics.unreachable_routes += 1,
                }
            }
        }
    }

    fn check_topology(&mut self, frame: u64) {
        let topology = self.controller.topology();

        if let Err(err) = topology.verify() {
            self.fail(format!("frame {frame}: {err}"));
            return;
        }
        let marked = topology
            .nodes()
            .find(|n| n.status == NodeStatus::Failed)
            .map(|n| n.id.clone());
        if let Some(id) = marked {
            self.fail(format!("frame {frame}: live node {id} marked failed"));
        }
    }

    fn finish(mut self) -> ScenarioResult {
        let total_ticks = self.controller.frame();
        let metrics = self.metrics.clone();

        if metrics.route_cycles == 0 && total_ticks > 0 {
            self.fail("no route cycles ran".into());
        }
        match self.scenario {
            ScenarioId::Stable if metrics.failures > 0 || metrics.unreachable_routes > 0 => {
                self.fail(format!(
                    "{} failures and {} unreachable routes with failures disabled",
                    metrics.failures, metrics.unreachable_routes
                ));
            }
            ScenarioId::Outage if metrics.route_cycles > 0 && metrics.failures == 0 => {
                self.fail("no routers failed".into());
            }
            ScenarioId::PauseResume => {
                let route_every = self.controller.config().route_every;
                if let Some((_, resume_at)) = self.pause_window {
                    if metrics.paused_ticks == 0 {
                        self.fail("never paused".into());
                    } else if resume_at + route_every <= total_ticks
                        && self.cycles_after_resume == 0
                    {
                        self.fail("cadence did not resume after unpause".into());
                    }
                }
            }
            _ => {}
        }

        let passed = self.failure_reason.is_none();
        info!(
            "{} finished: {} ticks, {} routes ({} unreachable), {} failures, mean hops {:.2}",
            self.scenario.name(),
            total_ticks,
            metrics.routes_found,
            metrics.unreachable_routes,
            metrics.failures,
            metrics.mean_hops()
        );

        ScenarioResult {
            scenario: self.scenario,
            seed: self.controller.seed(),
            passed,
            total_ticks,
            final_time_secs: total_ticks as f64 / self.fps as f64,
            failure_reason: self.failure_reason,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ScriptedContext;

    #[test]
    fn test_baseline_passes() {
        let result = ScenarioRunner::new(42)
            .with_duration(30.0)
            .run(ScenarioId::Baseline)
            .unwrap();

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.total_ticks, 900);
        assert_eq!(result.final_time_secs, 30.0);
        // Frames 0, 90, ... 810
        assert_eq!(result.metrics.rebuilds, 10);
        // Frames 0, 60, ... 840
        assert_eq!(result.metrics.route_cycles, 15);
        assert_eq!(
            result.metrics.route_cycles,
            result.metrics.routes_found + result.metrics.unreachable_routes
        );
    }

    #[test]
    fn test_stable_never_unreachable() {
        let result = ScenarioRunner::new(7)
            .with_duration(60.0)
            .run(ScenarioId::Stable)
            .unwrap();

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.failures, 0);
        assert_eq!(result.metrics.unreachable_routes, 0);
        assert!(result.metrics.mean_hops() >= 3.0);
        assert!(result.metrics.mean_hops() <= 4.0);
    }

    #[test]
    fn test_outage_fails_every_cycle() {
        let result = ScenarioRunner::new(9)
            .with_duration(30.0)
            .run(ScenarioId::Outage)
            .unwrap();

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.failures, result.metrics.route_cycles);
    }

    #[test]
    fn test_pause_resume() {
        let result = ScenarioRunner::new(3)
            .with_duration(30.0)
            .run(ScenarioId::PauseResume)
            .unwrap();

        assert!(result.passed, "{:?}", result.failure_reason);
        // Paused from frame 300 through 599
        assert_eq!(result.metrics.paused_ticks, 300);
        assert_eq!(result.total_ticks, 900);
    }

    #[test]
    fn test_zero_duration() {
        let result = ScenarioRunner::new(1)
            .with_duration(0.0)
            .run(ScenarioId::Baseline)
            .unwrap();
        assert!(result.passed);
        assert_eq!(result.total_ticks, 0);
    }

    #[test]
    fn test_export_collects_active_frames() {
        let runner = ScenarioRunner::new(5).with_duration(10.0);
        let mut export = SimExport::new("baseline", 5, runner.fps());

        let ctx = ScriptedContext::with_fallback([], 5);
        let result = runner
            .run_with_context(ScenarioId::Baseline, ctx, Some(&mut export))
            .unwrap();
        export.finalize(result.passed);

        // Active frames in 300 ticks: 0, 60, 90, 120, 180, 240, 270
        let frames: Vec<u64> = export.frames.iter().map(|f| f.frame).collect();
        assert_eq!(frames, vec![0, 60, 90, 120, 180, 240, 270]);
        assert_eq!(export.frames[0].events.len(), 2);
        assert!(export.passed);
    }

    #[test]
    fn test_scenario_config_overrides() {
        let runner = ScenarioRunner::new(1);
        assert_eq!(runner.config_for(ScenarioId::Stable).failure_odds, 0);
        assert_eq!(runner.config_for(ScenarioId::Outage).failure_odds, 1);
        assert_eq!(runner.config_for(ScenarioId::Baseline).failure_odds, 5);
    }

    #[test]
    fn test_json_summary_parses_back() {
        let runner = ScenarioRunner::new(42).with_duration(2.0);
        let results = vec![
            runner.run(ScenarioId::Stable).unwrap(),
            runner.run(ScenarioId::Baseline).unwrap(),
        ];

        let text = serde_json::to_string_pretty(&json_summary(&results)).unwrap();
        let summary: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(summary["total"], 2);
        assert_eq!(summary["passed"], 2);
        assert_eq!(summary["failed"], 0);
        assert_eq!(summary["results"][0]["scenario"], "stable");
        assert_eq!(summary["results"][0]["seed"], 42);
        assert_eq!(summary["results"][0]["ticks"], 60);
        assert_eq!(summary["results"][0]["metrics"]["unreachable"], 0);
        assert!(summary["results"][1]["failure_reason"].is_null());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_paced_matches_unpaced() {
        let runner = ScenarioRunner::new(11).with_duration(5.0);

        let paced = runner
            .run_paced(ScenarioId::Baseline, SeededContext::new(11), None)
            .await
            .unwrap();
        let unpaced = runner.run(ScenarioId::Baseline).unwrap();

        assert_eq!(paced.metrics, unpaced.metrics);
        assert_eq!(paced.total_ticks, 150);
    }
}
