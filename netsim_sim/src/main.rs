//! netsim CLI
//!
//! Run routing and failure scenarios headless, or paced at the host frame rate.

use clap::Parser;
use netsim_core::TopologyBlueprint;
use netsim_env::{OsContext, SimulationContext};
use netsim_sim::scenarios::ScenarioId;
use netsim_sim::{
    json_summary, ScenarioResult, ScenarioRunner, SeededContext, SimError, SimExport, DEFAULT_FPS,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const SCENARIO_NAMES: &str = "baseline, stable, outage, pause_resume, all";

/// netsim routing and failure simulator
#[derive(Parser, Debug)]
#[command(name = "netsim")]
#[command(about = "Routing and router-failure simulator", long_about = None)]
struct Args {
    /// Master seed for reproducible runs (0 = fresh entropy)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (baseline, stable, outage, pause_resume, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to run
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Simulation duration in seconds
    #[arg(short, long, default_value = "30")]
    duration: f64,

    /// Host frame rate; cadences scale with it
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,

    /// JSON topology blueprint to use instead of the built-in layout
    #[arg(short, long)]
    topology: Option<String>,

    /// Export per-frame topology snapshots to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Pace ticks in wall-clock time instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Runs one scenario, flat out or paced.
fn execute<C: SimulationContext>(
    runner: &ScenarioRunner,
    scenario: ScenarioId,
    ctx: C,
    export: Option<&mut SimExport>,
    realtime: bool,
) -> Result<ScenarioResult, SimError> {
    if !realtime {
        return runner.run_with_context(scenario, ctx, export);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(runner.run_paced(scenario, ctx, export))
}

fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides --verbose. Logs go to stderr so
    // stdout stays clean for --json.
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if !args.json {
        info!("netsim v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!("Available scenarios: {}", SCENARIO_NAMES);
            std::process::exit(1);
        })]
    };

    let blueprint = match &args.topology {
        Some(path) => TopologyBlueprint::load(path).unwrap_or_else(|e| {
            eprintln!("Error: failed to load topology {}: {}", path, e);
            std::process::exit(1);
        }),
        None => TopologyBlueprint::canonical(),
    };

    if args.export.is_some() && (scenarios.len() > 1 || args.seeds > 1) {
        eprintln!("Error: --export only supports a single scenario and seed");
        std::process::exit(1);
    }

    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = if args.seed == 0 {
            0
        } else {
            args.seed.wrapping_add(seed_offset as u64)
        };

        let runner = ScenarioRunner::new(seed)
            .with_fps(args.fps)
            .with_duration(args.duration)
            .with_blueprint(blueprint.clone());

        for scenario in &scenarios {
            let mut export = args
                .export
                .as_ref()
                .map(|_| SimExport::new(scenario.name(), seed, runner.fps()));

            let (scenario, realtime) = (*scenario, args.realtime);
            let outcome = if seed == 0 {
                let ctx = OsContext::new();
                execute(&runner, scenario, ctx, export.as_mut(), realtime)
            } else {
                let ctx = SeededContext::new(seed);
                execute(&runner, scenario, ctx, export.as_mut(), realtime)
            };
            let result = outcome.unwrap_or_else(|e| {
                error!("✗ {} could not start: {}", scenario.name(), e);
                std::process::exit(1);
            });

            if let (Some(path), Some(export)) = (&args.export, export.as_mut()) {
                export.finalize(result.passed);
                match export.write_to_file(path) {
                    Ok(()) => info!("Exported {} frames to {}", export.frames.len(), path),
                    Err(e) => error!("Failed to write export: {}", e),
                }
            }

            if !args.json {
                if result.passed {
                    info!(
                        "✓ {} (seed={}) PASSED | routes={} unreachable={} failures={} hops={:.2}",
                        scenario.name(),
                        result.seed,
                        result.metrics.routes_found,
                        result.metrics.unreachable_routes,
                        result.metrics.failures,
                        result.metrics.mean_hops()
                    );
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        result.seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }

            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();

    if args.json {
        match serde_json::to_string_pretty(&json_summary(&all_results)) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Error: failed to encode summary: {}", e),
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);

            for result in &all_results {
                if !result.passed {
                    error!(
                        "  - {} seed={}: {}",
                        result.scenario.name(),
                        result.seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
