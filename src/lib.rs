// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod params;
pub mod plan;
pub mod supervisor;
pub mod types;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_for_cli, LaunchConfig};
use crate::exec::RealProcessBackend;
use crate::params::ParameterResolver;
use crate::plan::{CommandLine, LaunchPlan};
use crate::supervisor::{LaunchReport, Supervisor, SupervisorCore, SupervisorEvent};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + CLI overrides
/// - parameter resolution and plan assembly
/// - the supervisor and the real process backend
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_for_cli(&args)?;
    info!(
        map_path = %cfg.shared.map_path,
        rviz_config = %cfg.settings.visualizer.rviz_config,
        "launch configuration loaded"
    );

    let plan = build_plan(&cfg)?;

    if args.dry_run {
        print_dry_run(&cfg, &plan)?;
        return Ok(());
    }

    let (tx, rx) = mpsc::channel::<SupervisorEvent>(64);
    let backend = RealProcessBackend::new(tx.clone(), cfg.supervisor.startup_window);
    let supervisor = Supervisor::new(SupervisorCore::new(cfg.supervisor), tx, rx, backend);

    // Ctrl-C → coordinated shutdown.
    {
        let handle = supervisor.handle();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received; stopping process group");
            handle.stop().await;
        });
    }

    {
        let mut handle = supervisor.handle();
        tokio::spawn(async move {
            if handle.wait_until_running().await {
                info!("process group fully running; press Ctrl+C to stop");
            }
        });
    }

    let report = supervisor.run(plan).await?;
    print_report(&report);

    match report.error() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Resolve parameters for every role and assemble the launch plan.
pub fn build_plan(cfg: &LaunchConfig) -> errors::Result<LaunchPlan> {
    let resolved = ParameterResolver::new(&cfg.settings, &cfg.overrides).resolve(&cfg.shared)?;
    LaunchPlan::assemble(resolved, &cfg.catalogue)
}

/// Dry-run output: shared values, then each process's command line.
fn print_dry_run(cfg: &LaunchConfig, plan: &LaunchPlan) -> Result<()> {
    let shared = &cfg.shared;
    println!("vlam-launch dry-run");
    println!("  shared.algorithm = {}", shared.algorithm);
    println!("  shared.map_path = {}", shared.map_path);
    println!("  shared.make_map = {}", shared.make_map);
    println!("  shared.marker_length = {}", shared.marker_length);
    println!(
        "  shared.corner_measurement_sigma = {}",
        shared.corner_measurement_sigma
    );
    println!("  supervisor.grace_period = {:?}", cfg.supervisor.grace_period);
    println!();

    println!("processes ({}):", plan.len());
    for spec in plan.specs() {
        println!("  - {} ({})", spec.role(), spec.target());
        println!("      output: {}", spec.output());
        println!("      cmd: {}", CommandLine::render(spec)?);
    }

    debug!("dry-run complete (nothing started)");
    Ok(())
}

fn print_report(report: &LaunchReport) {
    eprintln!("vlam-launch: {}", report.cause);
    for p in &report.processes {
        let pid = p.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
        let killed = if p.killed { " (killed)" } else { "" };
        eprintln!("  {:<10} pid {:<8} {}{}", p.role, pid, p.final_state, killed);
    }
}
