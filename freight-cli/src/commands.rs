//! Subcommand handling for the freight CLI.

use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use freight_sim::{
    CarrierConservationInvariant, SimulationConfig, SimulationReport, SimulationScenarios,
};

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the reference network until its deliveries complete
    Run {
        /// Reject events addressed to unknown locations instead of
        /// retaining them silently
        #[arg(long)]
        strict: bool,
        /// Abort if the run has not completed within this many ticks
        #[arg(long, default_value_t = 10_000)]
        max_ticks: u64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a seeded random manifest for a fixed number of ticks
    Random {
        /// Seed for manifest and fleet generation
        #[arg(long)]
        seed: u64,
        /// Number of shipments to generate
        #[arg(long, default_value_t = 6)]
        shipments: usize,
        /// Number of ticks to simulate
        #[arg(long, default_value_t = 50)]
        ticks: u64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Dispatches the parsed command.
pub fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            strict,
            max_ticks,
            json,
        } => run_reference(strict, max_ticks, json),
        Commands::Random {
            seed,
            shipments,
            ticks,
            json,
        } => run_random(seed, shipments, ticks, json),
    }
}

fn run_reference(strict: bool, max_ticks: u64, json: bool) -> anyhow::Result<()> {
    let config = SimulationConfig {
        strict_locations: strict,
        max_ticks,
        deterministic_seed: None,
    };
    let mut sim = SimulationScenarios::reference_network(config)
        .context("failed to build reference network")?;

    tracing::info!(strict, max_ticks, "running reference network");

    // The original driver's termination condition: one delivery at "a"
    // or two at "b".
    let report = sim
        .run_until(|sim| {
            sim.destination("a").is_some_and(|d| d.received_count() >= 1)
                || sim.destination("b").is_some_and(|d| d.received_count() >= 2)
        })
        .context("reference network did not complete")?;

    println!("Took {} ticks to ship all products", report.ticks);
    print_report(&report, json)
}

fn run_random(seed: u64, shipments: usize, ticks: u64, json: bool) -> anyhow::Result<()> {
    let config = SimulationConfig {
        max_ticks: ticks,
        deterministic_seed: Some(seed),
        ..SimulationConfig::default()
    };
    let mut sim = SimulationScenarios::random_manifest(config, seed, shipments)
        .context("failed to build random manifest")?;

    let fleet: Vec<String> = sim
        .actors()
        .iter()
        .flat_map(|actor| actor.available_carriers())
        .cloned()
        .collect();
    sim.add_invariant(Arc::new(CarrierConservationInvariant::new(fleet)));

    tracing::info!(seed, shipments, ticks, "running random manifest");

    for _ in 0..ticks {
        sim.advance().context("simulation aborted")?;
    }

    print_report(&sim.report(), json)
}

fn print_report(report: &SimulationReport, json: bool) -> anyhow::Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(report).context("failed to serialize report")?;
        println!("{rendered}");
    } else {
        println!("{}", report.summary());
    }
    Ok(())
}
