//! Freight CLI - Command-line interface
//!
//! Provides command-line access to the logistics simulator.

mod commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "freight")]
#[command(about = "A deterministic logistics-network simulator")]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    commands::handle_command(cli.command)?;

    Ok(())
}
