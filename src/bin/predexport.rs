//! predexport CLI - Turn evaluation-loop prediction dumps into flat CSV tables
//!
//! This CLI provides:
//! - Exporting JSON Lines batch dumps to `model_predictions*.csv`
//! - Inspecting a dump before exporting it

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "predexport")]
#[command(version, about = "Export model prediction batches to CSV", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export prediction batches to a CSV table
    Export(predexport::cli::commands::export::ExportArgs),

    /// Summarize prediction batches without writing anything
    Inspect(predexport::cli::commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Export(args) => predexport::cli::commands::export::execute(args),
        Commands::Inspect(args) => predexport::cli::commands::inspect::execute(args),
    }
}
