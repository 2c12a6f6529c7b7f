//! Export command - Write a JSON Lines batch dump as a prediction CSV

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    adapters::JsonlBatchSource,
    cli::output::format_number,
    export::{ExportConfig, ExportSummary, PredictionExporter},
    ports::BatchSource,
    reduction::ReductionPolicy,
};

#[derive(Parser, Debug)]
#[command(about = "Export prediction batches to a CSV table")]
pub struct ExportArgs {
    /// JSON Lines file with one prediction batch per line
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Directory receiving the CSV file (must already exist)
    #[arg(long, short = 'o')]
    pub output_dir: PathBuf,

    /// Reduction applied to `yhat`: identity (binary/regression) or argmax (multiclass)
    #[arg(long, short = 'r', default_value = "identity")]
    pub reduction: ReductionPolicy,

    /// Output file name (defaults to model_predictions.csv or model_predictions_multiclass.csv)
    #[arg(long)]
    pub file_name: Option<String>,
}

pub fn execute(args: ExportArgs) -> Result<()> {
    let source = JsonlBatchSource::new(&args.input);
    println!("Reading prediction batches from: {}", args.input.display());

    let summary = export_from(&source, &args)?;

    println!(
        "✓ Exported {} rows from {} batches to: {}",
        format_number(summary.rows),
        format_number(summary.batches),
        summary.path.display()
    );
    Ok(())
}

/// Load batches from `source` and export them as configured by `args`.
pub fn export_from<S: BatchSource>(source: &S, args: &ExportArgs) -> Result<ExportSummary> {
    let batches = source
        .load()
        .with_context(|| format!("failed to load batches from {}", args.input.display()))?;

    let mut config = ExportConfig::new(args.reduction);
    if let Some(file_name) = &args.file_name {
        config = config.with_file_name(file_name.clone());
    }

    let summary = PredictionExporter::new(config)
        .export(&batches, &args.output_dir)
        .with_context(|| format!("failed to export to {}", args.output_dir.display()))?;
    Ok(summary)
}
