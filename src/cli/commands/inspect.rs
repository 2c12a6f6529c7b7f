//! Inspect command - Summarize a JSON Lines batch dump without exporting it

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    adapters::JsonlBatchSource,
    batch::PredictionBatch,
    cli::output::{format_loss, format_number, print_kv, print_section},
    ports::BatchSource,
};

#[derive(Parser, Debug)]
#[command(about = "Summarize prediction batches")]
pub struct InspectArgs {
    /// JSON Lines file with one prediction batch per line
    #[arg(long, short = 'i')]
    pub input: PathBuf,
}

/// Aggregate figures over a batch dump
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOverview {
    pub batches: usize,
    pub examples: usize,
    /// Unweighted mean of the batch losses (`None` without batches)
    pub mean_loss: Option<f64>,
    pub first_y_shape: Option<Vec<usize>>,
    pub first_yhat_shape: Option<Vec<usize>>,
}

impl BatchOverview {
    pub fn from_batches(batches: &[PredictionBatch]) -> Self {
        let mean_loss = (!batches.is_empty())
            .then(|| batches.iter().map(|b| b.loss).sum::<f64>() / batches.len() as f64);
        let first = batches.first();

        Self {
            batches: batches.len(),
            examples: batches.iter().map(PredictionBatch::len).sum(),
            mean_loss,
            first_y_shape: first.map(|b| b.y.shape().to_vec()),
            first_yhat_shape: first.map(|b| b.yhat.shape().to_vec()),
        }
    }
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let batches = JsonlBatchSource::new(&args.input)
        .load()
        .with_context(|| format!("failed to load batches from {}", args.input.display()))?;
    let overview = BatchOverview::from_batches(&batches);

    print_section(&format!("Prediction batches: {}", args.input.display()));
    print_kv("Batches", &format_number(overview.batches));
    print_kv("Examples", &format_number(overview.examples));
    print_kv("Mean batch loss", &format_loss(overview.mean_loss));
    if let Some(shape) = &overview.first_y_shape {
        print_kv("y shape (first)", &format!("{shape:?}"));
    }
    if let Some(shape) = &overview.first_yhat_shape {
        print_kv("yhat shape (first)", &format!("{shape:?}"));
    }
    Ok(())
}
