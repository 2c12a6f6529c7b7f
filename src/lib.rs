//! Export of model prediction batches to flat CSV tables
//!
//! This crate provides:
//! - A typed model of evaluation-loop output (`PredictionBatch`, `Tensor`)
//! - Reductions collapsing labels and scores to one value per example
//! - A CSV exporter writing one row per example with the batch loss repeated
//! - A JSON Lines batch source and a small CLI on top of it

pub mod adapters;
pub mod batch;
pub mod cli;
pub mod error;
pub mod export;
pub mod ports;
pub mod reduction;

pub use batch::{ExampleId, PredictionBatch, Scalar, ScalarKind, Tensor};
pub use error::{Error, Result};
pub use export::{
    ExportConfig, ExportSummary, ExportedRow, PredictionExporter, export_binary,
    export_multiclass_argmax,
};
pub use reduction::ReductionPolicy;
