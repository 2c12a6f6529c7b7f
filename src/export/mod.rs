//! Export functionality for evaluation results
//!
//! This module turns prediction batches into flat tables on disk. One row is
//! written per example, with the batch loss repeated on every row of its batch.

mod predictions_csv;

pub use predictions_csv::{
    ExportConfig, ExportSummary, ExportedRow, PredictionExporter, export_binary,
    export_multiclass_argmax,
};
