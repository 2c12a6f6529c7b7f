//! Common test utilities for the predexport test suite.
//!
//! Builders for prediction batches and a CSV reader for exported files.

#![allow(dead_code)]

use std::path::Path;

use ndarray::Array2;
use predexport::PredictionBatch;

/// Batch of scalar integer labels and predictions.
pub fn binary_batch(ids: &[i64], y: &[i64], yhat: &[i64], loss: f64) -> PredictionBatch {
    PredictionBatch::new(ids.iter().copied(), y.to_vec(), yhat.to_vec(), loss)
}

/// Batch of class labels and per-class scores, one score row per example.
pub fn multiclass_batch(ids: &[i64], y: &[i64], scores: &[&[f64]], loss: f64) -> PredictionBatch {
    let classes = scores.first().map_or(0, |row| row.len());
    let flat: Vec<f64> = scores.iter().flat_map(|row| row.iter().copied()).collect();
    let scores = Array2::from_shape_vec((scores.len(), classes), flat)
        .expect("score rows must have equal length");
    PredictionBatch::new(ids.iter().copied(), y.to_vec(), scores, loss)
}

/// Read an exported CSV as header + string records.
pub fn read_table(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("exported file should be readable");
    let header = reader
        .headers()
        .expect("header row")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|record| {
            record
                .expect("valid record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();
    (header, rows)
}

/// Convert `&[&[&str]]` literals into owned rows for comparison.
pub fn rows(expected: &[&[&str]]) -> Vec<Vec<String>> {
    expected
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}
