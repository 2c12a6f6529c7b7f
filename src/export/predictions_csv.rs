//! CSV export of per-example predictions
//!
//! Rows from all batches are concatenated in input order and written with the
//! header `id,y,yhat,loss`. The table is assembled in memory first, so a batch
//! that fails validation never truncates an existing output file.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::Serialize;

use crate::{
    Result,
    batch::{ExampleId, PredictionBatch, Scalar, ScalarKind},
    error::Error,
    reduction::{self, ReductionPolicy},
};

/// Configuration for prediction CSV export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportConfig {
    /// Reduction applied to `yhat`
    pub reduction: ReductionPolicy,
    /// Output file name inside the output directory (defaults to the policy's file name)
    pub file_name: Option<String>,
}

impl ExportConfig {
    pub fn new(reduction: ReductionPolicy) -> Self {
        Self {
            reduction,
            file_name: None,
        }
    }

    /// Write to `file_name` instead of the policy's default file.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn file_name(&self) -> &str {
        self.file_name
            .as_deref()
            .unwrap_or_else(|| self.reduction.file_name())
    }
}

/// A single row in the prediction CSV export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedRow {
    pub id: ExampleId,
    pub y: Scalar,
    pub yhat: Scalar,
    pub loss: f64,
}

/// Outcome of a successful export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub batches: usize,
    pub rows: usize,
}

/// Exporter for prediction CSV files
#[derive(Debug, Clone, Default)]
pub struct PredictionExporter {
    config: ExportConfig,
}

impl PredictionExporter {
    pub const HEADER: [&'static str; 4] = ["id", "y", "yhat", "loss"];

    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Flatten batches into rows without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Fails when a field does not reduce to one value per example or when its
    /// length differs from `id`. A column mixing integer and float batches is
    /// widened to float.
    pub fn collect_rows<'a, I>(&self, batches: I) -> Result<Vec<ExportedRow>>
    where
        I: IntoIterator<Item = &'a PredictionBatch>,
    {
        self.collect(batches).map(|(rows, _)| rows)
    }

    /// Export batches to `<output_dir>/<file name>`, replacing any existing file.
    ///
    /// # Returns
    /// Summary with the written path and row count
    pub fn export<'a, I>(&self, batches: I, output_dir: impl AsRef<Path>) -> Result<ExportSummary>
    where
        I: IntoIterator<Item = &'a PredictionBatch>,
    {
        let output_dir = output_dir.as_ref();
        if !output_dir.is_dir() {
            return Err(Error::MissingOutputDirectory {
                path: output_dir.to_path_buf(),
            });
        }

        let (rows, batch_count) = self.collect(batches)?;

        let path = output_dir.join(self.config.file_name());
        let file = File::create(&path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        Self::write_rows(&rows, file)?;

        info!(
            "exported {} rows from {} batches to {}",
            rows.len(),
            batch_count,
            path.display()
        );

        Ok(ExportSummary {
            path,
            batches: batch_count,
            rows: rows.len(),
        })
    }

    /// Write the header and rows as CSV.
    pub fn write_rows<W: Write>(rows: &[ExportedRow], writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        writer.write_record(Self::HEADER)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn collect<'a, I>(&self, batches: I) -> Result<(Vec<ExportedRow>, usize)>
    where
        I: IntoIterator<Item = &'a PredictionBatch>,
    {
        let mut rows = Vec::new();
        let mut float_columns = FloatColumns::default();
        let mut batch_count = 0;

        for (index, batch) in batches.into_iter().enumerate() {
            batch_count += 1;

            let ids = reduction::squeeze_ids(&batch.id, index)?;
            let expected = ids.len();

            let y = reduction::squeeze(&batch.y, index, "y")?;
            check_length(index, "y", expected, y.len())?;

            let yhat = self.config.reduction.reduce(&batch.yhat, index, "yhat")?;
            check_length(index, "yhat", expected, yhat.len())?;

            float_columns.y |= y.iter().any(|cell| cell.kind() == ScalarKind::Float);
            float_columns.yhat |= yhat.iter().any(|cell| cell.kind() == ScalarKind::Float);

            debug!("batch {index}: {expected} examples, loss {}", batch.loss);

            rows.extend(
                ids.into_iter()
                    .zip(y)
                    .zip(yhat)
                    .map(|((id, y), yhat)| ExportedRow {
                        id,
                        y,
                        yhat,
                        loss: batch.loss,
                    }),
            );
        }

        float_columns.widen(&mut rows);
        Ok((rows, batch_count))
    }
}

/// Columns that hold at least one float cell. Such a column is written as
/// floats throughout, integer cells included.
#[derive(Debug, Default)]
struct FloatColumns {
    y: bool,
    yhat: bool,
}

impl FloatColumns {
    fn widen(&self, rows: &mut [ExportedRow]) {
        if !self.y && !self.yhat {
            return;
        }
        debug!(
            "widening integer cells to float (y: {}, yhat: {})",
            self.y, self.yhat
        );
        for row in rows {
            if self.y {
                row.y = row.y.to_float();
            }
            if self.yhat {
                row.yhat = row.yhat.to_float();
            }
        }
    }
}

fn check_length(batch: usize, field: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(Error::LengthMismatch {
            batch,
            field,
            expected,
            got,
        })
    }
}

/// Export scalar predictions to `model_predictions.csv`.
pub fn export_binary<'a, I>(batches: I, output_dir: impl AsRef<Path>) -> Result<ExportSummary>
where
    I: IntoIterator<Item = &'a PredictionBatch>,
{
    PredictionExporter::new(ExportConfig::new(ReductionPolicy::Identity)).export(batches, output_dir)
}

/// Export argmax class predictions to `model_predictions_multiclass.csv`.
pub fn export_multiclass_argmax<'a, I>(
    batches: I,
    output_dir: impl AsRef<Path>,
) -> Result<ExportSummary>
where
    I: IntoIterator<Item = &'a PredictionBatch>,
{
    PredictionExporter::new(ExportConfig::new(ReductionPolicy::Argmax)).export(batches, output_dir)
}
