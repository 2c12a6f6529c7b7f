//! JSON Lines implementation of the batch source.
//!
//! Each non-empty line holds one batch object with the keys `id`, `y`, `yhat`
//! and `loss`. Tensors are written as nested arrays, optionally tagged with
//! their element type (`{"int": [...]}` / `{"float": [...]}`).

use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use log::debug;

use crate::{Result, batch::PredictionBatch, error::Error, ports::BatchSource};

/// JSON Lines file of prediction batches.
///
/// # Examples
///
/// ```no_run
/// use predexport::adapters::JsonlBatchSource;
/// use predexport::ports::BatchSource;
///
/// let source = JsonlBatchSource::new("val_predictions.jsonl");
/// let batches = source.load()?;
/// # Ok::<(), predexport::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct JsonlBatchSource {
    path: PathBuf,
}

impl JsonlBatchSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse batches from any buffered reader. Line numbers in errors are 1-based.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Vec<PredictionBatch>> {
        let mut batches = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line_number = idx + 1;
            let line = line.map_err(|source| Error::Io {
                operation: format!("read line {line_number}"),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let batch: PredictionBatch =
                serde_json::from_str(&line).map_err(|e| Error::InvalidBatchRecord {
                    line: line_number,
                    message: e.to_string(),
                })?;
            batches.push(batch);
        }
        Ok(batches)
    }

    /// Write batches as JSON Lines, one batch per line.
    pub fn write_to<'a, W, I>(batches: I, mut writer: W) -> Result<()>
    where
        W: Write,
        I: IntoIterator<Item = &'a PredictionBatch>,
    {
        for batch in batches {
            serde_json::to_writer(&mut writer, batch)?;
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Replace the file's contents with `batches`.
    pub fn save<'a, I>(&self, batches: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a PredictionBatch>,
    {
        let file = File::create(&self.path).map_err(|source| Error::Io {
            operation: format!("create file {:?}", self.path),
            source,
        })?;
        Self::write_to(batches, std::io::BufWriter::new(file))
    }
}

impl BatchSource for JsonlBatchSource {
    fn load(&self) -> Result<Vec<PredictionBatch>> {
        let file = File::open(&self.path).map_err(|source| Error::Io {
            operation: format!("open file {:?}", self.path),
            source,
        })?;

        let batches = Self::read_from(BufReader::new(file))?;
        debug!("loaded {} batches from {}", batches.len(), self.path.display());
        Ok(batches)
    }
}
