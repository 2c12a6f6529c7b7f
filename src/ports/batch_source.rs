//! Batch source port for loading evaluation output.

use crate::{Result, batch::PredictionBatch};

/// Port for obtaining the prediction batches of one evaluation run.
///
/// # Examples
///
/// ```
/// use predexport::ports::BatchSource;
/// use predexport::PredictionBatch;
///
/// fn count_examples<S: BatchSource>(source: &S) -> predexport::Result<usize> {
///     Ok(source.load()?.iter().map(PredictionBatch::len).sum())
/// }
///
/// let batches = vec![PredictionBatch::new([1, 2], vec![0_i64, 1], vec![1_i64, 1], 0.5)];
/// assert_eq!(count_examples(&batches)?, 2);
/// # Ok::<(), predexport::Error>(())
/// ```
pub trait BatchSource {
    /// Load every batch, in evaluation order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying storage cannot be read
    /// - A batch record is malformed or missing a field
    fn load(&self) -> Result<Vec<PredictionBatch>>;
}

/// In-memory batches. `load` returns a clone of every batch, so this suits
/// tests and small runs; large evaluation dumps should be passed to the
/// exporter by reference instead.
impl BatchSource for Vec<PredictionBatch> {
    fn load(&self) -> Result<Vec<PredictionBatch>> {
        Ok(self.clone())
    }
}
