//! Per-field reductions applied before rows are written
//!
//! Every per-example field must collapse to a single cell. Two policies exist:
//! - `Identity`: squeeze away length-1 axes and keep the values as they are
//! - `Argmax`: replace a per-class score vector with the index of its maximum

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    batch::{ExampleId, ExampleIds, Scalar, Tensor},
    error::Error,
};

/// How the `yhat` field of each batch is reduced to one value per example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionPolicy {
    /// Scalar predictions (binary classification or regression).
    #[default]
    Identity,
    /// Per-class scores reduced to the highest-scoring class index.
    Argmax,
}

impl ReductionPolicy {
    /// File written for this policy unless the caller overrides it.
    pub fn file_name(&self) -> &'static str {
        match self {
            ReductionPolicy::Identity => "model_predictions.csv",
            ReductionPolicy::Argmax => "model_predictions_multiclass.csv",
        }
    }

    /// Reduce a `yhat` tensor to one scalar per example.
    pub fn reduce(
        &self,
        tensor: &Tensor,
        batch: usize,
        field: &'static str,
    ) -> Result<Vec<Scalar>> {
        match self {
            ReductionPolicy::Identity => squeeze(tensor, batch, field),
            ReductionPolicy::Argmax => argmax_rows(tensor, batch, field),
        }
    }
}

impl fmt::Display for ReductionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReductionPolicy::Identity => "identity",
            ReductionPolicy::Argmax => "argmax",
        };
        f.write_str(label)
    }
}

impl FromStr for ReductionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "binary" | "squeeze" => Ok(ReductionPolicy::Identity),
            "argmax" | "multiclass" => Ok(ReductionPolicy::Argmax),
            _ => Err(Error::ParseReductionPolicy {
                input: s.to_string(),
                expected: "identity/binary, argmax/multiclass".to_string(),
            }),
        }
    }
}

/// Drop every length-1 axis and return the remaining values.
///
/// At most one axis may remain. A tensor that squeezes to zero dimensions
/// yields its single value.
pub fn squeeze(tensor: &Tensor, batch: usize, field: &'static str) -> Result<Vec<Scalar>> {
    check_squeezable(tensor.shape(), batch, field)?;
    Ok(tensor.scalars())
}

/// Squeeze example identifiers the same way as label tensors.
pub fn squeeze_ids(ids: &ExampleIds, batch: usize) -> Result<Vec<ExampleId>> {
    check_squeezable(ids.shape(), batch, "id")?;
    Ok(ids.values().to_vec())
}

fn check_squeezable(shape: &[usize], batch: usize, field: &'static str) -> Result<()> {
    let remaining = shape.iter().filter(|&&dim| dim != 1).count();
    if remaining > 1 {
        return Err(Error::ShapeMismatch {
            batch,
            field,
            shape: shape.to_vec(),
            expected: "at most one axis longer than 1 after squeezing".to_string(),
        });
    }
    Ok(())
}

/// Index of the maximum along the class axis of a `[examples, classes]` tensor.
pub fn argmax_rows(tensor: &Tensor, batch: usize, field: &'static str) -> Result<Vec<Scalar>> {
    let shape = tensor.shape();
    if shape.len() != 2 {
        return Err(Error::ShapeMismatch {
            batch,
            field,
            shape: shape.to_vec(),
            expected: "[examples, classes]".to_string(),
        });
    }
    if shape[1] == 0 {
        return Err(Error::EmptyClassAxis { batch });
    }

    let indices: Vec<usize> = match tensor {
        Tensor::Int(values) => values
            .outer_iter()
            .map(|row| first_max_position(row.iter().copied()))
            .collect(),
        Tensor::Float(values) => values
            .outer_iter()
            .map(|row| first_max_position(row.iter().copied()))
            .collect(),
    };

    Ok(indices
        .into_iter()
        .map(|idx| Scalar::Int(idx as i64))
        .collect())
}

/// Ties resolve to the earliest position. An unordered value (NaN) wins
/// immediately, as numpy's argmax does.
fn first_max_position<T, I>(values: I) -> usize
where
    T: PartialOrd + Copy,
    I: IntoIterator<Item = T>,
{
    let mut best: Option<(usize, T)> = None;
    for (idx, value) in values.into_iter().enumerate() {
        if value.partial_cmp(&value).is_none() {
            return idx;
        }
        match best {
            Some((_, current)) if value.partial_cmp(&current) != Some(Ordering::Greater) => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map_or(0, |(idx, _)| idx)
}
