//! Prediction batches as produced by an evaluation loop
//!
//! A [`PredictionBatch`] carries parallel per-example fields (`id`, `y`, `yhat`)
//! and one batch-level `loss`. Label and prediction arrays keep the element
//! type they were produced with, so integer class labels stay integers when
//! they are written out.

use std::fmt;

use ndarray::{Array, ArrayD, ArrayViewD, Dimension, IxDyn};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::{Number, Value};

use crate::error::Error;

/// Identifier of a single evaluated example.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExampleId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ExampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExampleId::Int(id) => write!(f, "{id}"),
            ExampleId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ExampleId {
    fn from(id: i64) -> Self {
        ExampleId::Int(id)
    }
}

impl From<i32> for ExampleId {
    fn from(id: i32) -> Self {
        ExampleId::Int(i64::from(id))
    }
}

impl From<&str> for ExampleId {
    fn from(id: &str) -> Self {
        ExampleId::Text(id.to_string())
    }
}

impl From<String> for ExampleId {
    fn from(id: String) -> Self {
        ExampleId::Text(id)
    }
}

/// Element type of a tensor or of a reduced cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int,
    Float,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cell value after reduction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Float(_) => ScalarKind::Float,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Scalar::Int(value) => value as f64,
            Scalar::Float(value) => value,
        }
    }

    /// Same value as a float cell, the way a mixed int/float column is widened.
    pub fn to_float(self) -> Scalar {
        Scalar::Float(self.as_f64())
    }
}

/// Dense n-dimensional array of labels or model outputs.
///
/// Serialized as `{"int": [...]}` or `{"float": [...]}` with nested JSON arrays.
/// When deserializing, a bare nested array is accepted as well: it becomes an
/// integer tensor if every element is an integer, otherwise a float tensor.
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    Int(ArrayD<i64>),
    Float(ArrayD<f64>),
}

impl Tensor {
    pub fn shape(&self) -> &[usize] {
        match self {
            Tensor::Int(values) => values.shape(),
            Tensor::Float(values) => values.shape(),
        }
    }

    pub fn kind(&self) -> ScalarKind {
        match self {
            Tensor::Int(_) => ScalarKind::Int,
            Tensor::Float(_) => ScalarKind::Float,
        }
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        match self {
            Tensor::Int(values) => values.len(),
            Tensor::Float(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All elements in logical (row-major) order.
    pub fn scalars(&self) -> Vec<Scalar> {
        match self {
            Tensor::Int(values) => values.iter().copied().map(Scalar::Int).collect(),
            Tensor::Float(values) => values.iter().copied().map(Scalar::Float).collect(),
        }
    }

    /// Build a tensor from a nested JSON array, inferring the element type.
    pub fn from_nested(value: &Value) -> crate::Result<Self> {
        let (shape, leaves) = flatten_nested(value)?;
        let leaves = numeric_leaves(&leaves)?;
        let all_integers = !leaves.is_empty() && leaves.iter().all(|n| n.as_i64().is_some());
        if all_integers {
            Self::int_from_leaves(shape, &leaves)
        } else {
            Self::float_from_leaves(shape, &leaves)
        }
    }

    /// Build a tensor of the requested element type from a nested JSON array.
    pub fn from_nested_as(value: &Value, kind: ScalarKind) -> crate::Result<Self> {
        let (shape, leaves) = flatten_nested(value)?;
        let leaves = numeric_leaves(&leaves)?;
        match kind {
            ScalarKind::Int => Self::int_from_leaves(shape, &leaves),
            ScalarKind::Float => Self::float_from_leaves(shape, &leaves),
        }
    }

    /// Nested JSON array representation (without the element type tag).
    pub fn to_nested(&self) -> Value {
        match self {
            Tensor::Int(values) => nest(values.view()),
            Tensor::Float(values) => nest(values.view()),
        }
    }

    fn int_from_leaves(shape: Vec<usize>, leaves: &[&Number]) -> crate::Result<Self> {
        let data = leaves
            .iter()
            .map(|n| {
                n.as_i64().ok_or_else(|| Error::InvalidTensor {
                    message: format!("expected an integer element, got {n}"),
                })
            })
            .collect::<crate::Result<Vec<i64>>>()?;
        let values = ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| {
            Error::InvalidTensor {
                message: e.to_string(),
            }
        })?;
        Ok(Tensor::Int(values))
    }

    fn float_from_leaves(shape: Vec<usize>, leaves: &[&Number]) -> crate::Result<Self> {
        let data = leaves
            .iter()
            .map(|n| {
                n.as_f64().ok_or_else(|| Error::InvalidTensor {
                    message: format!("element {n} is not representable as f64"),
                })
            })
            .collect::<crate::Result<Vec<f64>>>()?;
        let values = ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| {
            Error::InvalidTensor {
                message: e.to_string(),
            }
        })?;
        Ok(Tensor::Float(values))
    }
}

impl<D: Dimension> From<Array<i64, D>> for Tensor {
    fn from(values: Array<i64, D>) -> Self {
        Tensor::Int(values.into_dyn())
    }
}

impl<D: Dimension> From<Array<f64, D>> for Tensor {
    fn from(values: Array<f64, D>) -> Self {
        Tensor::Float(values.into_dyn())
    }
}

impl From<Vec<i64>> for Tensor {
    fn from(values: Vec<i64>) -> Self {
        Tensor::Int(Array::from(values).into_dyn())
    }
}

impl From<Vec<f64>> for Tensor {
    fn from(values: Vec<f64>) -> Self {
        Tensor::Float(Array::from(values).into_dyn())
    }
}

/// Shape comes from the first element along each axis; every other element
/// must match it exactly. Leaves are any non-array JSON values.
fn flatten_nested(value: &Value) -> crate::Result<(Vec<usize>, Vec<&Value>)> {
    let mut shape = Vec::new();
    let mut cursor = value;
    while let Value::Array(items) = cursor {
        shape.push(items.len());
        match items.first() {
            Some(first) => cursor = first,
            None => break,
        }
    }

    let mut leaves = Vec::with_capacity(shape.iter().product());
    collect_leaves(value, &shape, &mut leaves)?;
    Ok((shape, leaves))
}

fn collect_leaves<'a>(
    value: &'a Value,
    shape: &[usize],
    leaves: &mut Vec<&'a Value>,
) -> crate::Result<()> {
    match (value, shape.split_first()) {
        (Value::Array(items), Some((&len, rest))) if items.len() == len => {
            for item in items {
                collect_leaves(item, rest, leaves)?;
            }
            Ok(())
        }
        (Value::Array(_), _) | (_, Some(_)) => Err(Error::InvalidTensor {
            message: "ragged nested array".to_string(),
        }),
        (leaf, None) => {
            leaves.push(leaf);
            Ok(())
        }
    }
}

fn numeric_leaves<'a>(leaves: &[&'a Value]) -> crate::Result<Vec<&'a Number>> {
    leaves
        .iter()
        .map(|leaf| match leaf {
            Value::Number(number) => Ok(number),
            other => Err(Error::InvalidTensor {
                message: format!("expected a number or an array, got {other}"),
            }),
        })
        .collect()
}

fn nest<T>(view: ArrayViewD<'_, T>) -> Value
where
    T: Copy + Into<Value>,
{
    if view.ndim() == 0 {
        return view.first().map_or(Value::Null, |&value| value.into());
    }
    Value::Array(view.outer_iter().map(nest).collect())
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TaggedTensor {
    Int(Value),
    Float(Value),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TensorRepr {
    Tagged(TaggedTensor),
    Nested(Value),
}

impl Serialize for Tensor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tagged = match self {
            Tensor::Int(_) => TaggedTensor::Int(self.to_nested()),
            Tensor::Float(_) => TaggedTensor::Float(self.to_nested()),
        };
        tagged.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Tensor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tensor = match TensorRepr::deserialize(deserializer)? {
            TensorRepr::Tagged(TaggedTensor::Int(value)) => {
                Tensor::from_nested_as(&value, ScalarKind::Int)
            }
            TensorRepr::Tagged(TaggedTensor::Float(value)) => {
                Tensor::from_nested_as(&value, ScalarKind::Float)
            }
            TensorRepr::Nested(value) => Tensor::from_nested(&value),
        };
        tensor.map_err(de::Error::custom)
    }
}

/// Example identifiers of one batch, kept in the shape they were produced in.
///
/// Serialized as a nested JSON array of integers and strings. An `[n, 1]`
/// column of ids is squeezed to `n` values at export time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleIds {
    shape: Vec<usize>,
    values: Vec<ExampleId>,
}

impl ExampleIds {
    /// Ids laid out in `shape`, in row-major order.
    pub fn from_shape(shape: Vec<usize>, values: Vec<ExampleId>) -> crate::Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(Error::InvalidTensor {
                message: format!(
                    "shape {shape:?} holds {expected} ids, got {}",
                    values.len()
                ),
            });
        }
        Ok(Self { shape, values })
    }

    pub fn from_nested(value: &Value) -> crate::Result<Self> {
        let (shape, leaves) = flatten_nested(value)?;
        let values = leaves
            .into_iter()
            .map(|leaf| match leaf {
                Value::Number(number) => number.as_i64().map(ExampleId::Int).ok_or_else(|| {
                    Error::InvalidTensor {
                        message: format!("id {number} is not an integer"),
                    }
                }),
                Value::String(text) => Ok(ExampleId::Text(text.clone())),
                other => Err(Error::InvalidTensor {
                    message: format!("expected an integer or string id, got {other}"),
                }),
            })
            .collect::<crate::Result<Vec<_>>>()?;
        Self::from_shape(shape, values)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// All ids in row-major order, regardless of shape.
    pub fn values(&self) -> &[ExampleId] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExampleId> {
        self.values.iter()
    }

    fn to_nested(&self) -> Value {
        fn nest_ids(shape: &[usize], values: &[ExampleId]) -> Value {
            match shape.split_first() {
                None => values.first().map_or(Value::Null, id_value),
                Some((&len, rest)) => {
                    let stride: usize = rest.iter().product();
                    Value::Array(
                        (0..len)
                            .map(|i| nest_ids(rest, &values[i * stride..(i + 1) * stride]))
                            .collect(),
                    )
                }
            }
        }
        nest_ids(&self.shape, &self.values)
    }
}

fn id_value(id: &ExampleId) -> Value {
    match id {
        ExampleId::Int(id) => Value::from(*id),
        ExampleId::Text(id) => Value::from(id.as_str()),
    }
}

impl<T: Into<ExampleId>> FromIterator<T> for ExampleIds {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let values: Vec<ExampleId> = iter.into_iter().map(Into::into).collect();
        Self {
            shape: vec![values.len()],
            values,
        }
    }
}

impl<'a> IntoIterator for &'a ExampleIds {
    type Item = &'a ExampleId;
    type IntoIter = std::slice::Iter<'a, ExampleId>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl Serialize for ExampleIds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_nested().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ExampleIds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ExampleIds::from_nested(&value).map_err(de::Error::custom)
    }
}

/// A group of examples evaluated together.
///
/// `id`, `y` and `yhat` are parallel: each holds one entry per example. `loss`
/// is the mean loss of the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionBatch {
    pub id: ExampleIds,
    pub y: Tensor,
    pub yhat: Tensor,
    pub loss: f64,
}

impl PredictionBatch {
    pub fn new<I, T>(id: I, y: impl Into<Tensor>, yhat: impl Into<Tensor>, loss: f64) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ExampleId>,
    {
        Self {
            id: id.into_iter().collect(),
            y: y.into(),
            yhat: yhat.into(),
            loss,
        }
    }

    /// Number of examples in the batch.
    pub fn len(&self) -> usize {
        self.id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}
