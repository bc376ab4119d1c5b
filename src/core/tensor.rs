//! Immutable tensor views over flat numeric buffers.
//!
//! A [`TensorView`] couples an owned flat buffer with an explicit shape and
//! element kind. Consumers never mutate a view in place; reshaping produces a
//! new view over a copy of the buffer. The crate supports the two element
//! kinds the model families emit: 32-bit floats and 64-bit signed integers
//! (class indices).

use ndarray::{ArrayViewD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::core::errors::{PredictError, PredictResult};

/// Element kind of a tensor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    /// 32-bit IEEE float.
    Float32,
    /// 64-bit signed integer.
    Int64,
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DType::Float32 => write!(f, "float32"),
            DType::Int64 => write!(f, "int64"),
        }
    }
}

/// Owned tensor payload, one variant per supported element kind.
#[derive(Debug, Clone, PartialEq)]
enum TensorData {
    Float32(Vec<f32>),
    Int64(Vec<i64>),
}

impl TensorData {
    fn len(&self) -> usize {
        match self {
            TensorData::Float32(v) => v.len(),
            TensorData::Int64(v) => v.len(),
        }
    }
}

/// An immutable view over a flat numeric buffer plus its shape.
///
/// Invariant: `product(shape) == len(data)`, checked at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorView {
    data: TensorData,
    shape: Vec<usize>,
}

impl TensorView {
    /// Creates a float32 tensor view, validating the shape invariant.
    pub fn from_f32(data: Vec<f32>, shape: Vec<usize>) -> PredictResult<Self> {
        check_shape(data.len(), &shape)?;
        Ok(Self {
            data: TensorData::Float32(data),
            shape,
        })
    }

    /// Creates an int64 tensor view, validating the shape invariant.
    pub fn from_i64(data: Vec<i64>, shape: Vec<usize>) -> PredictResult<Self> {
        check_shape(data.len(), &shape)?;
        Ok(Self {
            data: TensorData::Int64(data),
            shape,
        })
    }

    /// Returns the element kind of the underlying buffer.
    pub fn dtype(&self) -> DType {
        match self.data {
            TensorData::Float32(_) => DType::Float32,
            TensorData::Int64(_) => DType::Int64,
        }
    }

    /// Returns the ordered dimension sizes.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the total element count.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the float32 buffer, or None for other element kinds.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.data {
            TensorData::Float32(v) => Some(v),
            TensorData::Int64(_) => None,
        }
    }

    /// Returns the int64 buffer, or None for other element kinds.
    pub fn as_i64(&self) -> Option<&[i64]> {
        match &self.data {
            TensorData::Int64(v) => Some(v),
            TensorData::Float32(_) => None,
        }
    }

    /// Returns the float32 buffer or fails with the given operation context.
    pub fn expect_f32(&self, context: &str) -> PredictResult<&[f32]> {
        self.as_f32()
            .ok_or_else(|| PredictError::unsupported_dtype(self.dtype(), context.to_string()))
    }

    /// Produces a new view with a different shape over a copy of the buffer.
    ///
    /// The element count must be preserved.
    pub fn reshape(&self, shape: Vec<usize>) -> PredictResult<Self> {
        check_shape(self.data.len(), &shape)?;
        Ok(Self {
            data: self.data.clone(),
            shape,
        })
    }

    /// Borrows the float32 buffer as a dynamic-dimensional ndarray view.
    ///
    /// This is the handoff point to the inference engine, which consumes
    /// ndarray views directly.
    pub fn as_array_view(&self) -> PredictResult<ArrayViewD<'_, f32>> {
        let data = self.expect_f32("ndarray view")?;
        ArrayViewD::from_shape(IxDyn(&self.shape), data).map_err(PredictError::Tensor)
    }
}

fn check_shape(len: usize, shape: &[usize]) -> PredictResult<()> {
    // Dimensions are positive; a zero dimension would let an empty buffer
    // satisfy the product invariant and feed zero-width chunking downstream.
    if shape.contains(&0) {
        return Err(PredictError::invalid_input(format!(
            "shape {:?} has a zero dimension",
            shape
        )));
    }
    let expected: usize = shape.iter().product();
    if expected != len {
        return Err(PredictError::shape_mismatch(&[expected], &[len]));
    }
    Ok(())
}

/// Re-lays-out a planar CHW float buffer as interleaved HWC.
///
/// `out[(h*width + w)*channels + c] = data[c*height*width + h*width + w]`;
/// used by the image enhancement decoder to turn NCHW engine output into the
/// interleaved RGB float list its consumers expect.
pub fn chw_to_hwc(data: &[f32], channels: usize, height: usize, width: usize) -> Vec<f32> {
    let plane = height * width;
    let mut out = vec![0.0f32; data.len()];
    for h in 0..height {
        for w in 0..width {
            for c in 0..channels {
                out[(h * width + w) * channels + c] = data[c * plane + h * width + w];
            }
        }
    }
    out
}
