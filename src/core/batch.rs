//! Input batching.
//!
//! [`InputPacker`] concatenates per-sample tensors of identical shape into a
//! single tensor with a leading batch dimension. Sample order defines the
//! batch-index order observed in every downstream output.

use crate::core::errors::{PredictError, PredictResult};
use crate::core::tensor::{DType, TensorView};

/// Packs per-sample tensors into one batched tensor.
#[derive(Debug, Default)]
pub struct InputPacker;

impl InputPacker {
    /// Concatenates `n` identically-shaped `[C, H, W]` float32 samples into a
    /// `[n, C, H, W]` tensor.
    ///
    /// Fails with [`PredictError::ShapeMismatch`] if any sample's shape
    /// differs from the first, and with [`PredictError::UnsupportedDtype`]
    /// for element kinds other than float32; non-float samples are rejected
    /// outright rather than silently narrowed.
    pub fn pack(samples: &[TensorView]) -> PredictResult<TensorView> {
        let first = samples
            .first()
            .ok_or_else(|| PredictError::invalid_input("cannot pack an empty sample list"))?;
        let sample_shape = first.shape().to_vec();

        let mut buffer = Vec::with_capacity(samples.len() * first.len());
        for sample in samples {
            if sample.dtype() != DType::Float32 {
                return Err(PredictError::unsupported_dtype(
                    sample.dtype(),
                    "input batching",
                ));
            }
            if sample.shape() != sample_shape.as_slice() {
                return Err(PredictError::shape_mismatch(&sample_shape, sample.shape()));
            }
            buffer.extend_from_slice(sample.expect_f32("input batching")?);
        }

        let mut shape = Vec::with_capacity(sample_shape.len() + 1);
        shape.push(samples.len());
        shape.extend_from_slice(&sample_shape);

        TensorView::from_f32(buffer, shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(fill: f32) -> TensorView {
        TensorView::from_f32(vec![fill; 12], vec![3, 2, 2]).unwrap()
    }

    #[test]
    fn pack_prepends_batch_dimension() {
        let batched = InputPacker::pack(&[sample(1.0), sample(2.0), sample(3.0)]).unwrap();
        assert_eq!(batched.shape(), &[3, 3, 2, 2]);

        // Buffer equals the concatenation of inputs in call order.
        let data = batched.as_f32().unwrap();
        assert!(data[..12].iter().all(|&v| v == 1.0));
        assert!(data[12..24].iter().all(|&v| v == 2.0));
        assert!(data[24..].iter().all(|&v| v == 3.0));
    }

    #[test]
    fn pack_single_sample() {
        let batched = InputPacker::pack(&[sample(0.5)]).unwrap();
        assert_eq!(batched.shape(), &[1, 3, 2, 2]);
    }

    #[test]
    fn pack_rejects_empty_input() {
        let err = InputPacker::pack(&[]).unwrap_err();
        assert!(matches!(err, PredictError::InvalidInput { .. }));
    }

    #[test]
    fn pack_rejects_shape_drift() {
        let odd = TensorView::from_f32(vec![0.0; 8], vec![2, 2, 2]).unwrap();
        let err = InputPacker::pack(&[sample(1.0), odd]).unwrap_err();
        match err {
            PredictError::ShapeMismatch { expected, actual } => {
                assert_eq!(expected, vec![3, 2, 2]);
                assert_eq!(actual, vec![2, 2, 2]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn pack_rejects_int64_samples() {
        let ints = TensorView::from_i64(vec![0; 12], vec![3, 2, 2]).unwrap();
        let err = InputPacker::pack(&[ints]).unwrap_err();
        assert!(matches!(
            err,
            PredictError::UnsupportedDtype {
                dtype: DType::Int64,
                ..
            }
        ));
    }
}
