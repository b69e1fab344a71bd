// crates/stylescope-core/src/aggregate.rs
//
// Cross-chunk aggregation: C x L x D -> L x D by elementwise mean.
//
// Chunks are weighted equally regardless of how many tokens they cover, so a
// short trailing chunk counts as much as a full one.

use crate::error::StyleScopeError;
use crate::trajectory::{LayerMatrix, TrajectoryMatrix};

/// Elementwise arithmetic mean over the chunk axis.
///
/// Sums are accumulated in `f64` and stored back as `f32`. Every matrix must
/// share the shape of the first one.
pub fn aggregate(per_chunk: &[LayerMatrix]) -> Result<TrajectoryMatrix, StyleScopeError> {
    let first = per_chunk.first().ok_or_else(|| {
        StyleScopeError::ShapeMismatch("cannot aggregate zero chunks".to_string())
    })?;
    let (layers, dim) = first.shape();

    let mut sums = vec![0.0_f64; layers * dim];
    for (i, matrix) in per_chunk.iter().enumerate() {
        if matrix.shape() != (layers, dim) {
            return Err(StyleScopeError::ShapeMismatch(format!(
                "chunk {} has shape {:?}, expected {:?}",
                i,
                matrix.shape(),
                (layers, dim)
            )));
        }
        for (acc, v) in sums.iter_mut().zip(matrix.as_slice()) {
            *acc += *v as f64;
        }
    }

    let count = per_chunk.len() as f64;
    let mean = sums.into_iter().map(|s| (s / count) as f32).collect();
    LayerMatrix::from_flat(layers, dim, mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_chunks_average_exactly() {
        let a = LayerMatrix::from_rows(vec![vec![1.0, -2.0, 0.5], vec![4.0, 0.0, 3.25]]).unwrap();
        let b = LayerMatrix::from_rows(vec![vec![3.0, 2.0, 1.5], vec![-4.0, 7.0, 0.75]]).unwrap();
        let mean = aggregate(&[a.clone(), b.clone()]).unwrap();

        let expected: Vec<f32> = a
            .as_slice()
            .iter()
            .zip(b.as_slice())
            .map(|(x, y)| (x + y) / 2.0)
            .collect();
        assert_eq!(mean.as_slice(), expected.as_slice());
        assert_eq!(mean.row(0), &[2.0, 0.0, 1.0]);
    }

    #[test]
    fn test_single_chunk_is_identity() {
        let a = LayerMatrix::from_rows(vec![vec![0.1, 0.2], vec![0.3, 0.4]]).unwrap();
        assert_eq!(aggregate(std::slice::from_ref(&a)).unwrap(), a);
    }

    #[test]
    fn test_chunks_are_not_weighted_by_length() {
        // Three chunks contribute a third each, however many tokens they held.
        let rows = |v: f32| LayerMatrix::from_rows(vec![vec![v]]).unwrap();
        let mean = aggregate(&[rows(3.0), rows(6.0), rows(0.0)]).unwrap();
        assert_eq!(mean.row(0), &[3.0]);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(matches!(
            aggregate(&[]),
            Err(StyleScopeError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_mismatched_shapes_are_rejected() {
        let a = LayerMatrix::from_rows(vec![vec![1.0, 2.0]]).unwrap();
        let b = LayerMatrix::from_rows(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        assert!(matches!(
            aggregate(&[a, b]),
            Err(StyleScopeError::ShapeMismatch(_))
        ));
    }
}
