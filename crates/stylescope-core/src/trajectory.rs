// crates/stylescope-core/src/trajectory.rs
//
// Dense per-layer matrices: one chunk's layer vectors, and the across-chunk
// trajectory they aggregate into.

use serde::{Deserialize, Serialize};

use crate::error::StyleScopeError;

/// An L x D matrix of `f32`, stored row-major, one row per layer.
///
/// Row 0 is the input embedding layer; rows go shallow to deep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerMatrix {
    layers: usize,
    dim: usize,
    values: Vec<f32>,
}

/// The across-chunk mean of per-chunk layer matrices for one text.
pub type TrajectoryMatrix = LayerMatrix;

/// The 2D projection of a trajectory, rows in layer order.
pub type Trajectory2D = Vec<[f64; 2]>;

impl LayerMatrix {
    /// Build a matrix from a flat row-major buffer.
    pub fn from_flat(layers: usize, dim: usize, values: Vec<f32>) -> Result<Self, StyleScopeError> {
        if layers == 0 || dim == 0 {
            return Err(StyleScopeError::ShapeMismatch(format!(
                "layer matrix must be non-empty, got {}x{}",
                layers, dim
            )));
        }
        if values.len() != layers * dim {
            return Err(StyleScopeError::ShapeMismatch(format!(
                "expected {} values for {}x{}, got {}",
                layers * dim,
                layers,
                dim,
                values.len()
            )));
        }
        Ok(Self { layers, dim, values })
    }

    /// Build a matrix from per-layer rows. All rows must share one length.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, StyleScopeError> {
        let layers = rows.len();
        let dim = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dim) {
            return Err(StyleScopeError::ShapeMismatch(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                dim
            )));
        }
        Self::from_flat(layers, dim, rows.into_iter().flatten().collect())
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// `(layers, dim)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.layers, self.dim)
    }

    /// The vector for one layer.
    ///
    /// # Panics
    /// Panics if `layer >= self.layers()`.
    pub fn row(&self, layer: usize) -> &[f32] {
        &self.values[layer * self.dim..(layer + 1) * self.dim]
    }

    /// Iterate over layer rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks_exact(self.dim)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn into_rows(self) -> Vec<Vec<f32>> {
        self.values
            .chunks_exact(self.dim)
            .map(<[f32]>::to_vec)
            .collect()
    }
}
