// crates/stylescope-core/src/projection.rs
//
// Trajectory projection: L x D -> L x 2.
//
// The linear reducer is always available. The neighborhood reducer is probed
// once when the Projector is built; if it is absent, or fails while fitting,
// the Projector substitutes the linear result and reports that it did.

use std::fmt;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::StyleScopeError;
use crate::traits::TrajectoryReducer;
use crate::trajectory::{Trajectory2D, TrajectoryMatrix};

/// Dimensionality-reduction method, as requested and as actually used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMethod {
    /// Top-2 principal directions via SVD.
    #[default]
    #[serde(alias = "pca")]
    Linear,
    /// Non-linear neighbor-graph embedding.
    #[serde(alias = "umap")]
    Neighborhood,
}

impl ProjectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionMethod::Linear => "linear",
            ProjectionMethod::Neighborhood => "neighborhood",
        }
    }
}

impl fmt::Display for ProjectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 2D trajectory together with the method that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub coords: Trajectory2D,
    pub method: ProjectionMethod,
}

// ---------------------------------------------------------------------------
// Linear
// ---------------------------------------------------------------------------

/// Variance-maximizing projection onto the top two principal directions.
#[derive(Debug, Clone, Default)]
pub struct LinearReducer;

impl LinearReducer {
    pub fn new() -> Self {
        LinearReducer
    }
}

impl TrajectoryReducer for LinearReducer {
    fn method(&self) -> ProjectionMethod {
        ProjectionMethod::Linear
    }

    fn reduce(&self, matrix: &TrajectoryMatrix) -> Result<Trajectory2D, StyleScopeError> {
        linear_projection(matrix)
    }
}

/// Center each dimension across layers, then project onto the two right
/// singular vectors with the largest singular values.
///
/// Coordinates are computed as `U[:, k] * S[k]`, which equals the centered
/// matrix times `V[:, k]`. Each component's sign is fixed so its largest
/// absolute entry in `U` is positive. Missing components (L = 1 or D = 1) are
/// zero columns.
pub fn linear_projection(matrix: &TrajectoryMatrix) -> Result<Trajectory2D, StyleScopeError> {
    let (layers, dim) = matrix.shape();
    if matrix.as_slice().iter().any(|v| !v.is_finite()) {
        return Err(StyleScopeError::Projection(
            "trajectory contains non-finite values".to_string(),
        ));
    }

    let mut centered = DMatrix::<f64>::from_fn(layers, dim, |i, j| matrix.row(i)[j] as f64);
    for j in 0..dim {
        let mean = centered.column(j).mean();
        for i in 0..layers {
            centered[(i, j)] -= mean;
        }
    }

    let svd = centered
        .try_svd(true, false, f64::EPSILON, 0)
        .ok_or_else(|| StyleScopeError::Projection("SVD did not converge".to_string()))?;
    let u = svd
        .u
        .ok_or_else(|| StyleScopeError::Projection("SVD returned no U".to_string()))?;
    let singular = &svd.singular_values;

    let mut order: Vec<usize> = (0..singular.len()).collect();
    order.sort_by(|&a, &b| {
        singular[b]
            .partial_cmp(&singular[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut coords = vec![[0.0_f64; 2]; layers];
    for (k, &component) in order.iter().take(2).enumerate() {
        let column = u.column(component);
        let pivot = column
            .iter()
            .copied()
            .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
        let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
        for (i, row) in coords.iter_mut().enumerate() {
            row[k] = sign * column[i] * singular[component];
        }
    }

    Ok(coords)
}

// ---------------------------------------------------------------------------
// Projector
// ---------------------------------------------------------------------------

/// Capability-checked projection front end.
pub struct Projector {
    linear: LinearReducer,
    neighborhood: Option<Box<dyn TrajectoryReducer>>,
}

impl fmt::Debug for Projector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projector")
            .field("neighborhood_available", &self.neighborhood.is_some())
            .finish()
    }
}

impl Projector {
    /// Build a projector, enabling the neighborhood method when it was
    /// compiled in.
    pub fn new() -> Self {
        Self {
            linear: LinearReducer::new(),
            neighborhood: default_neighborhood(),
        }
    }

    /// A projector with no neighborhood capability.
    pub fn linear_only() -> Self {
        Self {
            linear: LinearReducer::new(),
            neighborhood: None,
        }
    }

    /// A projector with a caller-provided neighborhood strategy.
    pub fn with_neighborhood(reducer: Box<dyn TrajectoryReducer>) -> Self {
        Self {
            linear: LinearReducer::new(),
            neighborhood: Some(reducer),
        }
    }

    pub fn neighborhood_available(&self) -> bool {
        self.neighborhood.is_some()
    }

    /// Project with the requested method, falling back to linear when the
    /// neighborhood method is unavailable or fails.
    ///
    /// Only a linear failure (non-finite input) is returned as an error.
    pub fn project(
        &self,
        matrix: &TrajectoryMatrix,
        method: ProjectionMethod,
    ) -> Result<Projection, StyleScopeError> {
        if method == ProjectionMethod::Neighborhood {
            match &self.neighborhood {
                Some(reducer) => match reducer.reduce(matrix) {
                    Ok(coords) if coords.len() == matrix.layers() => {
                        return Ok(Projection {
                            coords,
                            method: reducer.method(),
                        });
                    }
                    Ok(coords) => tracing::warn!(
                        expected = matrix.layers(),
                        got = coords.len(),
                        "Neighborhood projection dropped rows; using linear"
                    ),
                    Err(e) => tracing::warn!(
                        error = %e,
                        "Neighborhood projection failed; using linear"
                    ),
                },
                None => tracing::warn!("Neighborhood projection unavailable; using linear"),
            }
        }

        let coords = self.linear.reduce(matrix)?;
        Ok(Projection {
            coords,
            method: ProjectionMethod::Linear,
        })
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "neighborhood")]
fn default_neighborhood() -> Option<Box<dyn TrajectoryReducer>> {
    Some(Box::new(crate::neighborhood::NeighborhoodReducer::default()))
}

#[cfg(not(feature = "neighborhood"))]
fn default_neighborhood() -> Option<Box<dyn TrajectoryReducer>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::LayerMatrix;

    struct FailingReducer;

    impl TrajectoryReducer for FailingReducer {
        fn method(&self) -> ProjectionMethod {
            ProjectionMethod::Neighborhood
        }

        fn reduce(&self, _matrix: &TrajectoryMatrix) -> Result<Trajectory2D, StyleScopeError> {
            Err(StyleScopeError::Projection("fit blew up".to_string()))
        }
    }

    fn line_matrix(layers: usize, dim: usize) -> LayerMatrix {
        // Points along a line plus a small orthogonal wiggle.
        let rows = (0..layers)
            .map(|i| {
                (0..dim)
                    .map(|j| {
                        let t = i as f32;
                        if j % 2 == 0 {
                            t
                        } else {
                            (t * 0.7).sin()
                        }
                    })
                    .collect()
            })
            .collect();
        LayerMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_method_names_and_aliases() {
        let linear: ProjectionMethod = serde_json::from_str("\"pca\"").unwrap();
        let neighborhood: ProjectionMethod = serde_json::from_str("\"umap\"").unwrap();
        assert_eq!(linear, ProjectionMethod::Linear);
        assert_eq!(neighborhood, ProjectionMethod::Neighborhood);
        assert_eq!(
            serde_json::to_string(&ProjectionMethod::Neighborhood).unwrap(),
            "\"neighborhood\""
        );
        assert_eq!(ProjectionMethod::default().to_string(), "linear");
    }

    #[test]
    fn test_linear_keeps_one_row_per_layer() {
        let coords = linear_projection(&line_matrix(24, 16)).unwrap();
        assert_eq!(coords.len(), 24);
    }

    #[test]
    fn test_linear_output_is_centered() {
        let coords = linear_projection(&line_matrix(10, 6)).unwrap();
        let mean_x: f64 = coords.iter().map(|c| c[0]).sum::<f64>() / 10.0;
        let mean_y: f64 = coords.iter().map(|c| c[1]).sum::<f64>() / 10.0;
        assert!(mean_x.abs() < 1e-9 && mean_y.abs() < 1e-9);
    }

    #[test]
    fn test_linear_first_axis_captures_the_line() {
        // Rows are exactly collinear: the second component carries nothing.
        let rows = (0..5).map(|i| vec![i as f32, 2.0 * i as f32, 0.0]).collect();
        let coords = linear_projection(&LayerMatrix::from_rows(rows).unwrap()).unwrap();
        let step = 5.0_f64.sqrt();
        for (i, c) in coords.iter().enumerate() {
            let expected = (i as f64 - 2.0) * step;
            assert!((c[0].abs() - expected.abs()).abs() < 1e-6, "{:?}", c);
            assert!(c[1].abs() < 1e-6);
        }
    }

    #[test]
    fn test_linear_is_deterministic() {
        let m = line_matrix(12, 9);
        assert_eq!(linear_projection(&m).unwrap(), linear_projection(&m).unwrap());
    }

    #[test]
    fn test_single_layer_projects_to_origin() {
        let m = LayerMatrix::from_rows(vec![vec![3.0, -1.0, 2.0]]).unwrap();
        assert_eq!(linear_projection(&m).unwrap(), vec![[0.0, 0.0]]);
    }

    #[test]
    fn test_single_dimension_pads_second_column() {
        let m = LayerMatrix::from_rows(vec![vec![1.0], vec![2.0], vec![4.0]]).unwrap();
        let coords = linear_projection(&m).unwrap();
        assert_eq!(coords.len(), 3);
        assert!(coords.iter().all(|c| c[1] == 0.0));
    }

    #[test]
    fn test_non_finite_input_is_an_error() {
        let m = LayerMatrix::from_rows(vec![vec![f32::NAN, 1.0], vec![0.0, 1.0]]).unwrap();
        assert!(linear_projection(&m).is_err());
    }

    #[test]
    fn test_neighborhood_unavailable_falls_back_to_linear() {
        let projector = Projector::linear_only();
        let m = line_matrix(24, 8);
        let p = projector.project(&m, ProjectionMethod::Neighborhood).unwrap();
        assert_eq!(p.method, ProjectionMethod::Linear);
        assert_eq!(p.coords.len(), 24);
        assert_eq!(p.coords, linear_projection(&m).unwrap());
    }

    #[test]
    fn test_neighborhood_failure_falls_back_to_linear() {
        let projector = Projector::with_neighborhood(Box::new(FailingReducer));
        let p = projector
            .project(&line_matrix(6, 4), ProjectionMethod::Neighborhood)
            .unwrap();
        assert_eq!(p.method, ProjectionMethod::Linear);
        assert_eq!(p.coords.len(), 6);
    }

    #[test]
    fn test_linear_request_never_touches_neighborhood() {
        let projector = Projector::with_neighborhood(Box::new(FailingReducer));
        let p = projector
            .project(&line_matrix(6, 4), ProjectionMethod::Linear)
            .unwrap();
        assert_eq!(p.method, ProjectionMethod::Linear);
    }
}
