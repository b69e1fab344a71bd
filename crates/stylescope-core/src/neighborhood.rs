// crates/stylescope-core/src/neighborhood.rs
//
// UMAP-style neighbor-graph projection for short layer trajectories.
//
// 1. k-nearest neighbors under cosine distance.
// 2. Fuzzy membership per point (local connectivity rho, bandwidth sigma),
//    symmetrized with the probabilistic t-conorm.
// 3. Layout initialized from the linear projection, then refined by
//    attractive/repulsive SGD with negative sampling from a fixed seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::StyleScopeError;
use crate::projection::{linear_projection, ProjectionMethod};
use crate::traits::TrajectoryReducer;
use crate::trajectory::{Trajectory2D, TrajectoryMatrix};

const SIGMA_SEARCH_STEPS: usize = 64;
const NEGATIVE_SAMPLE_RATE: f64 = 5.0;
const GRADIENT_CLIP: f64 = 4.0;
const INIT_SCALE: f64 = 10.0;

/// Parameters of the neighborhood projection.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodParams {
    /// Neighbors per point. Clamped to `layers - 1`.
    pub n_neighbors: usize,
    /// Minimum distance between embedded points.
    pub min_dist: f64,
    /// Scale of embedded distances.
    pub spread: f64,
    /// Optimization epochs.
    pub n_epochs: usize,
    /// Seed for negative sampling.
    pub seed: u64,
}

impl Default for NeighborhoodParams {
    fn default() -> Self {
        Self {
            n_neighbors: 10,
            min_dist: 0.1,
            spread: 1.0,
            n_epochs: 200,
            seed: 0,
        }
    }
}

/// Neighbor-graph reducer with cosine metric.
#[derive(Debug, Clone)]
pub struct NeighborhoodReducer {
    params: NeighborhoodParams,
    a: f64,
    b: f64,
}

impl NeighborhoodReducer {
    pub fn new(params: NeighborhoodParams) -> Self {
        let (a, b) = fit_ab(params.spread, params.min_dist);
        Self { params, a, b }
    }

    pub fn params(&self) -> &NeighborhoodParams {
        &self.params
    }

    /// Curve parameters `(a, b)` of `1 / (1 + a d^(2b))`.
    pub fn curve(&self) -> (f64, f64) {
        (self.a, self.b)
    }
}

impl Default for NeighborhoodReducer {
    fn default() -> Self {
        Self::new(NeighborhoodParams::default())
    }
}

impl TrajectoryReducer for NeighborhoodReducer {
    fn method(&self) -> ProjectionMethod {
        ProjectionMethod::Neighborhood
    }

    fn reduce(&self, matrix: &TrajectoryMatrix) -> Result<Trajectory2D, StyleScopeError> {
        let n = matrix.layers();
        if n < 3 {
            return Err(StyleScopeError::Projection(format!(
                "neighborhood projection needs at least 3 layers, got {}",
                n
            )));
        }
        let k = self.params.n_neighbors.clamp(1, n - 1);

        let points: Vec<Vec<f64>> = matrix
            .rows()
            .map(|r| r.iter().map(|v| *v as f64).collect())
            .collect();
        let distances = cosine_distances(&points);
        let graph = fuzzy_graph(&distances, k);
        if graph.is_empty() {
            return Err(StyleScopeError::Projection(
                "neighbor graph has no edges".to_string(),
            ));
        }

        let mut layout = initial_layout(matrix)?;
        optimize_layout(&mut layout, &graph, self.a, self.b, &self.params);

        if layout.iter().flatten().any(|v| !v.is_finite()) {
            return Err(StyleScopeError::Projection(
                "layout diverged to non-finite coordinates".to_string(),
            ));
        }
        Ok(layout)
    }
}

/// Pairwise cosine distances `1 - cos(x_i, x_j)`. Zero vectors are at
/// distance 1 from everything else.
fn cosine_distances(points: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let norms: Vec<f64> = points
        .iter()
        .map(|p| p.iter().map(|v| v * v).sum::<f64>().sqrt())
        .collect();
    let n = points.len();
    let mut out = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = if norms[i] == 0.0 || norms[j] == 0.0 {
                1.0
            } else {
                let dot: f64 = points[i].iter().zip(&points[j]).map(|(a, b)| a * b).sum();
                (1.0 - dot / (norms[i] * norms[j])).max(0.0)
            };
            out[i][j] = d;
            out[j][i] = d;
        }
    }
    out
}

/// Weighted undirected edges `(i, j, w)` with `i < j`.
fn fuzzy_graph(distances: &[Vec<f64>], k: usize) -> Vec<(usize, usize, f64)> {
    let n = distances.len();
    let target = (k as f64).log2().max(f64::MIN_POSITIVE);
    let mut directed = vec![vec![0.0_f64; n]; n];

    for i in 0..n {
        let mut neighbors: Vec<usize> = (0..n).filter(|&j| j != i).collect();
        neighbors.sort_by(|&a, &b| {
            distances[i][a]
                .partial_cmp(&distances[i][b])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        neighbors.truncate(k);

        let dists: Vec<f64> = neighbors.iter().map(|&j| distances[i][j]).collect();
        let rho = dists.iter().copied().find(|d| *d > 0.0).unwrap_or(0.0);
        let sigma = smooth_sigma(&dists, rho, target);

        for (&j, &d) in neighbors.iter().zip(&dists) {
            directed[i][j] = (-(d - rho).max(0.0) / sigma).exp();
        }
    }

    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (directed[i][j], directed[j][i]);
            let w = a + b - a * b;
            if w > 0.0 {
                edges.push((i, j, w));
            }
        }
    }
    edges
}

/// Binary search for the bandwidth giving `sum exp(-(d - rho)/sigma) = target`.
fn smooth_sigma(dists: &[f64], rho: f64, target: f64) -> f64 {
    let (mut lo, mut hi, mut mid) = (0.0_f64, f64::INFINITY, 1.0_f64);
    for _ in 0..SIGMA_SEARCH_STEPS {
        let total: f64 = dists
            .iter()
            .map(|d| (-(d - rho).max(0.0) / mid).exp())
            .sum();
        if (total - target).abs() < 1e-5 {
            break;
        }
        if total > target {
            hi = mid;
            mid = (lo + hi) / 2.0;
        } else {
            lo = mid;
            mid = if hi.is_infinite() { mid * 2.0 } else { (lo + hi) / 2.0 };
        }
    }
    mid.max(1e-3)
}

/// Linear projection rescaled so each axis spans `[0, INIT_SCALE]`.
fn initial_layout(matrix: &TrajectoryMatrix) -> Result<Trajectory2D, StyleScopeError> {
    let mut layout = linear_projection(matrix)?;
    for axis in 0..2 {
        let (min, max) = layout.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[axis]), hi.max(p[axis]))
        });
        let range = max - min;
        for p in layout.iter_mut() {
            p[axis] = if range > 0.0 {
                (p[axis] - min) / range * INIT_SCALE
            } else {
                0.0
            };
        }
    }
    Ok(layout)
}

fn clip(v: f64) -> f64 {
    v.clamp(-GRADIENT_CLIP, GRADIENT_CLIP)
}

fn optimize_layout(
    layout: &mut Trajectory2D,
    graph: &[(usize, usize, f64)],
    a: f64,
    b: f64,
    params: &NeighborhoodParams,
) {
    let n = layout.len();
    let max_w = graph.iter().map(|e| e.2).fold(0.0_f64, f64::max);

    // Both directions of each edge are sampled, moving both endpoints.
    let directed: Vec<(usize, usize, f64)> = graph
        .iter()
        .flat_map(|&(i, j, w)| [(i, j, max_w / w), (j, i, max_w / w)])
        .collect();
    let mut next_sample: Vec<f64> = directed.iter().map(|e| e.2).collect();
    let neg_period: Vec<f64> = directed.iter().map(|e| e.2 / NEGATIVE_SAMPLE_RATE).collect();
    let mut next_negative = neg_period.clone();

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);

    for epoch in 0..params.n_epochs {
        let alpha = 1.0 - epoch as f64 / params.n_epochs as f64;
        let now = epoch as f64;

        for (e, &(i, j, period)) in directed.iter().enumerate() {
            if next_sample[e] > now {
                continue;
            }

            let dist_sq = squared_distance(&layout[i], &layout[j]);
            if dist_sq > 0.0 {
                let coeff = -2.0 * a * b * dist_sq.powf(b - 1.0) / (a * dist_sq.powf(b) + 1.0);
                for d in 0..2 {
                    let grad = clip(coeff * (layout[i][d] - layout[j][d])) * alpha;
                    layout[i][d] += grad;
                    layout[j][d] -= grad;
                }
            }
            next_sample[e] += period;

            let n_neg = ((now - next_negative[e]) / neg_period[e]).max(0.0) as usize;
            for _ in 0..n_neg {
                let other = rng.gen_range(0..n);
                if other == i {
                    continue;
                }
                let dist_sq = squared_distance(&layout[i], &layout[other]);
                for d in 0..2 {
                    let grad = if dist_sq > 0.0 {
                        let coeff = 2.0 * b / ((0.001 + dist_sq) * (a * dist_sq.powf(b) + 1.0));
                        clip(coeff * (layout[i][d] - layout[other][d]))
                    } else {
                        GRADIENT_CLIP
                    };
                    layout[i][d] += grad * alpha;
                }
            }
            next_negative[e] += n_neg as f64 * neg_period[e];
        }
    }
}

fn squared_distance(p: &[f64; 2], q: &[f64; 2]) -> f64 {
    (p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2)
}

/// Least-squares fit of `1 / (1 + a x^(2b))` to the target membership curve
/// (1 below `min_dist`, exponential decay with `spread` above it), by a
/// coarse-to-fine grid search.
fn fit_ab(spread: f64, min_dist: f64) -> (f64, f64) {
    let xs: Vec<f64> = (1..=300).map(|i| i as f64 * 3.0 * spread / 300.0).collect();
    let ys: Vec<f64> = xs
        .iter()
        .map(|&x| if x < min_dist { 1.0 } else { (-(x - min_dist) / spread).exp() })
        .collect();
    let loss = |a: f64, b: f64| -> f64 {
        xs.iter()
            .zip(&ys)
            .map(|(&x, &y)| (1.0 / (1.0 + a * x.powf(2.0 * b)) - y).powi(2))
            .sum()
    };

    let (mut a_lo, mut a_hi) = (0.01_f64, 10.0_f64);
    let (mut b_lo, mut b_hi) = (0.1_f64, 3.0_f64);
    let (mut best_a, mut best_b, mut best) = (1.0, 1.0, f64::INFINITY);
    const STEPS: usize = 40;

    for _ in 0..5 {
        for ia in 0..=STEPS {
            let a = a_lo + (a_hi - a_lo) * ia as f64 / STEPS as f64;
            for ib in 0..=STEPS {
                let b = b_lo + (b_hi - b_lo) * ib as f64 / STEPS as f64;
                let l = loss(a, b);
                if l < best {
                    (best_a, best_b, best) = (a, b, l);
                }
            }
        }
        let (da, db) = ((a_hi - a_lo) / STEPS as f64 * 2.0, (b_hi - b_lo) / STEPS as f64 * 2.0);
        a_lo = (best_a - da).max(1e-3);
        a_hi = best_a + da;
        b_lo = (best_b - db).max(1e-3);
        b_hi = best_b + db;
    }
    (best_a, best_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::LayerMatrix;

    fn spiral(layers: usize, dim: usize) -> LayerMatrix {
        let rows = (0..layers)
            .map(|i| {
                let t = i as f32 * 0.4;
                (0..dim)
                    .map(|j| match j % 3 {
                        0 => t.cos() + 1.5,
                        1 => t.sin() + 1.5,
                        _ => t * 0.1 + j as f32 * 0.01,
                    })
                    .collect()
            })
            .collect();
        LayerMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_curve_fit_matches_known_parameters() {
        // Reference values for spread = 1.0, min_dist = 0.1.
        let (a, b) = fit_ab(1.0, 0.1);
        assert!((a - 1.577).abs() < 0.1, "a = {}", a);
        assert!((b - 0.895).abs() < 0.05, "b = {}", b);
    }

    #[test]
    fn test_keeps_one_finite_row_per_layer() {
        let coords = NeighborhoodReducer::default().reduce(&spiral(24, 12)).unwrap();
        assert_eq!(coords.len(), 24);
        assert!(coords.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let m = spiral(16, 9);
        let reducer = NeighborhoodReducer::default();
        assert_eq!(reducer.reduce(&m).unwrap(), reducer.reduce(&m).unwrap());
    }

    #[test]
    fn test_too_few_layers_is_a_fit_error() {
        let m = LayerMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        assert!(matches!(
            NeighborhoodReducer::default().reduce(&m),
            Err(StyleScopeError::Projection(_))
        ));
    }

    #[test]
    fn test_neighbors_clamp_to_available_points() {
        let coords = NeighborhoodReducer::default().reduce(&spiral(4, 6)).unwrap();
        assert_eq!(coords.len(), 4);
    }

    #[test]
    fn test_cosine_distance_of_parallel_vectors_is_zero() {
        let d = cosine_distances(&[vec![1.0, 2.0], vec![2.0, 4.0], vec![0.0, 0.0]]);
        assert!(d[0][1].abs() < 1e-12);
        assert_eq!(d[0][2], 1.0);
        assert_eq!(d[1][0], d[0][1]);
    }

    #[test]
    fn test_fuzzy_weights_are_probabilities() {
        let points: Vec<Vec<f64>> = (0..6).map(|i| vec![1.0, i as f64 * 0.3]).collect();
        let graph = fuzzy_graph(&cosine_distances(&points), 3);
        assert!(!graph.is_empty());
        assert!(graph.iter().all(|&(i, j, w)| i < j && w > 0.0 && w <= 1.0));
    }
}
