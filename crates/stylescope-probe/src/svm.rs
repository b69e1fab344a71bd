// crates/stylescope-probe/src/svm.rs
//
// Linear support vector classifier.
//
// Primal objective per binary problem, with the intercept folded into the
// weight vector as a constant feature of 1 (and regularized with it):
//
//   0.5 * |w|^2 + C * sum_i max(0, 1 - t_i * w.x_i)^2
//
// Minimized by full-batch gradient descent with step 1 / L, where
// L = 1 + 2C * |X|_F^2 bounds the gradient's Lipschitz constant. More than
// two classes train one-vs-rest.

/// Training parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SvmParams {
    /// Inverse regularization strength.
    pub c: f64,
    pub max_iter: usize,
    /// Stop once the gradient norm falls below this.
    pub tol: f64,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 2000,
            tol: 1e-6,
        }
    }
}

/// A fitted classifier.
#[derive(Debug, Clone)]
pub struct LinearSvm {
    /// Known labels, ascending.
    classes: Vec<i64>,
    /// One augmented weight vector (features then intercept) per binary
    /// problem: one for two classes, one per class otherwise.
    weights: Vec<Vec<f64>>,
}

impl LinearSvm {
    /// Fit on rows `x` with labels `y`.
    ///
    /// Expects validated input: rectangular, finite with a finite squared
    /// norm, and at least two distinct labels.
    pub fn fit(x: &[Vec<f64>], y: &[i64], params: &SvmParams) -> Self {
        let mut classes: Vec<i64> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let weights = if classes.len() == 2 {
            // Positive side is the larger label.
            vec![fit_binary(x, y, classes[1], params)]
        } else {
            classes
                .iter()
                .map(|&positive| fit_binary(x, y, positive, params))
                .collect()
        };

        Self { classes, weights }
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Signed distance-like scores, one per binary problem.
    pub fn decision_function(&self, row: &[f64]) -> Vec<f64> {
        self.weights.iter().map(|w| augmented_dot(w, row)).collect()
    }

    pub fn predict_one(&self, row: &[f64]) -> i64 {
        let scores = self.decision_function(row);
        if self.classes.len() == 2 {
            return if scores[0] > 0.0 {
                self.classes[1]
            } else {
                self.classes[0]
            };
        }
        // Highest score wins; ties go to the lower label.
        let mut best = 0;
        for (i, s) in scores.iter().enumerate().skip(1) {
            if *s > scores[best] {
                best = i;
            }
        }
        self.classes[best]
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<i64> {
        x.iter().map(|row| self.predict_one(row)).collect()
    }
}

/// `|X_aug|_F^2`: every row gains a constant 1.
pub fn augmented_frobenius_sq(x: &[Vec<f64>]) -> f64 {
    x.iter()
        .map(|row| row.iter().map(|v| v * v).sum::<f64>() + 1.0)
        .sum()
}

/// `w[..d] . row + w[d]`
fn augmented_dot(w: &[f64], row: &[f64]) -> f64 {
    let (features, intercept) = w.split_at(row.len());
    features.iter().zip(row).map(|(a, b)| a * b).sum::<f64>() + intercept[0]
}

fn fit_binary(x: &[Vec<f64>], y: &[i64], positive: i64, params: &SvmParams) -> Vec<f64> {
    let dim = x.first().map(Vec::len).unwrap_or(0);
    let targets: Vec<f64> = y
        .iter()
        .map(|&label| if label == positive { 1.0 } else { -1.0 })
        .collect();

    let step = 1.0 / (1.0 + 2.0 * params.c * augmented_frobenius_sq(x));

    let mut w = vec![0.0; dim + 1];
    let mut grad = vec![0.0; dim + 1];
    for iter in 0..params.max_iter {
        grad.copy_from_slice(&w);
        for (row, t) in x.iter().zip(&targets) {
            let slack = 1.0 - t * augmented_dot(&w, row);
            if slack > 0.0 {
                let scale = -2.0 * params.c * t * slack;
                for (g, v) in grad.iter_mut().zip(row) {
                    *g += scale * v;
                }
                grad[dim] += scale;
            }
        }

        let norm = grad.iter().map(|g| g * g).sum::<f64>().sqrt();
        if norm < params.tol {
            tracing::trace!(positive, iter, "SVM converged");
            break;
        }
        for (wi, g) in w.iter_mut().zip(&grad) {
            *wi -= step * g;
        }
    }
    w
}
