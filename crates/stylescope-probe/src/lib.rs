// crates/stylescope-probe/src/lib.rs
//
// stylescope-probe: how linearly separable are a set of labeled vectors?
//
// A seeded stratified 80/20 split, a linear SVM trained on the larger side,
// and accuracy plus a confusion matrix measured on the smaller one. Identical
// input always gives an identical report.

pub mod error;
pub mod metrics;
pub mod split;
pub mod svm;

use serde::{Deserialize, Serialize};

pub use error::ProbeError;
pub use svm::{LinearSvm, SvmParams};

/// Held-out fraction.
pub const TEST_FRACTION: f64 = 0.2;
/// Seed for the split shuffle.
pub const SPLIT_SEED: u64 = 0;

/// Feature rows and one integer label per row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeRequest {
    #[serde(rename = "X")]
    pub x: Vec<Vec<f64>>,
    pub y: Vec<i64>,
}

/// Held-out evaluation of the probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Test-set accuracy in `[0, 1]`.
    pub acc: f64,
    /// Rows are true labels, columns predicted, both ordered as `labels`.
    pub cm: Vec<Vec<usize>>,
    /// Sorted union of true and predicted test labels.
    #[serde(default)]
    pub labels: Vec<i64>,
}

/// Reject input that cannot be split and fitted.
pub fn validate(x: &[Vec<f64>], y: &[i64]) -> Result<(), ProbeError> {
    let first = x.first().ok_or(ProbeError::EmptyInput)?;
    let dim = first.len();
    if dim == 0 {
        return Err(ProbeError::NoFeatures);
    }
    for (row, values) in x.iter().enumerate() {
        if values.len() != dim {
            return Err(ProbeError::RaggedRows {
                row,
                expected: dim,
                got: values.len(),
            });
        }
        if let Some(col) = values.iter().position(|v| !v.is_finite()) {
            return Err(ProbeError::NonFinite { row, col });
        }
    }
    if !svm::augmented_frobenius_sq(x).is_finite() {
        return Err(ProbeError::NormOverflow);
    }
    if y.len() != x.len() {
        return Err(ProbeError::LabelCountMismatch {
            rows: x.len(),
            labels: y.len(),
        });
    }

    let groups = split::class_indices(y);
    if groups.len() < 2 {
        return Err(ProbeError::TooFewClasses(groups.len()));
    }
    if let Some((label, indices)) = groups.iter().find(|(_, idx)| idx.len() < 2) {
        return Err(ProbeError::ClassTooSmall {
            label: *label,
            count: indices.len(),
        });
    }
    Ok(())
}

/// Train on a stratified split of `(x, y)` and evaluate on the held-out part.
pub fn train_eval(x: &[Vec<f64>], y: &[i64]) -> Result<ProbeReport, ProbeError> {
    validate(x, y)?;

    let split = split::stratified_split(y, TEST_FRACTION, SPLIT_SEED);
    let pick_x = |idx: &[usize]| idx.iter().map(|&i| x[i].clone()).collect::<Vec<_>>();
    let pick_y = |idx: &[usize]| idx.iter().map(|&i| y[i]).collect::<Vec<_>>();

    let (x_train, y_train) = (pick_x(&split.train), pick_y(&split.train));
    let (x_test, y_test) = (pick_x(&split.test), pick_y(&split.test));

    let model = LinearSvm::fit(&x_train, &y_train, &SvmParams::default());
    let y_pred = model.predict(&x_test);

    let acc = metrics::accuracy(&y_test, &y_pred);
    let (labels, cm) = metrics::confusion_matrix(&y_test, &y_pred);

    tracing::debug!(
        samples = x.len(),
        features = x[0].len(),
        classes = model.classes().len(),
        train = y_train.len(),
        test = y_test.len(),
        acc,
        "Probe evaluated"
    );

    Ok(ProbeReport { acc, cm, labels })
}

impl ProbeRequest {
    pub fn run(&self) -> Result<ProbeReport, ProbeError> {
        train_eval(&self.x, &self.y)
    }
}
