// crates/stylescope-probe/src/metrics.rs

/// Fraction of positions where prediction equals truth. Zero for empty input.
pub fn accuracy(y_true: &[i64], y_pred: &[i64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    hits as f64 / y_true.len() as f64
}

/// Confusion matrix over the sorted union of true and predicted labels.
///
/// Returns `(labels, cm)` where `cm[i][j]` counts samples whose true label is
/// `labels[i]` and whose predicted label is `labels[j]`.
pub fn confusion_matrix(y_true: &[i64], y_pred: &[i64]) -> (Vec<i64>, Vec<Vec<usize>>) {
    let mut labels: Vec<i64> = y_true.iter().chain(y_pred).copied().collect();
    labels.sort_unstable();
    labels.dedup();

    let mut cm = vec![vec![0usize; labels.len()]; labels.len()];
    for (t, p) in y_true.iter().zip(y_pred) {
        // Both labels were inserted above.
        if let (Ok(i), Ok(j)) = (labels.binary_search(t), labels.binary_search(p)) {
            cm[i][j] += 1;
        }
    }
    (labels, cm)
}
