// crates/stylescope-probe/tests/train_eval.rs
//
// End-to-end probe runs on small synthetic datasets.

use stylescope_probe::{train_eval, ProbeError, ProbeRequest};

/// Two well-separated clusters of `per_class` points each in `dim` dimensions.
fn two_clusters(per_class: usize, dim: usize) -> (Vec<Vec<f64>>, Vec<i64>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for label in [0i64, 1] {
        let sign = if label == 0 { -1.0 } else { 1.0 };
        for j in 0..per_class {
            let row = (0..dim)
                .map(|d| sign * 3.0 + ((j * 7 + d * 3) % 5) as f64 * 0.1)
                .collect();
            x.push(row);
            y.push(label);
        }
    }
    (x, y)
}

#[test]
fn test_separable_data_scores_perfectly() {
    let (x, y) = two_clusters(10, 4);
    let report = train_eval(&x, &y).unwrap();
    assert_eq!(report.acc, 1.0);
    assert_eq!(report.labels, vec![0, 1]);
    assert_eq!(report.cm, vec![vec![2, 0], vec![0, 2]]);
}

#[test]
fn test_report_is_deterministic() {
    let (x, y) = two_clusters(15, 3);
    assert_eq!(train_eval(&x, &y).unwrap(), train_eval(&x, &y).unwrap());
}

#[test]
fn test_confusion_matrix_counts_test_split() {
    let (x, y) = two_clusters(25, 2);
    let report = train_eval(&x, &y).unwrap();
    let total: usize = report.cm.iter().flatten().sum();
    assert_eq!(total, 10);
    assert!((0.0..=1.0).contains(&report.acc));
}

#[test]
fn test_minimum_viable_input() {
    // Two classes, two samples each: one train and one test sample per class.
    let x = vec![vec![-1.0], vec![-2.0], vec![1.0], vec![2.0]];
    let report = train_eval(&x, &[0, 0, 1, 1]).unwrap();
    assert_eq!(report.cm.iter().flatten().sum::<usize>(), 2);
}

#[test]
fn test_single_class_is_rejected() {
    let x = vec![vec![1.0]; 5];
    assert_eq!(train_eval(&x, &[3; 5]), Err(ProbeError::TooFewClasses(1)));
}

#[test]
fn test_report_serializes_acc_and_cm() {
    let req = ProbeRequest {
        x: two_clusters(5, 2).0,
        y: two_clusters(5, 2).1,
    };
    let json = serde_json::to_value(req.run().unwrap()).unwrap();
    assert!(json["acc"].is_number());
    assert!(json["cm"].is_array());
}

#[test]
fn test_huge_separable_features_are_rejected_not_guessed() {
    let x: Vec<Vec<f64>> = (0..10)
        .map(|i| vec![if i < 5 { -1e200 } else { 1e200 }])
        .collect();
    let y: Vec<i64> = (0..10).map(|i| if i < 5 { 0 } else { 1 }).collect();
    assert_eq!(train_eval(&x, &y), Err(ProbeError::NormOverflow));
}
