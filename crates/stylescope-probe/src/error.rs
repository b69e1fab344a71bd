// crates/stylescope-probe/src/error.rs

use thiserror::Error;

/// Rejections of probe input. Every variant is a caller error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    #[error("X has no rows")]
    EmptyInput,

    #[error("X rows have no features")]
    NoFeatures,

    #[error("X row {row} has {got} features, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("X has {rows} rows but y has {labels} labels")]
    LabelCountMismatch { rows: usize, labels: usize },

    #[error("need at least 2 distinct labels, got {0}")]
    TooFewClasses(usize),

    /// A stratified split needs one train and one test sample per class.
    #[error("label {label} has {count} sample(s); every label needs at least 2")]
    ClassTooSmall { label: i64, count: usize },

    #[error("X[{row}][{col}] is not finite")]
    NonFinite { row: usize, col: usize },

    /// The solver's step size needs the squared norm of X to be finite.
    #[error("X is too large in magnitude to fit: its squared norm overflows")]
    NormOverflow,
}
