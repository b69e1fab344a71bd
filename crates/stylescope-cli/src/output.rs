// crates/stylescope-cli/src/output.rs
//
// Output formatting utilities for the StyleScope CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::builder::Builder;
use tabled::{Table, Tabled};

use stylescope_core::EmbedResponse;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// One projected layer.
#[derive(Debug, Tabled)]
pub struct LayerPointRow {
    #[tabled(rename = "Layer")]
    pub layer: usize,
    #[tabled(rename = "x")]
    pub x: String,
    #[tabled(rename = "y")]
    pub y: String,
}

pub fn layer_rows(resp: &EmbedResponse) -> Vec<LayerPointRow> {
    resp.coords2d
        .iter()
        .enumerate()
        .map(|(layer, [x, y])| LayerPointRow {
            layer,
            x: format!("{:.4}", x),
            y: format!("{:.4}", y),
        })
        .collect()
}

/// Summary line plus the per-layer table.
pub fn format_trajectory(resp: &EmbedResponse) -> String {
    format!(
        "Trajectory: {} layers x {} dims  |  chunk size {}  |  method {}\n\n{}",
        resp.layers,
        resp.dim,
        resp.chunk_size,
        resp.method,
        format_table(&layer_rows(resp))
    )
}

/// Confusion matrix with label headers; rows are true labels.
pub fn format_confusion(labels: &[i64], cm: &[Vec<usize>]) -> String {
    let mut builder = Builder::default();
    let mut header = vec!["true \\ pred".to_string()];
    header.extend(labels.iter().map(|l| l.to_string()));
    builder.push_record(header);
    for (i, row) in cm.iter().enumerate() {
        let mut record = vec![labels.get(i).map(|l| l.to_string()).unwrap_or_default()];
        record.extend(row.iter().map(|c| c.to_string()));
        builder.push_record(record);
    }
    builder.build().to_string()
}

/// Cut `text` to at most `max` characters, marking the cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylescope_core::ProjectionMethod;

    #[test]
    fn test_layer_rows_follow_layer_order() {
        let resp = EmbedResponse {
            coords2d: vec![[0.0, 1.0], [2.5, -1.0]],
            layers: 2,
            dim: 4,
            chunk_size: 32,
            method: ProjectionMethod::Linear,
        };
        let rows = layer_rows(&resp);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].layer, 1);
        assert_eq!(rows[1].x, "2.5000");
        assert!(format_trajectory(&resp).contains("method linear"));
    }

    #[test]
    fn test_confusion_table_has_label_headers() {
        let table = format_confusion(&[0, 1], &[vec![2, 0], vec![1, 1]]);
        assert!(table.contains("true \\ pred"));
        assert_eq!(table.lines().filter(|l| l.contains('|')).count(), 3);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
    }
}
