// crates/stylescope-cli/src/commands/analyze.rs
//
// `stylescope analyze` — parenthetical density, span lengths and where the
// asides fall in the text.

use std::path::PathBuf;

use clap::Args;
use serde_json::json;
use stylescope_core::paren::Histogram;
use stylescope_core::AnalyzeReport;
use tabled::Tabled;

use super::{read_text, Context};
use crate::output::{format_json, format_table, truncate, OutputFormat};
use crate::rpc_client;

const BAR_WIDTH: usize = 40;
const CONTEXT_CHARS: usize = 60;

/// Measure a text's parenthetical asides.
#[derive(Debug, Args)]
pub struct AnalyzeCmd {
    /// Text to analyze.
    #[arg()]
    pub text: Option<String>,

    /// Read the text from a file instead.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Histogram buckets (1 to 200).
    #[arg(long)]
    pub bins: Option<i64>,

    /// Context characters on each side of a span.
    #[arg(long)]
    pub window: Option<usize>,

    /// Spans to list in the table.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Tabled)]
struct SpanRow {
    #[tabled(rename = "#")]
    id: usize,
    #[tabled(rename = "Pos")]
    position: String,
    #[tabled(rename = "Words")]
    tokens: usize,
    #[tabled(rename = "Context")]
    context: String,
}

/// One line per bucket, bars scaled to the fullest bucket.
pub fn format_histogram(hist: &Histogram) -> String {
    let peak = hist.y.iter().copied().max().unwrap_or(0).max(1);
    hist.x
        .iter()
        .zip(&hist.y)
        .map(|(edge, count)| {
            let bar = "#".repeat(count * BAR_WIDTH / peak);
            format!("{:>5.1}% | {:<width$} {}", edge * 100.0, bar, count, width = BAR_WIDTH)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_report(report: &AnalyzeReport, limit: usize) -> String {
    let mut out = format!(
        "Words: {}  |  spans: {}  |  per 1k words: {:.2}  |  median length: {}  |  p95 length: {}\n\n{}",
        report.word_count,
        report.num_spans,
        report.per1k,
        report.median_len_tokens,
        report.p95_len_tokens,
        format_histogram(&report.histogram)
    );
    let rows: Vec<SpanRow> = report
        .spans
        .iter()
        .take(limit)
        .map(|s| SpanRow {
            id: s.id,
            position: format!("{:.1}%", s.position * 100.0),
            tokens: s.tokens,
            context: truncate(&s.context, CONTEXT_CHARS),
        })
        .collect();
    if !rows.is_empty() {
        out.push_str("\n\n");
        out.push_str(&format_table(&rows));
    }
    out
}

/// Run the analyze command.
pub async fn run(cmd: &AnalyzeCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_text(cmd.text.as_deref(), cmd.file.as_ref())?;
    let mut params = json!({ "text": text, "bins": cmd.bins });
    if let Some(window) = cmd.window {
        params["window"] = json!(window);
    }
    let report: AnalyzeReport = rpc_client::call(&ctx.rpc, "analyze", params).await?;
    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => println!("{}", format_report(&report, cmd.limit)),
    }
    Ok(())
}
