// crates/stylescope-rpc/src/handlers/analyze.rs
//
// Analyze handler: parenthetical-span statistics for one text.

use stylescope_core::{AnalyzeReport, AnalyzeRequest};

use super::HandlerError;

/// Handle an Analyze request. Long texts are scanned on the blocking pool.
pub async fn handle_analyze(request: AnalyzeRequest) -> Result<AnalyzeReport, HandlerError> {
    let report = tokio::task::spawn_blocking(move || request.run()).await??;
    Ok(report)
}
