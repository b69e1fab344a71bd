// crates/stylescope-rpc/src/handlers/probe.rs
//
// Probe handler: linear separability of labeled vectors.

use stylescope_probe::{ProbeReport, ProbeRequest};

use super::HandlerError;

/// Handle a Probe request. Training runs on the blocking pool.
pub async fn handle_probe(request: ProbeRequest) -> Result<ProbeReport, HandlerError> {
    let report = tokio::task::spawn_blocking(move || request.run()).await??;
    Ok(report)
}
