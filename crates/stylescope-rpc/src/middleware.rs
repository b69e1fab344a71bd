// crates/stylescope-rpc/src/middleware.rs
//
// Middleware for the RPC server: request logging interceptor.

use tonic::{Request, Status};

/// Logging interceptor for incoming requests.
///
/// Logs the client agent and body size from the request metadata. The method
/// name lives in the body and is logged by dispatch.
pub fn logging_interceptor(req: Request<()>) -> Result<Request<()>, Status> {
    let meta = req.metadata();
    let agent = meta
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    let length = meta
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info!(agent, length, remote = ?req.remote_addr(), "Incoming RPC request");
    Ok(req)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interceptor_passes_request_through() {
        let mut req = Request::new(());
        req.metadata_mut()
            .insert("user-agent", "stylescope-cli".parse().unwrap());
        assert!(logging_interceptor(req).is_ok());
    }
}
