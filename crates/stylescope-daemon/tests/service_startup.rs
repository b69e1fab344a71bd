// crates/stylescope-daemon/tests/service_startup.rs
//
// Startup-path tests for the daemon: cache preload, request defaults, and
// health reporting, wired the way main does it.
//
// The daemon is a binary crate with no lib.rs, so these tests assemble the
// same pieces from stylescope-core and stylescope-rpc directly.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use stylescope_core::{ChunkSize, EmbedderCache, EmbedderOptions, Projector, TrajectoryPipeline};
use stylescope_rpc::{JsonRpcRequest, RequestDefaults, RpcConfig, StyleScopeRpcServer};

fn request(method: &str, params: serde_json::Value) -> JsonRpcRequest {
    JsonRpcRequest {
        method: method.to_string(),
        params,
    }
}

fn daemon_server(preload: &[&str], defaults: RequestDefaults) -> StyleScopeRpcServer {
    let cache = Arc::new(EmbedderCache::new(EmbedderOptions::default()));
    cache.preload(preload).unwrap();
    let pipeline = Arc::new(TrajectoryPipeline::new(cache, Projector::new()));
    StyleScopeRpcServer::new(RpcConfig::default(), pipeline)
        .with_defaults(defaults)
        .with_start_time(Instant::now())
}

#[tokio::test]
async fn test_preloaded_models_show_in_health() {
    let server = daemon_server(&["mock"], RequestDefaults::default());
    let resp = server.handle(request("node/health", json!({}))).await;
    assert!(resp.success);
    let result = resp.result.unwrap();
    assert_eq!(result["cached_models"], json!(["mock"]));
    assert_eq!(result["service"], "StyleScope backend");
}

#[tokio::test]
async fn test_configured_chunk_size_applies_to_requests() {
    let server = daemon_server(
        &[],
        RequestDefaults {
            model: "mock".to_string(),
            chunk_size: ChunkSize::new(16).unwrap(),
        },
    );
    let resp = server
        .handle(request("embed", json!({ "text": "so it goes" })))
        .await;
    assert!(resp.success);
    assert_eq!(resp.result.unwrap()["chunk_size"], 16);
}

#[tokio::test]
async fn test_default_rpc_config_matches_service_port() {
    let server = daemon_server(&[], RequestDefaults::default());
    assert_eq!(server.config().port, 8000);
    assert_eq!(server.config().host, "127.0.0.1");
}
