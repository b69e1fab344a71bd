// crates/stylescope-rpc/src/server.rs
//
// RPC server setup: StyleScopeRpcServer and RpcConfig.
//
// A single tonic service accepts HTTP/1 POST bodies holding a JSON envelope
// with a method field, dispatches to the matching handler, and returns a JSON
// envelope. No proto codegen is involved; tonic supplies transport and
// interceptors.

use std::sync::Arc;
use std::time::Instant;

use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tonic::transport::Server;
use tonic::Status;

use stylescope_core::{ChunkSize, TrajectoryPipeline, MOCK_MODEL};

use crate::handlers::{self, HandlerError};
use crate::middleware;

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Values filled into embed and shuffle params the client left out.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDefaults {
    pub model: String,
    pub chunk_size: ChunkSize,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            model: MOCK_MODEL.to_string(),
            chunk_size: ChunkSize::default(),
        }
    }
}

impl RequestDefaults {
    /// Insert missing or null `model` and `chunk_size` keys into an object.
    fn apply(&self, params: &mut serde_json::Value) {
        let Some(obj) = params.as_object_mut() else {
            return;
        };
        let missing = |v: Option<&serde_json::Value>| v.map_or(true, serde_json::Value::is_null);
        if missing(obj.get("model")) {
            obj.insert("model".to_string(), self.model.clone().into());
        }
        if missing(obj.get("chunk_size")) {
            obj.insert("chunk_size".to_string(), self.chunk_size.get().into());
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC Envelope
// ---------------------------------------------------------------------------

/// A JSON-RPC-style request envelope.
/// The client sends a method name and a JSON params payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// The RPC method to invoke (e.g., "embed", "node/health").
    pub method: String,
    /// JSON-encoded parameters for the method.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// A JSON-RPC-style response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// The result data (if success).
    pub result: Option<serde_json::Value>,
    /// Error message (if not success).
    pub error: Option<String>,
    /// "validation", "model" or "internal" (if not success).
    pub error_kind: Option<String>,
}

impl JsonRpcResponse {
    fn ok(value: serde_json::Value) -> Self {
        Self {
            success: true,
            result: Some(value),
            error: None,
            error_kind: None,
        }
    }

    fn err(err: HandlerError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(err.message),
            error_kind: Some(err.kind.as_str().to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// StyleScopeRpcServer
// ---------------------------------------------------------------------------

/// The main RPC server for StyleScope.
///
/// Holds the shared pipeline (and through it the embedder cache) and exposes
/// it over a tonic server with JSON-RPC dispatching.
#[derive(Clone)]
pub struct StyleScopeRpcServer {
    config: RpcConfig,
    service: StyleScopeServiceImpl,
}

impl std::fmt::Debug for StyleScopeRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleScopeRpcServer")
            .field("config", &self.config)
            .field("defaults", &self.service.defaults)
            .finish()
    }
}

impl StyleScopeRpcServer {
    /// Create a new server over a shared pipeline.
    pub fn new(config: RpcConfig, pipeline: Arc<TrajectoryPipeline>) -> Self {
        Self {
            config,
            service: StyleScopeServiceImpl {
                pipeline,
                defaults: RequestDefaults::default(),
                start_time: Instant::now(),
            },
        }
    }

    /// Set the model and chunk size used when a request omits them.
    pub fn with_defaults(mut self, defaults: RequestDefaults) -> Self {
        self.service.defaults = defaults;
        self
    }

    /// Set the daemon start time for uptime calculation.
    pub fn with_start_time(mut self, st: Instant) -> Self {
        self.service.start_time = st;
        self
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Dispatch one request without going through the transport.
    pub async fn handle(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        self.service.dispatch(request).await
    }

    /// The HTTP service the transport serves.
    pub fn json_rpc_service(&self) -> StyleScopeJsonRpcServer {
        StyleScopeJsonRpcServer::new(self.service.clone())
    }

    /// Start the RPC server and listen for requests.
    ///
    /// This binds to the configured address and serves requests until
    /// the process is terminated.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        tracing::info!("StyleScope RPC server starting on {}", addr);

        Server::builder()
            .accept_http1(true)
            .add_service(tonic::service::interceptor::InterceptedService::new(
                self.json_rpc_service(),
                middleware::logging_interceptor,
            ))
            .serve(addr)
            .await?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// The internal service implementation that holds shared state
/// and dispatches JSON-RPC calls to the appropriate handler.
#[derive(Clone)]
struct StyleScopeServiceImpl {
    pipeline: Arc<TrajectoryPipeline>,
    defaults: RequestDefaults,
    start_time: Instant,
}

impl StyleScopeServiceImpl {
    /// Dispatch a JSON-RPC request to the appropriate handler based on the method name.
    async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let started = Instant::now();
        let JsonRpcRequest { method, mut params } = request;

        let result = match method.as_str() {
            "embed" => {
                self.defaults.apply(&mut params);
                dispatch_handler(params, |r| {
                    handlers::embed::handle_embed(self.pipeline.clone(), r)
                })
                .await
            }
            "shuffle" => {
                self.defaults.apply(&mut params);
                dispatch_handler(params, |r| {
                    handlers::shuffle::handle_shuffle(self.pipeline.clone(), r)
                })
                .await
            }
            "shuffle/text" => {
                dispatch_handler(params, handlers::shuffle::handle_shuffle_text).await
            }
            "probe" => dispatch_handler(params, handlers::probe::handle_probe).await,
            "analyze" => dispatch_handler(params, handlers::analyze::handle_analyze).await,
            "presets" => {
                dispatch_handler(empty_as_object(params), handlers::presets::handle_presets).await
            }
            "node/health" => {
                dispatch_handler(empty_as_object(params), |r| async move {
                    handlers::node::handle_get_health(r, self.pipeline.cache(), self.start_time)
                        .await
                })
                .await
            }

            _ => Err(HandlerError::validation(format!("Unknown method: {}", method))),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(value) => {
                tracing::debug!(method = %method, elapsed_ms, "RPC handled");
                JsonRpcResponse::ok(value)
            }
            Err(err) => {
                tracing::debug!(
                    method = %method,
                    elapsed_ms,
                    kind = err.kind.as_str(),
                    error = %err.message,
                    "RPC failed"
                );
                JsonRpcResponse::err(err)
            }
        }
    }
}

/// Treat absent params as `{}` for methods whose fields are all optional.
fn empty_as_object(params: serde_json::Value) -> serde_json::Value {
    if params.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        params
    }
}

/// Generic dispatch helper: deserialize params into a request type,
/// call the handler, and serialize the result to JSON.
async fn dispatch_handler<Req, Resp, F, Fut>(
    params: serde_json::Value,
    handler: F,
) -> Result<serde_json::Value, HandlerError>
where
    Req: serde::de::DeserializeOwned,
    Resp: serde::Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: std::future::Future<Output = Result<Resp, HandlerError>>,
{
    let request: Req = serde_json::from_value(params)
        .map_err(|e| HandlerError::validation(format!("Failed to deserialize request: {}", e)))?;
    let response = handler(request).await?;
    serde_json::to_value(response)
        .map_err(|e| HandlerError::internal(format!("Failed to serialize response: {}", e)))
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------
// One service, one route: the request and response bodies are raw JSON
// envelopes.

/// The tonic service wrapper. Accepts a JSON body, dispatches it, and
/// writes the JSON envelope back.
#[derive(Clone)]
pub struct StyleScopeJsonRpcServer {
    inner: StyleScopeServiceImpl,
}

impl std::fmt::Debug for StyleScopeJsonRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleScopeJsonRpcServer").finish()
    }
}

impl StyleScopeJsonRpcServer {
    fn new(inner: StyleScopeServiceImpl) -> Self {
        Self { inner }
    }
}

impl tonic::server::NamedService for StyleScopeJsonRpcServer {
    const NAME: &'static str = "stylescope.rpc.StyleScopeService";
}

impl<B> tower_service::Service<http::Request<B>> for StyleScopeJsonRpcServer
where
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    B::Data: Send,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let body_bytes = match collect_body(req.into_body()).await {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("Failed to read request body: {}", e);
                    let resp = JsonRpcResponse::err(HandlerError::validation(format!(
                        "Failed to read request body: {}",
                        e
                    )));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
                Ok(r) => r,
                Err(e) => {
                    let resp = JsonRpcResponse::err(HandlerError::validation(format!(
                        "Invalid JSON-RPC request: {}",
                        e
                    )));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_response = inner.dispatch(rpc_request).await;
            Ok(build_response(&rpc_response))
        })
    }
}

/// Collect the body of an HTTP request into bytes.
async fn collect_body<B>(body: B) -> Result<Vec<u8>, String>
where
    B: HttpBody + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    B::Data: Send,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    loop {
        match std::future::poll_fn(|cx| HttpBody::poll_frame(body.as_mut(), cx)).await {
            Some(Ok(frame)) => {
                if let Ok(data) = frame.into_data() {
                    use bytes::Buf;
                    collected.extend_from_slice(data.chunk());
                }
            }
            Some(Err(e)) => return Err(e.into().to_string()),
            None => break,
        }
    }

    Ok(collected)
}

/// Build an HTTP response carrying the JSON envelope.
fn build_response(envelope: &JsonRpcResponse) -> http::Response<tonic::body::BoxBody> {
    let json = serde_json::to_vec(envelope).unwrap_or_default();
    let body = tonic::body::BoxBody::new(
        http_body_util::Full::new(bytes::Bytes::from(json))
            .map_err(|e| Status::internal(format!("body error: {}", e))),
    );

    let mut response = http::Response::new(body);
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn server() -> StyleScopeRpcServer {
        StyleScopeRpcServer::new(RpcConfig::default(), Arc::new(TrajectoryPipeline::default()))
    }

    fn call(method: &str, params: serde_json::Value) -> JsonRpcRequest {
        JsonRpcRequest {
            method: method.to_string(),
            params,
        }
    }

    #[test]
    fn test_defaults_fill_missing_and_null_keys() {
        let defaults = RequestDefaults {
            model: "custom".to_string(),
            chunk_size: ChunkSize::new(8).unwrap(),
        };
        let mut params = json!({"text": "x", "model": null});
        defaults.apply(&mut params);
        assert_eq!(params["model"], "custom");
        assert_eq!(params["chunk_size"], 8);

        let mut explicit = json!({"text": "x", "model": "mock", "chunk_size": 4});
        defaults.apply(&mut explicit);
        assert_eq!(explicit["chunk_size"], 4);
    }

    #[tokio::test]
    async fn test_unknown_method_is_validation_error() {
        let resp = server().handle(call("embed/batch", json!({}))).await;
        assert!(!resp.success);
        assert_eq!(resp.error_kind.as_deref(), Some("validation"));
    }

    #[tokio::test]
    async fn test_bad_chunk_size_is_validation_error() {
        let resp = server()
            .handle(call("embed", json!({"text": "a b", "chunk_size": 0})))
            .await;
        assert!(!resp.success);
        assert_eq!(resp.error_kind.as_deref(), Some("validation"));
    }

    #[tokio::test]
    async fn test_embed_uses_server_defaults() {
        let server = server().with_defaults(RequestDefaults {
            model: "mock".to_string(),
            chunk_size: ChunkSize::new(3).unwrap(),
        });
        let resp = server.handle(call("embed", json!({"text": "a b c d"}))).await;
        assert!(resp.success, "{:?}", resp.error);
        let result = resp.result.unwrap();
        assert_eq!(result["chunk_size"], 3);
        assert_eq!(result["coords2d"].as_array().unwrap().len(), 24);
    }

    #[tokio::test]
    async fn test_analyze_rejects_blank_text() {
        let resp = server().handle(call("analyze", json!({"text": " \n "}))).await;
        assert!(!resp.success);
        assert_eq!(resp.error_kind.as_deref(), Some("validation"));
    }

    #[tokio::test]
    async fn test_health_lists_cached_models() {
        let server = server();
        server.handle(call("embed", json!({"text": "warm up"}))).await;
        let resp = server.handle(call("node/health", serde_json::Value::Null)).await;
        let result = resp.result.unwrap();
        assert_eq!(result["ok"], true);
        assert_eq!(result["cached_models"], json!(["mock"]));
    }
}
