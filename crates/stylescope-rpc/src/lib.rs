// crates/stylescope-rpc/src/lib.rs
//
// stylescope-rpc: JSON-RPC server and handlers for StyleScope.
//
// A tonic server accepting HTTP/1 carries JSON envelopes
// `{ method, params }` -> `{ success, result, error, error_kind }` for the
// embed, shuffle, probe, presets and health endpoints.

pub mod handlers;
pub mod middleware;
pub mod server;

// Re-export the main server type for ergonomic access.
pub use server::{JsonRpcRequest, JsonRpcResponse, RequestDefaults, RpcConfig, StyleScopeRpcServer};
