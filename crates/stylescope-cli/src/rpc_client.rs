// crates/stylescope-cli/src/rpc_client.rs
//
// Lightweight JSON-RPC client that POSTs to the stylescope-daemon endpoint.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mirrors the server's JsonRpcRequest envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub method: String,
    pub params: serde_json::Value,
}

/// Mirrors the server's JsonRpcResponse envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub success: bool,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    #[serde(default)]
    pub error_kind: Option<String>,
}

/// A call that reached the daemon but did not succeed.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("{kind} error from daemon: {message}")]
    Failed { kind: String, message: String },

    #[error("daemon reported success without a result")]
    MissingResult,
}

impl JsonRpcResponse {
    /// Unwrap the envelope into its typed result.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, Box<dyn std::error::Error>> {
        if !self.success {
            return Err(RpcError::Failed {
                kind: self.error_kind.unwrap_or_else(|| "unknown".to_string()),
                message: self.error.unwrap_or_default(),
            }
            .into());
        }
        let value = self.result.ok_or(RpcError::MissingResult)?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Send a JSON-RPC call to the daemon and return the parsed response.
pub async fn rpc_call(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<JsonRpcResponse, Box<dyn std::error::Error>> {
    let request = JsonRpcRequest {
        method: method.to_string(),
        params,
    };

    let client = reqwest::Client::new();
    let resp = client
        .post(endpoint)
        .json(&request)
        .send()
        .await?;

    let rpc_response: JsonRpcResponse = resp.json().await?;
    Ok(rpc_response)
}

/// `rpc_call` followed by `into_result`.
pub async fn call<T: DeserializeOwned>(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<T, Box<dyn std::error::Error>> {
    rpc_call(endpoint, method, params).await?.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failed_envelope_carries_kind() {
        let resp: JsonRpcResponse = serde_json::from_value(json!({
            "success": false,
            "result": null,
            "error": "Validation error: chunk_size must be positive",
            "error_kind": "validation"
        }))
        .unwrap();
        let err = resp.into_result::<serde_json::Value>().unwrap_err();
        assert!(err.to_string().starts_with("validation error from daemon"));
    }

    #[test]
    fn test_success_envelope_decodes_result() {
        let resp: JsonRpcResponse = serde_json::from_value(json!({
            "success": true,
            "result": {"text": "b a"},
            "error": null
        }))
        .unwrap();
        let value: serde_json::Value = resp.into_result().unwrap();
        assert_eq!(value["text"], "b a");
    }
}
