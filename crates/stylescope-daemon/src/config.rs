// crates/stylescope-daemon/src/config.rs
//
// Runtime configuration for the StyleScope daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Host address for the RPC server.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// Port for the RPC server.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG`, when set, takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory searched for real model directories by id.
    #[serde(default = "default_models_dir")]
    pub models_dir: String,

    /// Model used when a request names none.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Chunk size used when a request gives none.
    #[serde(default = "default_chunk_size")]
    pub default_chunk_size: i64,

    /// Models constructed at startup, before the server accepts requests.
    #[serde(default)]
    pub preload_models: Vec<String>,
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_models_dir() -> String {
    "~/.stylescope/models".to_string()
}

fn default_model() -> String {
    stylescope_core::MOCK_MODEL.to_string()
}

fn default_chunk_size() -> i64 {
    32
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            log_level: default_log_level(),
            models_dir: default_models_dir(),
            default_model: default_model(),
            default_chunk_size: default_chunk_size(),
            preload_models: Vec::new(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(expand_tilde(path))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: DaemonConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// `models_dir` with a leading `~` expanded.
    pub fn models_path(&self) -> PathBuf {
        PathBuf::from(expand_tilde(&self.models_dir))
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).display().to_string();
        }
    }
    path.to_string()
}
