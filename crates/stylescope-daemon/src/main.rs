// crates/stylescope-daemon/src/main.rs
//
// Binary entrypoint for the StyleScope daemon.
//
// Loads configuration, initializes tracing, builds the shared embedder cache
// and trajectory pipeline, preloads configured models, and serves JSON-RPC
// until interrupted.

mod config;

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use config::DaemonConfig;

use stylescope_core::{ChunkSize, EmbedderCache, EmbedderOptions, Projector, TrajectoryPipeline};
use stylescope_rpc::{RequestDefaults, RpcConfig, StyleScopeRpcServer};

/// StyleScope daemon: serves layer-trajectory embedding over JSON-RPC.
#[derive(Parser, Debug)]
#[command(name = "stylescope-daemon", version, about = "StyleScope trajectory service")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.stylescope/config.toml")]
    config: String,

    /// RPC host; overrides the config file.
    #[arg(long)]
    host: Option<String>,

    /// RPC port; overrides the config file.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let args = Args::parse();

    // Configuration is read before tracing starts so its log level applies;
    // the outcome is logged once the subscriber is up.
    let loaded = DaemonConfig::load(&args.config);
    let log_level = loaded
        .as_ref()
        .map(|cfg| cfg.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    let mut daemon_config = match loaded {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", args.config);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                args.config,
                e
            );
            DaemonConfig::default()
        }
    };

    // CLI flags override the config file.
    if let Some(host) = args.host {
        daemon_config.rpc_host = host;
    }
    if let Some(port) = args.port {
        daemon_config.rpc_port = port;
    }

    let defaults = RequestDefaults {
        model: daemon_config.default_model.clone(),
        chunk_size: ChunkSize::new(daemon_config.default_chunk_size)?,
    };

    tracing::info!("StyleScope Daemon v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );
    tracing::info!("Models directory: {}", daemon_config.models_path().display());
    tracing::info!(
        "Request defaults: model={} chunk_size={}",
        defaults.model,
        defaults.chunk_size.get()
    );

    // ---------------------------------------------------------------
    // Shared embedder cache and pipeline.
    // ---------------------------------------------------------------
    let cache = Arc::new(EmbedderCache::new(EmbedderOptions {
        models_dir: Some(daemon_config.models_path()),
    }));
    let projector = Projector::new();
    if !projector.neighborhood_available() {
        tracing::warn!("Neighborhood projection not compiled in; requests will use linear");
    }

    if !daemon_config.preload_models.is_empty() {
        let preload_cache = cache.clone();
        let models = daemon_config.preload_models.clone();
        tokio::task::spawn_blocking(move || preload_cache.preload(&models)).await??;
        tracing::info!("Preloaded models: {:?}", cache.model_ids());
    }

    let pipeline = Arc::new(TrajectoryPipeline::new(cache, projector));

    let rpc_config = RpcConfig {
        host: daemon_config.rpc_host.clone(),
        port: daemon_config.rpc_port,
    };
    let rpc_server = StyleScopeRpcServer::new(rpc_config, pipeline)
        .with_defaults(defaults)
        .with_start_time(start_time);

    tokio::select! {
        result = rpc_server.start() => {
            if let Err(e) = result {
                tracing::error!("RPC server error: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal");
        }
    }

    tracing::info!("StyleScope daemon shut down gracefully");
    Ok(())
}
