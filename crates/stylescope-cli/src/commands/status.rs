// crates/stylescope-cli/src/commands/status.rs
//
// `stylescope status` — daemon health, version and cached models.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Context;
use crate::output::{format_json, OutputFormat};
use crate::rpc_client;

#[derive(Debug, Serialize, Deserialize)]
struct Health {
    ok: bool,
    service: String,
    version: String,
    cached_models: Vec<String>,
    uptime_secs: u64,
}

/// Run the status command.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let health: Health = rpc_client::call(&ctx.rpc, "node/health", json!({})).await?;

    if ctx.format == OutputFormat::Json {
        println!("{}", format_json(&health));
        return Ok(());
    }

    let models = if health.cached_models.is_empty() {
        "(none loaded)".to_string()
    } else {
        health.cached_models.join(", ")
    };
    println!("{} v{}", health.service, health.version);
    println!();
    println!("Daemon Status");
    println!("-------------");
    println!("  Healthy:       {}", health.ok);
    println!("  RPC endpoint:  {}", ctx.rpc);
    println!("  Uptime:        {}s", health.uptime_secs);
    println!("  Cached models: {}", models);

    Ok(())
}
