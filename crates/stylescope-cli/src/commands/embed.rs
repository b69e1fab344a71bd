// crates/stylescope-cli/src/commands/embed.rs
//
// `stylescope embed` — project a text's layer trajectory to 2D.

use std::path::PathBuf;

use clap::Args;
use serde_json::json;
use stylescope_core::EmbedResponse;

use super::{read_text, Context};
use crate::output::{format_json, format_trajectory, OutputFormat};
use crate::rpc_client;

/// Embed a text and print its 2D trajectory.
#[derive(Debug, Args)]
pub struct EmbedCmd {
    /// Text to embed.
    #[arg()]
    pub text: Option<String>,

    /// Read the text from a file instead.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Model id; the daemon's default when omitted.
    #[arg(long)]
    pub model: Option<String>,

    /// Tokens per chunk; the daemon's default when omitted.
    #[arg(long)]
    pub chunk_size: Option<i64>,

    /// Projection method: "pca" or "umap".
    #[arg(long, default_value = "pca")]
    pub method: String,
}

/// Params shared by `embed` and `shuffle`.
pub fn embed_params(
    text: String,
    model: Option<&str>,
    chunk_size: Option<i64>,
    method: &str,
) -> serde_json::Value {
    json!({
        "text": text,
        "model": model,
        "chunk_size": chunk_size,
        "method": method,
    })
}

/// Print an embed response in the chosen format.
pub fn print_response(resp: &EmbedResponse, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", format_json(resp)),
        OutputFormat::Table => println!("{}", format_trajectory(resp)),
    }
}

/// Run the embed command.
pub async fn run(cmd: &EmbedCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_text(cmd.text.as_deref(), cmd.file.as_ref())?;
    let params = embed_params(text, cmd.model.as_deref(), cmd.chunk_size, &cmd.method);
    let resp: EmbedResponse = rpc_client::call(&ctx.rpc, "embed", params).await?;
    print_response(&resp, ctx.format);
    Ok(())
}
