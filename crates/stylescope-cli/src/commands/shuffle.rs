// crates/stylescope-cli/src/commands/shuffle.rs
//
// `stylescope shuffle` — deterministically shuffle a text, then embed it.

use std::path::PathBuf;

use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::json;
use stylescope_core::EmbedResponse;

use super::embed::{embed_params, print_response};
use super::{read_text, Context};
use crate::output::{format_json, OutputFormat};
use crate::rpc_client;

/// Shuffle a text (whole tokens or blocks) and embed the result.
#[derive(Debug, Args)]
pub struct ShuffleCmd {
    /// Text to shuffle.
    #[arg()]
    pub text: Option<String>,

    /// Read the text from a file instead.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Permute blocks of this many tokens, keeping each block intact.
    #[arg(long, short = 'B')]
    pub block_size: Option<i64>,

    /// Print the shuffled text only; skip embedding.
    #[arg(long)]
    pub text_only: bool,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub chunk_size: Option<i64>,

    #[arg(long, default_value = "pca")]
    pub method: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ShuffledText {
    text: String,
}

/// Run the shuffle command.
pub async fn run(cmd: &ShuffleCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_text(cmd.text.as_deref(), cmd.file.as_ref())?;

    if cmd.text_only {
        let params = json!({ "text": text, "block_size": cmd.block_size });
        let shuffled: ShuffledText = rpc_client::call(&ctx.rpc, "shuffle/text", params).await?;
        match ctx.format {
            OutputFormat::Json => println!("{}", format_json(&shuffled)),
            OutputFormat::Table => println!("{}", shuffled.text),
        }
        return Ok(());
    }

    let mut params = embed_params(text, cmd.model.as_deref(), cmd.chunk_size, &cmd.method);
    params["block_size"] = json!(cmd.block_size);
    let resp: EmbedResponse = rpc_client::call(&ctx.rpc, "shuffle", params).await?;
    print_response(&resp, ctx.format);
    Ok(())
}
