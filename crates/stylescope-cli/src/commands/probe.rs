// crates/stylescope-cli/src/commands/probe.rs
//
// `stylescope probe --file data.json` — linear separability of labeled vectors.

use std::path::PathBuf;

use clap::Args;
use stylescope_probe::{ProbeReport, ProbeRequest};

use super::Context;
use crate::output::{format_confusion, format_json, OutputFormat};
use crate::rpc_client;

/// Train and evaluate a linear probe on the daemon.
#[derive(Debug, Args)]
pub struct ProbeCmd {
    /// JSON file of the form {"X": [[...], ...], "y": [...]}.
    #[arg(long)]
    pub file: PathBuf,
}

/// Run the probe command.
pub async fn run(cmd: &ProbeCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(&cmd.file)?;
    // Parse locally so a malformed file fails before the network call.
    let request: ProbeRequest = serde_json::from_str(&contents)?;
    let samples = request.x.len();

    let report: ProbeReport =
        rpc_client::call(&ctx.rpc, "probe", serde_json::to_value(&request)?).await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => {
            println!("Samples:  {}", samples);
            println!("Accuracy: {:.3}", report.acc);
            println!();
            println!("{}", format_confusion(&report.labels, &report.cm));
        }
    }
    Ok(())
}
