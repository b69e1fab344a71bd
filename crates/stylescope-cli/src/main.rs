// crates/stylescope-cli/src/main.rs
//
// CLI entrypoint for StyleScope.
//
// Talks to a running stylescope-daemon over JSON-RPC: embed and shuffle
// texts, measure parenthetical asides, run linear probes, list presets, and
// check daemon status.

mod commands;
mod output;
mod rpc_client;

use clap::{Parser, Subcommand};
use commands::analyze::AnalyzeCmd;
use commands::embed::EmbedCmd;
use commands::presets::PresetsCmd;
use commands::probe::ProbeCmd;
use commands::shuffle::ShuffleCmd;
use commands::Context;
use output::OutputFormat;

/// StyleScope CLI: layer-trajectory views of text style.
#[derive(Parser, Debug)]
#[command(name = "stylescope", version, about = "StyleScope client for the trajectory daemon")]
struct Cli {
    /// RPC endpoint for the stylescope-daemon.
    #[arg(long, global = true, default_value = "http://localhost:8000")]
    rpc: String,

    /// Print raw JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Embed a text and show its per-layer 2D trajectory.
    Embed(EmbedCmd),

    /// Shuffle a text deterministically, then embed it.
    Shuffle(ShuffleCmd),

    /// Measure parenthetical density, span lengths and positions.
    Analyze(AnalyzeCmd),

    /// Run a linear-separability probe on labeled vectors.
    Probe(ProbeCmd),

    /// List example texts.
    Presets(PresetsCmd),

    /// Display daemon health, version and cached models.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let ctx = Context {
        rpc: cli.rpc.clone(),
        format: OutputFormat::from_json_flag(cli.json),
    };

    match &cli.command {
        Commands::Embed(cmd) => commands::embed::run(cmd, &ctx).await?,
        Commands::Shuffle(cmd) => commands::shuffle::run(cmd, &ctx).await?,
        Commands::Analyze(cmd) => commands::analyze::run(cmd, &ctx).await?,
        Commands::Probe(cmd) => commands::probe::run(cmd, &ctx).await?,
        Commands::Presets(cmd) => commands::presets::run(cmd, &ctx).await?,
        Commands::Status => commands::status::run(&ctx).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["stylescope", "status", "--json", "--rpc", "http://h:1"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.rpc, "http://h:1");
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_shuffle_short_block_flag() {
        let cli = Cli::try_parse_from(["stylescope", "shuffle", "a b c", "-B", "2"]).unwrap();
        match cli.command {
            Commands::Shuffle(cmd) => {
                assert_eq!(cmd.block_size, Some(2));
                assert_eq!(cmd.text.as_deref(), Some("a b c"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_analyze_options() {
        let cli = Cli::try_parse_from(["stylescope", "analyze", "a (b)", "--bins", "10"]).unwrap();
        match cli.command {
            Commands::Analyze(cmd) => {
                assert_eq!(cmd.bins, Some(10));
                assert_eq!(cmd.window, None);
                assert_eq!(cmd.limit, 20);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_probe_requires_file() {
        assert!(Cli::try_parse_from(["stylescope", "probe"]).is_err());
    }
}
