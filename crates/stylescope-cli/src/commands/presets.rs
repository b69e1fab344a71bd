// crates/stylescope-cli/src/commands/presets.rs
//
// `stylescope presets` — list the daemon's example texts.

use clap::Args;
use serde_json::json;
use stylescope_core::presets::PresetCatalog;
use tabled::Tabled;

use super::Context;
use crate::output::{format_json, format_table, truncate, OutputFormat};
use crate::rpc_client;

const PREVIEW_CHARS: usize = 48;

#[derive(Debug, Args)]
pub struct PresetsCmd {
    /// Only this category: "authors" or "bilingual_pairs".
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Tabled)]
struct AuthorRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Lang")]
    lang: String,
    #[tabled(rename = "Text")]
    text: String,
}

#[derive(Tabled)]
struct PairRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Langs")]
    langs: String,
    #[tabled(rename = "Text 1")]
    text1: String,
    #[tabled(rename = "Text 2")]
    text2: String,
}

/// Run the presets command.
pub async fn run(cmd: &PresetsCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let value: serde_json::Value =
        rpc_client::call(&ctx.rpc, "presets", json!({ "category": cmd.category })).await?;

    if ctx.format == OutputFormat::Json {
        println!("{}", format_json(&value));
        return Ok(());
    }

    let catalog = PresetCatalog::from_selection(cmd.category.as_deref(), value)?;
    if !catalog.authors.is_empty() {
        let rows: Vec<AuthorRow> = catalog
            .authors
            .iter()
            .map(|a| AuthorRow {
                id: a.id.to_string(),
                name: a.name.to_string(),
                lang: a.lang.to_string(),
                text: truncate(&a.text, PREVIEW_CHARS),
            })
            .collect();
        println!("Authors");
        println!("{}", format_table(&rows));
    }
    if !catalog.bilingual_pairs.is_empty() {
        let rows: Vec<PairRow> = catalog
            .bilingual_pairs
            .iter()
            .map(|p| PairRow {
                id: p.id.to_string(),
                langs: format!("{}/{}", p.lang1, p.lang2),
                text1: truncate(&p.text1, PREVIEW_CHARS),
                text2: truncate(&p.text2, PREVIEW_CHARS),
            })
            .collect();
        println!("Bilingual pairs");
        println!("{}", format_table(&rows));
    }
    Ok(())
}
