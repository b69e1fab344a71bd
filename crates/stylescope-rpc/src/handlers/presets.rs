// crates/stylescope-rpc/src/handlers/presets.rs
//
// Presets handler: the compiled-in example texts.

use serde::{Deserialize, Serialize};
use stylescope_core::presets::{self, PresetSelection};

use super::HandlerError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetsRequest {
    /// "authors" or "bilingual_pairs"; absent returns everything.
    #[serde(default)]
    pub category: Option<String>,
}

pub async fn handle_presets(request: PresetsRequest) -> Result<PresetSelection, HandlerError> {
    Ok(presets::select(request.category.as_deref())?)
}
