// crates/stylescope-core/src/presets.rs
//
// Compiled-in catalog of example texts for demos.

use std::borrow::Cow;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StyleScopeError;

/// A single-author excerpt.
///
/// Fields borrow for the compiled-in catalog and own when read back from the
/// wire, so one schema serves both the daemon and its clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorPreset {
    pub id: Cow<'static, str>,
    pub name: Cow<'static, str>,
    pub text: Cow<'static, str>,
    pub lang: Cow<'static, str>,
}

/// The same passage in two languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualPair {
    pub id: Cow<'static, str>,
    pub lang1: Cow<'static, str>,
    pub text1: Cow<'static, str>,
    pub lang2: Cow<'static, str>,
    pub text2: Cow<'static, str>,
}

pub static AUTHORS: &[AuthorPreset] = &[
    AuthorPreset {
        id: Cow::Borrowed("woolf"),
        name: Cow::Borrowed("Virginia Woolf"),
        text: Cow::Borrowed(
            "Mrs Dalloway said she would buy the flowers herself. For Lucy had her work cut out for her...",
        ),
        lang: Cow::Borrowed("en"),
    },
    AuthorPreset {
        id: Cow::Borrowed("eliot"),
        name: Cow::Borrowed("T.S. Eliot"),
        text: Cow::Borrowed(
            "Let us go then, you and I, When the evening is spread out against the sky...",
        ),
        lang: Cow::Borrowed("en"),
    },
];

pub static BILINGUAL_PAIRS: &[BilingualPair] = &[BilingualPair {
    id: Cow::Borrowed("flaubert"),
    lang1: Cow::Borrowed("fr"),
    text1: Cow::Borrowed("Elle se rappelait la lecture de son roman préféré..."),
    lang2: Cow::Borrowed("en"),
    text2: Cow::Borrowed("She remembered reading her favorite novel..."),
}];

/// The whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetCatalog {
    #[serde(default)]
    pub authors: Cow<'static, [AuthorPreset]>,
    #[serde(default)]
    pub bilingual_pairs: Cow<'static, [BilingualPair]>,
}

pub fn catalog() -> PresetCatalog {
    PresetCatalog {
        authors: Cow::Borrowed(AUTHORS),
        bilingual_pairs: Cow::Borrowed(BILINGUAL_PAIRS),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetCategory {
    Authors,
    BilingualPairs,
}

impl FromStr for PresetCategory {
    type Err = StyleScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authors" => Ok(PresetCategory::Authors),
            "bilingual_pairs" => Ok(PresetCategory::BilingualPairs),
            other => Err(StyleScopeError::Validation(format!(
                "unknown preset category '{}'; expected 'authors' or 'bilingual_pairs'",
                other
            ))),
        }
    }
}

/// Either the full catalog or one category of it.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PresetSelection {
    All(PresetCatalog),
    Authors(&'static [AuthorPreset]),
    BilingualPairs(&'static [BilingualPair]),
}

/// Look up presets, optionally narrowed to one category.
pub fn select(category: Option<&str>) -> Result<PresetSelection, StyleScopeError> {
    Ok(match category.map(str::parse::<PresetCategory>).transpose()? {
        None => PresetSelection::All(catalog()),
        Some(PresetCategory::Authors) => PresetSelection::Authors(AUTHORS),
        Some(PresetCategory::BilingualPairs) => PresetSelection::BilingualPairs(BILINGUAL_PAIRS),
    })
}

impl PresetCatalog {
    /// Read a `select` answer back into a catalog. A category query yields a
    /// bare list, which fills only that category.
    pub fn from_selection(
        category: Option<&str>,
        value: serde_json::Value,
    ) -> Result<Self, StyleScopeError> {
        Ok(match category.map(str::parse::<PresetCategory>).transpose()? {
            None => serde_json::from_value(value)?,
            Some(PresetCategory::Authors) => PresetCatalog {
                authors: Cow::Owned(serde_json::from_value(value)?),
                ..PresetCatalog::default()
            },
            Some(PresetCategory::BilingualPairs) => PresetCatalog {
                bilingual_pairs: Cow::Owned(serde_json::from_value(value)?),
                ..PresetCatalog::default()
            },
        })
    }
}
