use crate::constants::DEFAULT_REDIRECT_URL;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// The remote configuration document: which assets to load and in what order.
///
/// Only `cdn` is required. Every asset path is relative and gets prefixed with
/// `cdn` verbatim (no separator is inserted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderConfig {
    pub cdn: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fonts: Vec<FontSpec>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub styles: Vec<String>,
    /// Block names in display order. A name missing from `blocks` is skipped with a warning.
    #[serde(default, deserialize_with = "null_as_default")]
    pub layout: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blocks: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scripts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

impl LoaderConfig {
    #[must_use]
    pub fn new(cdn: impl Into<String>) -> Self {
        Self {
            cdn: cdn.into(),
            fonts: Vec::new(),
            styles: Vec::new(),
            layout: Vec::new(),
            blocks: BTreeMap::new(),
            scripts: Vec::new(),
            redirect_url: None,
        }
    }

    /// Absolute URL of an asset path.
    #[must_use]
    pub fn asset_url(&self, path: &str) -> String {
        format!("{}{path}", self.cdn)
    }

    /// Relative path of a layout entry, `None` when the layout names an unknown block.
    #[must_use]
    pub fn block_path(&self, name: &str) -> Option<&str> {
        self.blocks.get(name).map(String::as_str).filter(|path| !path.is_empty())
    }

    #[must_use]
    pub fn redirect_url(&self) -> &str {
        self.redirect_url.as_deref().filter(|url| !url.is_empty()).unwrap_or(DEFAULT_REDIRECT_URL)
    }
}

/// An explicit `null` reads the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A font face declared by the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSpec {
    pub name: String,
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl FontSpec {
    #[must_use]
    pub fn weight(&self) -> &str {
        self.weight.as_deref().filter(|w| !w.is_empty()).unwrap_or("normal")
    }

    #[must_use]
    pub fn style(&self) -> &str {
        self.style.as_deref().filter(|s| !s.is_empty()).unwrap_or("normal")
    }
}
