use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::NumberFailurePolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub site_title: String,
    pub site_description: String,
    pub site_domain: String,
    /// Where the chapter pages are written.
    pub output_dir: PathBuf,
    /// Label of the translation shown first (active) on each page.
    pub default_translation: Option<String>,
    pub osis_label: String,
    pub zefania_label: String,
    pub number_failure_policy: NumberFailurePolicy,
    /// Skip pages whose file already exists.
    pub only_missing: bool,
    pub api: ApiSettings,
}

impl Default for SiteSettings {
    fn default() -> Self {
        SiteSettings {
            site_title: "Liturgy Bible".to_string(),
            site_description: "The Liturgy Bible visualizes the liturgical use of the biblical text, including the Lectionary for Mass and selections from the Divine Office.".to_string(),
            site_domain: "liturgybible.org".to_string(),
            output_dir: PathBuf::from("bible"),
            default_translation: Some("DRA".to_string()),
            osis_label: "KJV".to_string(),
            zefania_label: "DRA".to_string(),
            number_failure_policy: NumberFailurePolicy::NodeLevel,
            only_missing: false,
            api: ApiSettings::default(),
        }
    }
}

impl SiteSettings {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {:?}", path))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTranslation {
    pub label: String,
    pub api_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Fixed pause after every request, successful or not.
    pub delay_ms: u64,
    pub translations: Vec<ApiTranslation>,
    pub books: Vec<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: "https://bible-api.com".to_string(),
            timeout_secs: 20,
            delay_ms: 1500,
            translations: vec![
                ApiTranslation { label: "KJV".to_string(), api_id: "kjv".to_string() },
                ApiTranslation { label: "DRA".to_string(), api_id: "dra".to_string() },
            ],
            books: vec!["Psalms".to_string(), "Proverbs".to_string()],
        }
    }
}
