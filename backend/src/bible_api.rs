//! Chapter text from bible-api.com.
//!
//! Every request is followed by the same fixed pause, whatever its outcome.
//! A failed request leaves only that translation's chapter empty.

use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::book_registry::BookEntry;
use crate::logger;
use crate::site_settings::{ApiSettings, ApiTranslation};
use crate::types::Chapter;

#[derive(Debug, Deserialize)]
struct ApiVerse {
    verse: u32,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiChapter {
    verses: Vec<ApiVerse>,
}

/// Decode a bible-api.com response body into a chapter.
pub fn chapter_from_api_json(body: &str) -> Result<Chapter> {
    let api_chapter: ApiChapter = serde_json::from_str(body)
        .map_err(|e| anyhow!("Failed to parse chapter response: {}", e))?;

    Ok(api_chapter
        .verses
        .into_iter()
        .map(|v| (v.verse, v.text.replace('\n', " ")))
        .collect())
}

pub fn chapter_url(base_url: &str, book: &BookEntry, chapter: u32, api_id: &str) -> String {
    format!(
        "{}/{}+{}?translation={}",
        base_url.trim_end_matches('/'),
        book.api_name().replace(' ', "%20"),
        chapter,
        api_id
    )
}

pub struct BibleApiClient {
    client: reqwest::blocking::Client,
    settings: ApiSettings,
}

impl BibleApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(BibleApiClient {
            client,
            settings: settings.clone(),
        })
    }

    fn fetch(&self, url: &str) -> Result<Chapter> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| anyhow!("Failed to fetch {}: {}", url, e))?;

        if !response.status().is_success() {
            return Err(anyhow!("Status {} from {}", response.status(), url));
        }

        let body = response
            .text()
            .map_err(|e| anyhow!("Failed to read response from {}: {}", url, e))?;

        chapter_from_api_json(&body)
    }

    /// Fetch one chapter for one translation. `None` on any failure.
    pub fn fetch_chapter(&self, book: &BookEntry, chapter: u32, translation: &ApiTranslation) -> Option<Chapter> {
        let url = chapter_url(&self.settings.base_url, book, chapter, &translation.api_id);

        let result = match self.fetch(&url) {
            Ok(c) => {
                logger::info(&format!("    -> Successfully fetched {}", translation.label));
                Some(c)
            }
            Err(e) => {
                logger::warn(&format!("    -> Error fetching {}: {}", translation.label, e));
                None
            }
        };

        thread::sleep(Duration::from_millis(self.settings.delay_ms));

        result
    }

    /// Fetch a chapter for every configured translation, labelled.
    pub fn fetch_chapter_translations(&self, book: &BookEntry, chapter: u32) -> Vec<(String, Option<Chapter>)> {
        self.settings
            .translations
            .iter()
            .map(|t| (t.label.clone(), self.fetch_chapter(book, chapter, t)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book_registry::BookRegistry;

    #[test]
    fn test_chapter_url() {
        let registry = BookRegistry::catholic();
        let song = registry.find("Song of Songs").unwrap();
        assert_eq!(
            chapter_url("https://bible-api.com/", song, 2, "kjv"),
            "https://bible-api.com/Song%20of%20Solomon+2?translation=kjv"
        );

        let psalms = registry.find("Psalms").unwrap();
        assert_eq!(
            chapter_url("https://bible-api.com", psalms, 23, "dra"),
            "https://bible-api.com/Psalm+23?translation=dra"
        );
    }

    #[test]
    fn test_chapter_from_api_json() {
        let body = r#"{
            "reference": "Psalm 23",
            "verses": [
                {"book_id": "PSA", "book_name": "Psalms", "chapter": 23, "verse": 2, "text": "He maketh me to lie down\nin green pastures.\n"},
                {"book_id": "PSA", "book_name": "Psalms", "chapter": 23, "verse": 1, "text": "The LORD is my shepherd; I shall not want.\n"}
            ],
            "translation_id": "kjv"
        }"#;

        let chapter = chapter_from_api_json(body).unwrap();
        assert_eq!(chapter.len(), 2);
        assert_eq!(chapter.verse(1), Some("The LORD is my shepherd; I shall not want."));
        assert_eq!(chapter.verse(2), Some("He maketh me to lie down in green pastures."));
    }

    #[test]
    fn test_chapter_from_api_json_rejects_error_body() {
        assert!(chapter_from_api_json(r#"{"error": "not found"}"#).is_err());
        assert!(chapter_from_api_json("<html>").is_err());
    }
}
