//! Writes one HTML page per chapter, from parsed XML sources or from the API.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::bible_api::BibleApiClient;
use crate::book_registry::{BookEntry, BookRegistry};
use crate::chapter_store::{chapter_translations, ChapterTranslation, TranslationSource};
use crate::helpers::chapter_file_name;
use crate::html_content::{render_chapter_page, ChapterPage};
use crate::logger;
use crate::navigation::chapter_links;
use crate::osis_parser::parse_osis_file;
use crate::site_settings::SiteSettings;
use crate::types::{Chapter, SourceFormat};
use crate::zefania_parser::{parse_zefania_file, ZefaniaParseOptions};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub pages_written: usize,
    /// Pages left alone because the file exists and only missing pages were requested.
    pub pages_existing: usize,
    /// Chapters for which no translation had any text.
    pub chapters_without_text: usize,
}

/// Parse the XML sources which were given.
///
/// A source which yields no data is left out with a warning, the site is
/// built from the others. It's an error only if nothing at all was parsed.
pub fn load_xml_sources(
    osis_path: Option<&Path>,
    zefania_path: Option<&Path>,
    settings: &SiteSettings,
) -> Result<Vec<TranslationSource>> {
    let mut sources = Vec::new();

    if let Some(path) = zefania_path {
        let options = ZefaniaParseOptions {
            number_failure_policy: settings.number_failure_policy,
        };
        let data = parse_zefania_file(path, &options);
        if data.is_empty() {
            logger::warn(&format!("No {} text from {:?}, continuing without it", settings.zefania_label, path));
        } else {
            sources.push(TranslationSource::new(&settings.zefania_label, SourceFormat::Zefania, data));
        }
    }

    if let Some(path) = osis_path {
        let data = parse_osis_file(path);
        if data.is_empty() {
            logger::warn(&format!("No {} text from {:?}, continuing without it", settings.osis_label, path));
        } else {
            sources.push(TranslationSource::new(&settings.osis_label, SourceFormat::Osis, data));
        }
    }

    if sources.is_empty() {
        anyhow::bail!("Failed to parse any of the XML sources, no text to generate pages from");
    }

    Ok(sources)
}

fn page_path(output_dir: &Path, book: &BookEntry, chapter: u32) -> PathBuf {
    output_dir.join(chapter_file_name(&book.slug(), chapter))
}

fn write_page(path: &Path, page: &ChapterPage, settings: &SiteSettings) -> Result<()> {
    let html = render_chapter_page(page, settings)?;
    fs::write(path, html).with_context(|| format!("Failed to write page: {:?}", path))
}

/// Generate pages for every registry book and chapter from parsed sources.
pub fn generate_site(
    sources: &[TranslationSource],
    registry: &BookRegistry,
    settings: &SiteSettings,
    mut on_book_done: impl FnMut(&BookEntry),
) -> Result<GenerationStats> {
    fs::create_dir_all(&settings.output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", settings.output_dir))?;

    let mut stats = GenerationStats::default();

    for (book_index, book) in registry.books().iter().enumerate() {
        logger::info(&format!("Processing book: {}", book.name));

        for chapter in 1..=book.chapters {
            let path = page_path(&settings.output_dir, book, chapter);
            if settings.only_missing && path.exists() {
                stats.pages_existing += 1;
                continue;
            }

            let translations = chapter_translations(sources, book, chapter);
            if translations.is_empty() {
                logger::debug(&format!("  - No text found for {} {}. Skipping.", book.name, chapter));
                stats.chapters_without_text += 1;
                continue;
            }

            let page = ChapterPage {
                book,
                chapter,
                translations,
                links: chapter_links(registry.books(), book_index, chapter),
            };
            write_page(&path, &page, settings)?;
            stats.pages_written += 1;
        }

        logger::info(&format!("  - Completed {} chapters for {}.", book.chapters, book.name));
        on_book_done(book);
    }

    Ok(stats)
}

/// Generate pages for the selected books with text fetched from bible-api.com.
///
/// Navigation links only run over the selected books.
pub fn generate_site_from_api(
    client: &BibleApiClient,
    registry: &BookRegistry,
    settings: &SiteSettings,
    mut on_book_done: impl FnMut(&BookEntry),
) -> Result<GenerationStats> {
    fs::create_dir_all(&settings.output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", settings.output_dir))?;

    let mut stats = GenerationStats::default();

    for (book_index, book) in registry.books().iter().enumerate() {
        logger::info(&format!("Processing book: {}", book.name));

        for chapter in 1..=book.chapters {
            let path = page_path(&settings.output_dir, book, chapter);
            if settings.only_missing && path.exists() {
                logger::info(&format!("  - Chapter {} {} already exists. Skipping.", book.name, chapter));
                stats.pages_existing += 1;
                continue;
            }

            logger::info(&format!("  - Generating {} {}...", book.name, chapter));
            let fetched: Vec<(String, Option<Chapter>)> = client.fetch_chapter_translations(book, chapter);

            let translations: Vec<ChapterTranslation> = fetched
                .iter()
                .filter_map(|(label, c)| c.as_ref().map(|c| ChapterTranslation { label, chapter: c }))
                .collect();

            if translations.is_empty() {
                logger::warn(&format!("    -> FAILED to get text for {} {}. Skipping file generation.", book.name, chapter));
                stats.chapters_without_text += 1;
                continue;
            }

            let page = ChapterPage {
                book,
                chapter,
                translations,
                links: chapter_links(registry.books(), book_index, chapter),
            };
            write_page(&path, &page, settings)?;
            stats.pages_written += 1;
        }

        on_book_done(book);
    }

    Ok(stats)
}
