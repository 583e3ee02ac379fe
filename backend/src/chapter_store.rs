//! Per-chapter lookup across translations.
//!
//! Each translation is looked up with its own book id alias. A translation
//! that lacks the book or the chapter simply doesn't contribute.

use crate::book_registry::BookEntry;
use crate::types::{BibleData, Chapter, SourceFormat};

/// One translation's extracted text, labelled for display ("DRA", "KJV").
#[derive(Debug, Clone)]
pub struct TranslationSource {
    pub label: String,
    pub format: SourceFormat,
    pub data: BibleData,
}

impl TranslationSource {
    pub fn new(label: &str, format: SourceFormat, data: BibleData) -> Self {
        TranslationSource {
            label: label.to_string(),
            format,
            data,
        }
    }

    pub fn chapter(&self, book: &BookEntry, chapter: u32) -> Option<&Chapter> {
        let book_id = book.id_for(self.format)?;
        self.data.chapter(book_id, chapter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterTranslation<'a> {
    pub label: &'a str,
    pub chapter: &'a Chapter,
}

/// The chapter maps present for one registry book and chapter, in source
/// order. Empty when no translation has the chapter.
pub fn chapter_translations<'a>(
    sources: &'a [TranslationSource],
    book: &BookEntry,
    chapter: u32,
) -> Vec<ChapterTranslation<'a>> {
    sources
        .iter()
        .filter_map(|source| {
            source.chapter(book, chapter).map(|c| ChapterTranslation {
                label: &source.label,
                chapter: c,
            })
        })
        .collect()
}
