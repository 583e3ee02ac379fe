//! Normalized text store shared by both XML extractors.
//!
//! Both dialects fold into the same shape: book id → chapter → verse → text.
//! Chapters expose two write policies: [`Chapter::insert_verse`] replaces
//! (last-wins, used for explicit verse elements) and
//! [`Chapter::append_fragment`] accumulates (used for marker-delimited text).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::helpers::normalize_verse_text;

/// Book identifier as used inside one source format.
/// A Zefania `bname` ("Genesis") or the first part of an OSIS id ("Gen").
pub type BookId = String;

/// Address of one verse within a single source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VerseRef {
    pub book_id: BookId,
    pub chapter: u32,
    pub verse: u32,
}

impl VerseRef {
    pub fn new(book_id: &str, chapter: u32, verse: u32) -> Self {
        VerseRef {
            book_id: book_id.to_string(),
            chapter,
            verse,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    #[serde(rename = "zefania")]
    Zefania,
    #[serde(rename = "osis")]
    Osis,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid SourceFormat value: {0}")]
pub struct ParseSourceFormatError(String);

impl FromStr for SourceFormat {
    type Err = ParseSourceFormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zefania" => Ok(SourceFormat::Zefania),
            "osis" => Ok(SourceFormat::Osis),
            _ => Err(ParseSourceFormatError(s.to_string())),
        }
    }
}

/// Verse number → verse text for one chapter of one translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chapter {
    verses: BTreeMap<u32, String>,
}

impl Chapter {
    pub fn new() -> Self {
        Chapter::default()
    }

    /// Store a verse, replacing any earlier text for the same number.
    pub fn insert_verse(&mut self, verse: u32, text: &str) {
        self.verses.insert(verse, normalize_verse_text(text));
    }

    /// Create the verse slot with empty text if it doesn't exist yet.
    /// Existing text is left untouched.
    pub fn ensure_verse(&mut self, verse: u32) {
        self.verses.entry(verse).or_default();
    }

    /// Append a text fragment to a verse, prefixed by a single space.
    /// Fragments which are empty after trimming are ignored.
    pub fn append_fragment(&mut self, verse: u32, fragment: &str) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return;
        }
        let text = self.verses.entry(verse).or_default();
        text.push(' ');
        text.push_str(fragment);
    }

    pub fn verse(&self, verse: u32) -> Option<&str> {
        self.verses.get(&verse).map(|s| s.as_str())
    }

    /// Verses in ascending numeric order.
    pub fn verses(&self) -> impl Iterator<Item = (u32, &str)> {
        self.verses.iter().map(|(n, text)| (*n, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    fn normalize_text(&mut self) {
        for text in self.verses.values_mut() {
            *text = normalize_verse_text(text);
        }
    }
}

impl FromIterator<(u32, String)> for Chapter {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        let mut chapter = Chapter::new();
        for (verse, text) in iter {
            chapter.insert_verse(verse, &text);
        }
        chapter
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Book {
    chapters: BTreeMap<u32, Chapter>,
}

impl Book {
    pub fn chapter(&self, chapter: u32) -> Option<&Chapter> {
        self.chapters.get(&chapter)
    }

    /// Start a chapter afresh, dropping an earlier chapter with the same number.
    pub fn replace_chapter(&mut self, chapter: u32) -> &mut Chapter {
        self.chapters.insert(chapter, Chapter::new());
        self.chapter_entry(chapter)
    }

    pub fn chapter_entry(&mut self, chapter: u32) -> &mut Chapter {
        self.chapters.entry(chapter).or_default()
    }

    pub fn chapters(&self) -> impl Iterator<Item = (u32, &Chapter)> {
        self.chapters.iter().map(|(n, c)| (*n, c))
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// The normalized store produced by either extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BibleData {
    books: BTreeMap<BookId, Book>,
}

impl BibleData {
    pub fn new() -> Self {
        BibleData::default()
    }

    pub fn book(&self, book_id: &str) -> Option<&Book> {
        self.books.get(book_id)
    }

    /// Start a book afresh, dropping an earlier book with the same id.
    pub fn replace_book(&mut self, book_id: &str) -> &mut Book {
        self.books.insert(book_id.to_string(), Book::default());
        self.book_entry(book_id)
    }

    pub fn book_entry(&mut self, book_id: &str) -> &mut Book {
        self.books.entry(book_id.to_string()).or_default()
    }

    pub fn chapter(&self, book_id: &str, chapter: u32) -> Option<&Chapter> {
        self.book(book_id).and_then(|b| b.chapter(chapter))
    }

    pub fn verse(&self, verse_ref: &VerseRef) -> Option<&str> {
        self.chapter(&verse_ref.book_id, verse_ref.chapter)
            .and_then(|c| c.verse(verse_ref.verse))
    }

    pub fn insert_verse(&mut self, verse_ref: &VerseRef, text: &str) {
        self.book_entry(&verse_ref.book_id)
            .chapter_entry(verse_ref.chapter)
            .insert_verse(verse_ref.verse, text);
    }

    pub fn ensure_verse(&mut self, verse_ref: &VerseRef) {
        self.book_entry(&verse_ref.book_id)
            .chapter_entry(verse_ref.chapter)
            .ensure_verse(verse_ref.verse);
    }

    pub fn append_fragment(&mut self, verse_ref: &VerseRef, fragment: &str) {
        self.book_entry(&verse_ref.book_id)
            .chapter_entry(verse_ref.chapter)
            .append_fragment(verse_ref.verse, fragment);
    }

    /// Trim and collapse whitespace in every verse.
    pub fn normalize_text(&mut self) {
        for book in self.books.values_mut() {
            for chapter in book.chapters.values_mut() {
                chapter.normalize_text();
            }
        }
    }

    pub fn books(&self) -> impl Iterator<Item = (&str, &Book)> {
        self.books.iter().map(|(id, b)| (id.as_str(), b))
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn verse_count(&self) -> usize {
        self.books
            .values()
            .flat_map(|b| b.chapters.values())
            .map(|c| c.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

/// Why an extraction failed.
///
/// `SourceUnavailable` and `MalformedDocument` abort a whole file.
/// `MalformedMarker` is only ever reported in the log, the OSIS walk recovers
/// from it locally. The attribute errors abort the file or only skip the
/// offending node, depending on [`NumberFailurePolicy`].
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Source unavailable: {path:?}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document at position {position}: {message}")]
    MalformedDocument { position: usize, message: String },

    #[error("Malformed verse marker: '{0}'")]
    MalformedMarker(String),

    #[error("<{element}> is missing the '{attribute}' attribute")]
    MissingAttribute { element: String, attribute: String },

    #[error("<{element} {attribute}=\"{value}\"> is not an integer")]
    NonIntegerNumber {
        element: String,
        attribute: String,
        value: String,
    },
}

/// How the Zefania extractor reacts to a missing or non-integer
/// book/chapter/verse attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberFailurePolicy {
    /// Skip the offending element and everything inside it.
    #[default]
    #[serde(rename = "node")]
    NodeLevel,
    /// Abandon the whole file, the result is empty.
    #[serde(rename = "file")]
    FileLevel,
}
