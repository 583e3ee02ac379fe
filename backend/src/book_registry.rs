//! Canonical ordered book list with per-format identifier aliases.
//!
//! A missing alias means the book is not present in that format's source.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::helpers::book_slug;
use crate::types::SourceFormat;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEntry {
    pub name: String,
    pub chapters: u32,
    pub osis_id: Option<String>,
    pub zefania_id: Option<String>,
    /// Book name for bible-api.com, when it differs from `name`.
    #[serde(default)]
    pub api_name: Option<String>,
}

impl BookEntry {
    pub fn id_for(&self, format: SourceFormat) -> Option<&str> {
        match format {
            SourceFormat::Osis => self.osis_id.as_deref(),
            SourceFormat::Zefania => self.zefania_id.as_deref(),
        }
    }

    pub fn slug(&self) -> String {
        book_slug(&self.name)
    }

    pub fn api_name(&self) -> &str {
        self.api_name.as_deref().unwrap_or(&self.name)
    }
}

// (name, chapters, OSIS id, Zefania bname)
static CATHOLIC_BIBLE_BOOKS: &[(&str, u32, Option<&str>, Option<&str>)] = &[
    ("Genesis", 50, Some("Gen"), Some("Genesis")),
    ("Exodus", 40, Some("Exod"), Some("Exodus")),
    ("Leviticus", 27, Some("Lev"), Some("Leviticus")),
    ("Numbers", 36, Some("Num"), Some("Numbers")),
    ("Deuteronomy", 34, Some("Deut"), Some("Deuteronomy")),
    ("Joshua", 24, Some("Josh"), Some("Joshua")),
    ("Judges", 21, Some("Judg"), Some("Judges")),
    ("Ruth", 4, Some("Ruth"), Some("Ruth")),
    ("1 Samuel", 31, Some("1Sam"), Some("1 Samuel")),
    ("2 Samuel", 24, Some("2Sam"), Some("2 Samuel")),
    ("1 Kings", 22, Some("1Kgs"), Some("1 Kings")),
    ("2 Kings", 25, Some("2Kgs"), Some("2 Kings")),
    ("1 Chronicles", 29, Some("1Chr"), Some("1 Chronicles")),
    ("2 Chronicles", 36, Some("2Chr"), Some("2 Chronicles")),
    ("Ezra", 10, Some("Ezra"), Some("Ezra")),
    ("Nehemiah", 13, Some("Neh"), Some("Nehemiah")),
    ("Tobit", 14, None, Some("Tobit")),
    ("Judith", 16, None, Some("Judith")),
    ("Esther", 10, Some("Esth"), Some("Esther")),
    ("1 Maccabees", 16, None, Some("1 Maccabees")),
    ("2 Maccabees", 15, None, Some("2 Maccabees")),
    ("Job", 42, Some("Job"), Some("Job")),
    ("Psalms", 150, Some("Ps"), Some("Psalms")),
    ("Proverbs", 31, Some("Prov"), Some("Proverbs")),
    ("Ecclesiastes", 12, Some("Eccl"), Some("Ecclesiastes")),
    ("Song of Songs", 8, Some("Song"), Some("Song of Solomon")),
    ("Wisdom", 19, None, Some("Wisdom")),
    ("Sirach", 51, None, Some("Sirach")),
    ("Isaiah", 66, Some("Isa"), Some("Isaiah")),
    ("Jeremiah", 52, Some("Jer"), Some("Jeremiah")),
    ("Lamentations", 5, Some("Lam"), Some("Lamentations")),
    ("Baruch", 6, None, Some("Baruch")),
    ("Ezekiel", 48, Some("Ezek"), Some("Ezekiel")),
    ("Daniel", 14, Some("Dan"), Some("Daniel")),
    ("Hosea", 14, Some("Hos"), Some("Hosea")),
    ("Joel", 3, Some("Joel"), Some("Joel")),
    ("Amos", 9, Some("Amos"), Some("Amos")),
    ("Obadiah", 1, Some("Obad"), Some("Oba")),
    ("Jonah", 4, Some("Jonah"), Some("Jonah")),
    ("Micah", 7, Some("Mic"), Some("Micah")),
    ("Nahum", 3, Some("Nah"), Some("Nahum")),
    ("Habakkuk", 3, Some("Hab"), Some("Habakkuk")),
    ("Zephaniah", 3, Some("Zeph"), Some("Zephaniah")),
    ("Haggai", 2, Some("Hag"), Some("Haggai")),
    ("Zechariah", 14, Some("Zech"), Some("Zechariah")),
    ("Malachi", 4, Some("Mal"), Some("Malachi")),
    ("Matthew", 28, Some("Matt"), Some("Matthew")),
    ("Mark", 16, Some("Mark"), Some("Mark")),
    ("Luke", 24, Some("Luke"), Some("Luke")),
    ("John", 21, Some("John"), Some("John")),
    ("Acts", 28, Some("Acts"), Some("Acts")),
    ("Romans", 16, Some("Rom"), Some("Romans")),
    ("1 Corinthians", 16, Some("1Cor"), Some("1 Corinthians")),
    ("2 Corinthians", 13, Some("2Cor"), Some("2 Corinthians")),
    ("Galatians", 6, Some("Gal"), Some("Galatians")),
    ("Ephesians", 6, Some("Eph"), Some("Ephesians")),
    ("Philippians", 4, Some("Phil"), Some("Philippians")),
    ("Colossians", 4, Some("Col"), Some("Colossians")),
    ("1 Thessalonians", 5, Some("1Thess"), Some("1 Thessalonians")),
    ("2 Thessalonians", 3, Some("2Thess"), Some("2 Thessalonians")),
    ("1 Timothy", 6, Some("1Tim"), Some("1 Timothy")),
    ("2 Timothy", 4, Some("2Tim"), Some("2 Timothy")),
    ("Titus", 3, Some("Titus"), Some("Titus")),
    ("Philemon", 1, Some("Phlm"), Some("Philemon")),
    ("Hebrews", 13, Some("Heb"), Some("Hebrews")),
    ("James", 5, Some("Jas"), Some("James")),
    ("1 Peter", 5, Some("1Pet"), Some("1 Peter")),
    ("2 Peter", 3, Some("2Pet"), Some("2 Peter")),
    ("1 John", 5, Some("1John"), Some("1 John")),
    ("2 John", 1, Some("2John"), Some("2 John")),
    ("3 John", 1, Some("3John"), Some("3 John")),
    ("Jude", 1, Some("Jude"), Some("Jude")),
    ("Revelation", 22, Some("Rev"), Some("Revelation")),
];

// bible-api.com wants these names in single-chapter requests.
static API_BOOK_NAMES: &[(&str, &str)] = &[
    ("Song of Songs", "Song of Solomon"),
    ("Psalms", "Psalm"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookRegistry {
    books: Vec<BookEntry>,
}

impl Default for BookRegistry {
    fn default() -> Self {
        BookRegistry::catholic()
    }
}

impl BookRegistry {
    /// The 73-book Catholic canon.
    pub fn catholic() -> Self {
        let books = CATHOLIC_BIBLE_BOOKS
            .iter()
            .map(|(name, chapters, osis_id, zefania_id)| BookEntry {
                name: name.to_string(),
                chapters: *chapters,
                osis_id: osis_id.map(|s| s.to_string()),
                zefania_id: zefania_id.map(|s| s.to_string()),
                api_name: API_BOOK_NAMES
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, api)| api.to_string()),
            })
            .collect();
        BookRegistry { books }
    }

    pub fn from_books(books: Vec<BookEntry>) -> Self {
        BookRegistry { books }
    }

    /// Load a registry from a JSON array of book entries.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read book registry: {:?}", path))?;
        let registry: BookRegistry = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse book registry: {:?}", path))?;
        if registry.books.is_empty() {
            anyhow::bail!("Book registry is empty: {:?}", path);
        }
        Ok(registry)
    }

    pub fn books(&self) -> &[BookEntry] {
        &self.books
    }

    pub fn find(&self, name: &str) -> Option<&BookEntry> {
        self.books.iter().find(|b| b.name.eq_ignore_ascii_case(name))
    }

    /// A registry with only the named books, in the order given.
    pub fn select(&self, names: &[String]) -> Result<BookRegistry> {
        let books = names
            .iter()
            .map(|name| {
                self.find(name.trim())
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("Unknown book: '{}'", name))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(BookRegistry { books })
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
