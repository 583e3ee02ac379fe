pub mod types;
pub mod helpers;
pub mod encoding;
pub mod logger;

pub mod osis_parser;
pub mod zefania_parser;

pub mod book_registry;
pub mod chapter_store;
pub mod navigation;
pub mod site_settings;
pub mod html_content;
pub mod bible_api;
pub mod site_generator;

pub use osis_parser::parse_osis_file;
pub use types::{BibleData, Book, BookId, Chapter, ExtractError, NumberFailurePolicy, SourceFormat, VerseRef};
pub use zefania_parser::{parse_zefania_file, ZefaniaParseOptions};

pub static DEFAULT_SETTINGS_FILE: &str = "liturgy-bible.json";
