//! Zefania dialect extractor.
//!
//! Handles the nested structure:
//! - `<BIBLEBOOK bname="Genesis">` child of the root → book
//! - `<CHAPTER cnumber="1">` child of a book → chapter
//! - `<VERS vnumber="1">text</VERS>` child of a chapter → verse
//!
//! A verse's text is its own leading text, up to its first child element.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::encoding::read_xml_file;
use crate::helpers::get_attribute;
use crate::logger;
use crate::types::{BibleData, ExtractError, NumberFailurePolicy, VerseRef};

#[derive(Debug, Clone, Copy, Default)]
pub struct ZefaniaParseOptions {
    pub number_failure_policy: NumberFailurePolicy,
}

/// One open element on the parse stack.
enum Frame {
    Book(String),
    Chapter { book_id: String, chapter: u32 },
    Verse {
        verse_ref: VerseRef,
        text: String,
        /// Set once a child element opens, later text is not the verse's own.
        text_done: bool,
    },
    /// Root, unknown elements, and skipped subtrees.
    Other,
}

/// Parse a Zefania file. Failures are logged and yield an empty [`BibleData`].
pub fn parse_zefania_file(path: &Path, options: &ZefaniaParseOptions) -> BibleData {
    logger::info(&format!("Parsing {:?}...", path));

    match try_parse_zefania_file(path, options) {
        Ok(data) => {
            logger::info(&format!(
                "  -> Parsed {} books ({} verses) from {:?}.",
                data.book_count(),
                data.verse_count(),
                path.file_name().unwrap_or_default()
            ));
            data
        }
        Err(e) => {
            logger::error(&format!("Error with {:?}: {}", path, e));
            BibleData::new()
        }
    }
}

pub fn try_parse_zefania_file(path: &Path, options: &ZefaniaParseOptions) -> Result<BibleData, ExtractError> {
    let content = read_xml_file(path)?;
    parse_zefania_str(&content, options)
}

fn malformed(reader: &Reader<&[u8]>, message: impl Into<String>) -> ExtractError {
    ExtractError::MalformedDocument {
        position: reader.buffer_position(),
        message: message.into(),
    }
}

fn number_attribute(e: &BytesStart, element: &str, attribute: &str) -> Result<u32, ExtractError> {
    let value = get_attribute(e, attribute.as_bytes()).ok_or_else(|| ExtractError::MissingAttribute {
        element: element.to_string(),
        attribute: attribute.to_string(),
    })?;

    value.trim().parse::<u32>().map_err(|_| ExtractError::NonIntegerNumber {
        element: element.to_string(),
        attribute: attribute.to_string(),
        value,
    })
}

struct ZefaniaWalk<'a> {
    data: BibleData,
    stack: Vec<Frame>,
    options: &'a ZefaniaParseOptions,
    skipped_nodes: usize,
}

impl ZefaniaWalk<'_> {
    /// Open an element and push its frame. Attribute failures either skip the
    /// element's subtree or abort the file, per the failure policy.
    fn open(&mut self, e: &BytesStart) -> Result<(), ExtractError> {
        let frame = match self.frame_for(e) {
            Ok(frame) => frame,
            Err(err) => match self.options.number_failure_policy {
                NumberFailurePolicy::FileLevel => return Err(err),
                NumberFailurePolicy::NodeLevel => {
                    self.skipped_nodes += 1;
                    logger::warn(&format!("Skipping element: {}", err));
                    Frame::Other
                }
            },
        };
        self.stack.push(frame);
        Ok(())
    }

    fn frame_for(&mut self, e: &BytesStart) -> Result<Frame, ExtractError> {
        let name = e.local_name();
        let name = name.as_ref();
        let is_root_child = self.stack.len() == 1;

        let frame = match self.stack.last_mut() {
            Some(Frame::Verse { text_done, .. }) => {
                *text_done = true;
                Frame::Other
            }
            Some(Frame::Other) if is_root_child && name == b"BIBLEBOOK" => {
                let book_id = get_attribute(e, b"bname").ok_or_else(|| ExtractError::MissingAttribute {
                    element: "BIBLEBOOK".to_string(),
                    attribute: "bname".to_string(),
                })?;
                self.data.replace_book(&book_id);
                Frame::Book(book_id)
            }
            Some(Frame::Book(book_id)) if name == b"CHAPTER" => {
                let chapter = number_attribute(e, "CHAPTER", "cnumber")?;
                let book_id = book_id.clone();
                self.data.book_entry(&book_id).replace_chapter(chapter);
                Frame::Chapter { book_id, chapter }
            }
            Some(Frame::Chapter { book_id, chapter }) if name == b"VERS" => {
                let verse = number_attribute(e, "VERS", "vnumber")?;
                Frame::Verse {
                    verse_ref: VerseRef::new(book_id, *chapter, verse),
                    text: String::new(),
                    text_done: false,
                }
            }
            _ => Frame::Other,
        };

        Ok(frame)
    }

    fn close(&mut self) {
        if let Some(Frame::Verse { verse_ref, text, .. }) = self.stack.pop() {
            self.data.insert_verse(&verse_ref, &text);
        }
    }

    /// Text events arrive trimmed and split around comments and CDATA, so
    /// fragments are joined with a space. Whitespace is collapsed on insert.
    fn text(&mut self, fragment: &str) {
        if let Some(Frame::Verse { text, text_done: false, .. }) = self.stack.last_mut() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(fragment);
        }
    }
}

/// Parse Zefania XML content.
pub fn parse_zefania_str(content: &str, options: &ZefaniaParseOptions) -> Result<BibleData, ExtractError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut walk = ZefaniaWalk {
        data: BibleData::new(),
        stack: Vec::new(),
        options,
        skipped_nodes: 0,
    };
    let mut seen_root = false;

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if walk.stack.is_empty() && seen_root {
                    return Err(malformed(&reader, "More than one root element"));
                }
                seen_root = true;
                walk.open(e)?;
            }
            Ok(Event::Empty(ref e)) => {
                if walk.stack.is_empty() && seen_root {
                    return Err(malformed(&reader, "More than one root element"));
                }
                seen_root = true;
                walk.open(e)?;
                walk.close();
            }
            Ok(Event::End(_)) => {
                if walk.stack.is_empty() {
                    return Err(malformed(&reader, "Closing tag without an open element"));
                }
                walk.close();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| malformed(&reader, err.to_string()))?;
                if walk.stack.is_empty() {
                    return Err(malformed(&reader, "Text outside the root element"));
                }
                walk.text(&text);
            }
            Ok(Event::CData(e)) => {
                walk.text(&String::from_utf8_lossy(&e));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(&reader, e.to_string())),
            _ => {}
        }

        buf.clear();
    }

    if !seen_root {
        return Err(malformed(&reader, "No root element"));
    }
    if !walk.stack.is_empty() {
        return Err(malformed(
            &reader,
            format!("Document ended with {} unclosed elements", walk.stack.len()),
        ));
    }

    if walk.skipped_nodes > 0 {
        logger::warn(&format!("Skipped {} elements with unusable attributes", walk.skipped_nodes));
    }

    Ok(walk.data)
}
