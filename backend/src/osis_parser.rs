//! OSIS dialect extractor.
//!
//! OSIS verses are not bounded by a closing element. An inline `<verse
//! osisID="Gen.1.1"/>` marker inside a `<p>` opens a verse, and the verse runs
//! until the next marker or the end of the paragraph:
//!
//! ```xml
//! <p><verse osisID="Gen.1.1" sID="Gen.1.1"/>In the beginning
//!    <transChange type="added">was</transChange> the Word<verse eID="Gen.1.1"/></p>
//! ```
//!
//! The paragraph is walked in document order. Every text fragment met while a
//! verse is active is appended to that verse, whatever the nesting depth of
//! the element it appears in.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::encoding::read_xml_file;
use crate::helpers::{get_attribute, parse_osis_verse_id};
use crate::logger;
use crate::types::{BibleData, ExtractError, VerseRef};

/// Which verse, if any, receives the text currently being read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VerseCursor {
    #[default]
    NoActiveVerse,
    ActiveVerse(VerseRef),
}

/// Events of the paragraph walk which can move the [`VerseCursor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalEvent<'a> {
    ParagraphStart,
    /// A `verse` element with an `osisID`.
    VerseMarker(&'a str),
    ParagraphEnd,
}

impl VerseCursor {
    /// A malformed marker id leaves no verse active, so text up to the next
    /// valid marker is dropped.
    pub fn transition(self, event: &TraversalEvent) -> VerseCursor {
        match event {
            TraversalEvent::ParagraphStart | TraversalEvent::ParagraphEnd => VerseCursor::NoActiveVerse,
            TraversalEvent::VerseMarker(osis_id) => match parse_osis_verse_id(osis_id) {
                Ok(verse_ref) => VerseCursor::ActiveVerse(verse_ref),
                Err(_) => VerseCursor::NoActiveVerse,
            },
        }
    }

    pub fn active(&self) -> Option<&VerseRef> {
        match self {
            VerseCursor::ActiveVerse(r) => Some(r),
            VerseCursor::NoActiveVerse => None,
        }
    }
}

/// Parse an OSIS file. Failures are logged and yield an empty [`BibleData`].
pub fn parse_osis_file(path: &Path) -> BibleData {
    logger::info(&format!("Parsing {:?}...", path));

    match try_parse_osis_file(path) {
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

pub fn try_parse_osis_file(path: &Path) -> Result<BibleData, ExtractError> {
    let content = read_xml_file(path)?;
    parse_osis_str(&content)
}

struct OsisWalk {
    data: BibleData,
    cursor: VerseCursor,
    malformed_markers: usize,
}

impl OsisWalk {
    fn step(&mut self, event: TraversalEvent) {
        let cursor = std::mem::take(&mut self.cursor);
        self.cursor = cursor.transition(&event);

        if let TraversalEvent::VerseMarker(osis_id) = event {
            match &self.cursor {
                VerseCursor::ActiveVerse(verse_ref) => self.data.ensure_verse(verse_ref),
                VerseCursor::NoActiveVerse => {
                    self.malformed_markers += 1;
                    logger::debug(&ExtractError::MalformedMarker(osis_id.to_string()).to_string());
                }
            }
        }
    }

    /// Only a `verse` with an `osisID` is a marker. Milestone ends
    /// (`<verse eID="..."/>`) are plain markup and the text keeps flowing.
    fn verse_element(&mut self, e: &BytesStart) {
        if let Some(osis_id) = get_attribute(e, b"osisID") {
            self.step(TraversalEvent::VerseMarker(&osis_id));
        }
    }

    fn text(&mut self, fragment: &str) {
        if let VerseCursor::ActiveVerse(verse_ref) = &self.cursor {
            self.data.append_fragment(verse_ref, fragment);
        }
    }
}

fn malformed(reader: &Reader<&[u8]>, message: impl Into<String>) -> ExtractError {
    ExtractError::MalformedDocument {
        position: reader.buffer_position(),
        message: message.into(),
    }
}

/// Parse OSIS XML content.
///
/// Element names are matched on their local name, so both `<verse>` and a
/// prefixed `<osis:verse>` count. A `p` nested inside another `p` is part of
/// the outer paragraph's walk.
pub fn parse_osis_str(content: &str) -> Result<BibleData, ExtractError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut walk = OsisWalk {
        data: BibleData::new(),
        cursor: VerseCursor::NoActiveVerse,
        malformed_markers: 0,
    };

    let mut depth: usize = 0;
    let mut seen_root = false;
    // Depth of the currently open outermost <p>.
    let mut paragraph_depth: Option<usize> = None;

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if depth == 0 && seen_root {
                    return Err(malformed(&reader, "More than one root element"));
                }
                depth += 1;
                seen_root = true;

                match e.local_name().as_ref() {
                    b"p" if paragraph_depth.is_none() => {
                        paragraph_depth = Some(depth);
                        walk.step(TraversalEvent::ParagraphStart);
                    }
                    b"verse" if paragraph_depth.is_some() => walk.verse_element(e),
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if depth == 0 {
                    if seen_root {
                        return Err(malformed(&reader, "More than one root element"));
                    }
                    seen_root = true;
                }
                if paragraph_depth.is_some() && e.local_name().as_ref() == b"verse" {
                    walk.verse_element(e);
                }
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    return Err(malformed(&reader, "Closing tag without an open element"));
                }
                if paragraph_depth == Some(depth) {
                    walk.step(TraversalEvent::ParagraphEnd);
                    paragraph_depth = None;
                }
                depth -= 1;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| malformed(&reader, err.to_string()))?;
                if depth == 0 {
                    return Err(malformed(&reader, "Text outside the root element"));
                }
                walk.text(&text);
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                walk.text(&text);
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
    if depth > 0 {
        return Err(malformed(&reader, format!("Document ended with {} unclosed elements", depth)));
    }

    if walk.malformed_markers > 0 {
        logger::warn(&format!(
            "Skipped text after {} malformed verse markers",
            walk.malformed_markers
        ));
    }

    let mut data = walk.data;
    data.normalize_text();
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn osis(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<osis xmlns="http://www.bibletechnologies.net/2003/OSIS/namespace">
  <osisText osisIDWork="KJV">
    <div type="book" osisID="Gen">
      <chapter osisID="Gen.1">
        {}
      </chapter>
    </div>
  </osisText>
</osis>"#,
            body
        )
    }

    #[test]
    fn test_transition_on_valid_marker() {
        let cursor = VerseCursor::NoActiveVerse.transition(&TraversalEvent::VerseMarker("Gen.1.3"));
        assert_eq!(cursor, VerseCursor::ActiveVerse(VerseRef::new("Gen", 1, 3)));
    }

    #[test]
    fn test_transition_on_malformed_marker_deactivates() {
        let active = VerseCursor::ActiveVerse(VerseRef::new("Gen", 1, 3));
        let cursor = active.transition(&TraversalEvent::VerseMarker("Gen.1"));
        assert_eq!(cursor, VerseCursor::NoActiveVerse);
        assert!(cursor.active().is_none());
    }

    #[test]
    fn test_transition_on_paragraph_boundaries() {
        let active = VerseCursor::ActiveVerse(VerseRef::new("Gen", 1, 3));
        assert_eq!(active.clone().transition(&TraversalEvent::ParagraphStart), VerseCursor::NoActiveVerse);
        assert_eq!(active.transition(&TraversalEvent::ParagraphEnd), VerseCursor::NoActiveVerse);
    }

    #[test]
    fn test_marker_text_and_nested_emphasis() {
        let xml = osis(r#"<p><verse osisID="Gen.1.1"/>Hello <hi type="italic">world</hi></p>"#);
        let data = parse_osis_str(&xml).unwrap();
        assert_eq!(data.verse(&VerseRef::new("Gen", 1, 1)), Some("Hello world"));
    }

    #[test]
    fn test_text_after_nested_element_stays_in_document_order() {
        let xml = osis(
            r#"<p><verse osisID="Gen.1.1"/>In the <hi>very <b>first</b> days</hi> of old</p>"#,
        );
        let data = parse_osis_str(&xml).unwrap();
        assert_eq!(
            data.verse(&VerseRef::new("Gen", 1, 1)),
            Some("In the very first days of old")
        );
    }

    #[test]
    fn test_marker_nested_inside_markup_splits_text() {
        let xml = osis(
            r#"<p><verse osisID="Gen.1.1"/>one <q>two <verse osisID="Gen.1.2"/>three</q> four</p>"#,
        );
        let data = parse_osis_str(&xml).unwrap();
        assert_eq!(data.verse(&VerseRef::new("Gen", 1, 1)), Some("one two"));
        assert_eq!(data.verse(&VerseRef::new("Gen", 1, 2)), Some("three four"));
    }

    #[test]
    fn test_text_before_first_marker_is_dropped() {
        let xml = osis(r#"<p>Heading words <verse osisID="Gen.1.1"/>Verse words</p>"#);
        let data = parse_osis_str(&xml).unwrap();
        assert_eq!(data.verse(&VerseRef::new("Gen", 1, 1)), Some("Verse words"));
        assert_eq!(data.verse_count(), 1);
    }

    #[test]
    fn test_verse_does_not_continue_into_next_paragraph() {
        let xml = osis(
            r#"<p><verse osisID="Gen.1.1"/>first</p>
               <p>orphan text<verse osisID="Gen.1.2"/>second</p>"#,
        );
        let data = parse_osis_str(&xml).unwrap();
        assert_eq!(data.verse(&VerseRef::new("Gen", 1, 1)), Some("first"));
        assert_eq!(data.verse(&VerseRef::new("Gen", 1, 2)), Some("second"));
    }

    #[test]
    fn test_milestone_end_marker_does_not_end_verse() {
        let xml = osis(
            r#"<p><verse osisID="Gen.1.1" sID="Gen.1.1"/>The LORD<verse eID="Gen.1.1"/> is my shepherd <verse osisID="Gen.1.2" sID="Gen.1.2"/>He<verse eID="Gen.1.2"/></p>"#,
        );
        let data = parse_osis_str(&xml).unwrap();
        assert_eq!(data.verse(&VerseRef::new("Gen", 1, 1)), Some("The LORD is my shepherd"));
        assert_eq!(data.verse(&VerseRef::new("Gen", 1, 2)), Some("He"));
    }

    #[test]
    fn test_markers_outside_paragraphs_are_ignored() {
        let xml = osis(r#"<verse osisID="Gen.1.1"/>loose text<p><verse osisID="Gen.1.2"/>kept</p>"#);
        let data = parse_osis_str(&xml).unwrap();
        assert_eq!(data.verse(&VerseRef::new("Gen", 1, 1)), None);
        assert_eq!(data.verse(&VerseRef::new("Gen", 1, 2)), Some("kept"));
    }

    #[test]
    fn test_marker_without_text_creates_empty_slot() {
        let xml = osis(r#"<p><verse osisID="Gen.1.1"/></p>"#);
        let data = parse_osis_str(&xml).unwrap();
        assert_eq!(data.verse(&VerseRef::new("Gen", 1, 1)), Some(""));
    }

    #[test]
    fn test_entities_are_unescaped() {
        let xml = osis(r#"<p><verse osisID="Gen.1.1"/>Cain &amp; Abel</p>"#);
        let data = parse_osis_str(&xml).unwrap();
        assert_eq!(data.verse(&VerseRef::new("Gen", 1, 1)), Some("Cain & Abel"));
    }

    #[test]
    fn test_prefixed_element_names() {
        let xml = r#"<osis:osis xmlns:osis="http://www.bibletechnologies.net/2003/OSIS/namespace">
            <osis:p><osis:verse osisID="Exod.2.1"/>And there went</osis:p>
        </osis:osis>"#;
        let data = parse_osis_str(xml).unwrap();
        assert_eq!(data.verse(&VerseRef::new("Exod", 2, 1)), Some("And there went"));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(parse_osis_str("").is_err());
        assert!(parse_osis_str("not xml at all").is_err());
        assert!(parse_osis_str("<osis><p></osis>").is_err());
        assert!(parse_osis_str("<osis><p>").is_err());
        assert!(parse_osis_str("<a/><b/>").is_err());
    }
}
