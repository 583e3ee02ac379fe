use lazy_static::lazy_static;
use quick_xml::events::BytesStart;
use regex::Regex;

use crate::types::{ExtractError, VerseRef};

lazy_static! {
    static ref RE_WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Trim the text and collapse internal whitespace runs to a single space.
pub fn normalize_verse_text(text: &str) -> String {
    RE_WHITESPACE_RUN.replace_all(text.trim(), " ").to_string()
}

/// "1 Samuel" -> "1-samuel"
pub fn book_slug(book_name: &str) -> String {
    book_name.to_lowercase().replace(' ', "-")
}

/// "1-samuel", 3 -> "1-samuel-03.html"
pub fn chapter_file_name(book_slug: &str, chapter: u32) -> String {
    format!("{}-{:02}.html", book_slug, chapter)
}

/// Uppercase every letter which follows a non-letter, lowercase the rest.
/// "song of songs 08" -> "Song Of Songs 08"
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Parse an OSIS verse id of the form `BOOK.CHAPTER.VERSE`.
///
/// Anything else (range ids, missing parts, non-integer numbers) is a
/// malformed marker.
pub fn parse_osis_verse_id(osis_id: &str) -> Result<VerseRef, ExtractError> {
    let malformed = || ExtractError::MalformedMarker(osis_id.to_string());

    let parts: Vec<&str> = osis_id.split('.').collect();
    if parts.len() != 3 {
        return Err(malformed());
    }

    let chapter = parts[1].trim().parse::<u32>().map_err(|_| malformed())?;
    let verse = parts[2].trim().parse::<u32>().map_err(|_| malformed())?;

    Ok(VerseRef::new(parts[0], chapter, verse))
}

/// Get an unescaped attribute value from a start tag.
pub fn get_attribute(element: &BytesStart, attr_name: &[u8]) -> Option<String> {
    element
        .attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == attr_name)
        .map(|a| {
            a.unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&a.value).into_owned())
        })
}
