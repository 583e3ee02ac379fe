use std::fs;
use std::path::{Path, PathBuf};

use liturgy_bible_backend::osis_parser::try_parse_osis_file;
use liturgy_bible_backend::zefania_parser::try_parse_zefania_file;
use liturgy_bible_backend::{
    parse_osis_file, parse_zefania_file, ExtractError, NumberFailurePolicy, VerseRef, ZefaniaParseOptions,
};

fn data_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

#[test]
fn test_osis_sample_verses() {
    let data = parse_osis_file(&data_path("sample.osis.xml"));

    assert_eq!(data.book_count(), 3);
    assert_eq!(
        data.verse(&VerseRef::new("Gen", 1, 1)),
        Some("In the beginning God created the heaven and the earth.")
    );
    assert_eq!(
        data.verse(&VerseRef::new("Gen", 1, 2)),
        Some("And the earth was without form, and void; and darkness was upon the face of the deep.")
    );
    assert_eq!(
        data.verse(&VerseRef::new("Gen", 1, 3)),
        Some("And God said, Let there be light: and there was light.")
    );
}

#[test]
fn test_osis_sample_malformed_marker_and_revisit() {
    let data = parse_osis_file(&data_path("sample.osis.xml"));

    assert_eq!(
        data.verse(&VerseRef::new("Ruth", 1, 1)),
        Some("Now it came to pass in the days when the judges ruled,")
    );
    assert_eq!(
        data.verse(&VerseRef::new("Ruth", 1, 2)),
        Some("And the name of the man was Elimelech, and the name of his wife Naomi.")
    );
    assert_eq!(data.chapter("Ruth", 1).map(|c| c.len()), Some(2));
}

#[test]
fn test_osis_sample_milestones() {
    let data = parse_osis_file(&data_path("sample.osis.xml"));

    assert_eq!(
        data.verse(&VerseRef::new("Ps", 23, 1)),
        Some("The LORD is my shepherd; I shall not want. between milestones")
    );
    assert_eq!(
        data.verse(&VerseRef::new("Ps", 23, 2)),
        Some("He maketh me to lie down in green pastures & still waters.")
    );
}

#[test]
fn test_zefania_sample_verses() {
    let data = parse_zefania_file(&data_path("sample.zefania.xml"), &ZefaniaParseOptions::default());

    assert_eq!(data.book_count(), 3);
    assert_eq!(
        data.verse(&VerseRef::new("Genesis", 1, 1)),
        Some("In the beginning God created heaven, and earth.")
    );
    assert_eq!(data.chapter("Genesis", 1).map(|c| c.len()), Some(3));
    assert_eq!(
        data.verse(&VerseRef::new("Tobit", 1, 1)),
        Some("Tobias of the tribe and city of Nephthali.")
    );
}

#[test]
fn test_zefania_sample_bad_chapter_number_is_skipped() {
    let data = parse_zefania_file(&data_path("sample.zefania.xml"), &ZefaniaParseOptions::default());

    let ruth = data.book("Ruth").unwrap();
    assert_eq!(ruth.len(), 1);
    assert_eq!(
        data.verse(&VerseRef::new("Ruth", 1, 2)),
        Some("He was called Elimelech, and his wife Noemi.")
    );
}

#[test]
fn test_zefania_sample_file_level_policy_aborts() {
    let options = ZefaniaParseOptions {
        number_failure_policy: NumberFailurePolicy::FileLevel,
    };

    let result = try_parse_zefania_file(&data_path("sample.zefania.xml"), &options);
    assert!(matches!(result, Err(ExtractError::NonIntegerNumber { .. })));

    let data = parse_zefania_file(&data_path("sample.zefania.xml"), &options);
    assert!(data.is_empty());
}

#[test]
fn test_missing_file_yields_empty_data() {
    let missing = data_path("does-not-exist.xml");

    assert!(parse_osis_file(&missing).is_empty());
    assert!(parse_zefania_file(&missing, &ZefaniaParseOptions::default()).is_empty());
    assert!(matches!(
        try_parse_osis_file(&missing),
        Err(ExtractError::SourceUnavailable { .. })
    ));
}

#[test]
fn test_corrupt_file_yields_empty_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.xml");
    fs::write(&path, "<XMLBIBLE><BIBLEBOOK bname=\"Genesis\"><CHAPTER cnumber=\"1\">").unwrap();

    assert!(parse_osis_file(&path).is_empty());
    assert!(parse_zefania_file(&path, &ZefaniaParseOptions::default()).is_empty());
    assert!(matches!(
        try_parse_zefania_file(&path, &ZefaniaParseOptions::default()),
        Err(ExtractError::MalformedDocument { .. })
    ));
}

#[test]
fn test_parsing_twice_gives_equal_data() {
    let osis_path = data_path("sample.osis.xml");
    assert_eq!(parse_osis_file(&osis_path), parse_osis_file(&osis_path));

    let zefania_path = data_path("sample.zefania.xml");
    let options = ZefaniaParseOptions::default();
    assert_eq!(parse_zefania_file(&zefania_path, &options), parse_zefania_file(&zefania_path, &options));
}

#[test]
fn test_utf16_file_with_bom() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("utf16.zefania.xml");

    let xml = "<XMLBIBLE>\r\n<BIBLEBOOK bname=\"Judith\"><CHAPTER cnumber=\"1\"><VERS vnumber=\"1\">Now Arphaxad king of the Medes</VERS></CHAPTER></BIBLEBOOK>\r\n</XMLBIBLE>";
    let mut bytes = vec![0xFF, 0xFE];
    for unit in xml.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    fs::write(&path, bytes).unwrap();

    let data = parse_zefania_file(&path, &ZefaniaParseOptions::default());
    assert_eq!(
        data.verse(&VerseRef::new("Judith", 1, 1)),
        Some("Now Arphaxad king of the Medes")
    );
}
