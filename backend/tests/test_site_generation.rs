use std::fs;
use std::path::{Path, PathBuf};

use liturgy_bible_backend::book_registry::BookRegistry;
use liturgy_bible_backend::site_generator::{generate_site, load_xml_sources};
use liturgy_bible_backend::site_settings::SiteSettings;

fn data_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn generate_into(output_dir: &Path) -> (SiteSettings, liturgy_bible_backend::site_generator::GenerationStats) {
    let settings = SiteSettings {
        output_dir: output_dir.to_path_buf(),
        ..SiteSettings::default()
    };
    let registry = BookRegistry::catholic();

    let sources = load_xml_sources(
        Some(&data_path("sample.osis.xml")),
        Some(&data_path("sample.zefania.xml")),
        &settings,
    )
    .unwrap();

    let stats = generate_site(&sources, &registry, &settings, |_| {}).unwrap();
    (settings, stats)
}

#[test]
fn test_pages_for_chapters_with_text() {
    let dir = tempfile::tempdir().unwrap();
    let (settings, stats) = generate_into(&dir.path().join("bible"));

    let total_chapters: u32 = BookRegistry::catholic().books().iter().map(|b| b.chapters).sum();
    assert_eq!(stats.pages_written, 4);
    assert_eq!(stats.chapters_without_text, total_chapters as usize - 4);

    let mut files: Vec<String> = fs::read_dir(&settings.output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    files.sort();
    assert_eq!(
        files,
        vec!["genesis-01.html", "psalms-23.html", "ruth-01.html", "tobit-01.html"]
    );
}

#[test]
fn test_page_contents() {
    let dir = tempfile::tempdir().unwrap();
    let (settings, _) = generate_into(&dir.path().join("bible"));

    let ruth = fs::read_to_string(settings.output_dir.join("ruth-01.html")).unwrap();
    assert!(ruth.contains("<title>Ruth 1 - Liturgy Bible</title>"));
    assert!(ruth.contains("<div class=\"translation-text dra active\">"));
    assert!(ruth.contains("<div class=\"translation-text kjv \">"));
    assert!(ruth.contains("<span class=\"verse-num\">2</span> He was called Elimelech, and his wife Noemi.</p>"));
    assert!(ruth.contains("<a href=\"judges-21.html\">← Judges 21</a>"));
    assert!(ruth.contains("<a href=\"ruth-02.html\">Ruth 02 →</a>"));

    // Only the OSIS source has the psalms, so KJV is the active translation.
    let psalm = fs::read_to_string(settings.output_dir.join("psalms-23.html")).unwrap();
    assert!(psalm.contains("<div class=\"translation-text kjv active\">"));
    assert!(!psalm.contains("translation-text dra"));
    assert!(psalm.contains("green pastures &amp; still waters."));

    let tobit = fs::read_to_string(settings.output_dir.join("tobit-01.html")).unwrap();
    assert!(tobit.contains("<div class=\"translation-text dra active\">"));
    assert!(!tobit.contains("translation-text kjv"));
}

#[test]
fn test_generation_is_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let (first_settings, _) = generate_into(&dir.path().join("first"));
    let (second_settings, _) = generate_into(&dir.path().join("second"));

    for name in ["genesis-01.html", "psalms-23.html", "ruth-01.html", "tobit-01.html"] {
        assert_eq!(
            fs::read_to_string(first_settings.output_dir.join(name)).unwrap(),
            fs::read_to_string(second_settings.output_dir.join(name)).unwrap(),
        );
    }
}
