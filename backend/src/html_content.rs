use anyhow::{anyhow, Result};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::book_registry::BookEntry;
use crate::chapter_store::ChapterTranslation;
use crate::navigation::{link_label, ChapterLinks};
use crate::site_settings::SiteSettings;

static CHAPTER_HTML: &str = include_str!("../assets/templates/chapter.html");

#[derive(Serialize)]
struct TmplContext {
    site_title: String,
    site_description: String,
    site_domain: String,
    book_name: String,
    book_slug: String,
    chapter: u32,
    translation_options: String,
    main_text_html: String,
    prev_link: String,
    next_link: String,
}

/// Everything needed to render one chapter page.
#[derive(Debug, Clone)]
pub struct ChapterPage<'a> {
    pub book: &'a BookEntry,
    pub chapter: u32,
    pub translations: Vec<ChapterTranslation<'a>>,
    pub links: ChapterLinks,
}

/// Put the default translation first, the rest alphabetically by label.
/// The first translation is the one shown when the page opens.
pub fn order_translations(translations: &mut [ChapterTranslation], default_translation: Option<&str>) {
    translations.sort_by(|a, b| {
        let a_default = Some(a.label) == default_translation;
        let b_default = Some(b.label) == default_translation;
        b_default.cmp(&a_default).then_with(|| a.label.cmp(b.label))
    });
}

fn translation_html(chapter_num: u32, translation: &ChapterTranslation, active: bool) -> String {
    let active_class = if active { "active" } else { "" };
    let mut html = format!(
        "        <div class=\"translation-text {} {}\">\n",
        encode_double_quoted_attribute(&translation.label.to_lowercase()),
        active_class
    );
    for (verse_num, verse_text) in translation.chapter.verses() {
        html.push_str(&format!(
            "            <p data-verse=\"{}:{}\"><span class=\"verse-num\">{}</span> {}</p>\n",
            chapter_num,
            verse_num,
            verse_num,
            encode_text(verse_text)
        ));
    }
    html.push_str("        </div>\n");
    html
}

fn nav_link(file_name: Option<&str>, is_prev: bool) -> String {
    match file_name {
        Some(f) if is_prev => format!("<a href=\"{}\">← {}</a>", f, link_label(f)),
        Some(f) => format!("<a href=\"{}\">{} →</a>", f, link_label(f)),
        None => "<span></span>".to_string(),
    }
}

pub fn render_chapter_page(page: &ChapterPage, settings: &SiteSettings) -> Result<String> {
    let mut translations = page.translations.clone();
    order_translations(&mut translations, settings.default_translation.as_deref());

    let mut main_text_html = String::new();
    let mut translation_options = String::new();

    for (idx, translation) in translations.iter().enumerate() {
        main_text_html.push_str(&translation_html(page.chapter, translation, idx == 0));
        translation_options.push_str(&format!(
            "<option value=\"{}\">{}</option>",
            encode_double_quoted_attribute(&translation.label.to_lowercase()),
            encode_text(translation.label)
        ));
    }

    let ctx = TmplContext {
        site_title: encode_text(&settings.site_title).to_string(),
        site_description: encode_double_quoted_attribute(&settings.site_description).to_string(),
        site_domain: encode_text(&settings.site_domain).to_string(),
        book_name: encode_text(&page.book.name).to_string(),
        book_slug: page.book.slug(),
        chapter: page.chapter,
        translation_options,
        main_text_html,
        prev_link: nav_link(page.links.prev.as_deref(), true),
        next_link: nav_link(page.links.next.as_deref(), false),
    };

    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("chapter_html", CHAPTER_HTML)
        .map_err(|e| anyhow!("Template error in chapter.html: {}", e))?;

    tt.render("chapter_html", &ctx)
        .map_err(|e| anyhow!("Failed to render {} {}: {}", page.book.name, page.chapter, e))
}
