use crate::book_registry::BookEntry;
use crate::helpers::{chapter_file_name, title_case};

/// File names of the neighbouring chapter pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterLinks {
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Previous and next chapter pages over an ordered book list.
///
/// Crossing a book boundary goes to the last chapter of the previous book or
/// the first chapter of the next one.
pub fn chapter_links(books: &[BookEntry], book_index: usize, chapter: u32) -> ChapterLinks {
    let Some(book) = books.get(book_index) else {
        return ChapterLinks::default();
    };

    let prev = if chapter > 1 {
        Some(chapter_file_name(&book.slug(), chapter - 1))
    } else if book_index > 0 {
        let prev_book = &books[book_index - 1];
        Some(chapter_file_name(&prev_book.slug(), prev_book.chapters))
    } else {
        None
    };

    let next = if chapter < book.chapters {
        Some(chapter_file_name(&book.slug(), chapter + 1))
    } else {
        books
            .get(book_index + 1)
            .map(|next_book| chapter_file_name(&next_book.slug(), 1))
    };

    ChapterLinks { prev, next }
}

/// "1-samuel-31.html" -> "1 Samuel 31"
pub fn link_label(file_name: &str) -> String {
    title_case(&file_name.replace(".html", "").replace('-', " "))
}
