//! Main-text extraction from article pages.
//!
//! Collects `<p>` text from the most specific container that has any:
//! `article`, then `main`, then the whole document.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};

static CONTAINER_PARAGRAPHS: Lazy<[Selector; 3]> = Lazy::new(|| {
    [
        Selector::parse("article p").unwrap(),
        Selector::parse("main p").unwrap(),
        Selector::parse("p").unwrap(),
    ]
});

/// Extract the main text of an article page.
///
/// Paragraphs are whitespace-normalized and separated by blank lines.
///
/// # Errors
///
/// [`Error::Resolution`] if no paragraph text is found.
pub fn extract_main_text(html: &str, url: &str) -> Result<String> {
    let document = Html::parse_document(html);

    for selector in CONTAINER_PARAGRAPHS.iter() {
        let paragraphs = document
            .select(selector)
            .map(element_text)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>();
        if !paragraphs.is_empty() {
            return Ok(paragraphs.join("\n\n"));
        }
    }

    Err(Error::resolution(url, "no paragraph text found"))
}

/// Text content of an element with runs of whitespace collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
