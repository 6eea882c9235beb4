//! Original-publisher discovery on preview-only aggregator pages.
//!
//! Aggregators such as BizToc publish a teaser and a link back to the story
//! they picked up. The link is recognised by its anchor text ("This story
//! appeared on ...", "Original article", ...), which is fragile by nature, so
//! it lives here on its own.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use super::extract::element_text;

static ANCHORS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Find the original-publisher link on an aggregator page.
///
/// The first anchor whose text contains one of `phrases` (case-insensitive)
/// wins. Relative hrefs are resolved against `page_url`; only `http(s)`
/// targets other than the page itself are returned.
pub fn find_original_link(html: &str, page_url: &str, phrases: &[String]) -> Option<String> {
    let base = Url::parse(page_url).ok()?;
    let phrases = phrases
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>();
    if phrases.is_empty() {
        return None;
    }

    let document = Html::parse_document(html);
    document
        .select(&ANCHORS)
        .filter(|a| {
            let text = element_text(*a).to_lowercase();
            phrases.iter().any(|p| text.contains(p.as_str()))
        })
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .find(|target| matches!(target.scheme(), "http" | "https") && *target != base)
        .map(|target| target.to_string())
}

/// Short body used when the original publisher cannot be reached.
pub fn attribution(page_url: &str) -> String {
    format!("Full story available at {page_url}")
}
