//! HTML rendering of an [`Edition`].
//!
//! The page is a single document with Bootstrap from a CDN, one card per
//! article and a divider wherever the timeline placed a boundary. Under the
//! watermark policy a small script repeats the last-seen comparison against
//! the viewer's `localStorage`, using each card's `data-published`
//! attribute, then records the newest timestamp for the next visit.

use std::fmt::Write;

use crate::classifier::CurationPath;
use crate::models::{Edition, PageItem};
use crate::timeline::BoundaryPolicy;

const WATERMARK_SCRIPT: &str = r#"<script>
(function () {
  const KEY = "ai-news-last-seen";
  const cards = Array.from(document.querySelectorAll("[data-published]"));
  const stamps = cards.map(c => Date.parse(c.dataset.published)).filter(t => !isNaN(t));
  const lastSeen = Date.parse(localStorage.getItem(KEY) || "");
  if (!isNaN(lastSeen)) {
    document.querySelectorAll(".seen-boundary").forEach(el => el.remove());
    const first = cards.find(c => Date.parse(c.dataset.published) < lastSeen);
    if (first) {
      const marker = document.createElement("div");
      marker.className = "seen-boundary";
      marker.innerHTML = '<hr><p class="text-muted text-center">Already seen</p>';
      first.before(marker);
    }
  }
  if (stamps.length) {
    localStorage.setItem(KEY, new Date(Math.max(...stamps)).toISOString());
  }
})();
</script>
"#;

/// Render the complete page for `edition`.
pub fn render_page(edition: &Edition) -> String {
    let title = html_escape(&edition.title);
    let mut html = String::new();

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>{title}</title>
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <link rel="stylesheet"
        href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css">
</head>
<body>
<div class="container mt-5">
  <h1 class="mb-4">{title}</h1>
  <p class="text-muted">Generated {generated}</p>
"#,
        generated = html_escape(&edition.generated_at.format("%B %-d, %Y at %H:%M UTC").to_string()),
    );

    if edition.curation == CurationPath::FallbackUnfiltered {
        html.push_str(
            "  <div class=\"alert alert-warning\">No article matched the topic filter; showing all fetched articles.</div>\n",
        );
    }

    if edition.items.is_empty() {
        html.push_str("  <p>No AI-related articles found.</p>\n");
    }

    for item in &edition.items {
        if item.boundary_before {
            html.push_str(&boundary_marker(edition.boundary_policy));
        }
        html.push_str(&render_card(item));
    }

    html.push_str("</div>\n");
    if edition.boundary_policy == BoundaryPolicy::Watermark {
        html.push_str(WATERMARK_SCRIPT);
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn boundary_marker(policy: BoundaryPolicy) -> String {
    let label = match policy {
        BoundaryPolicy::Watermark => "Already seen",
        BoundaryPolicy::InactivityGap => "Earlier",
    };
    format!(
        "  <div class=\"seen-boundary\"><hr><p class=\"text-muted text-center\">{label}</p></div>\n"
    )
}

fn render_card(item: &PageItem) -> String {
    let title = html_escape(&item.title);
    let url = html_escape(&item.url);
    let mut card = String::new();

    let _ = writeln!(
        card,
        r#"  <div class="card mb-3" data-published="{}">"#,
        html_escape(&item.published_machine)
    );
    if let Some(image) = &item.image_url {
        let _ = writeln!(
            card,
            r#"    <img src="{}" class="card-img-top" alt="{title}">"#,
            html_escape(image)
        );
    }
    let _ = writeln!(card, r#"    <div class="card-body">"#);
    let _ = writeln!(card, r#"      <h5 class="card-title">{title}</h5>"#);
    if let Some(description) = &item.description {
        let _ = writeln!(
            card,
            r#"      <p class="card-text">{}</p>"#,
            html_escape(description)
        );
    }
    let _ = writeln!(card, "      <details>");
    let _ = writeln!(card, "        <summary>Full article</summary>");
    for paragraph in item.full_text.split("\n\n") {
        let _ = writeln!(card, "        <p>{}</p>", html_escape(paragraph));
    }
    let _ = writeln!(card, "      </details>");
    let _ = writeln!(
        card,
        r#"      <a href="{url}" target="_blank" rel="noopener" class="btn btn-primary">Read More</a>"#
    );
    let _ = writeln!(
        card,
        r#"      <p class="card-text"><small class="text-muted">{} &middot; <time datetime="{}">{}</time></small></p>"#,
        html_escape(&item.source_name),
        html_escape(&item.published_machine),
        html_escape(&item.published_display)
    );
    let _ = writeln!(card, "    </div>");
    let _ = writeln!(card, "  </div>");
    card
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
