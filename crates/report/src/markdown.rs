use chrono::NaiveDate;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

use crate::{ExportArtifact, ExportFormat};

/// The report text as a `.md` download, byte for byte.
pub fn markdown_export(report: &str, date: NaiveDate) -> ExportArtifact {
    ExportArtifact::new(ExportFormat::Markdown, date, report.as_bytes().to_vec())
}

/// Link and image targets allowed through to the preview. URLs without a
/// scheme are relative and always allowed.
const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// HTML preview of the report. Tables are enabled; raw HTML in the model
/// output is escaped rather than passed through, and link or image targets
/// with any other scheme (`javascript:`, `data:`) are emptied.
pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed(""),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed(""),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn is_safe_url(url: &str) -> bool {
    let url = url.trim_start();
    match url.find([':', '/', '?', '#']) {
        Some(end) if url[end..].starts_with(':') => {
            let scheme = &url[..end];
            SAFE_SCHEMES.iter().any(|s| scheme.eq_ignore_ascii_case(s))
        }
        _ => true,
    }
}
