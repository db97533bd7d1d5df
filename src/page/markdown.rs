//! Markdown → HTML conversion.
//!
//! The extension profile is fixed: tables, footnotes, strikethrough,
//! definition lists, smart punctuation, `{#id}` heading attributes,
//! auto-generated heading ids, and `target="_blank"` on links that leave the
//! site.
//!
//! Output is not sanitized. Content comes from the site author and is embedded
//! verbatim by the page shells.

use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, html::push_html};
use pulldown_cmark_escape::{escape_href, escape_html};
use rustc_hash::FxHashSet;

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_DEFINITION_LIST
        | Options::ENABLE_SMART_PUNCTUATION
}

/// Render a markdown body to an HTML fragment.
pub fn render(body: &str) -> String {
    let parser = Parser::new_ext(body, options());
    let events = open_external_links(assign_heading_ids(parser));

    let mut html = String::with_capacity(body.len() * 3 / 2);
    push_html(&mut html, events.into_iter());
    html
}

// ============================================================================
// Heading ids
// ============================================================================

/// Give every heading without an explicit `{#id}` an id derived from its text.
///
/// Repeated slugs get `-1`, `-2`, ... suffixes so ids stay unique per document.
fn assign_heading_ids<'a>(parser: Parser<'a>) -> Vec<Event<'a>> {
    let mut events = Vec::new();
    let mut seen = FxHashSet::default();
    let mut heading: Option<(usize, String)> = None;

    for event in parser {
        match &event {
            Event::Start(Tag::Heading { id, .. }) => {
                if let Some(id) = id {
                    seen.insert(id.to_string());
                }
                heading = Some((events.len(), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = heading.as_mut() {
                    buf.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((start, text)) = heading.take()
                    && let Some(Event::Start(Tag::Heading { id, .. })) = events.get_mut(start)
                    && id.is_none()
                {
                    let slug = unique_slug(&slugify(&text), &mut seen);
                    if !slug.is_empty() {
                        *id = Some(CowStr::from(slug));
                    }
                }
            }
            _ => {}
        }
        events.push(event);
    }

    events
}

fn unique_slug(base: &str, seen: &mut FxHashSet<String>) -> String {
    if base.is_empty() {
        return String::new();
    }
    let mut candidate = base.to_owned();
    let mut n = 0;
    while !seen.insert(candidate.clone()) {
        n += 1;
        candidate = format!("{base}-{n}");
    }
    candidate
}

/// Lowercase alphanumerics, every other run of characters becomes one `-`.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut prev_hyphen = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            prev_hyphen = false;
        } else if !prev_hyphen {
            slug.push('-');
            prev_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

// ============================================================================
// Links
// ============================================================================

/// Links that stay on the site: fragments, root-relative and `./`, `../` paths.
fn is_relative_link(url: &str) -> bool {
    url.is_empty()
        || url.starts_with('#')
        || (url.starts_with('/') && !url.starts_with("//"))
        || url.starts_with("./")
        || url.starts_with("../")
}

/// Rewrite non-relative links as raw `<a ... target="_blank">` tags.
fn open_external_links(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut rewritten = Vec::new();

    for event in events {
        match event {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            }) if !is_relative_link(&dest_url) => {
                let mut tag = String::from("<a href=\"");
                if link_type == LinkType::Email {
                    tag.push_str("mailto:");
                }
                let _ = escape_href(&mut tag, &dest_url);
                tag.push('"');
                if !title.is_empty() {
                    tag.push_str(" title=\"");
                    let _ = escape_html(&mut tag, &title);
                    tag.push('"');
                }
                tag.push_str(" target=\"_blank\">");
                rewritten.push(true);
                out.push(Event::InlineHtml(tag.into()));
            }
            Event::Start(tag @ Tag::Link { .. }) => {
                rewritten.push(false);
                out.push(Event::Start(tag));
            }
            Event::End(TagEnd::Link) => {
                if rewritten.pop().unwrap_or(false) {
                    out.push(Event::InlineHtml("</a>".into()));
                } else {
                    out.push(Event::End(TagEnd::Link));
                }
            }
            other => out.push(other),
        }
    }

    out
}
