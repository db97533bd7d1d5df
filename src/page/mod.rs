//! Content pages.
//!
//! A page starts life as a markdown file in the content directory:
//!
//! ```text
//! posts/hello-world.md
//!     │
//!     ├── frontmatter::parse()  → title, date, body
//!     ├── markdown::render()    → HTML fragment
//!     └── Shell::render()       → full document bytes
//!                                   published at /hello-world.html
//! ```

pub mod frontmatter;
pub mod markdown;

use crate::{
    error::{Result, SiteError},
    template::Shell,
    utils::date::PublishDate,
};
use serde::Serialize;
use std::{fs, path::Path};

/// Extension of content documents (compared case-insensitively).
pub const CONTENT_EXT: &str = "md";

/// A rendered content page.
///
/// `document` is the composed output and is not exposed to templates.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub title: String,
    pub date: PublishDate,
    pub html: String,
    pub link: String,
    #[serde(skip)]
    pub document: Vec<u8>,
}

/// Context handed to the post shell.
#[derive(Serialize)]
struct PostContext<'a, S: Serialize> {
    post: &'a Page,
    site: &'a S,
}

impl Page {
    /// Read, parse and compose the document at `path` with the post `shell`.
    pub fn load(path: &Path, shell: &Shell, site: &impl Serialize) -> Result<Self> {
        let raw = fs::read(path).map_err(|err| SiteError::fs(path, err))?;
        let fm = frontmatter::parse(&raw, path)?;

        let mut page = Page {
            title: fm.title,
            date: fm.date,
            html: markdown::render(fm.body),
            link: link_for(path),
            document: Vec::new(),
        };
        page.document = shell.render(&PostContext { post: &page, site })?;

        Ok(page)
    }
}

/// Check whether `path` names a content document.
pub fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(CONTENT_EXT))
}

/// Output link for a content file: `posts/hello.md` → `/hello.html`.
pub fn link_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    format!("/{stem}.html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_for() {
        assert_eq!(link_for(Path::new("posts/hello-world.md")), "/hello-world.html");
        assert_eq!(link_for(Path::new("hello.MD")), "/hello.html");
        assert_eq!(link_for(Path::new("/abs/dir/a.b.md")), "/a.b.html");
    }

    #[test]
    fn test_link_for_is_deterministic() {
        let path = Path::new("posts/same.md");
        assert_eq!(link_for(path), link_for(path));
    }

    #[test]
    fn test_is_content_file() {
        assert!(is_content_file(Path::new("a.md")));
        assert!(is_content_file(Path::new("a.MD")));
        assert!(!is_content_file(Path::new("a.txt")));
        assert!(!is_content_file(Path::new("md")));
        assert!(!is_content_file(Path::new(".md.swp")));
    }

    #[test]
    fn test_page_serializes_without_document() {
        let page = Page {
            title: "T".into(),
            date: PublishDate::parse("2024-01-01").unwrap(),
            html: "<p>x</p>".into(),
            link: "/t.html".into(),
            document: b"full".to_vec(),
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["date"], "2024-01-01");
        assert!(json.get("document").is_none());
    }
}
