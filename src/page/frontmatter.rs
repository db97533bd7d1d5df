//! Frontmatter extraction for content documents.
//!
//! A document must start with exactly this block:
//!
//! ```text
//! ---
//! title: Some title
//! date: 2024-06-01
//! ---
//! ```
//!
//! Everything after the closing marker line is the markdown body.

use crate::{
    error::{Result, SiteError},
    utils::date::PublishDate,
};
use regex::Regex;
use std::{path::Path, sync::LazyLock};

static FRONTMATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A---\r?\ntitle:[ \t]*([^\r\n]*)\r?\ndate:[ \t]*([^\r\n]*)\r?\n---\r?\n")
        .expect("frontmatter pattern is valid")
});

/// Metadata and body split out of a raw document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter<'a> {
    pub title: String,
    pub date: PublishDate,
    pub body: &'a str,
}

/// Split `raw` into title, date and body.
///
/// `path` is only used for error reporting.
pub fn parse<'a>(raw: &'a [u8], path: &Path) -> Result<Frontmatter<'a>> {
    let malformed = || SiteError::MalformedFrontmatter(path.to_path_buf());

    let text = std::str::from_utf8(raw).map_err(|_| malformed())?;
    let caps = FRONTMATTER.captures(text).ok_or_else(malformed)?;

    let block = caps.get(0).ok_or_else(malformed)?;
    let title = caps.get(1).map_or("", |m| m.as_str()).trim();
    let date = caps.get(2).map_or("", |m| m.as_str()).trim();

    let date = PublishDate::parse(date).ok_or_else(|| SiteError::InvalidDate {
        path: path.to_path_buf(),
        value: date.to_owned(),
    })?;

    Ok(Frontmatter {
        title: title.to_owned(),
        date,
        body: &text[block.end()..],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(s: &str) -> Result<Frontmatter<'_>> {
        parse(s.as_bytes(), Path::new("posts/test.md"))
    }

    #[test]
    fn test_parse_valid() {
        let fm = parse_str("---\ntitle: Hello World\ndate: 2024-06-01\n---\n# Body\n").unwrap();
        assert_eq!(fm.title, "Hello World");
        assert_eq!(fm.date, PublishDate::parse("2024-06-01").unwrap());
        assert_eq!(fm.body, "# Body\n");
    }

    #[test]
    fn test_parse_without_space_after_colon() {
        let fm = parse_str("---\ntitle:Tight\ndate:2024-01-01\n---\n").unwrap();
        assert_eq!(fm.title, "Tight");
        assert_eq!(fm.body, "");
    }

    #[test]
    fn test_parse_crlf() {
        let fm = parse_str("---\r\ntitle: Windows\r\ndate: 2024-01-01\r\n---\r\nbody").unwrap();
        assert_eq!(fm.title, "Windows");
        assert_eq!(fm.body, "body");
    }

    #[test]
    fn test_missing_block() {
        let err = parse_str("# Just markdown\n").unwrap_err();
        assert!(matches!(err, SiteError::MalformedFrontmatter(_)));
    }

    #[test]
    fn test_block_must_lead_document() {
        let err = parse_str("intro\n---\ntitle: Late\ndate: 2024-01-01\n---\n").unwrap_err();
        assert!(matches!(err, SiteError::MalformedFrontmatter(_)));
    }

    #[test]
    fn test_fields_out_of_order() {
        let err = parse_str("---\ndate: 2024-01-01\ntitle: Swapped\n---\n").unwrap_err();
        assert!(matches!(err, SiteError::MalformedFrontmatter(_)));
    }

    #[test]
    fn test_extra_field_is_malformed() {
        let err =
            parse_str("---\ntitle: A\ndate: 2024-01-01\ntags: x\n---\n").unwrap_err();
        assert!(matches!(err, SiteError::MalformedFrontmatter(_)));
    }

    #[test]
    fn test_invalid_date() {
        let err = parse_str("---\ntitle: Bad\ndate: 2024-13-40\n---\n").unwrap_err();
        match err {
            SiteError::InvalidDate { value, .. } => assert_eq!(value, "2024-13-40"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_utf8_is_malformed() {
        let err = parse(&[0xff, 0xfe, b'-'], Path::new("x.md")).unwrap_err();
        assert!(matches!(err, SiteError::MalformedFrontmatter(_)));
    }
}
