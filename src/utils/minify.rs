//! HTML minification for exported pages.
//!
//! Live mode never minifies; static exports do when `[build] minify = true`.

use std::borrow::Cow;

/// Minify an HTML document when `enabled`.
///
/// Returns `Cow::Borrowed` if minify disabled, `Cow::Owned` if minified.
pub fn minify(html: &[u8], enabled: bool) -> Cow<'_, [u8]> {
    if enabled {
        Cow::Owned(minify_html_inner(html))
    } else {
        Cow::Borrowed(html)
    }
}

/// Minify HTML content using `minify_html` crate.
fn minify_html_inner(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    minify_html::minify(html, &cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_removes_whitespace() {
        let html = b"<html>\n  <head>\n  </head>\n  <body>\n    <p>Hello</p>\n  </body>\n</html>";
        let result = minify(html, true);
        let result_str = String::from_utf8_lossy(&result);

        assert!(!result_str.contains("\n  "));
        assert!(result_str.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_minify_keeps_closing_tags() {
        let result = minify(b"<ul><li>a</li><li>b</li></ul>", true);
        assert_eq!(&*result, b"<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_minify_strips_comments() {
        let result = minify(b"<p>kept</p><!-- dropped -->", true);
        let result_str = String::from_utf8_lossy(&result);

        assert!(result_str.contains("kept"));
        assert!(!result_str.contains("dropped"));
    }

    #[test]
    fn test_minify_disabled_borrows() {
        let html = b"<html>\n  <body>\n  </body>\n</html>";
        let result = minify(html, false);

        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(&*result, html);
    }

    #[test]
    fn test_minify_is_deterministic() {
        let html = b"<html>\n<body>\n<h1 id=\"a\">T</h1>\n<p>x  y</p>\n</body>\n</html>";
        assert_eq!(minify(html, true), minify(html, true));
    }
}
