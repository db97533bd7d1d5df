//! Error taxonomy for the render-and-watch pipeline.
//!
//! Every fallible step of an assembly pass (parse, render, compose, filesystem)
//! returns a [`SiteError`]. The caller decides what a failure means:
//! the static build aborts the process, the live server answers with a 500.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors produced while assembling, exporting or watching a site.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("`{0}`: expected a `---` / `title:` / `date:` / `---` frontmatter block")]
    MalformedFrontmatter(PathBuf),

    #[error("`{path}`: invalid date `{value}`, expected YYYY-MM-DD")]
    InvalidDate { path: PathBuf, value: String },

    #[error("failed to compose template `{name}`")]
    TemplateComposition {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("failed to render template `{name}`")]
    TemplateExecution {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("IO error when accessing `{0}`")]
    Filesystem(PathBuf, #[source] io::Error),

    #[error("failed to watch `{0}`")]
    WatchSubscription(PathBuf, #[source] notify::Error),

    #[error("`{first}` and `{second}` both publish to `{link}`")]
    DuplicateLink {
        link: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl SiteError {
    /// Attach a path to an IO error.
    pub fn fs(path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self::Filesystem(path.into(), err)
    }
}

pub type Result<T, E = SiteError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_site_error_display() {
        let err = SiteError::fs("posts/a.md", Error::new(ErrorKind::NotFound, "missing"));
        let display = format!("{err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("posts/a.md"));

        let err = SiteError::InvalidDate {
            path: PathBuf::from("posts/b.md"),
            value: "2024-13-40".into(),
        };
        let display = format!("{err}");
        assert!(display.contains("2024-13-40"));
        assert!(display.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_duplicate_link_display() {
        let err = SiteError::DuplicateLink {
            link: "/hello.html".into(),
            first: PathBuf::from("posts/hello.md"),
            second: PathBuf::from("posts/hello.MD"),
        };
        assert!(err.to_string().contains("/hello.html"));
    }
}
