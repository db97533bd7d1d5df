//! `[build]` section configuration.
//!
//! Source directories, the export destination, and the collaborator steps
//! (sass, asset copy) that run after pages are written.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in kiln.toml - directories and export settings.
///
/// All paths are relative to the project root and become absolute after
/// loading.
///
/// # Example
/// ```toml
/// [build]
/// content = "posts"    # Markdown documents
/// pages = "pages"      # _base.html, _post.html, index.html, 404.html
/// output = "dist"      # Wiped and regenerated on every build
/// minify = true
///
/// [build.sass]
/// input = "src/style.scss"
/// output = "public/style.css"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Markdown content directory.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Page shell directory.
    #[serde(default = "defaults::build::pages")]
    #[educe(Default = defaults::build::pages())]
    pub pages: PathBuf,

    /// Static assets, copied to `<output>/public`.
    #[serde(default = "defaults::build::public")]
    #[educe(Default = defaults::build::public())]
    pub public: PathBuf,

    /// Export destination.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Minify exported HTML.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,

    /// Single files copied to the output root when present.
    #[serde(default = "defaults::build::extra_files")]
    #[educe(Default = defaults::build::extra_files())]
    pub extra_files: Vec<PathBuf>,

    /// CSS preprocessor.
    #[serde(default)]
    pub sass: SassConfig,
}

/// `[build.sass]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SassConfig {
    /// Run sass at all. A missing binary is logged, not fatal.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Sass command and arguments
    #[serde(default = "defaults::build::sass::command")]
    #[educe(Default = defaults::build::sass::command())]
    pub command: Vec<String>,

    /// Stylesheet entry point
    #[serde(default = "defaults::build::sass::input")]
    #[educe(Default = defaults::build::sass::input())]
    pub input: PathBuf,

    /// Compiled stylesheet, usually inside the public directory
    #[serde(default = "defaults::build::sass::output")]
    #[educe(Default = defaults::build::sass::output())]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.build.content, PathBuf::from("posts"));
        assert_eq!(config.build.pages, PathBuf::from("pages"));
        assert_eq!(config.build.public, PathBuf::from("public"));
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert!(!config.build.minify);
        assert_eq!(
            config.build.extra_files,
            [PathBuf::from("favicon.ico"), PathBuf::from("CNAME")]
        );
    }

    #[test]
    fn test_build_paths_custom() {
        let config = r#"
            [build]
            content = "articles"
            pages = "layouts"
            output = "site"
            extra_files = []
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.content, PathBuf::from("articles"));
        assert_eq!(config.build.pages, PathBuf::from("layouts"));
        assert_eq!(config.build.output, PathBuf::from("site"));
        assert!(config.build.extra_files.is_empty());
        // untouched fields keep defaults
        assert_eq!(config.build.public, PathBuf::from("public"));
    }

    #[test]
    fn test_sass_config() {
        let config = r#"
            [build.sass]
            enable = false
            command = ["npx", "sass"]
            input = "styles/main.scss"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert!(!config.build.sass.enable);
        assert_eq!(config.build.sass.command, ["npx", "sass"]);
        assert_eq!(config.build.sass.input, PathBuf::from("styles/main.scss"));
        assert_eq!(config.build.sass.output, PathBuf::from("public/style.css"));
    }

    #[test]
    fn test_sass_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert!(config.build.sass.enable);
        assert_eq!(config.build.sass.command, ["sass"]);
        assert_eq!(config.build.sass.input, PathBuf::from("src/style.scss"));
    }

    #[test]
    fn test_unknown_field_rejection() {
        let result: Result<SiteConfig, _> = toml::from_str("[build]\ntypst = true\n");
        assert!(result.is_err());

        let result: Result<SiteConfig, _> = toml::from_str("[build.sass]\nwatch = true\n");
        assert!(result.is_err());

        // JSON data is addressed from the root by `read_json_array`
        let result: Result<SiteConfig, _> = toml::from_str("[build]\ndata = \"json\"\n");
        assert!(result.is_err());
    }
}
