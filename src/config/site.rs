//! `[site]` section configuration.
//!
//! Site-wide metadata. The whole section is handed to every page shell as
//! `site`, so templates can read `site.title` or `site.extra.whatever`.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `[site]` section in kiln.toml - metadata exposed to templates.
///
/// # Example
/// ```toml
/// [site]
/// title = "Jane's Notes"
/// author = "Jane"
/// url = "https://jane.example"
///
/// [site.extra]
/// github = "https://github.com/jane"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteMeta {
    /// Site title for `<title>` and headers.
    #[serde(default = "defaults::site::title")]
    #[educe(Default = defaults::site::title())]
    pub title: String,

    /// Short description for meta tags.
    #[serde(default)]
    pub description: String,

    #[serde(default = "defaults::site::author")]
    #[educe(Default = defaults::site::author())]
    pub author: String,

    /// Public URL of the deployed site.
    #[serde(default)]
    pub url: Option<String>,

    /// BCP 47 language code for `<html lang>`.
    #[serde(default = "defaults::site::language")]
    #[educe(Default = defaults::site::language())]
    pub language: String,

    /// Free-form values for templates. Sorted so renders are reproducible.
    #[serde(default)]
    pub extra: BTreeMap<String, toml::Value>,
}
