//! Page shell composition with Tera.
//!
//! Every page is produced by a fragment template that extends the shared base
//! layout (`_base.html`). A [`Composer`] knows where the shells live and which
//! helpers to bind; [`Composer::shell`] loads one fragment together with the
//! base and returns a [`Shell`] ready to render any number of contexts.
//!
//! # Helpers
//!
//! | Name                         | Kind     | Purpose                                  |
//! |------------------------------|----------|------------------------------------------|
//! | `is_static()`                | function | `true` for `build`, `false` for `serve`  |
//! | `live_reload_url()`          | function | WebSocket URL for reload (empty if static)|
//! | `read_json_array(path="..")` | function | Load a JSON array file from the site root |
//! | `format_date(format="..")`   | filter   | Reformat a `YYYY-MM-DD` string           |
//! | `safe`                       | filter   | Raw-HTML passthrough (Tera built-in)     |

use crate::{
    error::{Result, SiteError},
    utils::date::PublishDate,
};
use serde::Serialize;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tera::{Context, Filter, Function, Tera, Value};

/// Name of the shared base layout inside the shell directory.
pub const BASE: &str = "_base.html";

/// Default output format of the `format_date` filter.
const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y";

/// Whether pages are rendered for a static export or for the live server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Static,
    Live,
}

/// Loads page shells and binds template helpers.
#[derive(Debug, Clone)]
pub struct Composer {
    /// Directory holding `_base.html` and the fragment shells.
    pages: PathBuf,
    /// Root that `read_json_array` paths are resolved against.
    root: PathBuf,
    mode: RenderMode,
    reload_url: String,
}

impl Composer {
    pub fn new(pages: impl Into<PathBuf>, root: impl Into<PathBuf>, mode: RenderMode) -> Self {
        Self {
            pages: pages.into(),
            root: root.into(),
            mode,
            reload_url: String::new(),
        }
    }

    /// Set the URL returned by `live_reload_url()` (live mode only).
    pub fn with_reload_url(mut self, url: impl Into<String>) -> Self {
        if self.mode == RenderMode::Live {
            self.reload_url = url.into();
        }
        self
    }

    /// Load the base layout plus the fragment `name` and bind all helpers.
    pub fn shell(&self, name: &str) -> Result<Shell> {
        let composition = |source| SiteError::TemplateComposition {
            name: name.to_owned(),
            source,
        };

        let base = read_source(&self.pages.join(BASE)).map_err(composition)?;
        let fragment = read_source(&self.pages.join(name)).map_err(composition)?;

        let mut tera = Tera::default();
        self.bind_helpers(&mut tera);
        tera.add_raw_templates(vec![(BASE, base), (name, fragment)])
            .map_err(composition)?;

        Ok(Shell {
            tera,
            name: name.to_owned(),
        })
    }

    fn bind_helpers(&self, tera: &mut Tera) {
        let is_static = self.mode == RenderMode::Static;
        tera.register_function("is_static", move |_: &HashMap<String, Value>| {
            Ok(Value::Bool(is_static))
        });

        tera.register_function("live_reload_url", LiveReloadUrl(self.reload_url.clone()));

        let root = self.root.clone();
        tera.register_function("read_json_array", move |args: &HashMap<String, Value>| {
            read_json_array(&root, args)
        });

        tera.register_filter("format_date", FormatDate);
    }
}

/// `live_reload_url()`. Marked safe so the URL survives inside `<script>`.
struct LiveReloadUrl(String);

impl Function for LiveReloadUrl {
    fn call(&self, _: &HashMap<String, Value>) -> tera::Result<Value> {
        Ok(Value::String(self.0.clone()))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// A composed fragment + base layout, ready to render.
pub struct Shell {
    tera: Tera,
    name: String,
}

impl Shell {
    /// Render against `data`, which must serialize to a map.
    pub fn render(&self, data: &impl Serialize) -> Result<Vec<u8>> {
        let execution = |source| SiteError::TemplateExecution {
            name: self.name.clone(),
            source,
        };

        let context = Context::from_serialize(data).map_err(execution)?;
        self.tera
            .render(&self.name, &context)
            .map(String::into_bytes)
            .map_err(execution)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn read_source(path: &Path) -> tera::Result<String> {
    fs::read_to_string(path)
        .map_err(|err| tera::Error::chain(format!("cannot read `{}`", path.display()), err))
}

/// `read_json_array(path="data/projects.json")`
fn read_json_array(root: &Path, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let file = args
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("read_json_array: missing string argument `path`"))?;

    let path = root.join(file);
    let contents = fs::read(&path)
        .map_err(|err| tera::Error::chain(format!("cannot read `{}`", path.display()), err))?;
    let value: Value = serde_json::from_slice(&contents)
        .map_err(|err| tera::Error::chain(format!("invalid JSON in `{}`", path.display()), err))?;

    match value {
        Value::Array(_) => Ok(value),
        _ => Err(tera::Error::msg(format!(
            "`{}` does not contain a JSON array",
            path.display()
        ))),
    }
}

/// `{{ post.date | format_date(format="%d %b %Y") }}`
///
/// Safe, so separators like `/` in the format are not escaped.
struct FormatDate;

impl Filter for FormatDate {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let raw = value
            .as_str()
            .ok_or_else(|| tera::Error::msg("format_date: expected a date string"))?;
        let date = PublishDate::parse(raw)
            .ok_or_else(|| tera::Error::msg(format!("format_date: `{raw}` is not YYYY-MM-DD")))?;
        let fmt = args
            .get("format")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_DATE_FORMAT);

        date.format(fmt)
            .map(Value::String)
            .ok_or_else(|| tera::Error::msg(format!("format_date: invalid format `{fmt}`")))
    }

    fn is_safe(&self) -> bool {
        true
    }
}
