//! Site configuration management for `kiln.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[site]`    | Metadata handed to every template as `site`      |
//! | `[build]`   | Source directories, output, minify, sass         |
//! | `[serve]`   | Live server (interface, ports, watch, static)    |
//!
//! The file is optional: every field has a default, so a bare directory
//! with `posts/` and `pages/` builds without any configuration.
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "My Blog"
//! url = "https://example.com"
//!
//! [build]
//! output = "dist"
//! minify = true
//!
//! [serve]
//! port = 8181
//! ```

mod build;
pub mod defaults;
mod error;
mod serve;
mod site;

pub use error::ConfigError;
pub use serve::StaticRoot;
pub use site::SiteMeta;

use build::BuildConfig;
use serve::ServeConfig;

use crate::{
    cli::{Cli, Commands},
    log,
};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file looked up in the root when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "kiln.toml";

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing kiln.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site metadata for templates
    #[serde(default)]
    pub site: SiteMeta,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Live server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let config = toml::from_str(&content)
            .map_err(|err| ConfigError::Toml(path.to_path_buf(), err))?;
        Ok(config)
    }

    /// Load, apply CLI overrides and validate.
    ///
    /// A missing config file is not an error; defaults apply.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            log!("config"; "{} not found, using defaults", config_path.display());
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;

        Ok(config)
    }

    /// Default configuration rooted at `root`, with every path resolved.
    pub fn with_root(root: &Path) -> Self {
        let mut config = Self::default();
        config.update_path_with_root(root, Path::new(DEFAULT_CONFIG));
        config
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());

        match &cli.command {
            Commands::Build { output, minify } => {
                Self::update_option(&mut self.build.output, output.as_ref());
                Self::update_option(&mut self.build.minify, minify.as_ref());
            }
            Commands::Serve {
                interface,
                port,
                reload_port,
            } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.reload_port, reload_port.as_ref());
            }
        }

        self.update_path_with_root(&root, &cli.config);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path, config_file: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        let resolve = |path: &Path| Self::normalize_path(&root.join(path));

        self.config_path = resolve(config_file);

        let build = &mut self.build;
        build.content = resolve(&build.content);
        build.pages = resolve(&build.pages);
        build.public = resolve(&build.public);
        build.output = resolve(&build.output);
        build.sass.input = resolve(&build.sass.input);
        build.sass.output = resolve(&build.sass.output);
        for file in &mut build.extra_files {
            *file = resolve(file.as_path());
        }

        for dir in &mut self.serve.watch {
            *dir = resolve(dir.as_path());
        }
        for static_root in &mut self.serve.static_roots {
            static_root.dir = resolve(&static_root.dir);
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration values that serde cannot check.
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.site.url
            && !url.starts_with("http")
        {
            bail!(ConfigError::Validation(
                "[site.url] must start with http:// or https://".into()
            ));
        }

        if self.build.sass.enable && self.build.sass.command.is_empty() {
            bail!(ConfigError::Validation(
                "[build.sass.command] must have at least one element".into()
            ));
        }

        if self.serve.port == self.serve.reload_port {
            bail!(ConfigError::Validation(format!(
                "[serve.port] and [serve.reload_port] are both {}",
                self.serve.port
            )));
        }

        for StaticRoot { prefix, .. } in &self.serve.static_roots {
            if !prefix.starts_with('/') || !prefix.ends_with('/') {
                bail!(ConfigError::Validation(format!(
                    "[serve.static_roots] prefix `{prefix}` must start and end with `/`"
                )));
            }
        }

        if self.build.output == Self::normalize_path(self.get_root()) {
            bail!(ConfigError::Validation(
                "[build.output] must not be the project root".into()
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
