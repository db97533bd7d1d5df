//! Static export.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── compile_sass()       src/style.scss → public/style.css (non-fatal)
//!     ├── Assembler::assemble  full page set, nothing written yet
//!     └── export()
//!             ├── wipe + recreate output
//!             ├── index.html, 404.html, /<stem>.html ×N   (parallel)
//!             ├── public/ → <output>/public/
//!             └── extra files (favicon.ico, CNAME) → <output>/
//! ```
//!
//! Assembly happens before the output is touched, so a broken document
//! leaves the previous export in place.

use crate::{
    config::SiteConfig,
    error::SiteError,
    log,
    site::{Assembler, SitePageSet},
    template::RenderMode,
    utils::{exec, minify::minify},
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    process::Child,
};
use walkdir::WalkDir;

/// Files never copied out of the public directory
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Build the entire site into `[build] output`.
pub fn build_site(config: &SiteConfig) -> Result<()> {
    compile_sass(config);

    let set = Assembler::new(config, RenderMode::Static)
        .assemble()
        .context("Failed to assemble site")?;

    let output = &config.build.output;
    export(&set, output, config.build.minify)?;
    copy_dir(&config.build.public, &output.join("public"))?;
    copy_extra_files(&config.build.extra_files, output)?;

    log!("build"; "{} pages → {}", set.posts.len() + 2, output.display());
    Ok(())
}

/// Write a page set to `dest`, replacing whatever was there.
pub fn export(set: &SitePageSet, dest: &Path, minify_html: bool) -> Result<()> {
    if dest.exists() {
        fs::remove_dir_all(dest)
            .with_context(|| format!("Failed to clear output directory: {}", dest.display()))?;
    }
    fs::create_dir_all(dest).map_err(|err| SiteError::fs(dest, err))?;

    let mut documents: Vec<(PathBuf, &[u8])> = vec![
        (dest.join("index.html"), set.index.as_slice()),
        (dest.join("404.html"), set.not_found.as_slice()),
    ];
    documents.extend(
        set.posts
            .iter()
            .map(|post| (dest.join(post.link.trim_start_matches('/')), post.document.as_slice())),
    );

    documents.par_iter().try_for_each(|(path, html)| {
        fs::write(path, minify(html, minify_html)).map_err(|err| SiteError::fs(path, err))
    })?;

    Ok(())
}

/// Copy a directory tree. A missing source is skipped.
fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    if !src.is_dir() {
        log!("warn"; "{} not found, skipping", src.display());
        return Ok(());
    }

    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("Failed to read {}", src.display()))?;
        let name = entry.file_name().to_str().unwrap_or_default();
        if IGNORED_FILES.contains(&name) {
            continue;
        }

        let relative = entry.path().strip_prefix(src)?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|err| SiteError::fs(&target, err))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|err| SiteError::fs(entry.path(), err))?;
        }
    }

    Ok(())
}

/// Copy single files into the output root. Missing files are skipped.
fn copy_extra_files(files: &[PathBuf], dest: &Path) -> Result<()> {
    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        if !file.is_file() {
            log!("warn"; "{} not found, skipping", file.display());
            continue;
        }
        fs::copy(file, dest.join(name)).map_err(|err| SiteError::fs(file, err))?;
    }
    Ok(())
}

// ============================================================================
// Sass
// ============================================================================

/// `input:output` argument, relative to the root when possible.
fn sass_target(config: &SiteConfig) -> OsString {
    let root = config.get_root();
    let relative = |path: &Path| path.strip_prefix(root).unwrap_or(path).to_path_buf();

    let mut target = relative(&config.build.sass.input).into_os_string();
    target.push(":");
    target.push(relative(&config.build.sass.output));
    target
}

/// Whether sass should run at all, logging the reason when it should not.
fn sass_ready(config: &SiteConfig) -> bool {
    let sass = &config.build.sass;
    if !sass.enable || !sass.input.exists() {
        return false;
    }
    if !exec::is_installed(&sass.command) {
        log!("sass"; "`{}` not found, stylesheet not compiled", sass.command.join(" "));
        return false;
    }
    true
}

/// Compile the stylesheet once. Failures are logged, not returned.
pub fn compile_sass(config: &SiteConfig) {
    if !sass_ready(config) {
        return;
    }

    let args = [sass_target(config)];
    match exec::exec(
        Some(config.get_root()),
        &config.build.sass.command,
        &args,
        &exec::SASS_FILTER,
    ) {
        Ok(_) => log!("sass"; "{}", config.build.sass.output.display()),
        Err(err) => log!("error"; "{:#}", err),
    }
}

/// Start `sass --watch` in the background for live mode.
pub fn watch_sass(config: &SiteConfig) -> Option<Child> {
    if !sass_ready(config) {
        return None;
    }

    let args = [OsString::from("--watch"), sass_target(config)];
    match exec::spawn(Some(config.get_root()), &config.build.sass.command, &args) {
        Ok(child) => {
            log!("sass"; "watching {}", config.build.sass.input.display());
            Some(child)
        }
        Err(err) => {
            log!("error"; "{:#}", err);
            None
        }
    }
}
