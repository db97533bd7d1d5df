//! Site assembly.
//!
//! One assembly pass turns the current state of the content and shell
//! directories into a complete [`SitePageSet`]:
//!
//! ```text
//! assemble()
//!     │
//!     ├── discover()          posts/*.md, sorted by file name
//!     ├── Page::load() ×N     parse → markdown → _post.html  (parallel)
//!     ├── check_links()       every link unique
//!     ├── sort                newest first, stable on ties
//!     └── index.html, 404.html
//! ```
//!
//! A pass either produces a whole set or fails; nothing partial escapes.
//! [`SiteStore`] publishes finished sets with a single atomic swap so readers
//! always see a complete snapshot.

use crate::{
    config::{SiteConfig, SiteMeta},
    error::{Result, SiteError},
    page::{self, Page},
    template::{Composer, RenderMode},
};
use arc_swap::ArcSwapOption;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Shell for individual content pages.
pub const POST_SHELL: &str = "_post.html";
/// Shell for the landing page.
pub const INDEX_SHELL: &str = "index.html";
/// Shell for the not-found page.
pub const NOT_FOUND_SHELL: &str = "404.html";

/// Links owned by the index and not-found pages; no content page may take them.
const RESERVED_LINKS: [(&str, &str); 2] = [
    ("/index.html", INDEX_SHELL),
    ("/404.html", NOT_FOUND_SHELL),
];

/// Everything the site publishes, produced by one assembly pass.
#[derive(Debug)]
pub struct SitePageSet {
    /// Content pages, newest first.
    pub posts: Vec<Page>,
    pub index: Vec<u8>,
    pub not_found: Vec<u8>,
}

impl SitePageSet {
    /// Find the content page published at exactly `link`.
    pub fn find(&self, link: &str) -> Option<&Page> {
        self.posts.iter().find(|p| p.link == link)
    }
}

#[derive(Serialize)]
struct IndexContext<'a> {
    posts: &'a [Page],
    site: &'a SiteMeta,
}

#[derive(Serialize)]
struct SiteContext<'a> {
    site: &'a SiteMeta,
}

// ============================================================================
// Assembler
// ============================================================================

/// Builds [`SitePageSet`]s from the directories named in the config.
#[derive(Debug, Clone)]
pub struct Assembler {
    content: PathBuf,
    composer: Composer,
    site: SiteMeta,
}

impl Assembler {
    pub fn new(config: &SiteConfig, mode: RenderMode) -> Self {
        let composer = Composer::new(&config.build.pages, config.get_root(), mode)
            .with_reload_url(config.serve.reload_url());

        Self {
            content: config.build.content.clone(),
            composer,
            site: config.site.clone(),
        }
    }

    /// Run one full assembly pass.
    pub fn assemble(&self) -> Result<SitePageSet> {
        let sources = discover(&self.content)?;

        let post_shell = self.composer.shell(POST_SHELL)?;
        let mut posts = sources
            .par_iter()
            .map(|path| Page::load(path, &post_shell, &self.site))
            .collect::<Result<Vec<_>>>()?;

        check_links(&posts, &sources)?;

        // `sort_by` is stable, so equal dates keep discovery order
        posts.sort_by(|a, b| b.date.cmp(&a.date));

        let index = self.composer.shell(INDEX_SHELL)?.render(&IndexContext {
            posts: &posts,
            site: &self.site,
        })?;
        let not_found = self
            .composer
            .shell(NOT_FOUND_SHELL)?
            .render(&SiteContext { site: &self.site })?;

        Ok(SitePageSet {
            posts,
            index,
            not_found,
        })
    }
}

/// Content documents in `dir`, sorted by file name.
fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|err| SiteError::fs(dir, err))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| SiteError::fs(dir, err))?;
        let path = entry.path();
        let is_file = entry
            .file_type()
            .map_err(|err| SiteError::fs(&path, err))?
            .is_file();
        if is_file && page::is_content_file(&path) {
            paths.push(path);
        }
    }

    paths.sort();
    Ok(paths)
}

/// Reject two sources publishing to the same link, including the links of
/// the index and not-found pages.
///
/// `posts[i]` was loaded from `sources[i]`.
fn check_links(posts: &[Page], sources: &[PathBuf]) -> Result<()> {
    let mut seen: FxHashMap<&str, &Path> = RESERVED_LINKS
        .iter()
        .map(|&(link, shell)| (link, Path::new(shell)))
        .collect();
    for (post, source) in posts.iter().zip(sources) {
        if let Some(first) = seen.insert(post.link.as_str(), source) {
            return Err(SiteError::DuplicateLink {
                link: post.link.clone(),
                first: first.to_path_buf(),
                second: source.clone(),
            });
        }
    }
    Ok(())
}

// ============================================================================
// Snapshot store
// ============================================================================

/// Latest successfully assembled site, replaced wholesale on each pass.
pub struct SiteStore {
    current: ArcSwapOption<SitePageSet>,
}

impl Default for SiteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
        }
    }

    /// The last published snapshot, if any pass has succeeded yet.
    pub fn current(&self) -> Option<Arc<SitePageSet>> {
        self.current.load_full()
    }

    /// Assemble and publish a new snapshot.
    ///
    /// On failure the previous snapshot stays published.
    pub fn refresh(&self, assembler: &Assembler) -> Result<Arc<SitePageSet>> {
        let set = Arc::new(assembler.assemble()?);
        self.current.store(Some(Arc::clone(&set)));
        Ok(set)
    }
}
