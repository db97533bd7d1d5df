//! Live authoring server.
//!
//! Built on `tiny_http`, one worker thread per request:
//!
//! - `/favicon.ico` → 204
//! - static roots (`/public/`, `/src/`) → file from disk, no assembly
//! - anything else → full assembly pass, then `/` → index, a known link →
//!   its page, otherwise the not-found page with 404
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐   ┌──────────────────┐   ┌────────────────┐
//! │   HTTP server   │   │  Reload endpoint │   │  sass --watch  │
//! │  (serve_port)   │   │  (reload_port)   │   │  (background)  │
//! └────────┬────────┘   └────────┬─────────┘   └────────────────┘
//!          │                     │
//!          ▼                     ▼
//!   assemble per request   one Subscription per
//!   → SiteStore            browser connection
//! ```

use crate::{
    build::watch_sass,
    config::{SiteConfig, StaticRoot},
    log,
    reload::{RELOAD_PATH, ReloadServer},
    site::{Assembler, SiteStore},
    template::RenderMode,
    watch::ChangeWatcher,
};
use anyhow::{Context, Result, anyhow};
use std::{
    borrow::Cow,
    fs,
    net::{IpAddr, SocketAddr},
    path::{Component, Path, PathBuf},
    sync::Arc,
    thread,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the live server and the reload endpoint.
///
/// Blocks until Ctrl+C is received.
pub fn serve_site(config: &SiteConfig) -> Result<()> {
    let interface: IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid [serve.interface] `{}`", config.serve.interface))?;

    let reload = ReloadServer::bind(
        SocketAddr::new(interface, config.serve.reload_port),
        ChangeWatcher::from_config(config),
    )?;
    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    let site = Arc::new(LiveSite::new(config));
    if let Err(err) = site.store.refresh(&site.assembler) {
        log!("error"; "{err:#}");
    }
    if let Some(set) = site.store.current() {
        log!("serve"; "{} posts", set.posts.len());
    }

    let mut sass = watch_sass(config);
    let watched: Vec<_> = ChangeWatcher::from_config(config)
        .dirs()
        .iter()
        .map(|dir| dir.strip_prefix(config.get_root()).unwrap_or(dir).display().to_string())
        .collect();
    log!("watch"; "{}", watched.join(", "));
    log!("reload"; "ws://{}{}", reload.local_addr()?, RELOAD_PATH);
    reload.spawn();
    log!("serve"; "http://{}", addr);

    run(&server, &site);

    if let Some(child) = sass.as_mut() {
        child.kill().ok();
        child.wait().ok();
    }
    Ok(())
}

/// Dispatch requests until the server is unblocked.
fn run(server: &Server, site: &Arc<LiveSite>) {
    for request in server.incoming_requests() {
        let site = Arc::clone(site);
        thread::spawn(move || {
            if let Err(e) = handle_request(request, &site) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Routing
// ============================================================================

/// Everything a request handler needs, shared across worker threads.
pub struct LiveSite {
    assembler: Assembler,
    store: SiteStore,
    static_roots: Vec<StaticRoot>,
}

/// What to answer a request with.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    /// A file from a static root.
    File(PathBuf),
    /// A rendered document.
    Html(u16, Vec<u8>),
    /// Empty body with 204.
    NoContent,
    /// Plain 404 for static roots.
    NotFound,
    /// The assembly pass failed.
    Error(String),
}

impl LiveSite {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            assembler: Assembler::new(config, RenderMode::Live),
            store: SiteStore::new(),
            static_roots: config.serve.static_roots.clone(),
        }
    }

    /// Resolve a raw request URL.
    pub fn route(&self, url: &str) -> Reply {
        let path = request_path(url);

        if path == "/favicon.ico" {
            return Reply::NoContent;
        }

        if let Some((root, rest)) = self
            .static_roots
            .iter()
            .find_map(|root| path.strip_prefix(root.prefix.as_str()).map(|rest| (root, rest)))
        {
            return match resolve_static(&root.dir, rest) {
                Some(file) => Reply::File(file),
                None => Reply::NotFound,
            };
        }

        let set = match self.store.refresh(&self.assembler) {
            Ok(set) => set,
            Err(err) => {
                let err = anyhow::Error::from(err);
                log!("error"; "{err:#}");
                return Reply::Error(format!("{err:#}"));
            }
        };

        if path == "/" {
            return Reply::Html(200, set.index.clone());
        }
        match set.find(&path) {
            Some(page) => Reply::Html(200, page.document.clone()),
            None => Reply::Html(404, set.not_found.clone()),
        }
    }
}

/// Percent-decoded path with the query string removed.
fn request_path(url: &str) -> Cow<'_, str> {
    // Strip query string (e.g., ?t=123456) before resolving path
    let path = url.split(['?', '#']).next().unwrap_or(url);
    urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
}

/// Map the remainder of a static URL onto `dir`, refusing to leave it.
fn resolve_static(dir: &Path, rest: &str) -> Option<PathBuf> {
    let relative = Path::new(rest.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let file = dir.join(relative);
    file.is_file().then_some(file)
}

// ============================================================================
// Response Helpers
// ============================================================================

fn handle_request(request: Request, site: &LiveSite) -> Result<()> {
    match site.route(request.url()) {
        Reply::File(path) => serve_file(request, &path),
        Reply::Html(status, body) => serve_html(request, status, body),
        Reply::NoContent => Ok(request.respond(Response::empty(StatusCode(204)))?),
        Reply::NotFound => serve_text(request, 404, "404 Not Found".into()),
        Reply::Error(message) => serve_text(request, 500, message),
    }
}

fn content_type(value: &str) -> Result<Header> {
    Header::from_bytes("Content-Type", value).map_err(|()| anyhow!("invalid header: {value}"))
}

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let response = Response::from_data(content).with_header(content_type(guess_content_type(path))?);
    request.respond(response)?;
    Ok(())
}

/// Serve a rendered document.
fn serve_html(request: Request, status: u16, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(content_type("text/html; charset=utf-8")?);
    request.respond(response)?;
    Ok(())
}

fn serve_text(request: Request, status: u16, body: String) -> Result<()> {
    let response = Response::from_string(body)
        .with_status_code(StatusCode(status))
        .with_header(content_type("text/plain; charset=utf-8")?);
    request.respond(response)?;
    Ok(())
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("scss" | "sass") => "text/x-scss; charset=utf-8",
        Some("map") => "application/json; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",

        Some("txt") => "text/plain; charset=utf-8",

        // Default binary
        _ => "application/octet-stream",
    }
}
