//! `[serve]` section configuration.
//!
//! Contains live server and reload endpoint settings.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

/// `[serve]` section in kiln.toml - live server settings.
///
/// # Example
/// ```toml
/// [serve]
/// interface = "0.0.0.0"   # Listen on all interfaces
/// port = 3000
/// reload_port = 3001      # WebSocket endpoint for live reload
/// watch = ["posts", "pages"]
///
/// [[serve.static_roots]]
/// prefix = "/img/"
/// dir = "images"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    #[serde(default = "defaults::serve::interface")]
    #[educe(Default = defaults::serve::interface())]
    pub interface: String,

    /// HTTP port number (default: 8181).
    #[serde(default = "defaults::serve::port")]
    #[educe(Default = defaults::serve::port())]
    pub port: u16,

    /// WebSocket port for reload subscriptions (default: 8182).
    #[serde(default = "defaults::serve::reload_port")]
    #[educe(Default = defaults::serve::reload_port())]
    pub reload_port: u16,

    /// Directories whose changes trigger a browser reload.
    #[serde(default = "defaults::serve::watch")]
    #[educe(Default = defaults::serve::watch())]
    pub watch: Vec<PathBuf>,

    /// URL prefixes served straight from disk, without an assembly pass.
    #[serde(default = "defaults::serve::static_roots")]
    #[educe(Default = defaults::serve::static_roots())]
    pub static_roots: Vec<StaticRoot>,
}

/// One `[[serve.static_roots]]` entry: `/public/x.png` → `public/x.png`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticRoot {
    /// URL prefix, starting and ending with `/`.
    pub prefix: String,
    /// Directory the prefix maps to.
    pub dir: PathBuf,
}

impl ServeConfig {
    /// WebSocket URL the base shell subscribes to in live mode.
    ///
    /// A wildcard interface is reached through `localhost`; IPv6 hosts are
    /// bracketed.
    pub fn reload_url(&self) -> String {
        let host = match self.interface.parse::<IpAddr>() {
            Ok(ip) if ip.is_unspecified() => format!("localhost:{}", self.reload_port),
            Ok(ip) => SocketAddr::new(ip, self.reload_port).to_string(),
            Err(_) => format!("{}:{}", self.interface, self.reload_port),
        };
        format!("ws://{host}/ws")
    }
}
