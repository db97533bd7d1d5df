//! Live reload endpoint.
//!
//! Browsers open `ws://<interface>:<reload_port>/ws` from the base shell.
//! Each connection gets its own [`Subscription`](crate::watch::Subscription):
//!
//! ```text
//! connect ──► handshake ──► subscribe() ── fails ──► 500, no upgrade
//!                               │
//!                               ▼
//!                          wait() ◄── cancel ── reader thread (socket EOF)
//!                               │
//!                     Changed ──┴──► "reload", close
//! ```
//!
//! One notification per connection; the page reloads and opens a new one.

use crate::{
    log,
    watch::{ChangeWatcher, Outcome},
};
use anyhow::{Context, Result, anyhow};
use std::{
    io::Read,
    net::{Shutdown, SocketAddr, TcpListener, TcpStream},
    thread::{self, JoinHandle},
};
use tungstenite::{
    Message,
    handshake::server::{ErrorResponse, Request, Response},
    http::StatusCode,
};

/// Path browsers subscribe on.
pub const RELOAD_PATH: &str = "/ws";

/// Text payload telling the browser to reload.
pub const RELOAD_MESSAGE: &str = "reload";

/// Accepts reload subscriptions, one thread per connection.
pub struct ReloadServer {
    listener: TcpListener,
    watcher: ChangeWatcher,
}

impl ReloadServer {
    pub fn bind(addr: SocketAddr, watcher: ChangeWatcher) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .with_context(|| format!("Failed to bind reload endpoint on {addr}"))?;
        Ok(Self { listener, watcher })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the accept loop on a background thread.
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    fn run(self) {
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    log!("reload"; "accept failed: {err}");
                    continue;
                }
            };
            let watcher = self.watcher.clone();
            thread::spawn(move || {
                if let Err(err) = handle_connection(stream, &watcher) {
                    log!("reload"; "{err:#}");
                }
            });
        }
    }
}

fn error_response(status: StatusCode, body: String) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(body));
    *response.status_mut() = status;
    response
}

/// Serve one subscription from handshake to close.
fn handle_connection(stream: TcpStream, watcher: &ChangeWatcher) -> Result<()> {
    let mut subscription = None;

    let callback = |request: &Request, response: Response| {
        if request.uri().path() != RELOAD_PATH {
            return Err(error_response(StatusCode::NOT_FOUND, "404 Not Found".into()));
        }
        match watcher.subscribe() {
            Ok(sub) => {
                subscription = Some(sub);
                Ok(response)
            }
            Err(err) => {
                log!("error"; "{err:#}");
                Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
            }
        }
    };

    let reader = stream.try_clone().context("Failed to clone reload socket")?;
    let mut websocket = tungstenite::accept_hdr(stream, callback)
        .map_err(|err| anyhow!("reload handshake failed: {err}"))?;

    let Some(subscription) = subscription else {
        return Ok(());
    };

    let canceller = subscription.canceller();
    thread::spawn(move || {
        watch_close(reader);
        canceller.cancel();
    });

    match subscription.wait() {
        Outcome::Changed(paths) => {
            if let Some(path) = paths.first() {
                log!("reload"; "{}", path.display());
            }
            websocket.send(Message::text(RELOAD_MESSAGE))?;
            // Best effort: the client may already be navigating away
            let _ = websocket.close(None);
            let _ = websocket.flush();
        }
        Outcome::Failed(err) => log!("reload"; "watch error: {err}"),
        Outcome::Cancelled => {}
    }

    // Wakes the reader thread if the client is still connected
    let _ = websocket.get_ref().shutdown(Shutdown::Both);
    Ok(())
}

/// Block until the client disconnects or sends a close frame.
///
/// Nothing the client sends is acted on, so frames are read raw and dropped.
fn watch_close(mut stream: TcpStream) {
    let mut buf = [0u8; 512];
    loop {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            // Close opcode in the first frame of this read
            Ok(_) if buf[0] & 0x0f == 0x8 => return,
            Ok(_) => {}
        }
    }
}
