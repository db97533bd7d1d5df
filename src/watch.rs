//! Single-shot change notification.
//!
//! A [`Subscription`] watches the configured source directories and resolves
//! exactly once: on the first qualifying change, on a watch error, or when
//! it is cancelled. Waiting consumes the subscription, which drops the
//! underlying watcher, so nothing is delivered afterwards.
//!
//! ```text
//! subscribe() ──► notify watcher ──► mpsc ──► wait() ──► Outcome
//!                                      ▲
//!                    Canceller::cancel()┘
//! ```

use crate::{
    config::SiteConfig,
    error::{Result, SiteError},
};
use notify::{
    Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
    event::ModifyKind,
};
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{Receiver, Sender, channel},
};

/// How a subscription ended.
#[derive(Debug)]
pub enum Outcome {
    /// A qualifying change, with the paths the event reported.
    Changed(Vec<PathBuf>),
    /// The subscriber went away first.
    Cancelled,
    /// The watcher reported an error; no change is delivered.
    Failed(notify::Error),
}

enum Signal {
    Event(notify::Result<Event>),
    Cancel,
}

/// Creates subscriptions over a fixed set of directories.
#[derive(Debug, Clone)]
pub struct ChangeWatcher {
    dirs: Vec<PathBuf>,
}

impl ChangeWatcher {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Watch `[serve] watch`.
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.serve.watch.clone())
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Start watching every directory.
    ///
    /// Fails with [`SiteError::WatchSubscription`] if any directory is
    /// missing or cannot be watched; nothing is left registered in that case.
    pub fn subscribe(&self) -> Result<Subscription> {
        let (tx, rx) = channel();

        let event_tx = tx.clone();
        let mut watcher = notify::recommended_watcher(move |res| {
            // The receiver is gone once the subscription resolved
            let _ = event_tx.send(Signal::Event(res));
        })
        .map_err(|err| SiteError::WatchSubscription(PathBuf::new(), err))?;

        for dir in &self.dirs {
            if !dir.is_dir() {
                let err = notify::Error::path_not_found().add_path(dir.clone());
                return Err(SiteError::WatchSubscription(dir.clone(), err));
            }
            watcher
                .watch(dir, RecursiveMode::Recursive)
                .map_err(|err| SiteError::WatchSubscription(dir.clone(), err))?;
        }

        Ok(Subscription {
            _watcher: watcher,
            tx,
            rx,
        })
    }
}

/// An armed, not yet resolved watch.
pub struct Subscription {
    _watcher: RecommendedWatcher,
    tx: Sender<Signal>,
    rx: Receiver<Signal>,
}

/// Ends a pending [`Subscription::wait`] from another thread.
#[derive(Clone)]
pub struct Canceller(Sender<Signal>);

impl Canceller {
    pub fn cancel(&self) {
        // Already resolved if the receiver is gone
        let _ = self.0.send(Signal::Cancel);
    }
}

impl Subscription {
    pub fn canceller(&self) -> Canceller {
        Canceller(self.tx.clone())
    }

    /// Block until the subscription resolves.
    pub fn wait(self) -> Outcome {
        for signal in &self.rx {
            match signal {
                Signal::Cancel => return Outcome::Cancelled,
                Signal::Event(Err(err)) => return Outcome::Failed(err),
                Signal::Event(Ok(event)) if is_relevant(&event) => {
                    return Outcome::Changed(event.paths);
                }
                Signal::Event(Ok(_)) => {}
            }
        }
        // `self.tx` keeps the channel open, so this is unreachable in practice
        Outcome::Cancelled
    }
}

/// Creations, removals, content or name changes. Access and pure metadata
/// (permission, timestamp) events do not count.
pub const fn is_qualifying(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Any => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        EventKind::Access(_) | EventKind::Other => false,
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp") || name.ends_with('~')
}

fn is_relevant(event: &Event) -> bool {
    is_qualifying(&event.kind)
        && (event.paths.is_empty() || event.paths.iter().any(|p| !is_temp_file(p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};
    use std::{fs, thread, time::Duration};
    use tempfile::tempdir;

    #[test]
    fn test_qualifying_events() {
        assert!(is_qualifying(&EventKind::Create(CreateKind::File)));
        assert!(is_qualifying(&EventKind::Remove(RemoveKind::Any)));
        assert!(is_qualifying(&EventKind::Modify(ModifyKind::Data(DataChange::Content))));
        assert!(is_qualifying(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))));
        assert!(is_qualifying(&EventKind::Any));

        assert!(!is_qualifying(&EventKind::Modify(ModifyKind::Metadata(
            MetadataKind::Permissions
        ))));
        assert!(!is_qualifying(&EventKind::Access(AccessKind::Any)));
        assert!(!is_qualifying(&EventKind::Other));
    }

    #[test]
    fn test_editor_artifacts_ignored() {
        let event = |name: &str| {
            Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from(name))
        };
        assert!(is_relevant(&event("posts/a.md")));
        assert!(!is_relevant(&event("posts/.a.md.swp")));
        assert!(!is_relevant(&event("posts/a.md~")));
        assert!(is_relevant(&Event::new(EventKind::Any)));
    }

    #[test]
    fn test_missing_directory_fails_subscription() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("data");
        let watcher = ChangeWatcher::new(vec![dir.path().to_path_buf(), missing.clone()]);

        let err = watcher.subscribe().err().unwrap();
        assert!(matches!(err, SiteError::WatchSubscription(ref p, _) if *p == missing));
    }

    #[test]
    fn test_single_change_resolves_once() {
        let dir = tempdir().unwrap();
        let watcher = ChangeWatcher::new(vec![dir.path().to_path_buf()]);
        let subscription = watcher.subscribe().unwrap();

        let target = dir.path().join("new.md");
        let writer = {
            let target = target.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(200));
                fs::write(&target, "first").unwrap();
            })
        };

        match subscription.wait() {
            Outcome::Changed(paths) => {
                assert!(paths.iter().any(|p| p.file_name() == target.file_name()));
            }
            other => panic!("expected a change, got {other:?}"),
        }
        writer.join().unwrap();

        // The subscription is gone; a second change has nowhere to go, and a
        // fresh subscription only sees changes made after it was opened.
        let again = watcher.subscribe().unwrap();
        let canceller = again.canceller();
        canceller.cancel();
        fs::write(&target, "second").unwrap();
        assert!(matches!(again.wait(), Outcome::Cancelled));
    }

    #[test]
    fn test_cancel_unblocks_wait() {
        let dir = tempdir().unwrap();
        let subscription = ChangeWatcher::new(vec![dir.path().to_path_buf()])
            .subscribe()
            .unwrap();
        let canceller = subscription.canceller();

        let waiter = thread::spawn(move || subscription.wait());
        thread::sleep(Duration::from_millis(100));
        canceller.cancel();

        assert!(matches!(waiter.join().unwrap(), Outcome::Cancelled));
        // Cancelling a resolved subscription is harmless
        canceller.cancel();
    }

    #[test]
    fn test_from_config_uses_watch_list() {
        let dir = tempdir().unwrap();
        let config = SiteConfig::with_root(dir.path());
        let watcher = ChangeWatcher::from_config(&config);

        assert_eq!(watcher.dirs().len(), 4);
        assert!(watcher.dirs().iter().all(|d| d.starts_with(config.get_root())));
    }
}
