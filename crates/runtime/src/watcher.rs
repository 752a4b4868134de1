//! # Config Hot-Reloading
//!
//! Watches the run's config file with [`notify`] and flags changes over a
//! channel. The scheduler polls [`ConfigWatcher::changed`] between episodes,
//! so a reload never lands in the middle of one.
//!
//! The parent directory is watched rather than the file itself because many
//! editors save by replacing the file.

use std::ffi::OsString;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use tracing::{debug, error, info};

pub struct ConfigWatcher {
    // dropping the watcher stops notifications
    _watcher: RecommendedWatcher,
    changes: Receiver<()>,
}

impl ConfigWatcher {
    /// Start watching `path`.
    ///
    /// # Errors
    ///
    /// Fails if the path has no file name or the watcher cannot be created.
    pub fn start(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(OsString::from)
            .with_context(|| format!("config path {} has no file name", path.display()))?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let (sender, changes) = channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            handle_event(res, &file_name, &sender);
        })
        .context("failed to create config watcher")?;
        watcher
            .watch(directory, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", directory.display()))?;

        info!(path = %path.display(), "config watcher active");
        Ok(Self {
            _watcher: watcher,
            changes,
        })
    }

    /// Whether the file changed since the last call.
    pub fn changed(&self) -> bool {
        let mut changed = false;
        while self.changes.try_recv().is_ok() {
            changed = true;
        }
        changed
    }
}

fn handle_event(result: notify::Result<Event>, file_name: &OsString, sender: &Sender<()>) {
    let event = match result {
        Ok(event) => event,
        Err(err) => {
            error!("config watcher error: {err:?}");
            return;
        }
    };
    if !event.kind.is_modify() && !event.kind.is_create() {
        return;
    }
    if event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()))
    {
        debug!(paths = ?event.paths, "config file changed");
        // the receiver is gone once the run is over
        let _ = sender.send(());
    }
}
