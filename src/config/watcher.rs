//! Configuration file watcher for hot reload.
//!
//! Watches the file's parent directory rather than the file itself: editors
//! that save by writing a temporary file and renaming it over the original
//! would otherwise leave the watch attached to a deleted inode.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::ServiceConfig;

/// Monitors one configuration file and emits validated configurations.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ServiceConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ServiceConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as updates are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_relevant(&event, &path) => {
                    tracing::info!(path = ?path, kind = ?event.kind, "Config file change detected, reloading");
                    match load_config(&path) {
                        Ok(config) => {
                            let _ = tx.send(config);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// A content change to the watched file itself.
fn is_relevant(event: &Event, path: &Path) -> bool {
    let changed = event.kind.is_modify() || event.kind.is_create();
    changed
        && event
            .paths
            .iter()
            .any(|p| p.file_name().is_some() && p.file_name() == path.file_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, EventKind, ModifyKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_relevant_events() {
        let target = Path::new("/etc/locale-router/config.toml");

        assert!(is_relevant(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/locale-router/config.toml"),
            target
        ));
        assert!(is_relevant(
            &event(EventKind::Create(CreateKind::File), "/etc/locale-router/config.toml"),
            target
        ));
        assert!(!is_relevant(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/locale-router/other.toml"),
            target
        ));
        assert!(!is_relevant(
            &event(EventKind::Remove(RemoveKind::File), "/etc/locale-router/config.toml"),
            target
        ));
    }

    #[tokio::test]
    async fn test_new_returns_connected_channel() {
        let (watcher, mut rx) = ConfigWatcher::new(Path::new("config.toml"));
        watcher.update_tx.send(ServiceConfig::default()).unwrap();
        assert!(rx.recv().await.is_some());
    }
}
