//! Optional workspace watcher for the interactive shell.
//!
//! notify delivers events on its own thread. Created and modified files are
//! recorded in the session through the shared manager (only while the
//! session's `watch_enabled` flag is on) and forwarded over a channel that the
//! shell drains between inputs.

use std::fmt;
use std::path::Path;
use std::sync::mpsc::{self, Receiver};

use notify::event::{EventKind, ModifyKind};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use waypoint_core::config::WatchConfig;
use waypoint_core::manager::SharedManager;
use waypoint_core::paths::relative_to;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Created => "created",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub kind: ChangeKind,
    /// Relative to the workspace.
    pub path: String,
}

pub struct WorkspaceWatcher {
    _watcher: RecommendedWatcher,
    event_rx: Receiver<Change>,
}

impl WorkspaceWatcher {
    pub fn start(manager: SharedManager, ignore: WatchConfig) -> notify::Result<Self> {
        let root = match manager.lock() {
            Ok(m) => m.workspace().to_path_buf(),
            Err(poisoned) => poisoned.into_inner().workspace().to_path_buf(),
        };
        // Events arrive with canonical paths on some platforms.
        let root = root.canonicalize().unwrap_or(root);
        let (tx, rx) = mpsc::channel();
        let handler_root = root.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("watch error: {e}");
                        return;
                    }
                };
                let Some(kind) = change_kind(&event.kind) else {
                    return;
                };
                for path in &event.paths {
                    if let Some(change) = record(&manager, &handler_root, &ignore, path, kind) {
                        let _ = tx.send(change);
                    }
                }
            },
            Config::default(),
        )?;
        watcher.watch(&root, RecursiveMode::Recursive)?;
        tracing::info!(root = %root.display(), "watching workspace");

        Ok(Self {
            _watcher: watcher,
            event_rx: rx,
        })
    }

    /// Drain pending changes without blocking.
    pub fn poll_events(&self) -> Vec<Change> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }
}

fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        _ => None,
    }
}

/// Filter one event path and, for created or modified files, record it in the
/// session. Takes the manager lock only for the duration of the update.
fn record(
    manager: &SharedManager,
    root: &Path,
    ignore: &WatchConfig,
    path: &Path,
    kind: ChangeKind,
) -> Option<Change> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    if ignore.is_ignored(relative) || path.is_dir() {
        return None;
    }
    let rel = relative_to(root, path);

    if kind != ChangeKind::Deleted {
        if let Ok(mut m) = manager.lock() {
            let watching = m.state().is_some_and(|s| s.watch_enabled);
            if watching {
                if let Err(e) = m.add_file_touched(&rel) {
                    tracing::warn!("could not record {rel}: {e}");
                }
            }
        }
    }

    Some(Change { kind, path: rel })
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, RemoveKind};
    use tempfile::TempDir;
    use waypoint_core::manager::StateManager;

    fn shared(dir: &TempDir, watching: bool) -> SharedManager {
        let mut m = StateManager::new(dir.path());
        m.create_initial_state("watch", None, None).unwrap();
        m.set_watch(watching).unwrap();
        m.into_shared()
    }

    #[test]
    fn kinds() {
        assert_eq!(
            change_kind(&EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Created)
        );
        assert_eq!(
            change_kind(&EventKind::Remove(RemoveKind::File)),
            Some(ChangeKind::Deleted)
        );
        assert_eq!(change_kind(&EventKind::Any), None);
    }

    #[test]
    fn records_file_when_watching() {
        let dir = TempDir::new().unwrap();
        let m = shared(&dir, true);
        let file = dir.path().join("main.rs");
        std::fs::write(&file, "fn main() {}").unwrap();

        let change = record(&m, dir.path(), &WatchConfig::default(), &file, ChangeKind::Created);
        assert_eq!(change.unwrap().path, "main.rs");
        let guard = m.lock().unwrap();
        assert_eq!(guard.state().unwrap().files_touched, vec!["main.rs"]);
    }

    #[test]
    fn reports_but_does_not_record_when_off() {
        let dir = TempDir::new().unwrap();
        let m = shared(&dir, false);
        let file = dir.path().join("main.rs");
        std::fs::write(&file, "").unwrap();

        let change = record(&m, dir.path(), &WatchConfig::default(), &file, ChangeKind::Modified);
        assert!(change.is_some());
        assert!(m.lock().unwrap().state().unwrap().files_touched.is_empty());
    }

    #[test]
    fn ignores_state_dir() {
        let dir = TempDir::new().unwrap();
        let m = shared(&dir, true);
        let state = dir.path().join(".waypoint/state.json");
        let change = record(&m, dir.path(), &WatchConfig::default(), &state, ChangeKind::Modified);
        assert!(change.is_none());
    }
}
