//! Dependency watcher for watch mode.
//!
//! Watches the directories that hold the bundle's inputs (non-recursively) and reports
//! changes to the input files themselves. When the bundler reports no inputs the entry's
//! directory is watched recursively instead.

use crate::Result;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use path_clean::PathClean;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Default debounce window for repeated events on the same file.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
enum WatchFilter {
    /// Only these files.
    Inputs(HashSet<PathBuf>),
    /// Anything below this directory.
    Under(PathBuf),
}

impl WatchFilter {
    fn matches(&self, path: &Path) -> bool {
        match self {
            WatchFilter::Inputs(inputs) => inputs.contains(path),
            WatchFilter::Under(dir) => path.starts_with(dir) && !is_hidden(path, dir),
        }
    }
}

fn is_hidden(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root)
        .map(|rel| {
            rel.components().any(|c| {
                c.as_os_str()
                    .to_str()
                    .is_some_and(|name| name.starts_with('.') || name == "node_modules")
            })
        })
        .unwrap_or(true)
}

/// Resolve symlinks so event paths and input paths compare equal. Files that no longer
/// exist are resolved through their parent directory.
pub fn normalize(path: &Path) -> PathBuf {
    if let Ok(real) = path.canonicalize() {
        return real;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or_else(|_| path.to_path_buf().clean()),
        _ => path.to_path_buf().clean(),
    }
}

/// Watches the files a bundle was built from.
pub struct DependencyWatcher {
    watcher: RecommendedWatcher,
    watched: BTreeMap<PathBuf, RecursiveMode>,
    filter: Arc<RwLock<WatchFilter>>,
}

impl std::fmt::Debug for DependencyWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyWatcher")
            .field("watched", &self.watched)
            .finish_non_exhaustive()
    }
}

impl DependencyWatcher {
    /// Create a watcher that watches nothing yet.
    ///
    /// Changed input paths arrive on the returned receiver. The channel is bounded; when it
    /// is full a rebuild is already pending and further events are dropped.
    pub fn new(debounce: Duration) -> Result<(Self, mpsc::Receiver<PathBuf>)> {
        let (tx, rx) = mpsc::channel(100);
        let filter = Arc::new(RwLock::new(WatchFilter::Inputs(HashSet::new())));
        let callback_filter = Arc::clone(&filter);
        let mut last_event: Option<(PathBuf, Instant)> = None;

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("File watcher error: {}", e);
                    return;
                }
            };
            if !matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                return;
            }

            for path in &event.paths {
                let path = normalize(path);
                if !callback_filter.read().matches(&path) {
                    continue;
                }

                let now = Instant::now();
                if let Some((last_path, last_time)) = &last_event {
                    if *last_path == path && now.duration_since(*last_time) < debounce {
                        continue;
                    }
                }
                last_event = Some((path.clone(), now));

                let _ = tx.try_send(path);
            }
        })?;

        Ok((
            Self {
                watcher,
                watched: BTreeMap::new(),
                filter,
            },
            rx,
        ))
    }

    /// Point the watcher at a new input set.
    ///
    /// Directories no longer needed are unwatched. An empty `inputs` watches `fallback_dir`
    /// recursively.
    pub fn update(&mut self, inputs: &[PathBuf], fallback_dir: &Path) -> Result<()> {
        let (wanted, filter) = if inputs.is_empty() {
            let dir = normalize(fallback_dir);
            let mut wanted = BTreeMap::new();
            wanted.insert(dir.clone(), RecursiveMode::Recursive);
            (wanted, WatchFilter::Under(dir))
        } else {
            let files: HashSet<PathBuf> = inputs.iter().map(|p| normalize(p)).collect();
            let wanted = files
                .iter()
                .filter_map(|f| f.parent())
                .filter(|dir| dir.is_dir())
                .map(|dir| (dir.to_path_buf(), RecursiveMode::NonRecursive))
                .collect();
            (wanted, WatchFilter::Inputs(files))
        };

        let stale: Vec<PathBuf> = self
            .watched
            .iter()
            .filter(|(dir, mode)| wanted.get(*dir) != Some(*mode))
            .map(|(dir, _)| dir.clone())
            .collect();
        for dir in stale {
            if let Err(e) = self.watcher.unwatch(&dir) {
                tracing::debug!("unwatch {}: {}", dir.display(), e);
            }
            self.watched.remove(&dir);
        }

        for (dir, mode) in wanted {
            if self.watched.contains_key(&dir) {
                continue;
            }
            self.watcher.watch(&dir, mode)?;
            self.watched.insert(dir, mode);
        }

        *self.filter.write() = filter;
        tracing::debug!("watching {} director(ies)", self.watched.len());
        Ok(())
    }

    /// Directories currently watched.
    pub fn watched_dirs(&self) -> Vec<PathBuf> {
        self.watched.keys().cloned().collect()
    }
}
