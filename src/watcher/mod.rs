//! Filesystem watching for the weekly data directory.
//!
//! The OS subscription (`notify` via `notify-debouncer-mini`) batches raw
//! events over a short window; matching events are classified and forwarded
//! to a tokio channel. The 2-second coalescing that gates regeneration lives
//! in [`debounce::DebouncedTrigger`], fed by the serve loop.

pub mod debounce;
pub mod event;

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use tokio::sync::mpsc as tokio_mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::matcher::is_week_data_file;
use event::WatchEvent;

/// Handle to a running watcher. Keeps the OS subscription alive (dropping
/// stops watching).
pub struct WatcherHandle {
    _debouncer: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
    /// The bridge task forwarding events from std channel to tokio channel.
    _bridge_task: JoinHandle<()>,
}

/// Batching window for raw OS events. Smooths editor write bursts before the
/// quiet-period trigger sees them.
const BATCH_WINDOW: Duration = Duration::from_millis(250);

/// Start watching `data_dir` for weekly data file changes.
///
/// Returns a `WatcherHandle` (must be kept alive) and a tokio mpsc receiver
/// that yields classified [`WatchEvent`]s for matching files only.
pub fn start_watcher(
    data_dir: &Path,
) -> anyhow::Result<(WatcherHandle, tokio_mpsc::Receiver<WatchEvent>)> {
    let (std_tx, std_rx) = std::sync::mpsc::channel::<DebounceEventResult>();

    let mut debouncer = new_debouncer(BATCH_WINDOW, move |res| {
        let _ = std_tx.send(res);
    })?;
    // The data directory is flat; no need to descend.
    debouncer
        .watcher()
        .watch(data_dir, RecursiveMode::NonRecursive)?;

    let (tokio_tx, tokio_rx) = tokio_mpsc::channel::<WatchEvent>(256);

    // Bridge: spawn_blocking to receive from the std channel, classify,
    // forward to tokio.
    let bridge_task = tokio::task::spawn_blocking(move || {
        while let Ok(result) = std_rx.recv() {
            match result {
                Ok(events) => {
                    for debounced_event in events {
                        if let Some(watch_event) = classify_event(debounced_event.path) {
                            if tokio_tx.blocking_send(watch_event).is_err() {
                                return; // receiver dropped, shutdown
                            }
                        }
                    }
                }
                Err(err) => {
                    // Watcher errors are not fatal: log and keep watching.
                    warn!(%err, "file watcher error");
                }
            }
        }
    });

    Ok((
        WatcherHandle {
            _debouncer: debouncer,
            _bridge_task: bridge_task,
        },
        tokio_rx,
    ))
}

/// Classify a filesystem event path, or None if it is not a weekly data file.
///
/// Add, change, and removal all feed the same downstream trigger; the split
/// into Changed/Removed exists for logging. The debouncer reports only the
/// path, so removal is detected by the file no longer existing.
fn classify_event(path: PathBuf) -> Option<WatchEvent> {
    if !is_week_data_file(&path) {
        return None;
    }

    if path.exists() {
        Some(WatchEvent::Changed(path))
    } else {
        Some(WatchEvent::Removed(path))
    }
}
