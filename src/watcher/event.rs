use std::path::PathBuf;

/// Classified change events for weekly data files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The file exists after the event. Covers both creation and rewrite;
    /// the OS-level debouncer does not distinguish the two.
    Changed(PathBuf),
    /// The file no longer exists.
    Removed(PathBuf),
}
