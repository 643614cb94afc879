//! Translation of raw `notify` events
//!
//! One `notify::Event` can carry several paths; each path that passes the
//! filter becomes its own [`FileEvent`].

use notify::{Event, EventKind};

use super::{
    filter::FilenameFilter,
    watching::{FileEvent, FileEventKind},
};

// ═══════════════════════════════════════════════════════════════════════════
// EVENT HANDLERS
// ═══════════════════════════════════════════════════════════════════════════

/// Map a `notify` event kind onto the two kinds intake cares about
pub const fn classify_kind(kind: &EventKind) -> Option<FileEventKind> {
    match kind {
        EventKind::Create(_) => Some(FileEventKind::Created),
        EventKind::Modify(_) => Some(FileEventKind::Modified),
        _ => None,
    }
}

/// Turn a raw event into filtered [`FileEvent`]s
///
/// Directories are skipped; a path that no longer exists is kept (the file
/// may be replaced before intake looks at it).
pub fn translate_event(event: &Event, filter: &FilenameFilter) -> Vec<FileEvent> {
    let Some(kind) = classify_kind(&event.kind) else {
        return Vec::new();
    };

    event
        .paths
        .iter()
        .filter(|path| filter.matches_path(path))
        .filter(|path| !path.is_dir())
        .map(|path| FileEvent {
            path: path.clone(),
            kind,
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
