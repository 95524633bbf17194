//! File system watcher that invalidates the post cache in development mode.

use std::{path::Path, sync::Arc};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::application::sources::ChangeListener;

use super::error::InfraError;

/// Keeps the underlying watcher alive; dropping it stops notifications.
pub struct ContentWatcher {
    _watcher: RecommendedWatcher,
}

/// Editor artifacts that should not trigger a reload.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bak" | "swp" | "swo" | "tmp") || name.ends_with('~') || name.starts_with('.')
}

fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|path| !is_temp_file(path))
}

/// Watch `dir` (non-recursively) and notify `listener` on every relevant change.
pub fn watch_directory(
    dir: &Path,
    listener: Arc<dyn ChangeListener>,
) -> Result<ContentWatcher, InfraError> {
    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        match result {
            Ok(event) if is_relevant(&event) => {
                debug!(kind = ?event.kind, paths = ?event.paths, "content changed");
                listener.on_source_changed();
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "content watcher error"),
        }
    })
    .map_err(|err| InfraError::watcher(format!("failed to create watcher: {err}")))?;

    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|err| InfraError::watcher(format!("failed to watch {}: {err}", dir.display())))?;

    info!(path = %dir.display(), "watching content for changes");
    Ok(ContentWatcher { _watcher: watcher })
}
