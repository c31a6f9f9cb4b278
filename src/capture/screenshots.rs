//! Screenshot directory ingester.
//!
//! Watches one directory (not recursively) for image files that appear:
//! - only .png / .jpg / .jpeg names are considered
//! - the caller waits a settle delay before reading, screenshot tools write
//!   in several steps
//! - after the delay the file must still exist and have been modified within
//!   the recency window, which filters out old files surfaced by unrelated
//!   churn (sync clients, restores, renames of old files)
//! - the decoded image is encoded like a clipboard image and checked against
//!   the shared last-seen image before a snapshot is produced

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use super::{encode, CaptureState};
use crate::error::Result;
use crate::history::{IdSource, Snapshot};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// True when the file exists and was modified less than `window` before `now`.
/// A modification time ahead of `now` (clock skew) counts as recent.
pub fn is_recent(path: &Path, now: SystemTime, window: Duration) -> bool {
    let Ok(modified) = fs::metadata(path).and_then(|meta| meta.modified()) else {
        return false;
    };

    match now.duration_since(modified) {
        Ok(age) => age < window,
        Err(_) => true,
    }
}

/// Paths of image files that appeared in this event.
pub fn appeared_images(event: &Event) -> Vec<PathBuf> {
    let appeared = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To))
    );
    if !appeared {
        return Vec::new();
    }

    event.paths.iter().filter(|p| is_image_path(p)).cloned().collect()
}

/// Decode a settled screenshot and turn it into a snapshot if its encoding
/// hasn't been seen yet. Updates `state.last_image` when it fires.
pub fn ingest(
    path: &Path,
    state: &mut CaptureState,
    ids: &mut IdSource,
    now: DateTime<Utc>,
) -> Result<Option<Snapshot>> {
    let image = encode::decode_file(path)?;
    let uri = encode::to_data_uri(&image)?;

    if !state.observe_image(&uri) {
        return Ok(None);
    }

    Ok(Some(Snapshot::image(ids.next_id(now), uri, now)?))
}

/// Filesystem watch on the screenshot directory. Appearing image paths are
/// forwarded to `tx`; dropping or stopping the watcher ends the stream.
pub struct ScreenshotWatcher {
    watcher: RecommendedWatcher,
    dir: PathBuf,
}

impl ScreenshotWatcher {
    pub fn start(dir: &Path, tx: UnboundedSender<PathBuf>) -> Result<Self> {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for path in appeared_images(&event) {
                    // receiver gone means the daemon is shutting down
                    let _ = tx.send(path);
                }
            }
            Err(e) => warn!("screenshot watch error: {e}"),
        })?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        debug!("watching {} for screenshots", dir.display());

        Ok(ScreenshotWatcher {
            watcher,
            dir: dir.to_path_buf(),
        })
    }

    pub fn stop(mut self) -> Result<()> {
        self.watcher.unwatch(&self.dir)?;
        debug!("stopped watching {}", self.dir.display());
        Ok(())
    }
}
