//! Clipboard capture.
//!
//! Two channels are sampled on every poll tick, each compared against the
//! last value it saw:
//! - text: fires when the clipboard holds non-empty text that differs from
//!   the last text seen
//! - image: fires when the clipboard holds an image whose encoding differs
//!   from the last image seen
//!
//! The screenshot ingester shares the image channel's last-seen value, so a
//! screenshot that also lands on the clipboard is recorded once.
//! A failed read skips that channel for the tick and leaves state alone.

pub mod clipboard;
pub mod encode;
pub mod screenshots;

use chrono::{DateTime, Utc};
use image::RgbaImage;
use tracing::debug;

use crate::error::Result;
use crate::history::{History, IdSource, Kind, Snapshot};

pub use clipboard::SystemClipboard;

pub trait ClipboardSource {
    fn read_text(&mut self) -> Result<Option<String>>;
    fn read_image(&mut self) -> Result<Option<RgbaImage>>;
    fn write_text(&mut self, text: &str) -> Result<()>;
    fn write_image(&mut self, image: &RgbaImage) -> Result<()>;
}

/// Last-seen values for both channels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureState {
    pub last_text: String,
    pub last_image: String,
}

impl CaptureState {
    pub fn new() -> Self {
        CaptureState::default()
    }

    /// Start from the newest text and image already in the history, so a
    /// restart doesn't record the current clipboard a second time.
    pub fn resume(history: &History) -> Self {
        let latest = |kind: Kind| {
            history
                .iter()
                .find(|e| e.kind() == kind)
                .map(|e| e.payload().to_string())
                .unwrap_or_default()
        };

        CaptureState {
            last_text: latest(Kind::Text),
            last_image: latest(Kind::Image),
        }
    }

    /// Record `text` as seen. Returns true when it is new.
    pub fn observe_text(&mut self, text: &str) -> bool {
        if text.is_empty() || text == self.last_text {
            return false;
        }
        self.last_text = text.to_string();
        true
    }

    /// Record an image encoding as seen. Returns true when it is new.
    pub fn observe_image(&mut self, encoding: &str) -> bool {
        if encoding.is_empty() || encoding == self.last_image {
            return false;
        }
        self.last_image = encoding.to_string();
        true
    }
}

/// Sample both channels once and return the snapshots that fired, text first.
pub fn tick<C: ClipboardSource + ?Sized>(
    source: &mut C,
    state: &mut CaptureState,
    ids: &mut IdSource,
    now: DateTime<Utc>,
) -> Vec<Snapshot> {
    let mut captured = Vec::new();

    match source.read_text() {
        Ok(Some(text)) if state.observe_text(&text) => {
            match Snapshot::text(ids.next_id(now), text, now) {
                Ok(snapshot) => captured.push(snapshot),
                Err(e) => debug!("dropping text capture: {e}"),
            }
        }
        Ok(_) => {}
        Err(e) => debug!("clipboard text read failed, skipping tick: {e}"),
    }

    match source.read_image() {
        Ok(Some(image)) => match encode::to_data_uri(&image) {
            Ok(uri) if state.observe_image(&uri) => match Snapshot::image(ids.next_id(now), uri, now) {
                Ok(snapshot) => captured.push(snapshot),
                Err(e) => debug!("dropping image capture: {e}"),
            },
            Ok(_) => {}
            Err(e) => debug!("clipboard image encode failed: {e}"),
        },
        Ok(None) => {}
        Err(e) => debug!("clipboard image read failed, skipping tick: {e}"),
    }

    captured
}
