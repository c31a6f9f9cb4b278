//! Clipboard history service.
//!
//! Owns the in-memory history and everything that mutates it: the store it
//! is written through to, the capture state shared by the poller and the
//! screenshot ingester, and the id source. Presentation layers talk to it
//! through `Command`s and follow changes through `subscribe`.
//!
//! Persistence is write-through. While the store is in sync, every capture
//! starts from the stored history, so a `clear` run by another process is not
//! undone by the daemon's next write. A failed write is logged and the
//! in-memory history stays authoritative until the next write succeeds.

use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, SystemTime};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::capture::screenshots;
use crate::capture::{self, encode, CaptureState, ClipboardSource};
use crate::error::Result;
use crate::history::{self, Content, History, IdSource, Snapshot};
use crate::store::{self, KeyValueStore};

#[derive(Debug, Clone)]
pub enum Command {
    GetHistory,
    CopyItem(Snapshot),
    ClearHistory,
    SetTheme(String),
    GetTheme,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    History(History),
    Theme(Option<String>),
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Full history, sent in answer to a history request.
    ClipboardHistory(History),
    /// Full history after every mutation.
    ClipboardChanged(History),
}

pub struct Service<S> {
    store: S,
    history: History,
    capture: CaptureState,
    ids: IdSource,
    subscribers: Vec<Sender<Event>>,
    /// False after a failed write, until a write succeeds again.
    in_sync: bool,
}

impl<S: KeyValueStore> Service<S> {
    /// Load the stored history. An unreadable store starts empty.
    pub fn open(store: S) -> Self {
        let history = store::load_history(&store);
        let ids = IdSource::resume_after(history.max_id().unwrap_or(0));
        let capture = CaptureState::resume(&history);
        debug!("loaded {} history entries", history.len());

        Service {
            store,
            history,
            capture,
            ids,
            subscribers: Vec::new(),
            in_sync: true,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn capture_state(&self) -> &CaptureState {
        &self.capture
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn subscribe(&mut self) -> Receiver<Event> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn handle<C: ClipboardSource + ?Sized>(&mut self, command: Command, clipboard: &mut C) -> Result<Reply> {
        match command {
            Command::GetHistory => Ok(Reply::History(self.get_history())),
            Command::CopyItem(item) => self.copy_item(clipboard, &item).map(|_| Reply::Done),
            Command::ClearHistory => self.clear_history().map(|_| Reply::Done),
            Command::SetTheme(color) => self.set_theme(&color).map(|_| Reply::Done),
            Command::GetTheme => Ok(Reply::Theme(self.get_theme())),
        }
    }

    /// Current history; also pushed to subscribers.
    pub fn get_history(&mut self) -> History {
        self.publish(Event::ClipboardHistory(self.history.clone()));
        self.history.clone()
    }

    /// Fold a captured snapshot into the history, persist, notify.
    pub fn accept(&mut self, snapshot: Snapshot) {
        debug!("accepting {} snapshot {}", snapshot.kind(), snapshot.id());

        if self.in_sync {
            self.history = store::load_history(&self.store);
        }
        let current = std::mem::take(&mut self.history);
        self.history = history::apply(snapshot, current);

        if let Err(e) = self.persist() {
            warn!("failed to save history: {e}");
        }
        self.publish(Event::ClipboardChanged(self.history.clone()));
    }

    /// Sample the clipboard once. Returns how many snapshots were accepted.
    pub fn poll<C: ClipboardSource + ?Sized>(&mut self, clipboard: &mut C) -> usize {
        let captured = capture::tick(clipboard, &mut self.capture, &mut self.ids, Utc::now());
        let count = captured.len();

        for snapshot in captured {
            self.accept(snapshot);
        }

        count
    }

    /// Ingest a screenshot whose settle delay has passed. Stale, unreadable
    /// or already-seen files are skipped.
    pub fn ingest_screenshot(&mut self, path: &Path, recency_window: Duration) -> bool {
        if !screenshots::is_recent(path, SystemTime::now(), recency_window) {
            debug!("ignoring {}: missing or not recent", path.display());
            return false;
        }

        match screenshots::ingest(path, &mut self.capture, &mut self.ids, Utc::now()) {
            Ok(Some(snapshot)) => {
                info!("captured screenshot {}", path.display());
                self.accept(snapshot);
                true
            }
            Ok(None) => {
                debug!("screenshot {} already recorded", path.display());
                false
            }
            Err(e) => {
                warn!("failed to read screenshot {}: {e}", path.display());
                false
            }
        }
    }

    /// Put an entry back on the clipboard. The entry becomes the last-seen
    /// value of its channel so the poller won't record it again.
    pub fn copy_item<C: ClipboardSource + ?Sized>(&mut self, clipboard: &mut C, item: &Snapshot) -> Result<()> {
        match item.content() {
            Content::Text(text) => {
                clipboard.write_text(text)?;
                self.capture.last_text = text.clone();
            }
            Content::Image(uri) => {
                let image = encode::from_data_uri(uri)?;
                clipboard.write_image(&image)?;
                self.capture.last_image = uri.clone();
            }
        }

        debug!("copied {} entry {} to the clipboard", item.kind(), item.id());
        Ok(())
    }

    /// Empty the history. Subscribers see the empty history even if the
    /// write fails; the error is returned for the caller to report.
    pub fn clear_history(&mut self) -> Result<()> {
        self.history = History::new();
        let saved = self.persist();
        self.publish(Event::ClipboardChanged(self.history.clone()));
        saved
    }

    pub fn set_theme(&mut self, color: &str) -> Result<()> {
        store::save_theme(&mut self.store, color)
    }

    pub fn get_theme(&self) -> Option<String> {
        store::load_theme(&self.store)
    }

    fn persist(&mut self) -> Result<()> {
        let saved = store::save_history(&mut self.store, &self.history);
        self.in_sync = saved.is_ok();
        saved
    }

    fn publish(&mut self, event: Event) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
