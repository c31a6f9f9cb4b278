//! JSON key-value store.
//!
//! Persists state to a single pretty-printed JSON document keyed by string:
//! - "history": the clipboard history, most recent first
//! - "theme-color": the presentation theme, if one was set
//!
//! Reads never fail: a missing or corrupt document reads as "no data".
//! Writes replace the whole document through a temp file and a rename, so
//! readers see either the old or the new document.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::history::{History, Snapshot};

pub const HISTORY_KEY: &str = "history";
pub const THEME_KEY: &str = "theme-color";

const STORE_FILE: &str = "paste-history.json";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

/// Default store path (~/.local/share/clipstack/paste-history.json or platform equivalent)
pub fn default_path() -> Result<PathBuf> {
    let data_dir = directories::ProjectDirs::from("", "", "clipstack")
        .ok_or(Error::NoDataDir("data"))?
        .data_dir()
        .to_path_buf();

    Ok(data_dir.join(STORE_FILE))
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        let raw = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        if !self.path.exists() {
            return None;
        }

        match self.read_document() {
            Ok(mut document) => document.remove(key),
            Err(e) => {
                debug!("treating {} as empty: {e}", self.path.display());
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        // a corrupt document is replaced rather than blocking every write
        let mut document = if self.path.exists() {
            self.read_document().unwrap_or_default()
        } else {
            Map::new()
        };
        document.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(&Value::Object(document))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

/// In-memory store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Load the stored history. Entries that don't decode are skipped.
pub fn load_history<S: KeyValueStore + ?Sized>(store: &S) -> History {
    let Some(value) = store.get(HISTORY_KEY) else {
        return History::new();
    };

    let Value::Array(items) = value else {
        warn!("stored history is not a list, starting empty");
        return History::new();
    };

    let mut entries: Vec<Snapshot> = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<Snapshot>(item) {
            Ok(snapshot) => entries.push(snapshot),
            Err(e) => warn!("skipping unreadable history entry: {e}"),
        }
    }

    History::from_entries(entries)
}

pub fn save_history<S: KeyValueStore + ?Sized>(store: &mut S, history: &History) -> Result<()> {
    store.set(HISTORY_KEY, serde_json::to_value(history)?)
}

pub fn load_theme<S: KeyValueStore + ?Sized>(store: &S) -> Option<String> {
    match store.get(THEME_KEY)? {
        Value::String(color) => Some(color),
        _ => None,
    }
}

pub fn save_theme<S: KeyValueStore + ?Sized>(store: &mut S, color: &str) -> Result<()> {
    store.set(THEME_KEY, Value::String(color.to_string()))
}
