//! Clipboard history maintenance.
//!
//! History is most-recent-first and bounded to MAX_HISTORY entries:
//! - a new snapshot is inserted at the front
//! - a snapshot whose kind and payload match an existing entry replaces it
//!   at the front (promotion), the old id and timestamp are discarded
//! - anything beyond MAX_HISTORY is dropped from the back
//!
//! Snapshots are validated when they are built or decoded, so `apply` is
//! total and never fails.

pub mod search;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Text,
    Image,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Text => "text",
            Kind::Image => "image",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Snapshot payload. Images are kept in their encoded form (a data URI),
/// which is also what deduplication compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Image(String),
}

impl Content {
    pub fn kind(&self) -> Kind {
        match self {
            Content::Text(_) => Kind::Text,
            Content::Image(_) => Kind::Image,
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            Content::Text(s) | Content::Image(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshot", into = "RawSnapshot")]
pub struct Snapshot {
    id: i64,
    content: Content,
    timestamp: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(id: i64, content: Content, timestamp: DateTime<Utc>) -> Result<Self> {
        if content.payload().is_empty() {
            return Err(Error::InvalidSnapshot(format!(
                "empty {} payload (id {id})",
                content.kind()
            )));
        }

        Ok(Snapshot { id, content, timestamp })
    }

    pub fn text(id: i64, text: impl Into<String>, timestamp: DateTime<Utc>) -> Result<Self> {
        Self::new(id, Content::Text(text.into()), timestamp)
    }

    pub fn image(id: i64, data_uri: impl Into<String>, timestamp: DateTime<Utc>) -> Result<Self> {
        Self::new(id, Content::Image(data_uri.into()), timestamp)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn kind(&self) -> Kind {
        self.content.kind()
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn payload(&self) -> &str {
        self.content.payload()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Dedup equality: kind and payload only.
    pub fn same_content(&self, other: &Snapshot) -> bool {
        self.content == other.content
    }
}

/// On-disk shape of a snapshot: `{id, type, text?, image?, timestamp}`.
/// Entries written before images were supported carry no `type` and are
/// read as text.
#[derive(Serialize, Deserialize)]
struct RawSnapshot {
    id: i64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<Kind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(with = "iso_millis")]
    timestamp: DateTime<Utc>,
}

impl TryFrom<RawSnapshot> for Snapshot {
    type Error = Error;

    fn try_from(raw: RawSnapshot) -> Result<Self> {
        let content = match (raw.kind, raw.text, raw.image) {
            (Some(Kind::Text) | None, Some(text), _) => Content::Text(text),
            (Some(Kind::Image), _, Some(image)) => Content::Image(image),
            (Some(kind), _, _) => {
                return Err(Error::InvalidSnapshot(format!(
                    "{kind} entry {} has no {kind} payload",
                    raw.id
                )));
            }
            (None, None, _) => {
                return Err(Error::InvalidSnapshot(format!(
                    "entry {} has neither type nor text",
                    raw.id
                )));
            }
        };

        Snapshot::new(raw.id, content, raw.timestamp)
    }
}

impl From<Snapshot> for RawSnapshot {
    fn from(snapshot: Snapshot) -> Self {
        let kind = snapshot.kind();
        let (text, image) = match snapshot.content {
            Content::Text(text) => (Some(text), None),
            Content::Image(image) => (None, Some(image)),
        };

        RawSnapshot {
            id: snapshot.id,
            kind: Some(kind),
            text,
            image,
            timestamp: snapshot.timestamp,
        }
    }
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2024-05-01T10:00:00.000Z`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        History { entries: Vec::new() }
    }

    /// Build a history from entries in most-recent-first order, keeping the
    /// first occurrence of each kind/payload pair and at most MAX_HISTORY.
    pub fn from_entries(entries: Vec<Snapshot>) -> Self {
        let mut kept: Vec<Snapshot> = Vec::with_capacity(entries.len().min(MAX_HISTORY));

        for entry in entries {
            if kept.len() == MAX_HISTORY {
                break;
            }
            if !kept.iter().any(|k| k.same_content(&entry)) {
                kept.push(entry);
            }
        }

        History { entries: kept }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.entries.get(index)
    }

    pub fn first(&self) -> Option<&Snapshot> {
        self.entries.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.entries.iter()
    }

    pub fn max_id(&self) -> Option<i64> {
        self.entries.iter().map(|e| e.id).max()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Produce the next history after `new_item` was captured.
pub fn apply(new_item: Snapshot, current: History) -> History {
    let mut entries = current.entries;

    if let Some(pos) = entries.iter().position(|e| e.same_content(&new_item)) {
        entries.remove(pos);
    }

    entries.insert(0, new_item);
    entries.truncate(MAX_HISTORY);

    History { entries }
}

/// Hands out snapshot ids: the capture time in milliseconds, bumped so that
/// ids stay strictly increasing when two snapshots share a millisecond.
#[derive(Debug, Default)]
pub struct IdSource {
    last: i64,
}

impl IdSource {
    pub fn new() -> Self {
        IdSource::default()
    }

    /// Continue after ids already present in a loaded history.
    pub fn resume_after(last: i64) -> Self {
        IdSource { last }
    }

    pub fn next_id(&mut self, now: DateTime<Utc>) -> i64 {
        let id = now.timestamp_millis().max(self.last.saturating_add(1));
        self.last = id;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn text(id: i64, payload: &str) -> Snapshot {
        Snapshot::text(id, payload, at(id)).unwrap()
    }

    fn image(id: i64, payload: &str) -> Snapshot {
        Snapshot::image(id, payload, at(id)).unwrap()
    }

    fn payloads(history: &History) -> Vec<&str> {
        history.iter().map(|e| e.payload()).collect()
    }

    fn full_history() -> History {
        History::from_entries((0..MAX_HISTORY as i64).rev().map(|i| text(i, &format!("t{i}"))).collect())
    }

    #[test]
    fn insert_into_empty() {
        let result = apply(text(1, "hello"), History::new());
        assert_eq!(result.len(), 1);
        assert_eq!(result.first().unwrap().payload(), "hello");
        assert_eq!(result.first().unwrap().kind(), Kind::Text);
    }

    #[test]
    fn insert_new_goes_to_front() {
        let current = History::from_entries(vec![text(2, "b"), text(1, "a")]);
        let result = apply(text(3, "c"), current);
        assert_eq!(payloads(&result), vec!["c", "b", "a"]);
    }

    #[test]
    fn duplicate_is_promoted_not_appended() {
        let current = History::from_entries(vec![text(1, "a"), text(2, "b")]);
        let result = apply(text(3, "a"), current);

        assert_eq!(payloads(&result), vec!["a", "b"]);
        // the promoted entry is the new snapshot, not the old one
        assert_eq!(result.first().unwrap().id(), 3);
        assert_eq!(result.first().unwrap().timestamp(), at(3));
    }

    #[test]
    fn promotion_from_the_middle_keeps_other_order() {
        let current = History::from_entries(vec![
            text(5, "e"),
            text(4, "d"),
            text(3, "c"),
            text(2, "b"),
            text(1, "a"),
        ]);
        let result = apply(text(6, "c"), current);
        assert_eq!(payloads(&result), vec!["c", "e", "d", "b", "a"]);
    }

    #[test]
    fn image_duplicate_is_promoted_from_the_middle() {
        let current = History::from_entries(vec![
            text(4, "t"),
            image(3, "data:image/png;base64,BBBB"),
            image(2, "data:image/png;base64,AAAA"),
            text(1, "u"),
        ]);
        let result = apply(image(5, "data:image/png;base64,AAAA"), current);

        assert_eq!(
            payloads(&result),
            vec!["data:image/png;base64,AAAA", "t", "data:image/png;base64,BBBB", "u"]
        );
        assert_eq!(result.first().unwrap().id(), 5);
        assert_eq!(result.first().unwrap().kind(), Kind::Image);
    }

    #[test]
    fn text_and_image_with_same_payload_are_distinct() {
        let current = History::from_entries(vec![text(1, "data:x")]);
        let result = apply(image(2, "data:x"), current);
        assert_eq!(result.len(), 2);
        assert_eq!(result.get(0).unwrap().kind(), Kind::Image);
        assert_eq!(result.get(1).unwrap().kind(), Kind::Text);
    }

    #[test]
    fn full_history_drops_oldest() {
        let current = full_history();
        let oldest = current.get(MAX_HISTORY - 1).unwrap().payload().to_string();

        let result = apply(image(100, "x"), current);

        assert_eq!(result.len(), MAX_HISTORY);
        assert_eq!(result.first().unwrap().kind(), Kind::Image);
        assert_eq!(result.first().unwrap().payload(), "x");
        assert!(result.iter().all(|e| e.payload() != oldest));
    }

    #[test]
    fn promotion_in_full_history_keeps_everything() {
        let current = full_history();
        let last = current.get(MAX_HISTORY - 1).unwrap().payload().to_string();

        let result = apply(text(100, &last), current);

        assert_eq!(result.len(), MAX_HISTORY);
        assert_eq!(result.first().unwrap().payload(), last);
        assert_eq!(result.get(1).unwrap().payload(), "t49");
    }

    #[test]
    fn repeated_apply_is_idempotent() {
        let mut history = History::from_entries(vec![text(1, "a"), text(2, "b")]);
        for id in 10..15 {
            history = apply(text(id, "z"), history);
        }

        assert_eq!(payloads(&history), vec!["z", "a", "b"]);
        assert_eq!(history.iter().filter(|e| e.payload() == "z").count(), 1);
    }

    #[test]
    fn length_never_exceeds_bound() {
        let mut history = History::new();
        for id in 0..(MAX_HISTORY as i64 * 3) {
            let item = if id % 3 == 0 {
                image(id, &format!("img{}", id % 7))
            } else {
                text(id, &format!("txt{id}"))
            };
            history = apply(item, history);
            assert!(history.len() <= MAX_HISTORY);
        }
        assert_eq!(history.len(), MAX_HISTORY);
    }

    #[test]
    fn apply_is_deterministic() {
        let current = History::from_entries(vec![text(1, "a"), image(2, "i")]);
        let first = apply(text(3, "b"), current.clone());
        let second = apply(text(3, "b"), current);
        assert_eq!(first, second);
    }

    #[test]
    fn from_entries_normalises() {
        let mut entries = vec![text(1, "a"), text(2, "a"), image(3, "a")];
        entries.extend((10..70).map(|i| text(i, &format!("n{i}"))));

        let history = History::from_entries(entries);

        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.get(0).unwrap().id(), 1);
        assert_eq!(history.get(1).unwrap().kind(), Kind::Image);
    }

    #[test]
    fn empty_payload_rejected() {
        assert!(matches!(
            Snapshot::text(1, "", at(0)),
            Err(Error::InvalidSnapshot(_))
        ));
        assert!(Snapshot::image(1, String::new(), at(0)).is_err());
    }

    #[test]
    fn ids_strictly_increase_within_a_millisecond() {
        let mut ids = IdSource::new();
        let now = at(0);
        let a = ids.next_id(now);
        let b = ids.next_id(now);
        assert_eq!(a, now.timestamp_millis());
        assert_eq!(b, a + 1);
    }

    #[test]
    fn ids_resume_after_loaded_history() {
        let mut ids = IdSource::resume_after(i64::MAX - 1);
        assert_eq!(ids.next_id(at(0)), i64::MAX);
    }

    #[test]
    fn serializes_wire_shape() {
        let snapshot = Snapshot::text(7, "hi", Utc.timestamp_opt(1_714_557_600, 0).unwrap()).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "type": "text",
                "text": "hi",
                "timestamp": "2024-05-01T10:00:00.000Z"
            })
        );
    }

    #[test]
    fn reads_image_entries() {
        let snapshot: Snapshot = serde_json::from_value(serde_json::json!({
            "id": 9,
            "type": "image",
            "image": "data:image/png;base64,AAAA",
            "timestamp": "2024-05-01T10:00:00.123Z"
        }))
        .unwrap();

        assert_eq!(snapshot.kind(), Kind::Image);
        assert_eq!(snapshot.payload(), "data:image/png;base64,AAAA");
        assert_eq!(snapshot.timestamp().timestamp_subsec_millis(), 123);
    }

    #[test]
    fn reads_legacy_text_entries() {
        let snapshot: Snapshot = serde_json::from_value(serde_json::json!({
            "id": 1,
            "text": "old",
            "timestamp": "2024-05-01T10:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(snapshot.kind(), Kind::Text);
        assert_eq!(snapshot.payload(), "old");
    }

    #[test]
    fn rejects_unknown_or_mismatched_entries() {
        let unknown = serde_json::from_value::<Snapshot>(serde_json::json!({
            "id": 1, "type": "video", "text": "x", "timestamp": "2024-05-01T10:00:00.000Z"
        }));
        let mismatched = serde_json::from_value::<Snapshot>(serde_json::json!({
            "id": 1, "type": "image", "text": "x", "timestamp": "2024-05-01T10:00:00.000Z"
        }));
        let empty = serde_json::from_value::<Snapshot>(serde_json::json!({
            "id": 1, "type": "text", "text": "", "timestamp": "2024-05-01T10:00:00.000Z"
        }));

        assert!(unknown.is_err());
        assert!(mismatched.is_err());
        assert!(empty.is_err());
    }
}
