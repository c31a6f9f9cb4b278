//! History search for the list view.
//!
//! Matching is case-insensitive. Text entries match on their text; image
//! entries have no searchable text and match on their kind label instead,
//! so searching "image" lists the screenshots. Text that mentions "image"
//! is still text and matches too.

use super::{Content, History, Kind, Snapshot};

pub fn filter<'a>(history: &'a History, term: &str) -> Vec<&'a Snapshot> {
    filter_indexed(history, term).into_iter().map(|(_, entry)| entry).collect()
}

/// Like `filter`, paired with each entry's position in the full history.
pub fn filter_indexed<'a>(history: &'a History, term: &str) -> Vec<(usize, &'a Snapshot)> {
    let needle = term.trim().to_lowercase();

    history
        .iter()
        .enumerate()
        .filter(|(_, entry)| needle.is_empty() || matches(entry, &needle))
        .collect()
}

/// `needle` must already be lowercase.
fn matches(entry: &Snapshot, needle: &str) -> bool {
    match entry.content() {
        Content::Text(text) => text.to_lowercase().contains(needle),
        Content::Image(_) => Kind::Image.as_str().contains(needle),
    }
}
