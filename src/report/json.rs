//! JSON output for the history listing.
//!
//! Same entry shape as the history file, for scripting and piping.

use crate::history::Snapshot;

pub fn render(entries: &[(usize, &Snapshot)]) -> String {
    let snapshots: Vec<&Snapshot> = entries.iter().map(|(_, entry)| *entry).collect();
    serde_json::to_string_pretty(&snapshots).unwrap_or_else(|_| String::from("[]"))
}
