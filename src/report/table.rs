//! Terminal table for the history listing.
//!
//! One row per entry:
//! - position in the history (what `copy` takes)
//! - capture time in local time
//! - kind
//! - first line of text, or the encoded size for images

use chrono::Local;

use crate::capture::encode;
use crate::history::{Content, Snapshot};
use crate::util::{format_bytes, truncate};

const PREVIEW_WIDTH: usize = 60;

pub fn render(entries: &[(usize, &Snapshot)]) -> String {
    if entries.is_empty() {
        return String::from("History is empty.\n");
    }

    let mut output = String::new();

    output.push_str(&format!("{:>4}  {:<16}  {:<5}  {}\n", "#", "Time", "Type", "Content"));
    output.push_str(&"-".repeat(34 + PREVIEW_WIDTH));
    output.push('\n');

    for (index, entry) in entries {
        let time = entry.timestamp().with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string();
        output.push_str(&format!(
            "{:>4}  {:<16}  {:<5}  {}\n",
            index,
            time,
            entry.kind(),
            preview(entry)
        ));
    }

    output
}

pub fn preview(entry: &Snapshot) -> String {
    match entry.content() {
        Content::Text(text) => {
            let first_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
            let mut line = truncate(first_line, PREVIEW_WIDTH);
            if text.trim().lines().count() > 1 && !line.ends_with("...") {
                line.push_str(" ...");
            }
            line
        }
        Content::Image(uri) => format!("[image, {}]", format_bytes(encode::encoded_len(uri) as u64)),
    }
}
