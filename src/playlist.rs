// playlist.rs: Map a tag to the name of the playlist it selects

use crate::tag::{TagId, TagReading};

/// Playlist name for a tag: the stored text without trailing whitespace, or
/// the identifier in uppercase hex when the tag carries no usable text.
pub fn resolve(id: TagId, reading: &TagReading) -> String {
    match reading.text.as_deref().map(str::trim_end) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => id.to_string(),
    }
}
