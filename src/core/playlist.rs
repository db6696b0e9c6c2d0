//! Playlist item window

use crate::types::PlaylistRange;

/// Bound a requested item window to the playlist's size
///
/// Without an explicit end the window is `max_items` long from `start_item`.
/// Both ends are then clamped into `[1, total_items]`; a window that starts
/// past the end of the playlist comes back empty.
pub fn clamp_playlist_range(
    start_item: u64,
    end_item: Option<u64>,
    max_items: u64,
    total_items: u64,
) -> PlaylistRange {
    let end = end_item.unwrap_or_else(|| start_item.saturating_add(max_items).saturating_sub(1));

    PlaylistRange {
        start: start_item.max(1),
        end: end.min(total_items),
    }
}
