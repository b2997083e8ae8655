//! Patterns: named, independently sized groups of tracks

use serde::{Deserialize, Serialize};

use crate::project::normalize_bars;
use crate::resolution::storage_steps;
use crate::track::{normalize_track, Track, TRACK_COLORS};

/// Maximum tracks per pattern
pub const MAX_TRACKS: usize = 8;

/// Maximum patterns per project
pub const MAX_PATTERNS: usize = 16;

/// A page of the sequencer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub name: String,
    /// Loop length in bars (even, at least 2)
    pub bars: u32,
    pub tracks: Vec<Track>,
}

impl Pattern {
    pub fn new(id: impl Into<String>, name: impl Into<String>, bars: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bars,
            tracks: Vec::new(),
        }
    }

    pub fn storage_steps(&self) -> usize {
        storage_steps(self.bars)
    }

    pub fn has_solo(&self) -> bool {
        self.tracks.iter().any(|t| t.solo)
    }

    /// Whether the track at `index` is audible given mute and solo state
    pub fn is_audible(&self, index: usize) -> bool {
        let Some(track) = self.tracks.get(index) else {
            return false;
        };
        !track.mute && (!self.has_solo() || track.solo)
    }

    /// Set `solo` on one track and clear it everywhere else
    pub fn solo_exclusive(&mut self, index: usize, solo: bool) {
        for (i, track) in self.tracks.iter_mut().enumerate() {
            if i == index {
                track.solo = solo;
            } else if solo {
                track.solo = false;
            }
        }
    }
}

/// First `{prefix}-{n}` id (n >= 1) that `taken` rejects
pub(crate) fn next_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    (1..)
        .map(|n| format!("{prefix}-{n}"))
        .find(|id| !taken(id))
        .unwrap_or_else(|| prefix.to_string())
}

/// Normalize bars, track count, track shape, ids and names.
///
/// `shared_bars` overrides the pattern's own length (the active pattern
/// follows the project's bar count).
pub fn normalize_pattern(pattern: Pattern, rows: usize, bpm: f64, shared_bars: Option<u32>) -> Pattern {
    let bars = normalize_bars(shared_bars.unwrap_or(pattern.bars), bpm);
    let columns = storage_steps(bars);

    let mut tracks: Vec<Track> = Vec::with_capacity(pattern.tracks.len().min(MAX_TRACKS));
    let mut solo_seen = false;
    for (index, track) in pattern.tracks.into_iter().take(MAX_TRACKS).enumerate() {
        let mut track = normalize_track(track, rows, columns);
        if track.id.is_empty() || tracks.iter().any(|t| t.id == track.id) {
            track.id = next_id("track", |id| tracks.iter().any(|t| t.id == id));
        }
        if track.name.is_empty() {
            track.name = format!("Track {}", index + 1);
        }
        if track.color.is_empty() {
            track.color = TRACK_COLORS[index % TRACK_COLORS.len()].to_string();
        }
        if track.solo && solo_seen {
            track.solo = false;
        }
        solo_seen |= track.solo;
        tracks.push(track);
    }

    let name = pattern.name.trim().to_string();
    Pattern {
        id: pattern.id,
        name,
        bars,
        tracks,
    }
}
