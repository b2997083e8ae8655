//! The project aggregate and its normalization rules

use crate::pattern::{next_id, normalize_pattern, Pattern, MAX_PATTERNS};
use crate::resolution::{coerce_steps_per_bar, logical_steps, storage_steps, DEFAULT_STEPS_PER_BAR};
use crate::track::{Track, Waveform, TRACK_COLORS};

pub const MIN_BPM: f64 = 30.0;
pub const MAX_BPM: f64 = 260.0;
pub const DEFAULT_BPM: f64 = 120.0;

pub const MIN_ROWS: usize = 1;
pub const MAX_ROWS: usize = 32;
pub const DEFAULT_ROWS: usize = 16;

pub const MIN_BARS: u32 = 2;
pub const DEFAULT_BARS: u32 = 4;

/// Longest loop allowed at any tempo
pub const MAX_LOOP_SECONDS: f64 = 300.0;

pub const DEFAULT_PROJECT_NAME: &str = "Untitled";

/// Clamp tempo into range; non-finite input becomes the default
pub fn clamp_bpm(bpm: f64) -> f64 {
    if bpm.is_finite() { bpm.clamp(MIN_BPM, MAX_BPM) } else { DEFAULT_BPM }
}

/// Seconds per 4/4 bar
pub fn seconds_per_bar(bpm: f64) -> f64 {
    240.0 / clamp_bpm(bpm)
}

/// Raw bar ceiling: the most bars that fit in [`MAX_LOOP_SECONDS`]
pub fn max_bars(bpm: f64) -> u32 {
    (MAX_LOOP_SECONDS / seconds_per_bar(bpm)).floor() as u32
}

/// Round to the nearest even bar count (halves round up), then cap at the
/// largest even count under the ceiling. Never below [`MIN_BARS`].
pub fn normalize_bars(bars: u32, bpm: f64) -> u32 {
    let ceiling = max_bars(bpm);
    let ceiling = (ceiling - ceiling % 2).max(MIN_BARS);
    let even = bars.saturating_add(1) / 2 * 2;
    even.clamp(MIN_BARS, ceiling)
}

/// Transient playback cursor. Never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Playhead {
    pub step: usize,
    /// 0.0 to 1.0 through the current step
    pub progress: f64,
    pub last_step_time: f64,
    pub next_step_time: f64,
}

/// Top-level sequencer state
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub name: String,
    /// Pitch lanes
    pub rows: usize,
    /// Bars of the active pattern
    pub bars: u32,
    /// Display resolution
    pub steps_per_bar: u32,
    pub bpm: f64,
    /// Whether views should scroll with the playhead
    pub follow: bool,
    pub selected_track: usize,
    pub selected_pattern: usize,
    pub patterns: Vec<Pattern>,
    /// Pattern ids in song order
    pub arrangement: Vec<String>,
    pub playhead: Playhead,
}

impl Default for Project {
    fn default() -> Self {
        let mut lead = Track::new("track-1", "Lead", TRACK_COLORS[0]);
        lead.waveform = Waveform::Square;
        let mut bass = Track::new("track-2", "Bass", TRACK_COLORS[1]);
        bass.waveform = Waveform::Sawtooth;
        bass.octave = 2;

        let mut pattern = Pattern::new("pattern-1", "Pattern 1", DEFAULT_BARS);
        pattern.tracks = vec![lead, bass];

        Self {
            name: DEFAULT_PROJECT_NAME.to_string(),
            rows: DEFAULT_ROWS,
            bars: DEFAULT_BARS,
            steps_per_bar: DEFAULT_STEPS_PER_BAR,
            bpm: DEFAULT_BPM,
            follow: true,
            selected_track: 0,
            selected_pattern: 0,
            patterns: vec![pattern],
            arrangement: Vec::new(),
            playhead: Playhead::default(),
        }
        .normalized()
    }
}

impl Project {
    pub fn active_pattern(&self) -> &Pattern {
        &self.patterns[self.selected_pattern]
    }

    pub fn active_pattern_mut(&mut self) -> &mut Pattern {
        &mut self.patterns[self.selected_pattern]
    }

    /// Tracks of the active pattern
    pub fn tracks(&self) -> &[Track] {
        &self.active_pattern().tracks
    }

    pub fn tracks_mut(&mut self) -> &mut Vec<Track> {
        &mut self.active_pattern_mut().tracks
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks().get(self.selected_track)
    }

    pub fn storage_steps(&self) -> usize {
        storage_steps(self.bars)
    }

    pub fn logical_steps(&self) -> usize {
        logical_steps(self.bars, self.steps_per_bar)
    }

    pub fn loop_seconds(&self) -> f64 {
        self.bars as f64 * seconds_per_bar(self.bpm)
    }

    pub fn pattern_index(&self, id: &str) -> Option<usize> {
        self.patterns.iter().position(|p| p.id == id)
    }

    /// Re-establish every invariant. Idempotent.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            self.name = DEFAULT_PROJECT_NAME.to_string();
        }
        self.rows = self.rows.clamp(MIN_ROWS, MAX_ROWS);
        self.bpm = clamp_bpm(self.bpm);
        self.steps_per_bar = coerce_steps_per_bar(self.steps_per_bar);

        if self.patterns.is_empty() {
            self.patterns.push(Pattern::new("pattern-1", "Pattern 1", self.bars));
        }
        self.patterns.truncate(MAX_PATTERNS);
        self.selected_pattern = self.selected_pattern.min(self.patterns.len() - 1);

        let patterns = std::mem::take(&mut self.patterns);
        let mut normalized: Vec<Pattern> = Vec::with_capacity(patterns.len());
        for (index, pattern) in patterns.into_iter().enumerate() {
            let shared = (index == self.selected_pattern).then_some(self.bars);
            let mut pattern = normalize_pattern(pattern, self.rows, self.bpm, shared);
            if pattern.id.is_empty() || normalized.iter().any(|p| p.id == pattern.id) {
                pattern.id = next_id("pattern", |id| normalized.iter().any(|p| p.id == id));
            }
            if pattern.name.is_empty() {
                pattern.name = format!("Pattern {}", index + 1);
            }
            normalized.push(pattern);
        }
        self.patterns = normalized;
        self.bars = self.active_pattern().bars;

        let track_count = self.tracks().len();
        self.selected_track = self.selected_track.min(track_count.saturating_sub(1));

        let patterns = &self.patterns;
        self.arrangement.retain(|id| patterns.iter().any(|p| &p.id == id));
        self
    }
}
