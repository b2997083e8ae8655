//! Track representation

use serde::{Deserialize, Serialize};

use crate::scale::{validate_custom_scale, ScaleMode};

/// `notes[row][storage_column]`
pub type NoteMatrix = Vec<Vec<bool>>;

pub const MIN_OCTAVE: u8 = 1;
pub const MAX_OCTAVE: u8 = 7;
pub const DEFAULT_OCTAVE: u8 = 4;
pub const DEFAULT_VOLUME: f32 = 0.8;
pub const DEFAULT_CUSTOM_SHAPE: f32 = 0.5;

/// Colors handed out to new tracks, in order
pub const TRACK_COLORS: [&str; 8] = [
    "#f97316", "#22d3ee", "#a3e635", "#e879f9", "#facc15", "#60a5fa", "#f87171", "#34d399",
];

/// Clamp a float, substituting `fallback` for NaN/inf
pub(crate) fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() { value.clamp(min, max) } else { fallback }
}

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    #[default]
    Square,
    Sawtooth,
    Triangle,
    /// Morphing shape driven by `custom_shape`
    Custom,
}

impl Waveform {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sine" => Some(Self::Sine),
            "square" => Some(Self::Square),
            "sawtooth" | "saw" => Some(Self::Sawtooth),
            "triangle" | "tri" => Some(Self::Triangle),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Lowpass cutoff in Hz (20-20000)
    pub cutoff: f32,
    /// 0.0 to 1.0
    pub resonance: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self { cutoff: 20000.0, resonance: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayParams {
    /// Delay time in seconds (0-2)
    pub time: f32,
    /// 0.0 to 0.95
    pub feedback: f32,
    pub mix: f32,
}

impl Default for DelayParams {
    fn default() -> Self {
        Self { time: 0.25, feedback: 0.3, mix: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverbParams {
    pub size: f32,
    pub mix: f32,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self { size: 0.5, mix: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitcrushParams {
    /// Bit depth (1-16)
    pub bits: u8,
    pub mix: f32,
}

impl Default for BitcrushParams {
    fn default() -> Self {
        Self { bits: 16, mix: 0.0 }
    }
}

/// Per-track effect parameters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Effects {
    pub filter: FilterParams,
    pub delay: DelayParams,
    pub reverb: ReverbParams,
    pub bitcrush: BitcrushParams,
}

impl Effects {
    /// Every parameter clamped independently
    pub fn clamped(self) -> Self {
        let d = Effects::default();
        Self {
            filter: FilterParams {
                cutoff: clamp_or(self.filter.cutoff, 20.0, 20000.0, d.filter.cutoff),
                resonance: clamp_or(self.filter.resonance, 0.0, 1.0, d.filter.resonance),
            },
            delay: DelayParams {
                time: clamp_or(self.delay.time, 0.0, 2.0, d.delay.time),
                feedback: clamp_or(self.delay.feedback, 0.0, 0.95, d.delay.feedback),
                mix: clamp_or(self.delay.mix, 0.0, 1.0, d.delay.mix),
            },
            reverb: ReverbParams {
                size: clamp_or(self.reverb.size, 0.0, 1.0, d.reverb.size),
                mix: clamp_or(self.reverb.mix, 0.0, 1.0, d.reverb.mix),
            },
            bitcrush: BitcrushParams {
                bits: self.bitcrush.bits.clamp(1, 16),
                mix: clamp_or(self.bitcrush.mix, 0.0, 1.0, d.bitcrush.mix),
            },
        }
    }
}

/// Partial update of [`Effects`]; `None` leaves a field alone
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectsPatch {
    pub filter_cutoff: Option<f32>,
    pub filter_resonance: Option<f32>,
    pub delay_time: Option<f32>,
    pub delay_feedback: Option<f32>,
    pub delay_mix: Option<f32>,
    pub reverb_size: Option<f32>,
    pub reverb_mix: Option<f32>,
    pub bitcrush_bits: Option<u8>,
    pub bitcrush_mix: Option<f32>,
}

impl EffectsPatch {
    /// Apply to `effects`, skipping non-finite values. Result is clamped.
    pub fn apply(&self, effects: Effects) -> Effects {
        let mut next = effects;
        let floats = [
            (self.filter_cutoff, &mut next.filter.cutoff),
            (self.filter_resonance, &mut next.filter.resonance),
            (self.delay_time, &mut next.delay.time),
            (self.delay_feedback, &mut next.delay.feedback),
            (self.delay_mix, &mut next.delay.mix),
            (self.reverb_size, &mut next.reverb.size),
            (self.reverb_mix, &mut next.reverb.mix),
            (self.bitcrush_mix, &mut next.bitcrush.mix),
        ];
        for (value, slot) in floats {
            if let Some(v) = value.filter(|v| v.is_finite()) {
                *slot = v;
            }
        }
        if let Some(bits) = self.bitcrush_bits {
            next.bitcrush.bits = bits;
        }
        next.clamped()
    }
}

/// Amplitude envelope, all times in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for Adsr {
    fn default() -> Self {
        Self { attack: 0.01, decay: 0.1, sustain: 0.7, release: 0.2 }
    }
}

impl Adsr {
    pub fn clamped(self) -> Self {
        let d = Adsr::default();
        Self {
            attack: clamp_or(self.attack, 0.0, 2.0, d.attack),
            decay: clamp_or(self.decay, 0.0, 2.0, d.decay),
            sustain: clamp_or(self.sustain, 0.0, 1.0, d.sustain),
            release: clamp_or(self.release, 0.0, 5.0, d.release),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdsrPatch {
    pub attack: Option<f32>,
    pub decay: Option<f32>,
    pub sustain: Option<f32>,
    pub release: Option<f32>,
}

impl AdsrPatch {
    pub fn apply(&self, adsr: Adsr) -> Adsr {
        let pick = |patch: Option<f32>, current: f32| patch.filter(|v| v.is_finite()).unwrap_or(current);
        Adsr {
            attack: pick(self.attack, adsr.attack),
            decay: pick(self.decay, adsr.decay),
            sustain: pick(self.sustain, adsr.sustain),
            release: pick(self.release, adsr.release),
        }
        .clamped()
    }
}

/// A synth lane in a pattern: sound settings plus its note grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub name: String,
    pub color: String,
    pub waveform: Waveform,
    pub scale: ScaleMode,
    /// Semitones from root, only meaningful when `scale` is `Custom`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_scale: Vec<u8>,
    pub octave: u8,
    pub volume: f32,
    pub custom_shape: f32,
    pub effects: Effects,
    pub adsr: Adsr,
    pub root_note: u8,
    pub mute: bool,
    pub solo: bool,
    pub notes: NoteMatrix,
}

impl Track {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            waveform: Waveform::default(),
            scale: ScaleMode::default(),
            custom_scale: Vec::new(),
            octave: DEFAULT_OCTAVE,
            volume: DEFAULT_VOLUME,
            custom_shape: DEFAULT_CUSTOM_SHAPE,
            effects: Effects::default(),
            adsr: Adsr::default(),
            root_note: 0,
            mute: false,
            solo: false,
            notes: Vec::new(),
        }
    }

    /// Deep copy under a new id. The copy is never soloed.
    pub fn duplicate(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: format!("{} Copy", self.name),
            solo: false,
            ..self.clone()
        }
    }

    pub fn has_notes(&self) -> bool {
        self.notes.iter().any(|row| row.iter().any(|&c| c))
    }

    /// Intervals the rows walk through
    pub fn scale_intervals(&self) -> &[u8] {
        if self.scale == ScaleMode::Custom && !self.custom_scale.is_empty() {
            &self.custom_scale
        } else if self.scale == ScaleMode::Custom {
            ScaleMode::default().intervals()
        } else {
            self.scale.intervals()
        }
    }

    /// MIDI note for a grid row. Row 0 is the top (highest) lane.
    pub fn midi_note_for_row(&self, row: usize, rows: usize) -> u8 {
        let intervals = self.scale_intervals();
        let degree = rows.saturating_sub(1).saturating_sub(row);
        let octave_shift = degree / intervals.len();
        let interval = intervals[degree % intervals.len()] as usize;
        let base = 12 * (self.octave as usize + 1) + self.root_note as usize;
        (base + 12 * octave_shift + interval).min(127) as u8
    }
}

/// Reshape to exactly `rows` x `cols`, keeping the overlapping region
pub fn resize_notes(notes: &mut NoteMatrix, rows: usize, cols: usize) {
    notes.resize_with(rows, Vec::new);
    for row in notes.iter_mut() {
        row.resize(cols, false);
    }
}

/// Clamp every field and reshape the notes to `rows` x `storage_steps`
pub fn normalize_track(mut track: Track, rows: usize, storage_steps: usize) -> Track {
    track.name = track.name.trim().to_string();
    track.color = track.color.trim().to_string();
    track.octave = track.octave.clamp(MIN_OCTAVE, MAX_OCTAVE);
    track.volume = clamp_or(track.volume, 0.0, 1.0, DEFAULT_VOLUME);
    track.custom_shape = clamp_or(track.custom_shape, 0.0, 1.0, DEFAULT_CUSTOM_SHAPE);
    track.root_note = track.root_note.min(11);
    track.effects = track.effects.clamped();
    track.adsr = track.adsr.clamped();

    let degrees: Vec<i64> = track.custom_scale.iter().map(|&d| d as i64).collect();
    match validate_custom_scale(&degrees) {
        Some(valid) => track.custom_scale = valid,
        None => {
            if track.scale == ScaleMode::Custom {
                tracing::warn!(track = %track.id, "Invalid custom scale, falling back to default");
                track.scale = ScaleMode::default();
            }
            track.custom_scale.clear();
        }
    }

    resize_notes(&mut track.notes, rows, storage_steps);
    track
}
