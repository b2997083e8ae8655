//! Best-effort decoding of loaded payloads.
//!
//! Persisted data may come from older versions or be hand-edited, so nothing
//! here fails on a bad field: each value is read on its own and anything
//! missing or malformed falls back to its default. Clamping is left to
//! normalization.

use serde_json::{Map, Value};

use crate::pattern::Pattern;
use crate::project::{Playhead, Project, DEFAULT_BARS, DEFAULT_BPM, DEFAULT_PROJECT_NAME, DEFAULT_ROWS};
use crate::resolution::{coerce_steps_per_bar, storage_per_step, storage_steps, DEFAULT_STEPS_PER_BAR};
use crate::scale::{validate_custom_scale, ScaleMode};
use crate::track::{Adsr, Effects, NoteMatrix, Track, Waveform, DEFAULT_OCTAVE};

type Object = Map<String, Value>;

fn num(obj: &Object, key: &str) -> Option<f64> {
    let value = obj.get(key)?;
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn float(obj: &Object, key: &str, default: f32) -> f32 {
    num(obj, key).map(|n| n as f32).unwrap_or(default)
}

/// Non-negative integer (fractions floored, negatives become 0)
fn uint(obj: &Object, key: &str) -> Option<u64> {
    num(obj, key).map(|n| n.max(0.0).floor() as u64)
}

fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

fn boolean(obj: &Object, key: &str) -> Option<bool> {
    match obj.get(key)? {
        Value::Bool(b) => Some(*b),
        other @ Value::Number(_) => Some(flag(other)),
        _ => None,
    }
}

fn text(obj: &Object, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn effects_from(value: Option<&Value>) -> Effects {
    let d = Effects::default();
    let Some(obj) = value.and_then(Value::as_object) else {
        return d;
    };
    let section = |key: &str| obj.get(key).and_then(Value::as_object).cloned().unwrap_or_default();
    let (filter, delay, reverb, bitcrush) = (section("filter"), section("delay"), section("reverb"), section("bitcrush"));

    let mut fx = d;
    fx.filter.cutoff = float(&filter, "cutoff", d.filter.cutoff);
    fx.filter.resonance = float(&filter, "resonance", d.filter.resonance);
    fx.delay.time = float(&delay, "time", d.delay.time);
    fx.delay.feedback = float(&delay, "feedback", d.delay.feedback);
    fx.delay.mix = float(&delay, "mix", d.delay.mix);
    fx.reverb.size = float(&reverb, "size", d.reverb.size);
    fx.reverb.mix = float(&reverb, "mix", d.reverb.mix);
    fx.bitcrush.bits = uint(&bitcrush, "bits").map(|b| b.min(16) as u8).unwrap_or(d.bitcrush.bits);
    fx.bitcrush.mix = float(&bitcrush, "mix", d.bitcrush.mix);
    fx
}

fn adsr_from(value: Option<&Value>) -> Adsr {
    let d = Adsr::default();
    let Some(obj) = value.and_then(Value::as_object) else {
        return d;
    };
    Adsr {
        attack: float(obj, "attack", d.attack),
        decay: float(obj, "decay", d.decay),
        sustain: float(obj, "sustain", d.sustain),
        release: float(obj, "release", d.release),
    }
}

fn custom_scale_from(value: Option<&Value>) -> Vec<u8> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    // Non-integers map to an out-of-range degree so validation rejects them
    let degrees: Vec<i64> = items
        .iter()
        .map(|v| match v.as_f64() {
            Some(n) if n.fract() == 0.0 => n as i64,
            _ => -1,
        })
        .collect();
    validate_custom_scale(&degrees).unwrap_or_default()
}

/// Decode a notes matrix. Matrices saved at display resolution (exactly
/// `bars * steps_per_bar` columns) are upscaled to storage resolution.
fn notes_from(value: Option<&Value>, bars: u32, steps_per_bar: u32) -> NoteMatrix {
    let Some(rows) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    let notes: NoteMatrix = rows
        .iter()
        .map(|row| row.as_array().map(|cells| cells.iter().map(flag).collect()).unwrap_or_default())
        .collect();

    let display_columns = bars as usize * steps_per_bar as usize;
    let is_display_resolution = !notes.is_empty()
        && display_columns != storage_steps(bars)
        && notes.iter().all(|row| row.len() == display_columns);
    if !is_display_resolution {
        return notes;
    }

    tracing::warn!(bars, steps_per_bar, "Upscaling display-resolution notes to storage resolution");
    let per_step = storage_per_step(steps_per_bar);
    notes
        .into_iter()
        .map(|row| row.into_iter().flat_map(|cell| std::iter::repeat_n(cell, per_step)).collect())
        .collect()
}

fn track_from(value: &Value, bars: u32, steps_per_bar: u32) -> Option<Track> {
    let obj = value.as_object()?;
    let mut track = Track::new(
        text(obj, "id").unwrap_or_default(),
        text(obj, "name").unwrap_or_default(),
        text(obj, "color").unwrap_or_default(),
    );
    if let Some(name) = text(obj, "waveform") {
        track.waveform = Waveform::from_name(&name).unwrap_or_default();
    }
    if let Some(name) = text(obj, "scale") {
        track.scale = ScaleMode::from_name(&name).unwrap_or_else(|| {
            tracing::warn!(scale = %name, "Unknown scale, using default");
            ScaleMode::default()
        });
    }
    track.custom_scale = custom_scale_from(obj.get("customScale"));
    track.octave = uint(obj, "octave").map(|o| o.min(u8::MAX as u64) as u8).unwrap_or(DEFAULT_OCTAVE);
    track.volume = float(obj, "volume", track.volume);
    track.custom_shape = float(obj, "customShape", track.custom_shape);
    track.effects = effects_from(obj.get("effects"));
    track.adsr = adsr_from(obj.get("adsr"));
    track.root_note = uint(obj, "rootNote").map(|n| n.min(11) as u8).unwrap_or(0);
    track.mute = boolean(obj, "mute").unwrap_or(false);
    track.solo = boolean(obj, "solo").unwrap_or(false);
    track.notes = notes_from(obj.get("notes"), bars, steps_per_bar);
    Some(track)
}

fn tracks_from(value: Option<&Value>, bars: u32, steps_per_bar: u32) -> Vec<Track> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|t| track_from(t, bars, steps_per_bar)).collect())
        .unwrap_or_default()
}

fn pattern_from(value: &Value, default_bars: u32, steps_per_bar: u32) -> Option<Pattern> {
    let obj = value.as_object()?;
    let bars = uint(obj, "bars").map(|b| b.min(u32::MAX as u64) as u32).unwrap_or(default_bars);
    let mut pattern = Pattern::new(
        text(obj, "id").unwrap_or_default(),
        text(obj, "name").unwrap_or_default(),
        bars,
    );
    pattern.tracks = tracks_from(obj.get("tracks"), bars, steps_per_bar);
    Some(pattern)
}

/// Decode either payload shape into a normalized [`Project`].
///
/// Returns `None` only when `value` is not a JSON object.
pub fn project_from_value(value: &Value) -> Option<Project> {
    let obj = value.as_object()?;

    let steps_per_bar = uint(obj, "stepsPerBar")
        .map(|n| coerce_steps_per_bar(n.min(u32::MAX as u64) as u32))
        .unwrap_or(DEFAULT_STEPS_PER_BAR);
    let mut bars = uint(obj, "bars").map(|b| b.min(u32::MAX as u64) as u32).unwrap_or(DEFAULT_BARS);
    let mut selected_pattern = uint(obj, "selectedPattern").unwrap_or(0) as usize;

    let patterns: Vec<Pattern> = obj
        .get("patterns")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|p| pattern_from(p, bars, steps_per_bar)).collect())
        .unwrap_or_default();

    let patterns = if patterns.is_empty() {
        // Legacy shape: one implicit pattern holding the top-level tracks
        selected_pattern = 0;
        let mut pattern = Pattern::new("pattern-1", "Pattern 1", bars);
        pattern.tracks = tracks_from(obj.get("tracks"), bars, steps_per_bar);
        vec![pattern]
    } else {
        selected_pattern = selected_pattern.min(patterns.len() - 1);
        bars = patterns[selected_pattern].bars;
        patterns
    };

    let arrangement = obj
        .get("arrangement")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(|id| id.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    Some(
        Project {
            name: text(obj, "name").unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string()),
            rows: uint(obj, "rows").map(|r| r as usize).unwrap_or(DEFAULT_ROWS),
            bars,
            steps_per_bar,
            bpm: num(obj, "bpm").unwrap_or(DEFAULT_BPM),
            follow: boolean(obj, "follow").unwrap_or(true),
            selected_track: uint(obj, "selectedTrack").unwrap_or(0) as usize,
            selected_pattern,
            patterns,
            arrangement,
            playhead: Playhead::default(),
        }
        .normalized(),
    )
}
