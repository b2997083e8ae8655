//! Track setting commands

use crate::pattern::Pattern;
use crate::scale::ScaleMode;
use crate::track::{AdsrPatch, EffectsPatch, Waveform, MAX_OCTAVE, MIN_OCTAVE};

/// One edit to a track's sound settings
#[derive(Debug, Clone, PartialEq)]
pub enum TrackSetting {
    /// 0.0 to 1.0
    Volume(f32),
    /// 1 to 7
    Octave(i32),
    /// 0.0 to 1.0
    CustomShape(f32),
    Effects(EffectsPatch),
    Adsr(AdsrPatch),
    Mute(bool),
    /// Soloing one track un-solos the rest of the pattern
    Solo(bool),
    /// `custom` replaces the custom degrees; `None` keeps the current ones
    Scale { mode: ScaleMode, custom: Option<Vec<u8>> },
    Name(String),
    Color(String),
    Waveform(Waveform),
    /// 0 (C) to 11 (B)
    RootNote(i32),
}

impl TrackSetting {
    /// Write the setting into track `index` of `pattern`.
    ///
    /// Values are clamped here; values that cannot be clamped (NaN, empty
    /// names) leave the pattern untouched. Custom scales are validated by
    /// normalization afterwards.
    pub(crate) fn apply(self, pattern: &mut Pattern, index: usize) -> bool {
        if index >= pattern.tracks.len() {
            return false;
        }
        let track = &mut pattern.tracks[index];
        match self {
            Self::Volume(v) if v.is_finite() => track.volume = v.clamp(0.0, 1.0),
            Self::CustomShape(v) if v.is_finite() => track.custom_shape = v.clamp(0.0, 1.0),
            Self::Volume(_) | Self::CustomShape(_) => return false,
            Self::Octave(o) => track.octave = o.clamp(MIN_OCTAVE as i32, MAX_OCTAVE as i32) as u8,
            Self::RootNote(n) => track.root_note = n.clamp(0, 11) as u8,
            Self::Effects(patch) => track.effects = patch.apply(track.effects),
            Self::Adsr(patch) => track.adsr = patch.apply(track.adsr),
            Self::Mute(mute) => track.mute = mute,
            Self::Solo(solo) => pattern.solo_exclusive(index, solo),
            Self::Scale { mode, custom } => {
                track.scale = mode;
                if let Some(custom) = custom {
                    track.custom_scale = custom;
                }
            }
            Self::Name(name) | Self::Color(name) if name.trim().is_empty() => return false,
            Self::Name(name) => track.name = name.trim().to_string(),
            Self::Color(color) => track.color = color.trim().to_string(),
            Self::Waveform(waveform) => track.waveform = waveform,
        }
        true
    }
}
