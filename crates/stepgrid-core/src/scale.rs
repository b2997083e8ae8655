//! Scales used to map grid rows to pitches

use serde::{Deserialize, Serialize};

/// Scale/mode types. `Custom` takes its intervals from the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScaleMode {
    #[default]
    Major,
    Minor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
    HarmonicMinor,
    MelodicMinor,
    Pentatonic,
    MinorPentatonic,
    Blues,
    Chromatic,
    Custom,
}

impl ScaleMode {
    pub const NAMED: [ScaleMode; 13] = [
        Self::Major,
        Self::Minor,
        Self::Dorian,
        Self::Phrygian,
        Self::Lydian,
        Self::Mixolydian,
        Self::Locrian,
        Self::HarmonicMinor,
        Self::MelodicMinor,
        Self::Pentatonic,
        Self::MinorPentatonic,
        Self::Blues,
        Self::Chromatic,
    ];

    /// Scale intervals (semitones from root). Empty for `Custom`.
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 2, 4, 5, 7, 9, 11],
            Self::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Self::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Self::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            Self::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Self::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Self::Locrian => &[0, 1, 3, 5, 6, 8, 10],
            Self::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            Self::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            Self::Pentatonic => &[0, 2, 4, 7, 9],
            Self::MinorPentatonic => &[0, 3, 5, 7, 10],
            Self::Blues => &[0, 3, 5, 6, 7, 10],
            Self::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            Self::Custom => &[],
        }
    }

    /// Lenient name lookup: case, `_`, `-` and spaces are ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        let mode = match key.as_str() {
            "major" | "ionian" => Self::Major,
            "minor" | "aeolian" | "naturalminor" => Self::Minor,
            "dorian" => Self::Dorian,
            "phrygian" => Self::Phrygian,
            "lydian" => Self::Lydian,
            "mixolydian" => Self::Mixolydian,
            "locrian" => Self::Locrian,
            "harmonicminor" => Self::HarmonicMinor,
            "melodicminor" => Self::MelodicMinor,
            "pentatonic" | "majorpentatonic" => Self::Pentatonic,
            "minorpentatonic" => Self::MinorPentatonic,
            "blues" => Self::Blues,
            "chromatic" => Self::Chromatic,
            "custom" => Self::Custom,
            _ => return None,
        };
        Some(mode)
    }
}

/// Validate custom scale degrees: unique semitones in 0..=11 that include the
/// root. Returns the degrees sorted ascending, or `None` if invalid.
pub fn validate_custom_scale(degrees: &[i64]) -> Option<Vec<u8>> {
    if degrees.is_empty() || !degrees.contains(&0) {
        return None;
    }
    let mut out: Vec<u8> = Vec::with_capacity(degrees.len());
    for &degree in degrees {
        if !(0..=11).contains(&degree) {
            return None;
        }
        let degree = degree as u8;
        if out.contains(&degree) {
            return None;
        }
        out.push(degree);
    }
    out.sort_unstable();
    Some(out)
}
