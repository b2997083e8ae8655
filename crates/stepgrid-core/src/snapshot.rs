//! Serializable project snapshots

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StepgridError};
use crate::pattern::Pattern;
use crate::project::{Playhead, Project};
use crate::raw::project_from_value;
use crate::track::{resize_notes, NoteMatrix, Track};

/// Persisted/exported project shape.
///
/// `tracks` mirrors the selected pattern so that readers of the legacy
/// single-pattern format still find the notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub name: String,
    pub rows: usize,
    pub bars: u32,
    pub steps_per_bar: u32,
    pub bpm: f64,
    #[serde(default)]
    pub follow: bool,
    #[serde(default)]
    pub selected_track: usize,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<Pattern>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_pattern: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrangement: Option<Vec<String>>,
}

impl ProjectSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl TryFrom<&Value> for ProjectSnapshot {
    type Error = StepgridError;

    /// Lenient decode of either payload shape, normalized on the way
    fn try_from(value: &Value) -> Result<Self> {
        let project = project_from_value(value).ok_or(StepgridError::NotAnObject)?;
        Ok(Self::from(&project))
    }
}

impl From<&Project> for ProjectSnapshot {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            rows: project.rows,
            bars: project.bars,
            steps_per_bar: project.steps_per_bar,
            bpm: project.bpm,
            follow: project.follow,
            selected_track: project.selected_track,
            tracks: project.tracks().to_vec(),
            patterns: Some(project.patterns.clone()),
            selected_pattern: Some(project.selected_pattern),
            arrangement: Some(project.arrangement.clone()),
        }
    }
}

impl From<ProjectSnapshot> for Project {
    /// Typed conversion; a snapshot without patterns becomes one pattern.
    fn from(snapshot: ProjectSnapshot) -> Self {
        let patterns = match snapshot.patterns {
            Some(patterns) if !patterns.is_empty() => patterns,
            _ => {
                let mut pattern = Pattern::new("pattern-1", "Pattern 1", snapshot.bars);
                pattern.tracks = snapshot.tracks;
                vec![pattern]
            }
        };
        Project {
            name: snapshot.name,
            rows: snapshot.rows,
            bars: snapshot.bars,
            steps_per_bar: snapshot.steps_per_bar,
            bpm: snapshot.bpm,
            follow: snapshot.follow,
            selected_track: snapshot.selected_track,
            selected_pattern: snapshot.selected_pattern.unwrap_or(0),
            patterns,
            arrangement: snapshot.arrangement.unwrap_or_default(),
            playhead: Playhead::default(),
        }
        .normalized()
    }
}

/// Notes of one pattern's tracks, for the grid-only history
#[derive(Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    /// Id of the pattern the notes belong to
    pub pattern_id: String,
    pub notes: Vec<NoteMatrix>,
}

impl GridSnapshot {
    /// Notes of the active pattern
    pub fn capture(project: &Project) -> Self {
        Self::of(project.active_pattern())
    }

    /// Notes of the pattern with id `pattern_id`, if it still exists
    pub fn capture_pattern(project: &Project, pattern_id: &str) -> Option<Self> {
        let index = project.pattern_index(pattern_id)?;
        Some(Self::of(&project.patterns[index]))
    }

    fn of(pattern: &Pattern) -> Self {
        Self {
            pattern_id: pattern.id.clone(),
            notes: pattern.tracks.iter().map(|t| t.notes.clone()).collect(),
        }
    }

    /// Patch the notes of the owning pattern's tracks by index, reshaped to
    /// that pattern's grid. Everything else is left alone, and tracks beyond
    /// the snapshot keep their notes. Returns false if the pattern is gone.
    pub fn apply_to(self, project: &mut Project) -> bool {
        let Some(index) = project.pattern_index(&self.pattern_id) else {
            return false;
        };
        let rows = project.rows;
        let pattern = &mut project.patterns[index];
        let columns = pattern.storage_steps();
        for (track, mut notes) in pattern.tracks.iter_mut().zip(self.notes) {
            resize_notes(&mut notes, rows, columns);
            track.notes = notes;
        }
        true
    }
}
