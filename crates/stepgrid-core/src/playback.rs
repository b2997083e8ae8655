//! Turning scheduler steps into note events

use crate::project::Project;
use crate::resolution::{logical_range, storage_per_step};

/// A note to sound, in audio-clock seconds
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    /// Track index in the active pattern
    pub track: usize,
    pub row: usize,
    pub midi_note: u8,
    pub time: f64,
    pub duration: f64,
    pub velocity: f32,
}

/// Length of the run of set cells starting at `start`
fn run_length(cells: &[bool], start: usize) -> usize {
    cells[start..].iter().take_while(|&&c| c).count()
}

/// Note events starting inside logical `step` of the active pattern.
///
/// `step` wraps around the loop. A note is a run of contiguous set storage
/// cells; it sounds once, at its first cell, for the length of the run
/// (cut at the loop end). Muted tracks are silent, and once any track is
/// soloed only soloed tracks play.
pub fn events_for_step(project: &Project, step: u64, step_time: f64, step_duration: f64) -> Vec<NoteEvent> {
    let total = project.logical_steps();
    if total == 0 {
        return Vec::new();
    }
    let step = (step % total as u64) as usize;
    let range = logical_range(step, 1, project.steps_per_bar);
    let cell_seconds = step_duration / storage_per_step(project.steps_per_bar) as f64;
    let pattern = project.active_pattern();

    let mut events = Vec::new();
    for (track_index, track) in pattern.tracks.iter().enumerate() {
        if !pattern.is_audible(track_index) {
            continue;
        }
        for (row, cells) in track.notes.iter().enumerate() {
            for index in range.clone() {
                let onset = cells.get(index).copied().unwrap_or(false) && (index == 0 || !cells[index - 1]);
                if !onset {
                    continue;
                }
                events.push(NoteEvent {
                    track: track_index,
                    row,
                    midi_note: track.midi_note_for_row(row, project.rows),
                    time: step_time + (index - range.start) as f64 * cell_seconds,
                    duration: run_length(cells, index) as f64 * cell_seconds,
                    velocity: track.volume,
                });
            }
        }
    }
    events.sort_by(|a, b| a.time.total_cmp(&b.time));
    events
}
