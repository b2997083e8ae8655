//! Note painting, erasing, cutting and pasting

use std::ops::Range;

use tracing::trace;

use super::{ProjectStore, Record};
use crate::resolution::logical_range;

/// A note edit as emitted by the grid editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEdit {
    pub row: usize,
    pub start: usize,
    pub length: usize,
    /// `None` toggles the range
    pub value: Option<bool>,
    /// `start`/`length` are already storage indices
    pub storage: bool,
}

impl ProjectStore {
    /// Clip a storage range to the grid of `track`/`row`. `None` when the
    /// indices are out of bounds or the range is empty.
    fn cell_range(&self, track: usize, row: usize, start: usize, length: usize) -> Option<Range<usize>> {
        let columns = self.project.storage_steps();
        if track >= self.project.tracks().len() || row >= self.project.rows || length == 0 || start >= columns {
            return None;
        }
        Some(start..start.saturating_add(length).min(columns))
    }

    /// Overwrite cells of one row starting at `start`, recording both
    /// histories. Returns false, without recording, if nothing would change.
    fn write_cells(&mut self, op: &'static str, track: usize, row: usize, start: usize, cells: &[bool]) -> bool {
        let current = &self.project.tracks()[track].notes[row][start..start + cells.len()];
        if current == cells {
            trace!(op, track, row, start, "No change");
            return false;
        }
        let mut next = self.project.clone();
        next.tracks_mut()[track].notes[row][start..start + cells.len()].copy_from_slice(cells);
        self.commit(op, next, Record::FullAndGrid);
        true
    }

    /// Paint or erase `logical_length` display steps.
    ///
    /// With `value` of `None` the whole range is cleared if any cell in it is
    /// set, and filled otherwise, so one gesture always gives a uniform run.
    pub fn set_note_range(
        &mut self,
        track: usize,
        row: usize,
        logical_start: usize,
        logical_length: usize,
        value: Option<bool>,
    ) -> bool {
        let range = logical_range(logical_start, logical_length, self.project.steps_per_bar);
        self.set_note_range_storage(track, row, range.start, range.len(), value)
    }

    /// [`Self::set_note_range`] at storage resolution
    pub fn set_note_range_storage(
        &mut self,
        track: usize,
        row: usize,
        start: usize,
        length: usize,
        value: Option<bool>,
    ) -> bool {
        let Some(range) = self.cell_range(track, row, start, length) else {
            return false;
        };
        let value = value.unwrap_or_else(|| {
            let cells = &self.project.tracks()[track].notes[row][range.clone()];
            !cells.iter().any(|&c| c)
        });
        let cells = vec![value; range.len()];
        self.write_cells("set_note_range", track, row, range.start, &cells)
    }

    /// Dispatch an editor event
    pub fn apply_note_edit(&mut self, track: usize, edit: NoteEdit) -> bool {
        if edit.storage {
            self.set_note_range_storage(track, edit.row, edit.start, edit.length, edit.value)
        } else {
            self.set_note_range(track, edit.row, edit.start, edit.length, edit.value)
        }
    }

    /// Erase a range and hand back the storage cells it held. `None` if the
    /// range held no notes.
    pub fn cut_note_range(
        &mut self,
        track: usize,
        row: usize,
        logical_start: usize,
        logical_length: usize,
    ) -> Option<Vec<bool>> {
        let range = logical_range(logical_start, logical_length, self.project.steps_per_bar);
        let range = self.cell_range(track, row, range.start, range.len())?;
        let cut = self.project.tracks()[track].notes[row][range.clone()].to_vec();
        if !cut.iter().any(|&c| c) {
            return None;
        }
        let cleared = vec![false; cut.len()];
        self.write_cells("cut_note_range", track, row, range.start, &cleared);
        Some(cut)
    }

    /// Write storage cells starting at a display step, cut at the loop end
    pub fn paste_note_range(&mut self, track: usize, row: usize, logical_start: usize, cells: &[bool]) -> bool {
        let start = logical_range(logical_start, 0, self.project.steps_per_bar).start;
        let Some(range) = self.cell_range(track, row, start, cells.len()) else {
            return false;
        };
        self.write_cells("paste_note_range", track, row, range.start, &cells[..range.len()])
    }

    /// Erase every note of a track
    pub fn clear_track(&mut self, track: usize) -> bool {
        let Some(current) = self.project.tracks().get(track) else {
            return false;
        };
        if !current.has_notes() {
            return false;
        }
        let mut next = self.project.clone();
        for row in &mut next.tracks_mut()[track].notes {
            row.fill(false);
        }
        self.commit("clear_track", next, Record::FullAndGrid);
        true
    }
}
