//! Pattern management

use super::ProjectStore;
use crate::pattern::{next_id, Pattern, MAX_PATTERNS};
use crate::project::Project;

/// After the selected pattern changes, the project's bar count follows it
fn follow_selected(project: &mut Project) {
    project.bars = project.active_pattern().bars;
    project.selected_track = project.selected_track.min(project.tracks().len().saturating_sub(1));
}

impl ProjectStore {
    /// Add a pattern after the last one and select it.
    ///
    /// The new pattern reuses the current tracks' sounds with an empty grid.
    pub fn add_pattern(&mut self) -> Option<usize> {
        let index = self.project.patterns.len();
        if index >= MAX_PATTERNS {
            return None;
        }
        self.transition("add_pattern", |project| {
            let patterns = &project.patterns;
            let id = next_id("pattern", |id| patterns.iter().any(|p| p.id == id));
            let mut pattern = Pattern::new(id, format!("Pattern {}", index + 1), project.bars);
            pattern.tracks = project.tracks().to_vec();
            for track in &mut pattern.tracks {
                track.notes.clear();
            }
            project.patterns.push(pattern);
            project.selected_pattern = index;
            follow_selected(project);
            true
        })
        .then_some(index)
    }

    /// Insert a deep copy right after `index` and select it
    pub fn duplicate_pattern(&mut self, index: usize) -> Option<usize> {
        let count = self.project.patterns.len();
        if index >= count || count >= MAX_PATTERNS {
            return None;
        }
        self.transition("duplicate_pattern", |project| {
            let patterns = &project.patterns;
            let id = next_id("pattern", |id| patterns.iter().any(|p| p.id == id));
            let source = &project.patterns[index];
            let copy = Pattern {
                id,
                name: format!("{} Copy", source.name),
                ..source.clone()
            };
            project.patterns.insert(index + 1, copy);
            project.selected_pattern = index + 1;
            follow_selected(project);
            true
        })
        .then_some(index + 1)
    }

    /// Remove a pattern; the last one cannot be removed
    pub fn remove_pattern(&mut self, index: usize) -> bool {
        self.transition("remove_pattern", |project| {
            if index >= project.patterns.len() || project.patterns.len() <= 1 {
                return false;
            }
            project.patterns.remove(index);
            if project.selected_pattern > index {
                project.selected_pattern -= 1;
            }
            project.selected_pattern = project.selected_pattern.min(project.patterns.len() - 1);
            follow_selected(project);
            true
        })
    }

    pub fn rename_pattern(&mut self, index: usize, name: &str) -> bool {
        let name = name.trim();
        self.transition("rename_pattern", |project| {
            let Some(pattern) = project.patterns.get_mut(index) else {
                return false;
            };
            if name.is_empty() {
                return false;
            }
            pattern.name = name.to_string();
            true
        })
    }

    /// Move a pattern from `from` to `to`. The selection stays on the same
    /// pattern: it follows the moved pattern, or shifts by one when another
    /// pattern crosses it.
    pub fn reorder_pattern(&mut self, from: usize, to: usize) -> bool {
        self.transition("reorder_pattern", |project| {
            let count = project.patterns.len();
            if from >= count || to >= count || from == to {
                return false;
            }
            let pattern = project.patterns.remove(from);
            project.patterns.insert(to, pattern);

            let selected = project.selected_pattern;
            project.selected_pattern = if selected == from {
                to
            } else if from < selected && to >= selected {
                selected - 1
            } else if from > selected && to <= selected {
                selected + 1
            } else {
                selected
            };
            true
        })
    }

    /// Make another pattern active. Not recorded in history.
    pub fn select_pattern(&mut self, index: usize) -> bool {
        self.update_silently("select_pattern", |project| {
            if index >= project.patterns.len() {
                return false;
            }
            project.selected_pattern = index;
            follow_selected(project);
            true
        })
    }

    /// Song order as pattern ids; unknown ids are dropped
    pub fn set_arrangement(&mut self, ids: Vec<String>) -> bool {
        self.transition("set_arrangement", |project| {
            project.arrangement = ids;
            true
        })
    }
}
