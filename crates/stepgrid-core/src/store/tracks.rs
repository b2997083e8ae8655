//! Track management

use super::ProjectStore;
use crate::pattern::{next_id, MAX_TRACKS};
use crate::setting::TrackSetting;
use crate::track::{Track, TRACK_COLORS};

impl ProjectStore {
    /// Append a fresh track to the active pattern and select it. `None` at
    /// the track ceiling.
    pub fn add_track(&mut self) -> Option<usize> {
        let index = self.project.tracks().len();
        if index >= MAX_TRACKS {
            return None;
        }
        self.transition("add_track", |project| {
            let tracks = project.tracks_mut();
            let id = next_id("track", |id| tracks.iter().any(|t| t.id == id));
            let track = Track::new(id, format!("Track {}", index + 1), TRACK_COLORS[index % TRACK_COLORS.len()]);
            tracks.push(track);
            project.selected_track = index;
            true
        })
        .then_some(index)
    }

    /// Insert a deep copy right after `index` and select it
    pub fn duplicate_track(&mut self, index: usize) -> Option<usize> {
        let tracks = self.project.tracks();
        if index >= tracks.len() || tracks.len() >= MAX_TRACKS {
            return None;
        }
        self.transition("duplicate_track", |project| {
            let tracks = project.tracks_mut();
            let id = next_id("track", |id| tracks.iter().any(|t| t.id == id));
            let copy = tracks[index].duplicate(id);
            tracks.insert(index + 1, copy);
            project.selected_track = index + 1;
            true
        })
        .then_some(index + 1)
    }

    /// Remove a track. Removing the last one leaves the pattern empty.
    pub fn remove_track(&mut self, index: usize) -> bool {
        self.transition("remove_track", |project| {
            if index >= project.tracks().len() {
                return false;
            }
            project.tracks_mut().remove(index);
            if project.selected_track > index {
                project.selected_track -= 1;
            }
            true
        })
    }

    pub fn select_track(&mut self, index: usize) -> bool {
        self.update_silently("select_track", |project| {
            if index >= project.tracks().len() {
                return false;
            }
            project.selected_track = index;
            true
        })
    }

    /// Change one setting of a track in the active pattern
    pub fn set_track_setting(&mut self, index: usize, setting: TrackSetting) -> bool {
        self.transition("set_track_setting", |project| setting.apply(project.active_pattern_mut(), index))
    }
}
