//! Tempo, loop length, resolution and other project-wide settings

use super::ProjectStore;

impl ProjectStore {
    /// Change tempo. Bar counts above the new loop ceiling shrink.
    pub fn set_bpm(&mut self, bpm: f64) -> bool {
        if !bpm.is_finite() {
            return false;
        }
        self.transition("set_bpm", |project| {
            project.bpm = bpm;
            true
        })
    }

    /// Resize the active pattern. Rounded to an even count under the ceiling.
    pub fn set_bars(&mut self, bars: u32) -> bool {
        self.transition("set_bars", |project| {
            project.bars = bars;
            true
        })
    }

    /// Change the display resolution, snapped to a supported value
    pub fn set_steps_per_bar(&mut self, steps_per_bar: u32) -> bool {
        self.transition("set_steps_per_bar", |project| {
            project.steps_per_bar = steps_per_bar;
            true
        })
    }

    /// Change the number of pitch lanes on every track
    pub fn set_rows(&mut self, rows: usize) -> bool {
        self.transition("set_rows", |project| {
            project.rows = rows;
            true
        })
    }

    pub fn set_name(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.transition("set_name", |project| {
            project.name = name.to_string();
            true
        })
    }

    pub fn set_follow(&mut self, follow: bool) -> bool {
        self.transition("set_follow", |project| {
            project.follow = follow;
            true
        })
    }
}
