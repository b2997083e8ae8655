//! The project state machine.
//!
//! [`ProjectStore`] owns the current [`Project`], the two undo histories and
//! the subscriber list. Every mutation builds the next state, normalizes it
//! and commits only if something actually changed; a commit records the
//! previous state and notifies subscribers.

mod layout;
mod notes;
mod patterns;
mod tracks;

#[cfg(test)]
mod tests;

use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::history::{UndoStack, DEFAULT_MAX_HISTORY};
use crate::project::{Playhead, Project};
use crate::raw::project_from_value;
use crate::snapshot::{GridSnapshot, ProjectSnapshot};

pub use notes::NoteEdit;

/// Store tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Entries kept per history stack
    pub max_history: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { max_history: DEFAULT_MAX_HISTORY }
    }
}

/// Handle returned by [`ProjectStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Project) + Send>;

/// Which histories a commit records into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Record {
    Full,
    FullAndGrid,
}

pub struct ProjectStore {
    project: Project,
    history: UndoStack<Project>,
    grid_history: UndoStack<GridSnapshot>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self::with_project(Project::default(), config)
    }

    pub fn with_project(project: Project, config: StoreConfig) -> Self {
        Self {
            project: project.normalized(),
            history: UndoStack::new(config.max_history),
            grid_history: UndoStack::new(config.max_history),
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Current state
    pub fn project(&self) -> &Project {
        &self.project
    }

    // ------------------------------------------------------------------
    // Subscription
    // ------------------------------------------------------------------

    /// Call `listener` with the full state after every commit
    pub fn subscribe(&mut self, listener: impl FnMut(&Project) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.project);
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Run `edit` on a copy of the state, normalize, and commit if the
    /// result differs. `edit` returns false to reject the operation.
    fn transition(&mut self, op: &'static str, edit: impl FnOnce(&mut Project) -> bool) -> bool {
        let mut draft = self.project.clone();
        if !edit(&mut draft) {
            trace!(op, "Rejected");
            return false;
        }
        let next = draft.normalized();
        if next == self.project {
            trace!(op, "No change");
            return false;
        }
        self.commit(op, next, Record::Full);
        true
    }

    /// Like [`Self::transition`] but without touching history
    fn update_silently(&mut self, op: &'static str, edit: impl FnOnce(&mut Project) -> bool) -> bool {
        let mut draft = self.project.clone();
        if !edit(&mut draft) {
            return false;
        }
        let next = draft.normalized();
        if next == self.project {
            return false;
        }
        trace!(op, "Updated without history");
        self.project = next;
        self.notify();
        true
    }

    fn commit(&mut self, op: &'static str, next: Project, record: Record) {
        let previous = std::mem::replace(&mut self.project, next);
        if record == Record::FullAndGrid {
            self.grid_history.record(GridSnapshot::capture(&previous));
        }
        self.history.record(previous);
        debug!(op, undo = self.history.undo_len(), "Committed");
        self.notify();
    }

    // ------------------------------------------------------------------
    // Load / snapshot
    // ------------------------------------------------------------------

    /// Replace the project with a loaded payload (legacy or pattern-based).
    ///
    /// Clears both histories. Returns false only when `payload` is not an
    /// object.
    pub fn load(&mut self, payload: &Value) -> bool {
        let Some(project) = project_from_value(payload) else {
            warn!("Ignoring load of a non-object payload");
            return false;
        };
        self.replace(project);
        true
    }

    /// Typed variant of [`Self::load`]
    pub fn load_snapshot(&mut self, snapshot: &ProjectSnapshot) {
        self.replace(Project::from(snapshot.clone()));
    }

    fn replace(&mut self, project: Project) {
        self.project = project;
        self.history.clear();
        self.grid_history.clear();
        info!(
            name = %self.project.name,
            patterns = self.project.patterns.len(),
            bars = self.project.bars,
            bpm = self.project.bpm,
            "Project loaded"
        );
        self.notify();
    }

    /// Deep, serializable copy of the current state
    pub fn to_snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot::from(&self.project)
    }

    /// Snapshot of a fresh project
    pub fn default_snapshot() -> ProjectSnapshot {
        ProjectSnapshot::from(&Project::default())
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn can_grid_undo(&self) -> bool {
        self.grid_history.can_undo()
    }

    pub fn can_grid_redo(&self) -> bool {
        self.grid_history.can_redo()
    }

    /// Restore the whole project to before the last change
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(self.project.clone()) else {
            return false;
        };
        self.apply_full(previous);
        debug!(undo = self.history.undo_len(), redo = self.history.redo_len(), "Undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(self.project.clone()) else {
            return false;
        };
        self.apply_full(next);
        debug!(undo = self.history.undo_len(), redo = self.history.redo_len(), "Redo");
        true
    }

    /// Applying a history entry never records history. The playhead is
    /// transient and stays where it is.
    fn apply_full(&mut self, project: Project) {
        let playhead = self.project.playhead;
        self.project = Project { playhead, ..project.normalized() };
        self.notify();
    }

    /// Restore only the notes touched by the last note edit, in the pattern
    /// it was made on. An entry whose pattern has since been removed is
    /// dropped and nothing changes.
    pub fn grid_undo(&mut self) -> bool {
        let project = &self.project;
        let Some(previous) = self
            .grid_history
            .undo_with(|entry| GridSnapshot::capture_pattern(project, &entry.pattern_id))
        else {
            return false;
        };
        self.apply_grid(previous, "Grid undo")
    }

    pub fn grid_redo(&mut self) -> bool {
        let project = &self.project;
        let Some(next) = self
            .grid_history
            .redo_with(|entry| GridSnapshot::capture_pattern(project, &entry.pattern_id))
        else {
            return false;
        };
        self.apply_grid(next, "Grid redo")
    }

    fn apply_grid(&mut self, snapshot: GridSnapshot, op: &'static str) -> bool {
        let pattern = snapshot.pattern_id.clone();
        if !snapshot.apply_to(&mut self.project) {
            return false;
        }
        debug!(
            op,
            %pattern,
            undo = self.grid_history.undo_len(),
            redo = self.grid_history.redo_len(),
            "Grid history applied"
        );
        self.notify();
        true
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.grid_history.clear();
    }

    // ------------------------------------------------------------------
    // Transient state
    // ------------------------------------------------------------------

    /// Move the playback cursor. Not an edit: no history, no normalization.
    pub fn set_playhead(&mut self, playhead: Playhead) {
        if self.project.playhead == playhead {
            return;
        }
        self.project.playhead = playhead;
        self.notify();
    }
}
