//! stepgrid-core: Note storage, project state and undo for the stepgrid sequencer

mod error;
pub mod history;
pub mod pattern;
pub mod playback;
pub mod project;
mod raw;
pub mod resolution;
pub mod scale;
mod setting;
mod snapshot;
pub mod store;
pub mod track;

pub use error::{Result, StepgridError};
pub use history::{UndoStack, DEFAULT_MAX_HISTORY};
pub use pattern::{normalize_pattern, Pattern, MAX_PATTERNS, MAX_TRACKS};
pub use playback::{events_for_step, NoteEvent};
pub use project::{Playhead, Project, MAX_BPM, MAX_LOOP_SECONDS, MAX_ROWS, MIN_BARS, MIN_BPM};
pub use raw::project_from_value;
pub use resolution::{
    coerce_steps_per_bar, logical_to_storage, storage_to_logical, BASE_RESOLUTION, SUPPORTED_STEPS_PER_BAR,
};
pub use scale::ScaleMode;
pub use setting::TrackSetting;
pub use snapshot::{GridSnapshot, ProjectSnapshot};
pub use store::{NoteEdit, ProjectStore, StoreConfig, SubscriptionId};
pub use track::{normalize_track, Adsr, AdsrPatch, Effects, EffectsPatch, NoteMatrix, Track, Waveform};
