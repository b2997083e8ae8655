use std::sync::{Arc, Mutex};

use serde_json::json;

use super::*;
use crate::pattern::{MAX_PATTERNS, MAX_TRACKS};
use crate::resolution::BASE_RESOLUTION;
use crate::scale::ScaleMode;
use crate::setting::TrackSetting;
use crate::track::{AdsrPatch, EffectsPatch};

fn cells(store: &ProjectStore, track: usize, row: usize) -> &[bool] {
    &store.project().tracks()[track].notes[row]
}

#[test]
fn test_paint_one_sixteenth_sets_eight_cells() {
    let mut store = ProjectStore::new();
    assert_eq!(store.project().steps_per_bar, 16);
    assert!(store.set_note_range(0, 0, 0, 1, Some(true)));
    let row = cells(&store, 0, 0);
    assert!(row[0..8].iter().all(|&c| c));
    assert!(!row[8]);
}

#[test]
fn test_no_op_write_records_nothing() {
    let mut store = ProjectStore::new();
    assert!(!store.set_note_range(0, 0, 0, 4, Some(false)));
    assert!(!store.can_undo());
    assert!(!store.can_grid_undo());

    store.set_note_range(0, 0, 0, 4, Some(true));
    store.clear_history();
    assert!(!store.set_note_range(0, 0, 0, 4, Some(true)));
    assert!(!store.can_undo());
}

#[test]
fn test_toggle_clears_partially_filled_range() {
    let mut store = ProjectStore::new();
    store.set_note_range(0, 2, 1, 1, Some(true));
    // Steps 0..4 hold one active step, so toggling clears all of them
    assert!(store.set_note_range(0, 2, 0, 4, None));
    assert!(cells(&store, 0, 2)[0..32].iter().all(|&c| !c));
    // Empty range toggles on uniformly
    assert!(store.set_note_range(0, 2, 0, 4, None));
    assert!(cells(&store, 0, 2)[0..32].iter().all(|&c| c));
}

#[test]
fn test_out_of_range_edits_are_ignored() {
    let mut store = ProjectStore::new();
    assert!(!store.set_note_range(9, 0, 0, 1, Some(true)));
    assert!(!store.set_note_range(0, 999, 0, 1, Some(true)));
    assert!(!store.set_note_range(0, 0, 10_000, 1, Some(true)));
    assert!(!store.set_note_range(0, 0, 0, 0, Some(true)));
    assert!(!store.set_note_range(0, 0, usize::MAX, usize::MAX, Some(true)));
    assert!(!store.can_undo());
}

#[test]
fn test_write_is_clamped_to_loop_end() {
    let mut store = ProjectStore::new();
    let last = store.project().logical_steps() - 1;
    assert!(store.set_note_range(0, 0, last, 10, Some(true)));
    let row = cells(&store, 0, 0);
    assert_eq!(row.len(), store.project().storage_steps());
    assert!(row[row.len() - 8..].iter().all(|&c| c));
}

#[test]
fn test_storage_edit_bypasses_mapping() {
    let mut store = ProjectStore::new();
    let edit = NoteEdit { row: 1, start: 3, length: 2, value: Some(true), storage: true };
    assert!(store.apply_note_edit(0, edit));
    let row = cells(&store, 0, 1);
    assert!(!row[2] && row[3] && row[4] && !row[5]);

    let edit = NoteEdit { row: 1, start: 1, length: 1, value: Some(true), storage: false };
    assert!(store.apply_note_edit(0, edit));
    assert!(cells(&store, 0, 1)[8..16].iter().all(|&c| c));
}

#[test]
fn test_dual_history_independence() {
    let mut store = ProjectStore::new();
    store.set_note_range(0, 0, 0, 1, Some(true)); // note A
    store.set_bpm(140.0);
    store.set_note_range(0, 1, 4, 1, Some(true)); // note B

    assert!(store.grid_undo());
    assert!(!cells(&store, 0, 1)[32]);
    assert!(cells(&store, 0, 0)[0]);
    assert_eq!(store.project().bpm, 140.0);

    assert!(store.grid_undo());
    assert!(!cells(&store, 0, 0)[0]);
    assert_eq!(store.project().bpm, 140.0);
    assert!(!store.grid_undo());

    assert!(store.grid_redo());
    assert!(cells(&store, 0, 0)[0]);
}

#[test]
fn test_full_undo_reverts_in_order() {
    let mut store = ProjectStore::new();
    store.set_note_range(0, 0, 0, 1, Some(true));
    store.set_bpm(140.0);
    store.set_note_range(0, 1, 4, 1, Some(true));

    assert!(store.undo());
    assert!(!cells(&store, 0, 1)[32]);
    assert_eq!(store.project().bpm, 140.0);

    assert!(store.undo());
    assert_eq!(store.project().bpm, 120.0);
    assert!(cells(&store, 0, 0)[0]);

    assert!(store.undo());
    assert!(!cells(&store, 0, 0)[0]);
    assert!(!store.undo());

    assert!(store.redo());
    assert!(store.redo());
    assert_eq!(store.project().bpm, 140.0);
    assert!(store.can_redo());
}

#[test]
fn test_undo_on_empty_stacks_is_harmless() {
    let mut store = ProjectStore::new();
    let before = store.project().clone();
    assert!(!store.undo());
    assert!(!store.redo());
    assert!(!store.grid_undo());
    assert!(!store.grid_redo());
    assert_eq!(store.project(), &before);
}

#[test]
fn test_undo_does_not_record_history() {
    let mut store = ProjectStore::new();
    store.set_bpm(100.0);
    store.undo();
    assert!(!store.can_undo());
    assert!(store.can_redo());
}

#[test]
fn test_history_is_bounded() {
    let mut store = ProjectStore::with_config(StoreConfig { max_history: 3 });
    for step in 0..6 {
        store.set_note_range(0, 0, step, 1, Some(true));
    }
    let mut undone = 0;
    while store.undo() {
        undone += 1;
    }
    assert_eq!(undone, 3);
    assert!(cells(&store, 0, 0)[16]); // step 2 survives, the oldest entries are gone
}

#[test]
fn test_solo_exclusivity() {
    let mut store = ProjectStore::new();
    assert!(store.set_track_setting(0, TrackSetting::Solo(true)));
    assert!(store.set_track_setting(1, TrackSetting::Solo(true)));
    assert!(!store.project().tracks()[0].solo);
    assert!(store.project().tracks()[1].solo);
}

#[test]
fn test_track_settings_clamp_and_skip_no_ops() {
    let mut store = ProjectStore::new();
    assert!(store.set_track_setting(0, TrackSetting::Volume(4.0)));
    assert_eq!(store.project().tracks()[0].volume, 1.0);
    assert!(!store.set_track_setting(0, TrackSetting::Volume(1.5))); // clamps to the same value

    assert!(!store.set_track_setting(0, TrackSetting::Volume(f32::NAN)));
    assert!(!store.set_track_setting(0, TrackSetting::Name("   ".into())));
    assert!(!store.set_track_setting(7, TrackSetting::Mute(true)));

    assert!(store.set_track_setting(0, TrackSetting::Octave(-3)));
    assert_eq!(store.project().tracks()[0].octave, 1);

    let patch = EffectsPatch { delay_mix: Some(0.5), ..Default::default() };
    assert!(store.set_track_setting(0, TrackSetting::Effects(patch)));
    assert!(!store.set_track_setting(0, TrackSetting::Effects(patch)));
    assert_eq!(store.project().tracks()[0].effects.delay.mix, 0.5);

    let patch = AdsrPatch { release: Some(9.0), ..Default::default() };
    assert!(store.set_track_setting(0, TrackSetting::Adsr(patch)));
    assert_eq!(store.project().tracks()[0].adsr.release, 5.0);
}

#[test]
fn test_custom_scale_setting() {
    let mut store = ProjectStore::new();
    let setting = TrackSetting::Scale { mode: ScaleMode::Custom, custom: Some(vec![0, 3, 7]) };
    assert!(store.set_track_setting(0, setting));
    assert_eq!(store.project().tracks()[0].scale, ScaleMode::Custom);

    let invalid = TrackSetting::Scale { mode: ScaleMode::Custom, custom: Some(vec![3, 3]) };
    store.set_track_setting(0, invalid);
    assert_eq!(store.project().tracks()[0].scale, ScaleMode::Major);
}

#[test]
fn test_bar_ceiling() {
    let mut store = ProjectStore::new();
    store.set_bpm(60.0);
    store.set_bars(400);
    let project = store.project();
    assert_eq!(project.bars, 74);
    assert!(project.bars as f64 * (240.0 / 60.0) <= 300.0);
    assert_eq!(project.tracks()[0].notes[0].len(), 74 * BASE_RESOLUTION);
}

#[test]
fn test_bpm_change_shrinks_long_patterns() {
    let mut store = ProjectStore::new();
    store.set_bars(100);
    store.add_pattern();
    store.select_pattern(0);
    assert_eq!(store.project().bars, 100);
    store.set_bpm(60.0);
    assert_eq!(store.project().bars, 74);
    assert_eq!(store.project().bpm, 60.0);
    assert!(store.project().patterns.iter().all(|p| p.bars <= 74));
}

#[test]
fn test_bars_round_to_even_and_resize_tracks() {
    let mut store = ProjectStore::new();
    store.set_note_range(0, 0, 0, 1, Some(true));
    assert!(store.set_bars(7));
    assert_eq!(store.project().bars, 8);
    assert!(store.set_bars(2));
    let row = cells(&store, 0, 0);
    assert_eq!(row.len(), 2 * BASE_RESOLUTION);
    assert!(row[0]);
}

#[test]
fn test_steps_per_bar_is_coerced() {
    let mut store = ProjectStore::new();
    assert!(store.set_steps_per_bar(30));
    assert_eq!(store.project().steps_per_bar, 32);
    assert!(!store.set_steps_per_bar(33)); // same supported value
    store.set_note_range(0, 0, 1, 1, Some(true));
    assert!(cells(&store, 0, 0)[4..8].iter().all(|&c| c));
}

#[test]
fn test_rows_resize_every_pattern() {
    let mut store = ProjectStore::new();
    store.add_pattern();
    assert!(store.set_rows(5));
    for pattern in &store.project().patterns {
        for track in &pattern.tracks {
            assert_eq!(track.notes.len(), 5);
        }
    }
}

#[test]
fn test_track_ceiling_and_duplicate() {
    let mut store = ProjectStore::new();
    store.set_note_range(0, 0, 0, 1, Some(true));
    assert_eq!(store.duplicate_track(0), Some(1));
    let copy = &store.project().tracks()[1];
    assert_eq!(copy.name, "Lead Copy");
    assert!(copy.notes[0][0]);
    assert_ne!(copy.id, store.project().tracks()[0].id);
    assert_eq!(store.project().selected_track, 1);

    while store.add_track().is_some() {}
    assert_eq!(store.project().tracks().len(), MAX_TRACKS);
    assert_eq!(store.duplicate_track(0), None);
    assert!(!store.can_redo());
}

#[test]
fn test_duplicate_does_not_alias() {
    let mut store = ProjectStore::new();
    store.duplicate_track(0);
    store.set_note_range(1, 0, 0, 1, Some(true));
    assert!(!cells(&store, 0, 0)[0]);
}

#[test]
fn test_remove_last_track_leaves_empty_pattern() {
    let mut store = ProjectStore::new();
    assert!(store.remove_track(1));
    assert!(store.remove_track(0));
    assert!(store.project().tracks().is_empty());
    assert_eq!(store.project().selected_track, 0);

    // Everything keeps working with no tracks
    assert!(!store.set_note_range(0, 0, 0, 1, Some(true)));
    assert!(!store.set_track_setting(0, TrackSetting::Mute(true)));
    assert!(store.set_bpm(90.0));
    assert!(store.undo());
    assert!(store.add_track().is_some());
}

#[test]
fn test_selected_track_follows_removal() {
    let mut store = ProjectStore::new();
    store.add_track();
    store.select_track(2);
    store.remove_track(0);
    assert_eq!(store.project().selected_track, 1);
    assert!(!store.select_track(5));
}

#[test]
fn test_pattern_crud() {
    let mut store = ProjectStore::new();
    store.set_note_range(0, 0, 0, 1, Some(true));
    assert_eq!(store.add_pattern(), Some(1));
    assert_eq!(store.project().selected_pattern, 1);
    assert!(!cells(&store, 0, 0)[0]); // fresh grid
    assert_eq!(store.project().tracks()[0].name, "Lead");

    assert_eq!(store.duplicate_pattern(0), Some(1));
    assert_eq!(store.project().patterns[1].name, "Pattern 1 Copy");
    assert!(cells(&store, 0, 0)[0]);

    assert!(store.rename_pattern(1, " Verse "));
    assert_eq!(store.project().patterns[1].name, "Verse");
    assert!(!store.rename_pattern(1, ""));

    assert!(store.remove_pattern(1));
    assert!(store.remove_pattern(0));
    assert!(!store.remove_pattern(0)); // floor of one
    assert_eq!(store.project().patterns.len(), 1);

    while store.add_pattern().is_some() {}
    assert_eq!(store.project().patterns.len(), MAX_PATTERNS);
}

#[test]
fn test_patterns_keep_their_own_length() {
    let mut store = ProjectStore::new();
    store.add_pattern();
    store.set_bars(8);
    store.select_pattern(0);
    assert_eq!(store.project().bars, 4);
    assert_eq!(store.project().tracks()[0].notes[0].len(), 4 * BASE_RESOLUTION);
    store.select_pattern(1);
    assert_eq!(store.project().bars, 8);
}

#[test]
fn test_select_pattern_is_not_history() {
    let mut store = ProjectStore::new();
    store.add_pattern();
    store.clear_history();
    assert!(store.select_pattern(0));
    assert!(!store.can_undo());
    assert!(!store.select_pattern(4));
}

#[test]
fn test_reorder_pattern_tracks_selection() {
    let mut store = ProjectStore::new();
    for _ in 0..3 {
        store.add_pattern();
    }
    let ids: Vec<String> = store.project().patterns.iter().map(|p| p.id.clone()).collect();

    // Selected pattern moves itself
    store.select_pattern(1);
    assert!(store.reorder_pattern(1, 3));
    assert_eq!(store.project().selected_pattern, 3);
    assert_eq!(store.project().active_pattern().id, ids[1]);

    // Another pattern crosses from below
    let selected = store.project().active_pattern().id.clone();
    assert!(store.reorder_pattern(0, 3));
    assert_eq!(store.project().selected_pattern, 2);
    assert_eq!(store.project().active_pattern().id, selected);

    // Another pattern crosses from above
    assert!(store.reorder_pattern(3, 0));
    assert_eq!(store.project().selected_pattern, 3);
    assert_eq!(store.project().active_pattern().id, selected);

    // No crossing
    assert!(store.reorder_pattern(0, 1));
    assert_eq!(store.project().selected_pattern, 3);

    assert!(!store.reorder_pattern(0, 0));
    assert!(!store.reorder_pattern(0, 9));
}

#[test]
fn test_arrangement_follows_pattern_removal() {
    let mut store = ProjectStore::new();
    store.add_pattern();
    let ids: Vec<String> = store.project().patterns.iter().map(|p| p.id.clone()).collect();
    assert!(store.set_arrangement(vec![ids[0].clone(), ids[1].clone(), ids[0].clone(), "nope".into()]));
    assert_eq!(store.project().arrangement.len(), 3);
    store.remove_pattern(0);
    assert_eq!(store.project().arrangement, vec![ids[1].clone()]);
}

#[test]
fn test_cut_and_paste() {
    let mut store = ProjectStore::new();
    store.set_note_range_storage(0, 3, 2, 3, Some(true));
    let cut = store.cut_note_range(0, 3, 0, 1).unwrap();
    assert_eq!(cut, vec![false, false, true, true, true, false, false, false]);
    assert!(cells(&store, 0, 3)[0..8].iter().all(|&c| !c));
    assert!(store.cut_note_range(0, 3, 0, 1).is_none());

    assert!(store.paste_note_range(0, 3, 4, &cut));
    assert!(cells(&store, 0, 3)[34..37].iter().all(|&c| c));
    assert!(!store.paste_note_range(0, 3, 4, &cut));

    assert!(store.grid_undo());
    assert!(!cells(&store, 0, 3)[34]);
}

#[test]
fn test_clear_track() {
    let mut store = ProjectStore::new();
    assert!(!store.clear_track(0));
    store.set_note_range(0, 0, 0, 4, Some(true));
    assert!(store.clear_track(0));
    assert!(!store.project().tracks()[0].has_notes());
    assert!(store.grid_undo());
    assert!(store.project().tracks()[0].has_notes());
}

#[test]
fn test_snapshot_round_trip_through_load() {
    let mut store = ProjectStore::new();
    store.set_note_range(1, 4, 3, 2, Some(true));
    store.set_track_setting(1, TrackSetting::RootNote(5));
    store.add_pattern();
    store.set_bars(6);
    store.set_name("Loop");
    let before = store.project().clone();

    let value = store.to_snapshot().to_value().unwrap();
    let mut other = ProjectStore::new();
    assert!(other.load(&value));
    assert_eq!(other.project(), &before);
}

#[test]
fn test_snapshot_is_a_deep_copy() {
    let mut store = ProjectStore::new();
    let snapshot = store.to_snapshot();
    store.set_note_range(0, 0, 0, 1, Some(true));
    assert!(!snapshot.tracks[0].notes[0][0]);
    assert_eq!(ProjectStore::default_snapshot(), snapshot);
}

#[test]
fn test_load_resets_history_and_accepts_legacy() {
    let mut store = ProjectStore::new();
    store.set_note_range(0, 0, 0, 1, Some(true));
    assert!(store.can_undo());

    let legacy = json!({
        "name": "Legacy",
        "rows": 8,
        "bars": 2,
        "stepsPerBar": 8,
        "bpm": 95,
        "tracks": [{ "id": "a", "name": "Pad", "notes": [] }]
    });
    assert!(store.load(&legacy));
    assert!(!store.can_undo());
    assert!(!store.can_grid_undo());
    assert_eq!(store.project().name, "Legacy");
    assert_eq!(store.project().patterns.len(), 1);
    assert_eq!(store.project().tracks()[0].notes.len(), 8);

    assert!(!store.load(&json!(null)));
    assert_eq!(store.project().name, "Legacy");
}

#[test]
fn test_subscribers_see_commits_only() {
    let mut store = ProjectStore::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let id = store.subscribe(move |project| sink.lock().unwrap().push(project.bpm));

    store.set_bpm(100.0);
    store.set_bpm(100.0); // no-op
    store.undo();
    assert_eq!(*seen.lock().unwrap(), vec![100.0, 120.0]);

    assert!(store.unsubscribe(id));
    store.set_bpm(90.0);
    assert_eq!(seen.lock().unwrap().len(), 2);
    assert!(!store.unsubscribe(id));
}

#[test]
fn test_playhead_is_transient() {
    let mut store = ProjectStore::new();
    store.set_playhead(Playhead { step: 5, progress: 0.5, last_step_time: 1.0, next_step_time: 1.1 });
    assert!(!store.can_undo());
    assert_eq!(store.project().playhead.step, 5);
    store.set_bpm(100.0);
    store.undo();
    assert_eq!(store.project().playhead.step, 5);
    assert!(store.to_snapshot().to_value().unwrap().get("playhead").is_none());
}

fn pattern_cell(store: &ProjectStore, pattern: usize, row: usize, column: usize) -> bool {
    store.project().patterns[pattern].tracks[0].notes[row][column]
}

#[test]
fn test_grid_undo_follows_the_edited_pattern() {
    let mut store = ProjectStore::new();
    assert_eq!(store.add_pattern(), Some(1));
    store.set_note_range(0, 0, 0, 1, Some(true)); // on pattern 2
    store.select_pattern(0);
    store.set_note_range(0, 5, 3, 1, Some(true)); // on pattern 1
    store.select_pattern(1);

    assert!(store.grid_undo());
    assert!(!pattern_cell(&store, 0, 5, 24)); // the pattern 1 edit is reverted
    assert!(pattern_cell(&store, 1, 0, 0)); // pattern 2 keeps its note
    assert_eq!(store.project().selected_pattern, 1);

    assert!(store.grid_undo());
    assert!(!pattern_cell(&store, 1, 0, 0));

    assert!(store.grid_redo());
    assert!(store.grid_redo());
    assert!(pattern_cell(&store, 0, 5, 24));
    assert!(pattern_cell(&store, 1, 0, 0));
}

#[test]
fn test_grid_undo_skips_removed_pattern() {
    let mut store = ProjectStore::new();
    store.add_pattern();
    store.set_note_range(0, 0, 0, 1, Some(true));
    assert!(store.remove_pattern(1));
    let before = store.project().clone();

    assert!(store.can_grid_undo());
    assert!(!store.grid_undo());
    assert!(!store.can_grid_undo());
    assert!(!store.can_grid_redo());
    assert_eq!(store.project(), &before);
}

#[test]
fn test_load_snapshot_normalizes_and_clears_history() {
    let mut store = ProjectStore::new();
    store.set_note_range(0, 0, 0, 1, Some(true));
    store.set_bpm(90.0);
    assert!(store.can_undo());
    assert!(store.can_grid_undo());

    let mut snapshot = ProjectStore::default_snapshot();
    snapshot.name = "  Imported ".into();
    snapshot.bpm = 1000.0;
    snapshot.rows = 0;
    snapshot.steps_per_bar = 20;
    snapshot.bars = 5;
    snapshot.selected_pattern = Some(9);

    let notified = Arc::new(Mutex::new(0));
    let count = Arc::clone(&notified);
    store.subscribe(move |_| *count.lock().unwrap() += 1);

    store.load_snapshot(&snapshot);
    let project = store.project();
    assert_eq!(project.name, "Imported");
    assert_eq!(project.bpm, crate::project::MAX_BPM);
    assert_eq!(project.rows, 1);
    assert_eq!(project.steps_per_bar, 16);
    assert_eq!(project.bars, 6);
    assert_eq!(project.selected_pattern, 0);
    assert_eq!(project.tracks()[0].notes.len(), 1);
    assert!(!store.can_undo());
    assert!(!store.can_redo());
    assert!(!store.can_grid_undo());
    assert!(!store.can_grid_redo());
    assert_eq!(*notified.lock().unwrap(), 1);
}
