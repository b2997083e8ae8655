//! stepgrid: headless step-sequencer demo
//!
//! Loads an optional project snapshot, plays it through the look-ahead
//! scheduler for a while and logs the notes each step would sound.

mod config;

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context};
use crossbeam_channel::unbounded;
use stepgrid_core::{events_for_step, Playhead, ProjectStore};
use stepgrid_services::{Scheduler, SchedulerHandle, SystemClock};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Beats in one bar of the grid
const BEATS_PER_BAR: u32 = 4;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stepgrid=debug".parse()?)
                .add_directive("stepgrid_core=debug".parse()?)
                .add_directive("stepgrid_services=debug".parse()?),
        )
        .init();

    let config = config::load_config();
    let mut store = ProjectStore::with_config(config.store_config());

    if let Some(path) = std::env::args().nth(1) {
        load_project(&mut store, Path::new(&path))?;
    }
    if !store.project().tracks().iter().any(|t| t.has_notes()) {
        paint_demo(&mut store);
    }

    let project = store.project();
    info!(
        name = %project.name,
        bpm = project.bpm,
        bars = project.bars,
        steps_per_bar = project.steps_per_bar,
        tracks = project.tracks().len(),
        "Starting stepgrid"
    );

    let steps_per_beat = (project.steps_per_bar / BEATS_PER_BAR).max(1);
    let mut scheduler = Scheduler::new(
        SystemClock::new(),
        config.scheduler_config(project.bpm, steps_per_beat),
    )
    .context("Invalid scheduler configuration")?;

    let (tx, rx) = unbounded();
    scheduler.on_step(move |step, time, duration| {
        let _ = tx.send((step, time, duration));
    });

    let handle = SchedulerHandle::spawn(scheduler)?;
    handle.start()?;

    let play_for = config.play_duration();
    let end = Instant::now() + play_for;
    let mut notes = 0usize;

    while let Some(remaining) = end.checked_duration_since(Instant::now()) {
        let Ok((step, time, duration)) = rx.recv_timeout(remaining) else {
            break;
        };
        let events = events_for_step(store.project(), step, time, duration);
        for event in &events {
            info!(
                step,
                track = event.track,
                midi_note = event.midi_note,
                time = event.time,
                duration = event.duration,
                "Note"
            );
        }
        notes += events.len();

        let total = store.project().logical_steps().max(1) as u64;
        store.set_playhead(Playhead {
            step: (step % total) as usize,
            progress: 0.0,
            last_step_time: time,
            next_step_time: time + duration,
        });
    }

    handle.stop()?;
    handle.shutdown();
    info!(notes, "Stopped");
    Ok(())
}

fn load_project(store: &mut ProjectStore, path: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let payload: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    if !store.load(&payload) {
        bail!("{} is not a stepgrid project", path.display());
    }
    info!("Loaded {}", path.display());
    Ok(())
}

/// A one-bar arpeggio on the first track and a pulse on the second
fn paint_demo(store: &mut ProjectStore) {
    let steps_per_bar = store.project().steps_per_bar as usize;
    let rows = store.project().rows;
    let quarter = (steps_per_bar / 4).max(1);

    for (i, row) in [7usize, 5, 3, 0].into_iter().enumerate() {
        store.set_note_range(0, row.min(rows - 1), i * quarter, 1, Some(true));
    }
    if store.project().tracks().len() > 1 {
        for beat in 0..4 {
            store.set_note_range(1, rows - 1, beat * quarter, quarter / 2, Some(true));
        }
    }
    debug!("Painted demo pattern");
}
