//! Lookahead step scheduler.
//!
//! Timers are coarse and jittery; the audio clock is not. Each call to
//! [`Scheduler::schedule`] reads the audio clock and emits every step that
//! starts before `now + schedule_ahead`, so steps are stamped with exact
//! audio-clock times no matter when the timer actually fired. If a tick is
//! late, the backlog is flushed in one pass instead of being dropped.

use std::time::Duration;

use tracing::{info, trace};

use crate::clock::AudioClock;
use crate::error::{Result, SchedulerError};

/// Called with `(step, start_time, duration)` for each scheduled step
pub type StepCallback = Box<dyn FnMut(u64, f64, f64) + Send>;

/// Scheduler timing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Tempo in BPM
    pub tempo: f64,
    /// Grid steps per quarter note
    pub steps_per_beat: u32,
    /// How often the timer re-fires
    pub lookahead: Duration,
    /// How far past the clock steps are scheduled
    pub schedule_ahead: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tempo: 120.0,
            steps_per_beat: 4,
            lookahead: Duration::from_millis(100),
            schedule_ahead: Duration::from_millis(200),
        }
    }
}

pub(crate) fn validate_step(step: f64) -> Result<u64> {
    if !step.is_finite() || step < 0.0 {
        return Err(SchedulerError::InvalidStep(step));
    }
    Ok(step.floor() as u64)
}

pub(crate) fn validate_tempo(bpm: f64) -> Result<f64> {
    if !bpm.is_finite() || bpm <= 0.0 {
        return Err(SchedulerError::InvalidTempo(bpm));
    }
    Ok(bpm)
}

pub(crate) fn validate_steps_per_beat(steps: u32) -> Result<u32> {
    if steps == 0 {
        return Err(SchedulerError::InvalidStepsPerBeat(steps));
    }
    Ok(steps)
}

pub struct Scheduler<C: AudioClock> {
    clock: C,
    tempo: f64,
    steps_per_beat: u32,
    lookahead: Duration,
    schedule_ahead: f64,
    playing: bool,
    current_step: u64,
    next_step_time: f64,
    on_step: Option<StepCallback>,
}

impl<C: AudioClock> Scheduler<C> {
    pub fn new(clock: C, config: SchedulerConfig) -> Result<Self> {
        if config.lookahead.is_zero() {
            return Err(SchedulerError::InvalidLookahead);
        }
        Ok(Self {
            clock,
            tempo: validate_tempo(config.tempo)?,
            steps_per_beat: validate_steps_per_beat(config.steps_per_beat)?,
            lookahead: config.lookahead,
            schedule_ahead: config.schedule_ahead.as_secs_f64(),
            playing: false,
            current_step: 0,
            next_step_time: 0.0,
            on_step: None,
        })
    }

    /// Install the step callback, replacing any previous one
    pub fn on_step(&mut self, callback: impl FnMut(u64, f64, f64) + Send + 'static) {
        self.on_step = Some(Box::new(callback));
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    pub fn next_step_time(&self) -> f64 {
        self.next_step_time
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    pub fn steps_per_beat(&self) -> u32 {
        self.steps_per_beat
    }

    pub fn lookahead(&self) -> Duration {
        self.lookahead
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Seconds between consecutive steps at the current tempo
    pub fn seconds_per_step(&self) -> f64 {
        (60.0 / self.tempo) / self.steps_per_beat as f64
    }

    /// Begin playback from the current step, aligned to the clock's now.
    ///
    /// Does not rewind: seek with [`Self::set_current_step`] first to play
    /// from the top. Returns the delay until the next tick, or `None` if
    /// already playing.
    pub fn start(&mut self) -> Option<Duration> {
        if self.playing {
            return None;
        }
        self.playing = true;
        self.next_step_time = self.clock.current_time();
        info!(step = self.current_step, tempo = self.tempo, "Scheduler started");
        self.schedule()
    }

    /// Halt playback, keeping position. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.playing {
            info!(step = self.current_step, "Scheduler stopped");
        }
        self.playing = false;
    }

    /// Seek to `step` (floored). Allowed while stopped; the position
    /// survives a later `start`.
    pub fn set_current_step(&mut self, step: f64) -> Result<()> {
        self.current_step = validate_step(step)?;
        Ok(())
    }

    pub fn set_tempo(&mut self, bpm: f64) -> Result<()> {
        self.tempo = validate_tempo(bpm)?;
        Ok(())
    }

    pub fn set_steps_per_beat(&mut self, steps: u32) -> Result<()> {
        self.steps_per_beat = validate_steps_per_beat(steps)?;
        Ok(())
    }

    /// One timer tick: emit every step due before `now + schedule_ahead`.
    ///
    /// Returns the delay until the next tick while playing, `None` once
    /// stopped.
    pub fn schedule(&mut self) -> Option<Duration> {
        if !self.playing {
            return None;
        }
        let seconds_per_step = self.seconds_per_step();
        let horizon = self.clock.current_time() + self.schedule_ahead;
        while self.next_step_time < horizon {
            trace!(step = self.current_step, time = self.next_step_time, "Step");
            if let Some(on_step) = self.on_step.as_mut() {
                on_step(self.current_step, self.next_step_time, seconds_per_step);
            }
            self.next_step_time += seconds_per_step;
            self.current_step += 1;
        }
        Some(self.lookahead)
    }
}
