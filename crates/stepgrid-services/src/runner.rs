//! Scheduler thread.
//!
//! The scheduler itself is a plain state machine; this module gives it a
//! home. A dedicated thread runs a single-threaded event loop that waits on
//! either a control command or the re-arm timer, whichever comes first.
//! Everything inside one tick runs to completion before the next wait.

use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{after, never, select, unbounded, Receiver, Sender};
use tracing::{debug, warn};

use crate::clock::AudioClock;
use crate::error::{Result, SchedulerError};
use crate::scheduler::{validate_step, validate_steps_per_beat, validate_tempo, Scheduler};

#[derive(Debug)]
enum Command {
    Start,
    Stop,
    Seek(u64),
    Tempo(f64),
    StepsPerBeat(u32),
    Shutdown,
}

/// Owner-side handle of a scheduler running on its own thread.
///
/// Arguments are validated here, on the caller's thread, so bad input
/// surfaces as an error immediately. Dropping the handle stops the thread.
pub struct SchedulerHandle {
    commands: Sender<Command>,
    thread: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn spawn<C: AudioClock + 'static>(scheduler: Scheduler<C>) -> Result<Self> {
        let (commands, inbox) = unbounded();
        let thread = thread::Builder::new()
            .name("stepgrid-scheduler".into())
            .spawn(move || run(scheduler, inbox))?;
        Ok(Self {
            commands,
            thread: Some(thread),
        })
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).map_err(|_| SchedulerError::Disconnected)
    }

    pub fn start(&self) -> Result<()> {
        self.send(Command::Start)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Command::Stop)
    }

    pub fn set_current_step(&self, step: f64) -> Result<()> {
        self.send(Command::Seek(validate_step(step)?))
    }

    pub fn set_tempo(&self, bpm: f64) -> Result<()> {
        self.send(Command::Tempo(validate_tempo(bpm)?))
    }

    pub fn set_steps_per_beat(&self, steps: u32) -> Result<()> {
        self.send(Command::StepsPerBeat(validate_steps_per_beat(steps)?))
    }

    /// Stop the thread and wait for it to exit
    pub fn shutdown(mut self) {
        self.join();
    }

    fn join(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Scheduler thread panicked");
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.join();
    }
}

/// What woke the event loop
enum Wake {
    Command(Command),
    Tick,
    Disconnected,
}

fn run<C: AudioClock>(mut scheduler: Scheduler<C>, inbox: Receiver<Command>) {
    let mut deadline: Option<Instant> = None;
    debug!("Scheduler thread running");

    loop {
        let timer = match deadline {
            Some(at) => after(at.saturating_duration_since(Instant::now())),
            None => never(),
        };

        let wake = select! {
            recv(inbox) -> command => command.map_or(Wake::Disconnected, Wake::Command),
            recv(timer) -> _ => Wake::Tick,
        };

        match wake {
            Wake::Tick => {
                deadline = scheduler.schedule().map(|delay| Instant::now() + delay);
            }
            Wake::Command(Command::Start) => {
                if let Some(delay) = scheduler.start() {
                    deadline = Some(Instant::now() + delay);
                }
            }
            Wake::Command(Command::Stop) => {
                scheduler.stop();
                deadline = None;
            }
            Wake::Command(Command::Seek(step)) => {
                if let Err(e) = scheduler.set_current_step(step as f64) {
                    warn!("Seek rejected: {}", e);
                }
            }
            Wake::Command(Command::Tempo(bpm)) => {
                if let Err(e) = scheduler.set_tempo(bpm) {
                    warn!("Tempo rejected: {}", e);
                }
            }
            Wake::Command(Command::StepsPerBeat(steps)) => {
                if let Err(e) = scheduler.set_steps_per_beat(steps) {
                    warn!("Steps per beat rejected: {}", e);
                }
            }
            Wake::Command(Command::Shutdown) | Wake::Disconnected => break,
        }
    }

    scheduler.stop();
    debug!("Scheduler thread exited");
}
