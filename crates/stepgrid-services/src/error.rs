//! Scheduler errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Step must be a non-negative finite number, got {0}")]
    InvalidStep(f64),
    #[error("Tempo must be a positive finite BPM, got {0}")]
    InvalidTempo(f64),
    #[error("Steps per beat must be at least 1, got {0}")]
    InvalidStepsPerBeat(u32),
    #[error("Lookahead interval must be greater than zero")]
    InvalidLookahead,
    #[error("Failed to spawn scheduler thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Scheduler thread has stopped")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
