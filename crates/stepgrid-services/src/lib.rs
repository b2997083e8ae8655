//! Runtime services for stepgrid: audio clocks and the look-ahead step
//! scheduler, plus the thread that drives it.

mod clock;
mod error;
mod runner;
mod scheduler;

pub use clock::{AudioClock, ManualClock, SystemClock};
pub use error::{Result, SchedulerError};
pub use runner::SchedulerHandle;
pub use scheduler::{Scheduler, SchedulerConfig, StepCallback};
