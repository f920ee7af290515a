mod clock;
mod engine;
mod runner;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{RestGap, TimerEngine, TimerState, DEFAULT_COUNTDOWN_SECS};
pub use runner::{TimerRunner, DEFAULT_TICK_INTERVAL};
