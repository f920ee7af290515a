use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::program::IntervalType;
use crate::timer::TimerState;

/// Every state change of a run produces an Event.
/// Hooks registered on the engine receive them synchronously.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    RunStarted {
        program_id: Uuid,
        program_name: String,
        interval_count: usize,
        total_duration_secs: f64,
        at: DateTime<Utc>,
    },
    IntervalChanged {
        index: usize,
        interval_type: IntervalType,
        name: String,
        duration_secs: f64,
        at: DateTime<Utc>,
    },
    Countdown {
        index: usize,
        seconds_remaining: u8,
        at: DateTime<Utc>,
    },
    IntervalCompleted {
        index: usize,
        interval_type: IntervalType,
        at: DateTime<Utc>,
    },
    /// A rest gap started after `after_index`; the next interval begins once it elapses.
    RestStarted {
        after_index: usize,
        rest_secs: f64,
        at: DateTime<Utc>,
    },
    Paused {
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    Resumed {
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    Skipped {
        from_index: usize,
        to_index: usize,
        at: DateTime<Utc>,
    },
    Finished {
        completed_intervals: usize,
        total_intervals: usize,
        total_elapsed_secs: f64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        interval_index: usize,
        interval_type: Option<IntervalType>,
        interval_name: String,
        remaining_secs: f64,
        total_elapsed_secs: f64,
        total_progress: f64,
        resting: bool,
        at: DateTime<Utc>,
    },
}
