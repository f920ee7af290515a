//! Finished-run records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::program::{format_clock, Program};
use crate::store::SessionSink;
use crate::timer::TimerEngine;

/// Result of one run. Created once when the run finishes and never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub id: Uuid,
    /// Weak reference; the program may since have been deleted.
    pub program_id: Uuid,
    pub program_name: String,
    pub date: DateTime<Utc>,
    pub total_time_secs: f64,
    pub intervals_completed: usize,
    pub total_intervals: usize,
}

impl SessionResult {
    /// Build the record for the run `engine` just finished.
    pub fn from_run(program: &Program, engine: &TimerEngine, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            program_id: program.id,
            program_name: program.name.clone(),
            date,
            total_time_secs: engine.total_elapsed_secs(),
            intervals_completed: engine.completed_intervals(),
            total_intervals: program.intervals.len(),
        }
    }

    /// Completion fraction, 0 for a program with no intervals.
    pub fn progress(&self) -> f64 {
        if self.total_intervals == 0 {
            return 0.0;
        }
        self.intervals_completed as f64 / self.total_intervals as f64
    }

    pub fn formatted_total_time(&self) -> String {
        format_clock(self.total_time_secs)
    }
}

/// Turns finished runs into stored [`SessionResult`]s.
pub struct SessionRecorder<S> {
    sink: S,
}

impl<S: SessionSink> SessionRecorder<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Record the run `engine` holds for `program`, dated now.
    ///
    /// # Errors
    /// Returns an error if the sink fails to persist the session.
    pub fn record(&self, program: &Program, engine: &TimerEngine) -> Result<SessionResult> {
        let result = SessionResult::from_run(program, engine, Utc::now());
        self.sink.save_session(&result)?;
        tracing::info!(
            program = %result.program_name,
            total_secs = result.total_time_secs,
            completed = result.intervals_completed,
            "session recorded"
        );
        Ok(result)
    }
}
