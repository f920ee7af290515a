//! Planned workouts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::program::Program;

/// Default lead time for a reminder, in minutes.
pub const DEFAULT_REMINDER_MINUTES: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledWorkout {
    pub id: Uuid,
    pub program_id: Uuid,
    /// Copied at scheduling time so the entry survives program deletion.
    pub program_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub is_completed: bool,
    pub reminder_enabled: bool,
    /// How long before `scheduled_at` the reminder is due.
    pub reminder_minutes: u32,
}

impl ScheduledWorkout {
    pub fn new(program: &Program, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            program_id: program.id,
            program_name: program.name.clone(),
            scheduled_at,
            is_completed: false,
            reminder_enabled: true,
            reminder_minutes: DEFAULT_REMINDER_MINUTES,
        }
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at < now
    }

    /// Same UTC calendar day as `now`.
    pub fn is_today(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at.date_naive() == now.date_naive()
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at > now && !self.is_completed
    }

    pub fn reminder_at(&self) -> Option<DateTime<Utc>> {
        self.reminder_enabled
            .then(|| self.scheduled_at - Duration::minutes(i64::from(self.reminder_minutes)))
    }
}

/// Pending workouts on the current UTC day, including ones already past.
pub fn due_today(workouts: &[ScheduledWorkout], now: DateTime<Utc>) -> Vec<&ScheduledWorkout> {
    workouts
        .iter()
        .filter(|w| w.is_today(now) && !w.is_completed)
        .collect()
}

/// Pending future workouts, soonest first.
pub fn upcoming(workouts: &[ScheduledWorkout], now: DateTime<Utc>) -> Vec<&ScheduledWorkout> {
    let mut out: Vec<&ScheduledWorkout> = workouts.iter().filter(|w| w.is_upcoming(now)).collect();
    out.sort_by_key(|w| w.scheduled_at);
    out
}

/// Pending workouts in the next 7 days, soonest first.
pub fn this_week(workouts: &[ScheduledWorkout], now: DateTime<Utc>) -> Vec<&ScheduledWorkout> {
    let week_end = now + Duration::days(7);
    let mut out: Vec<&ScheduledWorkout> = workouts
        .iter()
        .filter(|w| w.scheduled_at >= now && w.scheduled_at <= week_end && !w.is_completed)
        .collect();
    out.sort_by_key(|w| w.scheduled_at);
    out
}
