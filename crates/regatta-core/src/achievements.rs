//! Achievement progress derived from session history.
//!
//! Nothing is stored: every call re-evaluates the full history, so an
//! achievement is unlocked exactly when its progress reaches 1.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::program::Program;
use crate::session::SessionResult;

/// A session at least this long earns [`AchievementType::MarathonTime`].
pub const MARATHON_SECS: f64 = 4.0 * 3600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementType {
    FirstSession,
    TenSessions,
    FiftySessions,
    HundredSessions,
    FirstPersonalRecord,
    FivePersonalRecords,
    WeeklyStreak,
    MonthlyStreak,
    TabataMaster,
    MarathonTime,
}

impl AchievementType {
    pub const ALL: [AchievementType; 10] = [
        AchievementType::FirstSession,
        AchievementType::TenSessions,
        AchievementType::FiftySessions,
        AchievementType::HundredSessions,
        AchievementType::FirstPersonalRecord,
        AchievementType::FivePersonalRecords,
        AchievementType::WeeklyStreak,
        AchievementType::MonthlyStreak,
        AchievementType::TabataMaster,
        AchievementType::MarathonTime,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            AchievementType::FirstSession => "First Steps",
            AchievementType::TenSessions => "Getting Started",
            AchievementType::FiftySessions => "Half Century",
            AchievementType::HundredSessions => "Century Club",
            AchievementType::FirstPersonalRecord => "Personal Best",
            AchievementType::FivePersonalRecords => "Record Breaker",
            AchievementType::WeeklyStreak => "Week Warrior",
            AchievementType::MonthlyStreak => "Month Master",
            AchievementType::TabataMaster => "Tabata Master",
            AchievementType::MarathonTime => "Marathon Time",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementType::FirstSession => "Complete your first training session",
            AchievementType::TenSessions => "Complete 10 training sessions",
            AchievementType::FiftySessions => "Complete 50 training sessions",
            AchievementType::HundredSessions => "Complete 100 training sessions",
            AchievementType::FirstPersonalRecord => "Set your first personal record",
            AchievementType::FivePersonalRecords => "Set 5 personal records",
            AchievementType::WeeklyStreak => "Train 7 days in a row",
            AchievementType::MonthlyStreak => "Train 30 days in a row",
            AchievementType::TabataMaster => "Complete 10 Tabata workouts",
            AchievementType::MarathonTime => "Complete a 4-hour training session",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub kind: AchievementType,
    /// 0.0 ..= 1.0
    pub progress: f64,
}

impl Achievement {
    pub fn is_unlocked(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Evaluate every achievement against `sessions` and the programs that
/// still exist. Streaks count UTC days ending at `now`.
pub fn evaluate(sessions: &[SessionResult], programs: &[Program], now: DateTime<Utc>) -> Vec<Achievement> {
    let count = sessions.len();
    let known: HashSet<Uuid> = programs.iter().map(|p| p.id).collect();
    let tabata: HashSet<Uuid> = programs
        .iter()
        .filter(|p| p.is_tabata_mode)
        .map(|p| p.id)
        .collect();

    let records = sessions
        .iter()
        .filter(|s| known.contains(&s.program_id))
        .map(|s| s.program_id)
        .collect::<HashSet<_>>()
        .len();
    let tabata_runs = sessions.iter().filter(|s| tabata.contains(&s.program_id)).count();
    let streak = day_streak(sessions, now.date_naive());
    let marathon = sessions.iter().any(|s| s.total_time_secs >= MARATHON_SECS);

    AchievementType::ALL
        .iter()
        .map(|&kind| {
            let progress = match kind {
                AchievementType::FirstSession => ratio(count, 1),
                AchievementType::TenSessions => ratio(count, 10),
                AchievementType::FiftySessions => ratio(count, 50),
                AchievementType::HundredSessions => ratio(count, 100),
                AchievementType::FirstPersonalRecord => ratio(records, 1),
                AchievementType::FivePersonalRecords => ratio(records, 5),
                AchievementType::WeeklyStreak => ratio(streak, 7),
                AchievementType::MonthlyStreak => ratio(streak, 30),
                AchievementType::TabataMaster => ratio(tabata_runs, 10),
                AchievementType::MarathonTime => {
                    if marathon {
                        1.0
                    } else {
                        0.0
                    }
                }
            };
            Achievement { kind, progress }
        })
        .collect()
}

/// Consecutive days with at least one session, counting back from `today`.
/// Zero when `today` itself has none.
pub fn day_streak(sessions: &[SessionResult], today: NaiveDate) -> usize {
    let days: HashSet<NaiveDate> = sessions.iter().map(|s| s.date.date_naive()).collect();
    let mut streak = 0;
    let mut day = today;
    while days.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

fn ratio(have: usize, need: usize) -> f64 {
    (have as f64 / need as f64).min(1.0)
}
