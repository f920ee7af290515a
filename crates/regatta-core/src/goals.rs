//! Training goals measured against session history.
//!
//! A goal's `current` value is re-measured from the full history on every
//! refresh until it is reached; after that it is left alone, so a completed
//! goal stays completed even when old sessions fall out of its window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::session::SessionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    TotalSessions,
    TotalTime,
    WeeklySessions,
    ProgramCompletion,
}

impl GoalType {
    pub const ALL: [GoalType; 4] = [
        GoalType::TotalSessions,
        GoalType::TotalTime,
        GoalType::WeeklySessions,
        GoalType::ProgramCompletion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::TotalSessions => "total_sessions",
            GoalType::TotalTime => "total_time",
            GoalType::WeeklySessions => "weekly_sessions",
            GoalType::ProgramCompletion => "program_completion",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GoalType::TotalSessions => "Total Sessions",
            GoalType::TotalTime => "Total Time",
            GoalType::WeeklySessions => "Weekly Sessions",
            GoalType::ProgramCompletion => "Program Completion",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            GoalType::TotalTime => "minutes",
            _ => "sessions",
        }
    }
}

impl std::str::FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        GoalType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown goal type: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub kind: GoalType,
    pub target: f64,
    /// Last measured value, in [`GoalType::unit`]s.
    pub current: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Required for [`GoalType::ProgramCompletion`], ignored otherwise.
    pub program_id: Option<Uuid>,
}

impl Goal {
    pub fn new(kind: GoalType, target: f64, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            target,
            current: 0.0,
            start,
            end,
            program_id: None,
        }
    }

    pub fn for_program(mut self, program_id: Uuid) -> Self {
        self.program_id = Some(program_id);
        self
    }

    /// # Errors
    /// Returns an error for a non-positive target, an empty date window, or a
    /// program-completion goal without a program.
    pub fn validate(&self) -> Result<()> {
        if !(self.target.is_finite() && self.target > 0.0) {
            return Err(CoreError::Custom(format!(
                "goal target must be positive (got {})",
                self.target
            )));
        }
        if self.end < self.start {
            return Err(CoreError::Custom("goal ends before it starts".into()));
        }
        if self.kind == GoalType::ProgramCompletion && self.program_id.is_none() {
            return Err(CoreError::Custom("program completion goals need a program".into()));
        }
        Ok(())
    }

    /// 0.0 ..= 1.0
    pub fn progress(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        (self.current / self.target).min(1.0)
    }

    pub fn is_completed(&self) -> bool {
        self.current >= self.target
    }

    /// Open and not yet reached.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed() && self.end >= now
    }

    /// Whole days until `end`, never negative.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.end - now).num_days().max(0)
    }

    pub fn formatted_progress(&self) -> String {
        format!(
            "{} / {} {}",
            self.current.floor() as i64,
            self.target.floor() as i64,
            self.kind.unit()
        )
    }

    /// Measure this goal against `sessions`.
    ///
    /// Weekly goals look at the 7 days before `now` regardless of the goal's
    /// own window; every other kind counts sessions inside `start..=end`.
    pub fn measure(&self, sessions: &[SessionResult], now: DateTime<Utc>) -> f64 {
        let in_window = |s: &&SessionResult| s.date >= self.start && s.date <= self.end;
        match self.kind {
            GoalType::TotalSessions => sessions.iter().filter(in_window).count() as f64,
            GoalType::TotalTime => {
                sessions
                    .iter()
                    .filter(in_window)
                    .map(|s| s.total_time_secs)
                    .sum::<f64>()
                    / 60.0
            }
            GoalType::WeeklySessions => {
                let week_ago = now - Duration::days(7);
                sessions.iter().filter(|s| s.date >= week_ago).count() as f64
            }
            GoalType::ProgramCompletion => match self.program_id {
                Some(id) => sessions
                    .iter()
                    .filter(in_window)
                    .filter(|s| s.program_id == id)
                    .count() as f64,
                None => 0.0,
            },
        }
    }
}

/// Re-measure every goal that is not yet completed. Returns how many changed.
pub fn refresh(goals: &mut [Goal], sessions: &[SessionResult], now: DateTime<Utc>) -> usize {
    let mut changed = 0;
    for goal in goals.iter_mut().filter(|g| !g.is_completed()) {
        let current = goal.measure(sessions, now);
        if current != goal.current {
            goal.current = current;
            changed += 1;
        }
    }
    changed
}

pub fn active(goals: &[Goal], now: DateTime<Utc>) -> Vec<&Goal> {
    goals.iter().filter(|g| g.is_active(now)).collect()
}

pub fn completed(goals: &[Goal]) -> Vec<&Goal> {
    goals.iter().filter(|g| g.is_completed()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn session(program_id: Uuid, secs: f64, days_ago: i64) -> SessionResult {
        SessionResult {
            id: Uuid::new_v4(),
            program_id,
            program_name: "P".into(),
            date: now() - Duration::days(days_ago),
            total_time_secs: secs,
            intervals_completed: 2,
            total_intervals: 2,
        }
    }

    fn month_goal(kind: GoalType, target: f64) -> Goal {
        Goal::new(kind, target, now() - Duration::days(20), now() + Duration::days(10))
    }

    #[test]
    fn measures_each_kind() {
        let rowing = Uuid::new_v4();
        let other = Uuid::new_v4();
        let sessions = vec![
            session(rowing, 600.0, 1),
            session(rowing, 1200.0, 10),
            session(other, 300.0, 3),
            // Before every window.
            session(rowing, 900.0, 40),
        ];

        assert_eq!(month_goal(GoalType::TotalSessions, 5.0).measure(&sessions, now()), 3.0);
        assert_eq!(month_goal(GoalType::TotalTime, 60.0).measure(&sessions, now()), 35.0);
        assert_eq!(month_goal(GoalType::WeeklySessions, 3.0).measure(&sessions, now()), 2.0);
        let program_goal = month_goal(GoalType::ProgramCompletion, 4.0).for_program(rowing);
        assert_eq!(program_goal.measure(&sessions, now()), 2.0);
        assert_eq!(month_goal(GoalType::ProgramCompletion, 4.0).measure(&sessions, now()), 0.0);
    }

    #[test]
    fn progress_is_capped_at_one() {
        let mut goal = month_goal(GoalType::TotalSessions, 4.0);
        goal.current = 1.0;
        assert_eq!(goal.progress(), 0.25);
        assert_eq!(goal.formatted_progress(), "1 / 4 sessions");
        goal.current = 9.0;
        assert_eq!(goal.progress(), 1.0);
        assert!(goal.is_completed());
    }

    #[test]
    fn refresh_leaves_completed_goals_alone() {
        let program = Uuid::new_v4();
        let mut goals = vec![
            month_goal(GoalType::TotalSessions, 2.0),
            month_goal(GoalType::TotalSessions, 10.0),
        ];
        let sessions = vec![session(program, 60.0, 1), session(program, 60.0, 2)];
        assert_eq!(refresh(&mut goals, &sessions, now()), 2);
        assert!(goals[0].is_completed());
        assert_eq!(goals[1].current, 2.0);

        // History shrinks; the reached goal keeps its value.
        assert_eq!(refresh(&mut goals, &sessions[..1], now()), 1);
        assert_eq!(goals[0].current, 2.0);
        assert_eq!(goals[1].current, 1.0);
    }

    #[test]
    fn active_and_completed_filters() {
        let mut done = month_goal(GoalType::TotalSessions, 1.0);
        done.current = 1.0;
        let open = month_goal(GoalType::TotalSessions, 5.0);
        let expired = Goal::new(
            GoalType::TotalSessions,
            5.0,
            now() - Duration::days(30),
            now() - Duration::days(1),
        );
        let goals = vec![done.clone(), open.clone(), expired];

        let active: Vec<Uuid> = active(&goals, now()).iter().map(|g| g.id).collect();
        assert_eq!(active, vec![open.id]);
        let completed: Vec<Uuid> = completed(&goals).iter().map(|g| g.id).collect();
        assert_eq!(completed, vec![done.id]);
        assert_eq!(open.days_remaining(now()), 10);
        assert_eq!(goals[2].days_remaining(now()), 0);
    }

    #[test]
    fn validation() {
        assert!(month_goal(GoalType::TotalTime, 30.0).validate().is_ok());
        assert!(month_goal(GoalType::TotalTime, 0.0).validate().is_err());
        assert!(month_goal(GoalType::ProgramCompletion, 3.0).validate().is_err());
        let backwards = Goal::new(GoalType::TotalSessions, 1.0, now(), now() - Duration::days(1));
        assert!(backwards.validate().is_err());
        assert_eq!("weekly_sessions".parse::<GoalType>(), Ok(GoalType::WeeklySessions));
        assert!("streak".parse::<GoalType>().is_err());
    }
}
