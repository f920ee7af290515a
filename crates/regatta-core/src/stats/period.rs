//! Rolling-window session summaries.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionResult;

/// Totals over the sessions recorded inside one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub total_sessions: usize,
    pub total_time_secs: f64,
    pub average_time_secs: f64,
}

impl PeriodStats {
    /// Summarize sessions dated at or after `since`. `None` when there are none.
    pub fn since(sessions: &[SessionResult], since: DateTime<Utc>) -> Option<Self> {
        let (count, total) = sessions
            .iter()
            .filter(|s| s.date >= since)
            .fold((0usize, 0.0f64), |(n, t), s| (n + 1, t + s.total_time_secs));
        if count == 0 {
            return None;
        }
        Some(Self {
            total_sessions: count,
            total_time_secs: total,
            average_time_secs: total / count as f64,
        })
    }

    /// The last 7 days.
    pub fn weekly(sessions: &[SessionResult], now: DateTime<Utc>) -> Option<Self> {
        Self::since(sessions, now - Duration::days(7))
    }

    /// The last 30 days.
    pub fn monthly(sessions: &[SessionResult], now: DateTime<Utc>) -> Option<Self> {
        Self::since(sessions, now - Duration::days(30))
    }

    pub fn formatted_total_time(&self) -> String {
        format_span(self.total_time_secs)
    }

    pub fn formatted_average_time(&self) -> String {
        format_span(self.average_time_secs)
    }
}

/// Coarse `"1h 5m"` / `"12m"` rendering for summaries.
pub fn format_span(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn at(now: DateTime<Utc>, days_ago: i64, secs: f64) -> SessionResult {
        SessionResult {
            id: Uuid::new_v4(),
            program_id: Uuid::nil(),
            program_name: "Any".into(),
            date: now - Duration::days(days_ago),
            total_time_secs: secs,
            intervals_completed: 1,
            total_intervals: 1,
        }
    }

    #[test]
    fn weekly_and_monthly_windows() {
        let now = Utc::now();
        let sessions = vec![at(now, 0, 600.0), at(now, 6, 1200.0), at(now, 20, 3600.0), at(now, 45, 60.0)];

        let week = PeriodStats::weekly(&sessions, now).unwrap();
        assert_eq!(week.total_sessions, 2);
        assert_eq!(week.total_time_secs, 1800.0);
        assert_eq!(week.average_time_secs, 900.0);
        assert_eq!(week.formatted_total_time(), "30m");

        let month = PeriodStats::monthly(&sessions, now).unwrap();
        assert_eq!(month.total_sessions, 3);
        assert_eq!(month.formatted_total_time(), "1h 30m");
        assert_eq!(month.formatted_average_time(), "30m");
    }

    #[test]
    fn empty_window_is_none() {
        let now = Utc::now();
        assert!(PeriodStats::weekly(&[], now).is_none());
        assert!(PeriodStats::weekly(&[at(now, 8, 60.0)], now).is_none());
    }
}
