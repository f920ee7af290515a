//! Workout programs: ordered intervals plus run configuration.

mod mode;

pub use mode::WorkoutMode;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InvalidProgram;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalType {
    Work,
    Rest,
    Warmup,
    Cooldown,
}

impl IntervalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalType::Work => "work",
            IntervalType::Rest => "rest",
            IntervalType::Warmup => "warmup",
            IntervalType::Cooldown => "cooldown",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            IntervalType::Work => "Work",
            IntervalType::Rest => "Rest",
            IntervalType::Warmup => "Warmup",
            IntervalType::Cooldown => "Cooldown",
        }
    }
}

impl std::str::FromStr for IntervalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(IntervalType::Work),
            "rest" => Ok(IntervalType::Rest),
            "warmup" => Ok(IntervalType::Warmup),
            "cooldown" => Ok(IntervalType::Cooldown),
            other => Err(format!("unknown interval type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub id: Uuid,
    /// Display hint only. Sequencing follows position in [`Program::intervals`].
    pub order: u32,
    pub name: String,
    pub duration_secs: f64,
    pub interval_type: IntervalType,
}

impl Interval {
    pub fn new(order: u32, name: impl Into<String>, duration_secs: f64, interval_type: IntervalType) -> Self {
        Self {
            id: Uuid::new_v4(),
            order,
            name: name.into(),
            duration_secs,
            interval_type,
        }
    }

    /// `m:ss` rendering of the duration.
    pub fn formatted_duration(&self) -> String {
        let total = self.duration_secs.max(0.0) as u64;
        format!("{}:{:02}", total / 60, total % 60)
    }
}

/// Parses `type:secs[:name]`, e.g. `work:30:Sprint` or `rest:15`.
///
/// The name defaults to the type's display name. `order` is left at 0;
/// [`Program::push_interval`] numbers it.
impl std::str::FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let interval_type: IntervalType = parts.next().unwrap_or_default().trim().parse()?;
        let raw_secs = parts
            .next()
            .ok_or_else(|| format!("missing duration in '{s}' (expected type:secs[:name])"))?;
        let duration_secs: f64 = raw_secs
            .trim()
            .parse()
            .map_err(|_| format!("invalid duration '{raw_secs}'"))?;
        if !(duration_secs.is_finite() && duration_secs > 0.0) {
            return Err(format!("duration must be positive (got {raw_secs})"));
        }
        let name = match parts.next().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => interval_type.display_name().to_string(),
        };
        Ok(Interval::new(0, name, duration_secs, interval_type))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    pub name: String,
    pub intervals: Vec<Interval>,
    /// Pause inserted between consecutive intervals, in seconds.
    #[serde(default)]
    pub rest_between_intervals: f64,
    #[serde(default)]
    pub is_tabata_mode: bool,
}

impl Program {
    pub fn new(name: impl Into<String>, intervals: Vec<Interval>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            intervals,
            rest_between_intervals: 0.0,
            is_tabata_mode: false,
        }
    }

    pub fn with_rest_between_intervals(mut self, secs: f64) -> Self {
        self.rest_between_intervals = secs;
        self
    }

    /// Sum of interval durations. Rest gaps are not included.
    pub fn total_duration_secs(&self) -> f64 {
        self.intervals.iter().map(|i| i.duration_secs).sum()
    }

    /// Seconds of program time before the interval at `index`.
    pub fn cumulative_secs(&self, index: usize) -> f64 {
        self.intervals
            .iter()
            .take(index)
            .map(|i| i.duration_secs)
            .sum()
    }

    pub fn work_count(&self) -> usize {
        self.intervals
            .iter()
            .filter(|i| i.interval_type == IntervalType::Work)
            .count()
    }

    /// Check that the program can be handed to the timer engine.
    ///
    /// # Errors
    /// Returns the first reason the program is not runnable.
    pub fn validate(&self) -> Result<(), InvalidProgram> {
        if self.intervals.is_empty() {
            return Err(InvalidProgram::NoIntervals);
        }
        if let Some((index, interval)) = self
            .intervals
            .iter()
            .enumerate()
            .find(|(_, i)| !(i.duration_secs.is_finite() && i.duration_secs > 0.0))
        {
            return Err(InvalidProgram::NonPositiveDuration {
                index,
                name: interval.name.clone(),
                duration: interval.duration_secs,
            });
        }
        if !(self.rest_between_intervals.is_finite() && self.rest_between_intervals >= 0.0) {
            return Err(InvalidProgram::InvalidRest(self.rest_between_intervals));
        }
        Ok(())
    }

    pub fn is_runnable(&self) -> bool {
        self.validate().is_ok()
    }

    /// `h:mm:ss` or `m:ss` rendering of the total duration.
    pub fn formatted_total_duration(&self) -> String {
        format_clock(self.total_duration_secs())
    }

    // ── Editing ──────────────────────────────────────────────────────

    /// Append `interval` as the last step.
    pub fn push_interval(&mut self, mut interval: Interval) {
        interval.order = self.intervals.len() as u32;
        self.intervals.push(interval);
    }

    /// Remove the interval at `index`. Later intervals move up one place.
    pub fn remove_interval(&mut self, index: usize) -> Option<Interval> {
        if index >= self.intervals.len() {
            return None;
        }
        let removed = self.intervals.remove(index);
        self.renumber();
        Some(removed)
    }

    /// Move the interval at `from` so that it ends up at position `to`.
    /// Returns false if either position is out of range.
    pub fn move_interval(&mut self, from: usize, to: usize) -> bool {
        let len = self.intervals.len();
        if from >= len || to >= len {
            return false;
        }
        let interval = self.intervals.remove(from);
        self.intervals.insert(to, interval);
        self.renumber();
        true
    }

    /// Make every `order` match its position.
    pub fn renumber(&mut self) {
        for (position, interval) in self.intervals.iter_mut().enumerate() {
            interval.order = position as u32;
        }
    }
}

/// Render seconds as `h:mm:ss` when at least an hour, `m:ss` otherwise.
pub fn format_clock(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step() -> Program {
        Program::new(
            "Pyramid",
            vec![
                Interval::new(0, "Row", 10.0, IntervalType::Work),
                Interval::new(1, "Breathe", 5.0, IntervalType::Rest),
            ],
        )
    }

    #[test]
    fn total_duration_excludes_rest_gaps() {
        let p = two_step().with_rest_between_intervals(20.0);
        assert_eq!(p.total_duration_secs(), 15.0);
        assert_eq!(p.cumulative_secs(1), 10.0);
        assert_eq!(p.cumulative_secs(2), 15.0);
    }

    #[test]
    fn empty_program_is_not_runnable() {
        let p = Program::new("Empty", vec![]);
        assert_eq!(p.validate(), Err(InvalidProgram::NoIntervals));
    }

    #[test]
    fn zero_duration_interval_is_reported_by_index() {
        let mut p = two_step();
        p.intervals[1].duration_secs = 0.0;
        match p.validate() {
            Err(InvalidProgram::NonPositiveDuration { index, .. }) => assert_eq!(index, 1),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn nan_duration_is_rejected() {
        let mut p = two_step();
        p.intervals[0].duration_secs = f64::NAN;
        assert!(!p.is_runnable());
    }

    #[test]
    fn negative_rest_is_rejected() {
        let p = two_step().with_rest_between_intervals(-1.0);
        assert_eq!(p.validate(), Err(InvalidProgram::InvalidRest(-1.0)));
    }

    #[test]
    fn editing_keeps_order_in_step_with_position() {
        let mut p = two_step();
        p.push_interval("cooldown:60:Stretch".parse().unwrap());
        assert_eq!(p.intervals[2].order, 2);
        assert_eq!(p.intervals[2].interval_type, IntervalType::Cooldown);

        assert!(p.move_interval(2, 0));
        let names: Vec<&str> = p.intervals.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Stretch", "Row", "Breathe"]);

        assert_eq!(p.remove_interval(1).map(|i| i.name), Some("Row".to_string()));
        assert!(p.remove_interval(5).is_none());
        assert!(!p.move_interval(0, 2));
        let orders: Vec<u32> = p.intervals.iter().map(|i| i.order).collect();
        assert_eq!(orders, [0, 1]);
        assert_eq!(p.work_count(), 0);
    }

    #[test]
    fn interval_parsing() {
        let sprint: Interval = "work:30:Sprint hard".parse().unwrap();
        assert_eq!(sprint.name, "Sprint hard");
        assert_eq!(sprint.duration_secs, 30.0);

        let rest: Interval = "rest:12.5".parse().unwrap();
        assert_eq!(rest.name, "Rest");
        assert_eq!(rest.interval_type, IntervalType::Rest);

        assert!("jog:30".parse::<Interval>().is_err());
        assert!("work".parse::<Interval>().is_err());
        assert!("work:0".parse::<Interval>().is_err());
        assert!("work:abc".parse::<Interval>().is_err());
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(65.0), "1:05");
        assert_eq!(format_clock(3725.0), "1:02:05");
        assert_eq!(two_step().intervals[0].formatted_duration(), "0:10");
    }
}
