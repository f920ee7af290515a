use serde::{Deserialize, Serialize};

use super::{Interval, IntervalType, Program};

/// Canned program shapes offered when creating a new program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutMode {
    Standard,
    Hiit,
    Running,
    Circuit,
    Tabata,
}

impl WorkoutMode {
    pub const ALL: [WorkoutMode; 5] = [
        WorkoutMode::Standard,
        WorkoutMode::Hiit,
        WorkoutMode::Running,
        WorkoutMode::Circuit,
        WorkoutMode::Tabata,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            WorkoutMode::Standard => "Standard",
            WorkoutMode::Hiit => "HIIT",
            WorkoutMode::Running => "Running",
            WorkoutMode::Circuit => "Circuit",
            WorkoutMode::Tabata => "Tabata",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WorkoutMode::Standard => "Custom interval training",
            WorkoutMode::Hiit => "High Intensity Interval Training",
            WorkoutMode::Running => "Running intervals with pace tracking",
            WorkoutMode::Circuit => "Circuit training with rest periods",
            WorkoutMode::Tabata => "Tabata protocol (20s work, 10s rest)",
        }
    }

    /// Build a fresh program of this shape. `rounds` is ignored by the
    /// running and standard modes.
    ///
    /// A standard program starts empty and is not runnable until intervals
    /// are added with [`Program::push_interval`].
    pub fn generate_program(&self, name: impl Into<String>, rounds: u32) -> Program {
        let name = name.into();
        match self {
            WorkoutMode::Standard => Program::new(name, Vec::new()),
            WorkoutMode::Hiit => Program::new(name, alternating(rounds, ("Work", 30.0), ("Rest", 15.0))),
            WorkoutMode::Running => {
                let mut intervals = vec![Interval::new(0, "Warmup", 300.0, IntervalType::Warmup)];
                for i in 0..5u32 {
                    intervals.push(Interval::new(i * 2 + 1, format!("Run {}", i + 1), 180.0, IntervalType::Work));
                    intervals.push(Interval::new(
                        i * 2 + 2,
                        format!("Recovery {}", i + 1),
                        60.0,
                        IntervalType::Rest,
                    ));
                }
                let order = intervals.len() as u32;
                intervals.push(Interval::new(order, "Cooldown", 300.0, IntervalType::Cooldown));
                Program::new(name, intervals)
            }
            WorkoutMode::Circuit => {
                Program::new(name, alternating(rounds, ("Exercise", 45.0), ("Rest", 30.0)))
                    .with_rest_between_intervals(15.0)
            }
            WorkoutMode::Tabata => {
                let mut program = Program::new(name, alternating(rounds, ("Work", 20.0), ("Rest", 10.0)));
                program.is_tabata_mode = true;
                program
            }
        }
    }
}

impl std::str::FromStr for WorkoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(WorkoutMode::Standard),
            "hiit" => Ok(WorkoutMode::Hiit),
            "running" => Ok(WorkoutMode::Running),
            "circuit" => Ok(WorkoutMode::Circuit),
            "tabata" => Ok(WorkoutMode::Tabata),
            other => Err(format!("unknown workout mode: {other}")),
        }
    }
}

fn alternating(rounds: u32, work: (&str, f64), rest: (&str, f64)) -> Vec<Interval> {
    let mut intervals = Vec::with_capacity(rounds as usize * 2);
    for i in 0..rounds {
        intervals.push(Interval::new(i * 2, format!("{} {}", work.0, i + 1), work.1, IntervalType::Work));
        intervals.push(Interval::new(i * 2 + 1, format!("{} {}", rest.0, i + 1), rest.1, IntervalType::Rest));
    }
    intervals
}
