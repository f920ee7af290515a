//! # Regatta Core Library
//!
//! This library provides the core logic for the Regatta interval-training
//! timer. Every operation is available through the standalone `regatta-cli`
//! binary, which is a thin front end over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine over an injected
//!   [`Clock`] that requires the caller to periodically invoke `tick()`
//! - **Timer Runner**: A tokio driver that owns the engine, ticks it and
//!   schedules rest gaps as cancellable tasks
//! - **Pace Ghost**: Projects a program's best session onto the live run
//! - **Storage**: SQLite-based program, session, goal and schedule storage
//!   and TOML-based configuration
//! - **History views**: statistics, achievements and goals derived from
//!   recorded sessions
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerRunner`]: Async driver for the engine
//! - [`PaceGhost`]: Best-session comparator
//! - [`Database`]: Program and session persistence
//! - [`Config`]: Application configuration management

pub mod achievements;
pub mod audio;
pub mod error;
pub mod events;
pub mod ghost;
pub mod goals;
pub mod program;
pub mod schedule;
pub mod session;
pub mod stats;
pub mod storage;
pub mod store;
pub mod timer;

pub use achievements::{Achievement, AchievementType};
pub use audio::{AudioSink, NullAudio, TerminalBell};
pub use error::{ConfigError, CoreError, DatabaseError, InvalidProgram};
pub use events::Event;
pub use ghost::PaceGhost;
pub use goals::{Goal, GoalType};
pub use program::{format_clock, Interval, IntervalType, Program, WorkoutMode};
pub use schedule::ScheduledWorkout;
pub use session::{SessionRecorder, SessionResult};
pub use stats::PeriodStats;
pub use storage::{Config, Database};
pub use store::{BestSessionSource, ProgramSource, SessionSink};
pub use timer::{Clock, ManualClock, SystemClock, TimerEngine, TimerRunner, TimerState};
