//! Workout scheduling commands for CLI.

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::Subcommand;
use regatta_core::schedule::{self, ScheduledWorkout};
use regatta_core::Database;

use super::{by_id_prefix, find_program};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Today's pending workouts and everything upcoming
    List {
        /// Every entry, including completed and past ones
        #[arg(long)]
        all: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Plan a workout
    Add {
        /// Program id or unique id prefix
        program: String,
        /// When, in UTC: RFC 3339 or "YYYY-MM-DD HH:MM"
        #[arg(long)]
        at: String,
        /// Minutes before the workout to remind
        #[arg(long)]
        reminder_minutes: Option<u32>,
        /// No reminder for this workout
        #[arg(long)]
        no_reminder: bool,
    },
    /// Mark a planned workout as done
    Done {
        /// Entry id or unique id prefix
        id: String,
    },
    /// Remove a planned workout
    Delete {
        /// Entry id or unique id prefix
        id: String,
    },
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ScheduleAction::List { all, json } => {
            let workouts = db.list_scheduled_workouts()?;
            let now = Utc::now();
            if all {
                if json {
                    println!("{}", serde_json::to_string_pretty(&workouts)?);
                } else if workouts.is_empty() {
                    println!("nothing scheduled");
                } else {
                    workouts.iter().for_each(print_workout);
                }
                return Ok(());
            }

            let today = schedule::due_today(&workouts, now);
            let later: Vec<&ScheduledWorkout> = schedule::upcoming(&workouts, now)
                .into_iter()
                .filter(|w| !w.is_today(now))
                .collect();
            if json {
                let view = serde_json::json!({ "today": today, "upcoming": later });
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else if today.is_empty() && later.is_empty() {
                println!("nothing scheduled");
            } else {
                if !today.is_empty() {
                    println!("Today:");
                    today.into_iter().for_each(print_workout);
                }
                if !later.is_empty() {
                    println!("Upcoming:");
                    later.into_iter().for_each(print_workout);
                }
            }
        }
        ScheduleAction::Add {
            program,
            at,
            reminder_minutes,
            no_reminder,
        } => {
            let program = find_program(&db, &program)?;
            let mut workout = ScheduledWorkout::new(&program, parse_when(&at)?);
            if let Some(minutes) = reminder_minutes {
                workout.reminder_minutes = minutes;
            }
            workout.reminder_enabled = !no_reminder;
            db.save_scheduled_workout(&workout)?;
            println!("Workout scheduled: {}", workout.id);
            print_workout(&workout);
        }
        ScheduleAction::Done { id } => {
            let workout = by_id_prefix(db.list_scheduled_workouts()?, &id, |w| w.id, "scheduled workout")?;
            db.mark_scheduled_completed(workout.id)?;
            println!("Marked done: {} ({})", workout.id, workout.program_name);
        }
        ScheduleAction::Delete { id } => {
            let workout = by_id_prefix(db.list_scheduled_workouts()?, &id, |w| w.id, "scheduled workout")?;
            db.delete_scheduled_workout(workout.id)?;
            println!("Removed: {} ({})", workout.id, workout.program_name);
        }
    }
    Ok(())
}

/// RFC 3339, or a bare `YYYY-MM-DD HH:MM` / `YYYY-MM-DDTHH:MM` taken as UTC.
fn parse_when(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("cannot read '{raw}' as a date; use RFC 3339 or YYYY-MM-DD HH:MM"))
}

fn print_workout(workout: &ScheduledWorkout) {
    let reminder = match workout.reminder_at() {
        Some(_) => format!("remind {}m before", workout.reminder_minutes),
        None => "no reminder".to_string(),
    };
    println!(
        "{}  {}  {:<24} {}{}",
        &workout.id.to_string()[..8],
        workout.scheduled_at.format("%Y-%m-%d %H:%M"),
        workout.program_name,
        reminder,
        if workout.is_completed { "  done" } else { "" }
    );
}
