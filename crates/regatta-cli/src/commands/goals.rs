//! Goal management commands for CLI.

use chrono::{Duration, NaiveTime, Utc};
use clap::Subcommand;
use regatta_core::goals::{self, Goal, GoalType};
use regatta_core::Database;

use super::{by_id_prefix, find_program};

#[derive(Subcommand)]
pub enum GoalsAction {
    /// Show goals with up-to-date progress
    List {
        /// Include completed and expired goals
        #[arg(long)]
        all: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a goal starting today
    Add {
        /// total_sessions, total_time, weekly_sessions or program_completion
        #[arg(long = "type", value_name = "TYPE")]
        kind: GoalType,
        /// Target in the goal's unit (sessions, or minutes for total_time)
        #[arg(long)]
        target: f64,
        /// Days until the goal ends
        #[arg(long, default_value = "30")]
        days: u32,
        /// Program for program_completion goals (id or unique id prefix)
        #[arg(long)]
        program: Option<String>,
    },
    /// Delete a goal
    Delete {
        /// Goal id or unique id prefix
        id: String,
    },
    /// List the goal types
    Types,
}

pub fn run(action: GoalsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        GoalsAction::List { all, json } => {
            let db = Database::open()?;
            let now = Utc::now();
            let mut goals = db.list_goals()?;
            if goals::refresh(&mut goals, &db.all_sessions()?, now) > 0 {
                for goal in &goals {
                    db.save_goal(goal)?;
                }
            }

            let shown: Vec<&Goal> = if all {
                goals.iter().collect()
            } else {
                goals::active(&goals, now)
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else if shown.is_empty() {
                println!("no goals; add one with `goals add`");
            } else {
                for goal in shown {
                    let status = if goal.is_completed() {
                        "done".to_string()
                    } else {
                        format!("{}d left", goal.days_remaining(now))
                    };
                    println!(
                        "{}  {:<18} {:>4.0}%  {:<24} {}",
                        short_id(goal),
                        goal.kind.display_name(),
                        goal.progress() * 100.0,
                        goal.formatted_progress(),
                        status
                    );
                }
            }
        }
        GoalsAction::Add {
            kind,
            target,
            days,
            program,
        } => {
            let db = Database::open()?;
            let now = Utc::now();
            // Sessions from earlier today count towards a goal set today.
            let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
            let mut goal = Goal::new(kind, target, start, now + Duration::days(i64::from(days)));
            if let Some(key) = program {
                goal = goal.for_program(find_program(&db, &key)?.id);
            }
            goal.current = goal.measure(&db.all_sessions()?, now);
            db.save_goal(&goal)?;
            println!("Goal created: {}", goal.id);
        }
        GoalsAction::Delete { id } => {
            let db = Database::open()?;
            let goal = by_id_prefix(db.list_goals()?, &id, |g| g.id, "goal")?;
            db.delete_goal(goal.id)?;
            println!("Goal deleted: {}", goal.id);
        }
        GoalsAction::Types => {
            for kind in GoalType::ALL {
                println!("{:<20} {} ({})", kind.as_str(), kind.display_name(), kind.unit());
            }
        }
    }
    Ok(())
}

fn short_id(goal: &Goal) -> String {
    goal.id.to_string()[..8].to_string()
}
