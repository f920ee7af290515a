//! Session history commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use regatta_core::stats::{format_span, personal_records};
use regatta_core::{BestSessionSource, Database, PeriodStats, SessionResult};

use super::resolve_program_id;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded sessions, newest first
    List {
        /// Only sessions of this program (id or unique id prefix)
        #[arg(long)]
        program: Option<String>,
        /// Maximum number of sessions
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Personal record for one program
    Best {
        /// Program id or unique id prefix
        program: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Weekly and monthly summaries
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        HistoryAction::List { program, limit, json } => {
            let sessions = match program {
                Some(key) => {
                    let id = resolve_program_id(&db, &key)?;
                    let mut sessions = db.sessions_for_program(id)?;
                    sessions.truncate(limit);
                    sessions
                }
                None => db.list_sessions(limit)?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else if sessions.is_empty() {
                println!("no sessions recorded");
            } else {
                for s in &sessions {
                    print_session(s);
                }
            }
        }
        HistoryAction::Best { program, json } => {
            let id = resolve_program_id(&db, &program)?;
            let best = db.fetch_best_session(id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&best)?);
            } else {
                match best {
                    Some(s) => print_session(&s),
                    None => println!("no sessions recorded for {id}"),
                }
            }
        }
        HistoryAction::Stats { json } => {
            let sessions = db.all_sessions()?;
            let now = Utc::now();
            let weekly = PeriodStats::weekly(&sessions, now);
            let monthly = PeriodStats::monthly(&sessions, now);
            let records = personal_records(&sessions);
            let total_time: f64 = sessions.iter().map(|s| s.total_time_secs).sum();

            if json {
                let out = serde_json::json!({
                    "total_sessions": sessions.len(),
                    "total_time_secs": total_time,
                    "personal_records": records.len(),
                    "weekly": weekly,
                    "monthly": monthly,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!(
                    "All time:   {} sessions, {} total, {} personal records",
                    sessions.len(),
                    format_span(total_time),
                    records.len()
                );
                print_period("Last 7 days", weekly.as_ref());
                print_period("Last 30 days", monthly.as_ref());
            }
        }
    }
    Ok(())
}

fn print_session(s: &SessionResult) {
    println!(
        "{}  {:<24} {:>8}  {}/{} intervals",
        s.date.format("%Y-%m-%d %H:%M"),
        s.program_name,
        s.formatted_total_time(),
        s.intervals_completed,
        s.total_intervals
    );
}

fn print_period(label: &str, stats: Option<&PeriodStats>) {
    match stats {
        Some(p) => println!(
            "{label}: {} sessions, {} total, {} average",
            p.total_sessions,
            p.formatted_total_time(),
            p.formatted_average_time()
        ),
        None => println!("{label}: no sessions"),
    }
}
