//! Program management commands for CLI.

use clap::Subcommand;
use regatta_core::{Config, Database, Interval, Program, WorkoutMode};

use super::find_program;

#[derive(Subcommand)]
pub enum ProgramAction {
    /// List saved programs
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one program with its intervals
    Show {
        /// Program id or unique id prefix
        id: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a program from a workout mode
    Create {
        /// standard, hiit, running, circuit or tabata (default from config)
        #[arg(long)]
        mode: Option<String>,
        /// Number of rounds (default from config)
        #[arg(long)]
        rounds: Option<u32>,
        /// Program name (defaults to the mode's name)
        #[arg(long)]
        name: Option<String>,
        /// Append an interval, e.g. work:30:Sprint (repeatable)
        #[arg(long = "interval", value_name = "TYPE:SECS[:NAME]")]
        intervals: Vec<Interval>,
        /// Rest gap between intervals in seconds
        #[arg(long)]
        rest: Option<f64>,
    },
    /// Change a saved program
    Edit {
        /// Program id or unique id prefix
        id: String,
        /// New program name
        #[arg(long)]
        name: Option<String>,
        /// Remove the interval at this 1-based position (repeatable)
        #[arg(long = "remove", value_name = "N")]
        remove: Vec<usize>,
        /// Move an interval between 1-based positions (repeatable)
        #[arg(long = "move", value_name = "FROM:TO")]
        moves: Vec<String>,
        /// Append an interval, e.g. rest:15 (repeatable)
        #[arg(long = "add-interval", value_name = "TYPE:SECS[:NAME]")]
        add: Vec<Interval>,
        /// Rest gap between intervals in seconds
        #[arg(long)]
        rest: Option<f64>,
        /// Mark the program as a Tabata workout
        #[arg(long)]
        tabata: Option<bool>,
    },
    /// Delete a program. Its session history is kept.
    Delete {
        /// Program id or unique id prefix
        id: String,
    },
    /// List the available workout modes
    Modes,
}

pub fn run(action: ProgramAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProgramAction::List { json } => {
            let db = Database::open()?;
            let programs = db.list_programs()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&programs)?);
            } else if programs.is_empty() {
                println!("no programs yet; create one with `program create`");
            } else {
                for p in &programs {
                    println!(
                        "{}  {:<24} {:>3} intervals  {:>8}",
                        p.id,
                        p.name,
                        p.intervals.len(),
                        p.formatted_total_duration()
                    );
                }
            }
        }
        ProgramAction::Show { id, json } => {
            let db = Database::open()?;
            let program = find_program(&db, &id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&program)?);
            } else {
                print_program(&program);
            }
        }
        ProgramAction::Create {
            mode,
            rounds,
            name,
            intervals,
            rest,
        } => {
            let config = Config::load_or_default();
            let mode = match mode {
                Some(m) => m.parse::<WorkoutMode>()?,
                // Intervals on the command line mean a hand-built program.
                None if !intervals.is_empty() => WorkoutMode::Standard,
                None => config.default_mode(),
            };
            let rounds = rounds.unwrap_or(config.defaults.rounds);
            let name = name.unwrap_or_else(|| mode.display_name().to_string());

            let mut program = mode.generate_program(name, rounds);
            for interval in intervals {
                program.push_interval(interval);
            }
            if let Some(rest) = rest {
                program.rest_between_intervals = rest;
            }
            let db = Database::open()?;
            db.save_program(&program)?;
            println!("Program created: {}", program.id);
            print_program(&program);
        }
        ProgramAction::Edit {
            id,
            name,
            remove,
            moves,
            add,
            rest,
            tabata,
        } => {
            let db = Database::open()?;
            let mut program = find_program(&db, &id)?;

            let mut remove = remove;
            remove.sort_unstable();
            remove.dedup();
            for position in remove.into_iter().rev() {
                let index = position_to_index(position, &program)?;
                program.remove_interval(index);
            }
            for spec in &moves {
                let (from, to) = parse_move(spec)?;
                let from = position_to_index(from, &program)?;
                let to = position_to_index(to, &program)?;
                program.move_interval(from, to);
            }
            for interval in add {
                program.push_interval(interval);
            }
            if let Some(rest) = rest {
                program.rest_between_intervals = rest;
            }
            if let Some(tabata) = tabata {
                program.is_tabata_mode = tabata;
            }
            if let Some(name) = name {
                program.name = name;
            }

            db.save_program(&program)?;
            println!("Program updated: {}", program.id);
            print_program(&program);
        }
        ProgramAction::Delete { id } => {
            let db = Database::open()?;
            let program = find_program(&db, &id)?;
            db.delete_program(program.id)?;
            println!("Program deleted: {} ({})", program.id, program.name);
        }
        ProgramAction::Modes => {
            for mode in WorkoutMode::ALL {
                println!("{:<10} {}", mode.display_name(), mode.description());
            }
        }
    }
    Ok(())
}

/// 1-based position on the command line to a vector index.
fn position_to_index(position: usize, program: &Program) -> Result<usize, String> {
    if position == 0 || position > program.intervals.len() {
        return Err(format!(
            "no interval at position {position} (program has {})",
            program.intervals.len()
        ));
    }
    Ok(position - 1)
}

fn parse_move(spec: &str) -> Result<(usize, usize), String> {
    let parse = |raw: &str| {
        raw.trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid move '{spec}' (expected FROM:TO)"))
    };
    match spec.split_once(':') {
        Some((from, to)) => Ok((parse(from)?, parse(to)?)),
        None => Err(format!("invalid move '{spec}' (expected FROM:TO)")),
    }
}

fn print_program(program: &Program) {
    println!("{}", program.name);
    println!(
        "  total {}  {} work  rest between intervals {}s{}",
        program.formatted_total_duration(),
        program.work_count(),
        program.rest_between_intervals,
        if program.is_tabata_mode { "  tabata" } else { "" }
    );
    for (i, interval) in program.intervals.iter().enumerate() {
        println!(
            "  {:>3}. {:<9} {:<20} {}",
            i + 1,
            interval.interval_type.display_name(),
            interval.name,
            interval.formatted_duration()
        );
    }
}
