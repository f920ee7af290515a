//! Live program runs.
//!
//! The runner ticks the engine on the tokio runtime; engine events come back
//! over a channel and are printed as they arrive. Single-letter lines on stdin
//! steer the run and Ctrl-C stops it.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use regatta_core::{
    AudioSink, BestSessionSource, Config, Database, Event, NullAudio, PaceGhost, Program,
    SessionRecorder, SessionResult, SystemClock, TerminalBell, TimerEngine, TimerRunner,
    TimerState,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::find_program;

#[derive(Args)]
pub struct RunArgs {
    /// Program id or unique id prefix
    program: String,
    /// Hide the pace ghost
    #[arg(long)]
    no_ghost: bool,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let program = find_program(&db, &args.program)?;
    program.validate()?;

    let previous_best = db.fetch_best_session(program.id)?;
    let show_ghost = config.ghost.enabled && !args.no_ghost;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let session = rt.block_on(drive(&db, &program, &config, &args, show_ghost))?;

    let new_record = previous_best.map_or(true, |best| session.total_time_secs < best.total_time_secs);
    if args.json {
        println!("{}", serde_json::to_string(&session)?);
    } else {
        println!(
            "Finished {}: {} ({}/{} intervals)",
            session.program_name,
            session.formatted_total_time(),
            session.intervals_completed,
            session.total_intervals
        );
        if new_record {
            println!("New personal record!");
        }
    }
    Ok(())
}

async fn drive(
    db: &Database,
    program: &Program,
    config: &Config,
    args: &RunArgs,
    show_ghost: bool,
) -> Result<SessionResult, Box<dyn std::error::Error>> {
    let audio: Arc<dyn AudioSink> = if config.audio.enabled {
        Arc::new(TerminalBell::new(config.audio.bell))
    } else {
        Arc::new(NullAudio)
    };
    let mut engine = TimerEngine::new(Arc::new(SystemClock::new()), audio)
        .with_countdown(config.timer.countdown_secs);

    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    engine.on_event(move |event| {
        let _ = tx.send(event.clone());
    });

    let runner = TimerRunner::new(engine, config.tick_interval());
    runner.start(program.clone())?;

    let ghost = PaceGhost::new(db);
    let show_ghost = show_ghost && ghost.has_ghost(program.id);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut interrupted = false;
    let mut status = tokio::time::interval(Duration::from_secs(1));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            biased;

            Some(event) = rx.recv() => {
                print_event(&event, args.json)?;
                if matches!(event, Event::Finished { .. }) {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => handle_command(&runner, line.trim()),
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::warn!(error = %e, "stdin closed");
                    stdin_open = false;
                }
            },
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                runner.stop();
            }
            _ = status.tick() => {
                let snapshot = runner.snapshot();
                let progress = runner.engine().total_progress();
                let ghost_at = if show_ghost {
                    ghost.ghost_position(program.id, progress)
                } else {
                    None
                };
                print_status(&snapshot, ghost_at, args.json)?;
            }
        }
    }
    runner.shutdown();

    let session = {
        let engine = runner.engine();
        debug_assert_eq!(engine.state(), TimerState::Finished);
        SessionRecorder::new(db).record(program, &engine)?
    };
    Ok(session)
}

fn handle_command(runner: &TimerRunner, command: &str) {
    match command {
        "p" => runner.pause(),
        "r" => runner.resume(),
        "s" => runner.skip(),
        "q" => runner.stop(),
        "" => {}
        other => eprintln!("unknown command '{other}' (p pause, r resume, s skip, q stop)"),
    }
}

fn print_event(event: &Event, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    match event {
        Event::RunStarted { program_name, interval_count, total_duration_secs, .. } => println!(
            "Starting {program_name}: {interval_count} intervals, {}",
            regatta_core::format_clock(*total_duration_secs)
        ),
        Event::IntervalChanged { index, interval_type, name, duration_secs, .. } => println!(
            ">> {}. {} [{}] {}",
            index + 1,
            name,
            interval_type.display_name(),
            regatta_core::format_clock(*duration_secs)
        ),
        Event::Countdown { seconds_remaining, .. } => println!("   {seconds_remaining}..."),
        Event::RestStarted { rest_secs, .. } => println!("   rest {rest_secs}s"),
        Event::Paused { remaining_secs, .. } => {
            println!("   paused ({} left)", regatta_core::format_clock(*remaining_secs))
        }
        Event::Resumed { .. } => println!("   resumed"),
        Event::Skipped { from_index, to_index, .. } => {
            println!("   skipped {} -> {}", from_index + 1, to_index + 1)
        }
        Event::IntervalCompleted { .. } | Event::Finished { .. } | Event::StateSnapshot { .. } => {}
    }
    Ok(())
}

fn print_status(snapshot: &Event, ghost: Option<f64>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
        if let Some(position) = ghost {
            println!("{}", serde_json::json!({ "type": "Ghost", "position": position }));
        }
        return Ok(());
    }
    let Event::StateSnapshot { state, interval_name, remaining_secs, total_progress, resting, .. } = snapshot
    else {
        return Ok(());
    };
    if *state != TimerState::Running && !*resting {
        return Ok(());
    }
    let mut line = format!(
        "   {:<20} {:>7}  {:>5.1}%",
        interval_name,
        regatta_core::format_clock(*remaining_secs),
        total_progress * 100.0
    );
    if let Some(position) = ghost {
        let lead = (total_progress - position) * 100.0;
        line.push_str(&format!("  ghost {:>5.1}% ({lead:+.1})", position * 100.0));
    }
    if *resting {
        line.push_str("  resting");
    }
    println!("{line}");
    Ok(())
}
