use chrono::Utc;
use regatta_core::{achievements, Database};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let sessions = db.all_sessions()?;
    let programs = db.list_programs()?;
    let all = achievements::evaluate(&sessions, &programs, Utc::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    let unlocked = all.iter().filter(|a| a.is_unlocked()).count();
    println!("{unlocked}/{} unlocked", all.len());
    for a in &all {
        println!(
            "[{}] {:<16} {:>4.0}%  {}",
            if a.is_unlocked() { "x" } else { " " },
            a.kind.display_name(),
            a.progress * 100.0,
            a.kind.description()
        );
    }
    Ok(())
}
