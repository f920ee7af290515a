pub mod achievements;
pub mod config;
pub mod goals;
pub mod history;
pub mod program;
pub mod run;
pub mod schedule;

use regatta_core::{Database, Program, ProgramSource};
use uuid::Uuid;

/// Look a program up by full id or by a unique id prefix.
pub fn find_program(db: &Database, key: &str) -> Result<Program, Box<dyn std::error::Error>> {
    if let Ok(id) = Uuid::parse_str(key) {
        return db
            .fetch_program(id)?
            .ok_or_else(|| format!("no program with id {key}").into());
    }

    by_id_prefix(db.list_programs()?, key, |p| p.id, "program")
}

/// Pick the single item whose id starts with `key`.
pub fn by_id_prefix<T>(
    items: Vec<T>,
    key: &str,
    id_of: impl Fn(&T) -> Uuid,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    let mut matches: Vec<T> = items
        .into_iter()
        .filter(|item| id_of(item).to_string().starts_with(key))
        .collect();
    match matches.len() {
        0 => Err(format!("no {what} matches '{key}'").into()),
        1 => Ok(matches.remove(0)),
        n => Err(format!("'{key}' matches {n} {what}s; use more of the id").into()),
    }
}

/// A program id for history lookups. Deleted programs still have history,
/// so a full id is accepted even when no program exists for it.
pub fn resolve_program_id(db: &Database, key: &str) -> Result<Uuid, Box<dyn std::error::Error>> {
    match Uuid::parse_str(key) {
        Ok(id) => Ok(id),
        Err(_) => Ok(find_program(db, key)?.id),
    }
}
