//! SQLite-based program and session storage.
//!
//! Provides persistent storage for:
//! - Workout programs and their intervals
//! - Finished sessions, from which personal records are derived
//! - Goals and scheduled workouts

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::goals::{Goal, GoalType};
use crate::program::{Interval, IntervalType, Program};
use crate::schedule::ScheduledWorkout;
use crate::session::SessionResult;
use crate::store::{BestSessionSource, ProgramSource, SessionSink};

use super::data_dir;

const SESSION_COLUMNS: &str =
    "id, program_id, program_name, date, total_time_secs, intervals_completed, total_intervals";

/// SQLite database for programs and session history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/regatta.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("regatta.db"))
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS programs (
                id                      TEXT PRIMARY KEY,
                name                    TEXT NOT NULL,
                rest_between_intervals  REAL NOT NULL DEFAULT 0,
                is_tabata_mode          INTEGER NOT NULL DEFAULT 0,
                created_at              TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS intervals (
                id             TEXT PRIMARY KEY,
                program_id     TEXT NOT NULL,
                position       INTEGER NOT NULL,
                sort_order     INTEGER NOT NULL,
                name           TEXT NOT NULL,
                duration_secs  REAL NOT NULL,
                interval_type  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id                   TEXT PRIMARY KEY,
                program_id           TEXT NOT NULL,
                program_name         TEXT NOT NULL,
                date                 TEXT NOT NULL,
                total_time_secs      REAL NOT NULL,
                intervals_completed  INTEGER NOT NULL,
                total_intervals      INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS goals (
                id          TEXT PRIMARY KEY,
                kind        TEXT NOT NULL,
                target      REAL NOT NULL,
                current     REAL NOT NULL DEFAULT 0,
                start_date  TEXT NOT NULL,
                end_date    TEXT NOT NULL,
                program_id  TEXT
            );

            CREATE TABLE IF NOT EXISTS scheduled_workouts (
                id                TEXT PRIMARY KEY,
                program_id        TEXT NOT NULL,
                program_name      TEXT NOT NULL,
                scheduled_at      TEXT NOT NULL,
                is_completed      INTEGER NOT NULL DEFAULT 0,
                reminder_enabled  INTEGER NOT NULL DEFAULT 1,
                reminder_minutes  INTEGER NOT NULL DEFAULT 30
            );

            CREATE INDEX IF NOT EXISTS idx_intervals_program ON intervals(program_id, position);
            CREATE INDEX IF NOT EXISTS idx_sessions_program_time ON sessions(program_id, total_time_secs);
            CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date);
            CREATE INDEX IF NOT EXISTS idx_scheduled_at ON scheduled_workouts(scheduled_at);",
        )?;
        Ok(())
    }

    // ── Programs ─────────────────────────────────────────────────────

    /// Insert or replace `program`. Its stored intervals are replaced wholesale.
    ///
    /// # Errors
    /// Returns an error if the program is not runnable or a write fails.
    pub fn save_program(&self, program: &Program) -> Result<()> {
        program.validate()?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO programs (id, name, rest_between_intervals, is_tabata_mode, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                rest_between_intervals = excluded.rest_between_intervals,
                is_tabata_mode = excluded.is_tabata_mode",
            params![
                program.id.to_string(),
                program.name,
                program.rest_between_intervals,
                program.is_tabata_mode,
                Utc::now().to_rfc3339(),
            ],
        )?;
        tx.execute(
            "DELETE FROM intervals WHERE program_id = ?1",
            params![program.id.to_string()],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO intervals
                    (id, program_id, position, sort_order, name, duration_secs, interval_type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, interval) in program.intervals.iter().enumerate() {
                stmt.execute(params![
                    interval.id.to_string(),
                    program.id.to_string(),
                    position as i64,
                    interval.order,
                    interval.name,
                    interval.duration_secs,
                    interval.interval_type.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(program = %program.name, intervals = program.intervals.len(), "program saved");
        Ok(())
    }

    /// All programs, oldest first.
    pub fn list_programs(&self) -> Result<Vec<Program>> {
        let headers = {
            let mut stmt = self.conn.prepare(
                "SELECT id, name, rest_between_intervals, is_tabata_mode
                 FROM programs
                 ORDER BY created_at ASC, name ASC",
            )?;
            let rows = stmt.query_map([], ProgramRow::from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };
        headers.into_iter().map(|h| self.hydrate(h)).collect()
    }

    /// Delete a program and its intervals. Sessions are kept.
    /// Returns false if no such program existed.
    pub fn delete_program(&self, id: Uuid) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM intervals WHERE program_id = ?1",
            params![id.to_string()],
        )?;
        let removed = tx.execute("DELETE FROM programs WHERE id = ?1", params![id.to_string()])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn hydrate(&self, header: ProgramRow) -> Result<Program> {
        let id = parse_uuid(&header.id)?;
        let mut stmt = self.conn.prepare(
            "SELECT id, sort_order, name, duration_secs, interval_type
             FROM intervals
             WHERE program_id = ?1
             ORDER BY position ASC",
        )?;
        let rows = stmt.query_map(params![header.id], IntervalRow::from_row)?;
        let intervals = rows
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(IntervalRow::into_interval)
            .collect::<Result<Vec<_>>>()?;

        Ok(Program {
            id,
            name: header.name,
            intervals,
            rest_between_intervals: header.rest_between_intervals,
            is_tabata_mode: header.is_tabata_mode,
        })
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Most recent sessions first, at most `limit`.
    pub fn list_sessions(&self, limit: usize) -> Result<Vec<SessionResult>> {
        self.query_sessions(
            &format!("SELECT {SESSION_COLUMNS} FROM sessions ORDER BY date DESC LIMIT ?1"),
            params![limit as i64],
        )
    }

    /// Sessions for one program, most recent first.
    pub fn sessions_for_program(&self, program_id: Uuid) -> Result<Vec<SessionResult>> {
        self.query_sessions(
            &format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE program_id = ?1 ORDER BY date DESC"
            ),
            params![program_id.to_string()],
        )
    }

    /// Every session, most recent first.
    pub fn all_sessions(&self) -> Result<Vec<SessionResult>> {
        self.query_sessions(
            &format!("SELECT {SESSION_COLUMNS} FROM sessions ORDER BY date DESC"),
            params![],
        )
    }

    fn query_sessions(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<SessionResult>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, SessionRow::from_row)?;
        rows.collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(SessionRow::into_session)
            .collect()
    }

    // ── Goals ────────────────────────────────────────────────────────

    /// Insert or replace `goal`.
    ///
    /// # Errors
    /// Returns an error if the goal is invalid or the write fails.
    pub fn save_goal(&self, goal: &Goal) -> Result<()> {
        goal.validate()?;
        self.conn.execute(
            "INSERT INTO goals (id, kind, target, current, start_date, end_date, program_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind,
                target = excluded.target,
                current = excluded.current,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                program_id = excluded.program_id",
            params![
                goal.id.to_string(),
                goal.kind.as_str(),
                goal.target,
                goal.current,
                goal.start.to_rfc3339(),
                goal.end.to_rfc3339(),
                goal.program_id.map(|id| id.to_string()),
            ],
        )?;
        Ok(())
    }

    /// All goals, soonest deadline first.
    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, target, current, start_date, end_date, program_id
             FROM goals
             ORDER BY end_date ASC",
        )?;
        let rows = stmt.query_map([], GoalRow::from_row)?;
        rows.collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(GoalRow::into_goal)
            .collect()
    }

    /// Returns false if no such goal existed.
    pub fn delete_goal(&self, id: Uuid) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1", params![id.to_string()])?;
        Ok(removed > 0)
    }

    // ── Schedule ─────────────────────────────────────────────────────

    /// Insert or replace a scheduled workout.
    pub fn save_scheduled_workout(&self, workout: &ScheduledWorkout) -> Result<()> {
        self.conn.execute(
            "INSERT INTO scheduled_workouts
                (id, program_id, program_name, scheduled_at, is_completed, reminder_enabled, reminder_minutes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                program_id = excluded.program_id,
                program_name = excluded.program_name,
                scheduled_at = excluded.scheduled_at,
                is_completed = excluded.is_completed,
                reminder_enabled = excluded.reminder_enabled,
                reminder_minutes = excluded.reminder_minutes",
            params![
                workout.id.to_string(),
                workout.program_id.to_string(),
                workout.program_name,
                workout.scheduled_at.to_rfc3339(),
                workout.is_completed,
                workout.reminder_enabled,
                workout.reminder_minutes,
            ],
        )?;
        Ok(())
    }

    /// Every scheduled workout, earliest first.
    pub fn list_scheduled_workouts(&self) -> Result<Vec<ScheduledWorkout>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, program_id, program_name, scheduled_at, is_completed,
                    reminder_enabled, reminder_minutes
             FROM scheduled_workouts
             ORDER BY scheduled_at ASC",
        )?;
        let rows = stmt.query_map([], ScheduledRow::from_row)?;
        rows.collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(ScheduledRow::into_workout)
            .collect()
    }

    /// Returns false if no such entry existed.
    pub fn mark_scheduled_completed(&self, id: Uuid) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE scheduled_workouts SET is_completed = 1 WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(updated > 0)
    }

    /// Returns false if no such entry existed.
    pub fn delete_scheduled_workout(&self, id: Uuid) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM scheduled_workouts WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(removed > 0)
    }
}

impl ProgramSource for Database {
    fn fetch_program(&self, id: Uuid) -> Result<Option<Program>> {
        let header = self
            .conn
            .query_row(
                "SELECT id, name, rest_between_intervals, is_tabata_mode
                 FROM programs WHERE id = ?1",
                params![id.to_string()],
                ProgramRow::from_row,
            )
            .optional()?;
        header.map(|h| self.hydrate(h)).transpose()
    }
}

impl BestSessionSource for Database {
    fn fetch_best_session(&self, program_id: Uuid) -> Result<Option<SessionResult>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {SESSION_COLUMNS} FROM sessions
                     WHERE program_id = ?1
                     ORDER BY total_time_secs ASC, date ASC
                     LIMIT 1"
                ),
                params![program_id.to_string()],
                SessionRow::from_row,
            )
            .optional()?;
        row.map(SessionRow::into_session).transpose()
    }
}

impl SessionSink for Database {
    fn save_session(&self, session: &SessionResult) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions
                (id, program_id, program_name, date, total_time_secs, intervals_completed, total_intervals)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session.id.to_string(),
                session.program_id.to_string(),
                session.program_name,
                session.date.to_rfc3339(),
                session.total_time_secs,
                session.intervals_completed as i64,
                session.total_intervals as i64,
            ],
        )?;
        Ok(())
    }
}

// ── Row decoding ─────────────────────────────────────────────────────

struct ProgramRow {
    id: String,
    name: String,
    rest_between_intervals: f64,
    is_tabata_mode: bool,
}

impl ProgramRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            rest_between_intervals: row.get(2)?,
            is_tabata_mode: row.get(3)?,
        })
    }
}

struct IntervalRow {
    id: String,
    order: u32,
    name: String,
    duration_secs: f64,
    interval_type: String,
}

impl IntervalRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            order: row.get(1)?,
            name: row.get(2)?,
            duration_secs: row.get(3)?,
            interval_type: row.get(4)?,
        })
    }

    fn into_interval(self) -> Result<Interval> {
        let interval_type: IntervalType = self
            .interval_type
            .parse()
            .map_err(DatabaseError::Corrupt)?;
        Ok(Interval {
            id: parse_uuid(&self.id)?,
            order: self.order,
            name: self.name,
            duration_secs: self.duration_secs,
            interval_type,
        })
    }
}

struct SessionRow {
    id: String,
    program_id: String,
    program_name: String,
    date: String,
    total_time_secs: f64,
    intervals_completed: i64,
    total_intervals: i64,
}

impl SessionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            program_id: row.get(1)?,
            program_name: row.get(2)?,
            date: row.get(3)?,
            total_time_secs: row.get(4)?,
            intervals_completed: row.get(5)?,
            total_intervals: row.get(6)?,
        })
    }

    fn into_session(self) -> Result<SessionResult> {
        let date = parse_date(&self.date)?;
        Ok(SessionResult {
            id: parse_uuid(&self.id)?,
            program_id: parse_uuid(&self.program_id)?,
            program_name: self.program_name,
            date,
            total_time_secs: self.total_time_secs,
            intervals_completed: count(self.intervals_completed)?,
            total_intervals: count(self.total_intervals)?,
        })
    }
}

struct GoalRow {
    id: String,
    kind: String,
    target: f64,
    current: f64,
    start: String,
    end: String,
    program_id: Option<String>,
}

impl GoalRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            target: row.get(2)?,
            current: row.get(3)?,
            start: row.get(4)?,
            end: row.get(5)?,
            program_id: row.get(6)?,
        })
    }

    fn into_goal(self) -> Result<Goal> {
        let kind: GoalType = self.kind.parse().map_err(DatabaseError::Corrupt)?;
        Ok(Goal {
            id: parse_uuid(&self.id)?,
            kind,
            target: self.target,
            current: self.current,
            start: parse_date(&self.start)?,
            end: parse_date(&self.end)?,
            program_id: self.program_id.as_deref().map(parse_uuid).transpose()?,
        })
    }
}

struct ScheduledRow {
    id: String,
    program_id: String,
    program_name: String,
    scheduled_at: String,
    is_completed: bool,
    reminder_enabled: bool,
    reminder_minutes: u32,
}

impl ScheduledRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            program_id: row.get(1)?,
            program_name: row.get(2)?,
            scheduled_at: row.get(3)?,
            is_completed: row.get(4)?,
            reminder_enabled: row.get(5)?,
            reminder_minutes: row.get(6)?,
        })
    }

    fn into_workout(self) -> Result<ScheduledWorkout> {
        Ok(ScheduledWorkout {
            id: parse_uuid(&self.id)?,
            program_id: parse_uuid(&self.program_id)?,
            program_name: self.program_name,
            scheduled_at: parse_date(&self.scheduled_at)?,
            is_completed: self.is_completed,
            reminder_enabled: self.reminder_enabled,
            reminder_minutes: self.reminder_minutes,
        })
    }
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Corrupt(format!("date '{raw}': {e}")).into())
}

fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::Corrupt(format!("id '{raw}': {e}")).into())
}

fn count(raw: i64) -> Result<usize> {
    usize::try_from(raw).map_err(|_| DatabaseError::Corrupt(format!("negative count {raw}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::WorkoutMode;
    use chrono::Duration;

    fn session(program: &Program, total: f64, days_ago: i64) -> SessionResult {
        SessionResult {
            id: Uuid::new_v4(),
            program_id: program.id,
            program_name: program.name.clone(),
            date: Utc::now() - Duration::days(days_ago),
            total_time_secs: total,
            intervals_completed: program.intervals.len(),
            total_intervals: program.intervals.len(),
        }
    }

    #[test]
    fn program_round_trip_keeps_interval_order() {
        let db = Database::open_memory().unwrap();
        let program = WorkoutMode::Running.generate_program("Tempo", 0);
        db.save_program(&program).unwrap();

        let loaded = db.fetch_program(program.id).unwrap().unwrap();
        assert_eq!(loaded, program);
        assert!(db.fetch_program(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn save_program_replaces_intervals() {
        let db = Database::open_memory().unwrap();
        let mut program = WorkoutMode::Tabata.generate_program("Tabata", 8);
        db.save_program(&program).unwrap();

        program.name = "Short Tabata".into();
        program.intervals.truncate(2);
        db.save_program(&program).unwrap();

        let programs = db.list_programs().unwrap();
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].name, "Short Tabata");
        assert_eq!(programs[0].intervals.len(), 2);
    }

    #[test]
    fn unrunnable_program_is_rejected() {
        let db = Database::open_memory().unwrap();
        let program = WorkoutMode::Standard.generate_program("Blank", 4);
        assert!(db.save_program(&program).is_err());
        assert!(db.list_programs().unwrap().is_empty());
    }

    #[test]
    fn delete_program_keeps_sessions() {
        let db = Database::open_memory().unwrap();
        let program = WorkoutMode::Hiit.generate_program("HIIT", 2);
        db.save_program(&program).unwrap();
        db.save_session(&session(&program, 90.0, 0)).unwrap();

        assert!(db.delete_program(program.id).unwrap());
        assert!(!db.delete_program(program.id).unwrap());
        assert!(db.fetch_program(program.id).unwrap().is_none());
        assert_eq!(db.sessions_for_program(program.id).unwrap().len(), 1);
    }

    #[test]
    fn best_session_is_the_fastest() {
        let db = Database::open_memory().unwrap();
        let program = WorkoutMode::Hiit.generate_program("HIIT", 2);
        let other = WorkoutMode::Tabata.generate_program("Tabata", 2);
        assert!(db.fetch_best_session(program.id).unwrap().is_none());

        db.save_session(&session(&program, 95.0, 3)).unwrap();
        let fastest = session(&program, 88.5, 2);
        db.save_session(&fastest).unwrap();
        db.save_session(&session(&program, 91.0, 1)).unwrap();
        db.save_session(&session(&other, 10.0, 0)).unwrap();

        let best = db.fetch_best_session(program.id).unwrap().unwrap();
        assert_eq!(best.id, fastest.id);
        assert_eq!(best.total_time_secs, 88.5);
    }

    #[test]
    fn sessions_are_listed_newest_first() {
        let db = Database::open_memory().unwrap();
        let program = WorkoutMode::Hiit.generate_program("HIIT", 1);
        for days_ago in [5, 1, 3] {
            db.save_session(&session(&program, 45.0, days_ago)).unwrap();
        }

        let all = db.all_sessions().unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].date >= w[1].date));
        assert_eq!(db.list_sessions(2).unwrap().len(), 2);
        assert_eq!(db.list_sessions(2).unwrap()[0].id, all[0].id);
    }

    #[test]
    fn corrupt_rows_surface_as_errors() {
        let db = Database::open_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO sessions VALUES ('nope', 'nope', 'x', 'yesterday', 1.0, 1, 1)",
                [],
            )
            .unwrap();
        assert!(db.all_sessions().is_err());
    }

    #[test]
    fn goals_round_trip_and_update() {
        let db = Database::open_memory().unwrap();
        let program = WorkoutMode::Hiit.generate_program("HIIT", 2);
        let now = Utc::now();
        let mut goal = Goal::new(GoalType::ProgramCompletion, 5.0, now, now + Duration::days(14))
            .for_program(program.id);
        db.save_goal(&goal).unwrap();
        let weekly = Goal::new(GoalType::WeeklySessions, 3.0, now, now + Duration::days(7));
        db.save_goal(&weekly).unwrap();

        goal.current = 2.0;
        db.save_goal(&goal).unwrap();

        let goals = db.list_goals().unwrap();
        assert_eq!(goals.len(), 2);
        assert_eq!(goals[0].id, weekly.id);
        assert_eq!(goals[1].current, 2.0);
        assert_eq!(goals[1].program_id, Some(program.id));

        assert!(db.delete_goal(weekly.id).unwrap());
        assert!(!db.delete_goal(weekly.id).unwrap());
        assert_eq!(db.list_goals().unwrap().len(), 1);
    }

    #[test]
    fn invalid_goal_is_rejected() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        let orphan = Goal::new(GoalType::ProgramCompletion, 5.0, now, now + Duration::days(1));
        assert!(db.save_goal(&orphan).is_err());
        assert!(db.list_goals().unwrap().is_empty());
    }

    #[test]
    fn scheduled_workouts_round_trip() {
        let db = Database::open_memory().unwrap();
        let program = WorkoutMode::Tabata.generate_program("Tabata", 8);
        let later = ScheduledWorkout::new(&program, Utc::now() + Duration::days(2));
        let mut sooner = ScheduledWorkout::new(&program, Utc::now() + Duration::hours(3));
        sooner.reminder_minutes = 10;
        db.save_scheduled_workout(&later).unwrap();
        db.save_scheduled_workout(&sooner).unwrap();

        let all = db.list_scheduled_workouts().unwrap();
        assert_eq!(all.iter().map(|w| w.id).collect::<Vec<_>>(), vec![sooner.id, later.id]);
        assert_eq!(all[0].reminder_minutes, 10);
        assert_eq!(all[0].program_name, "Tabata");

        assert!(db.mark_scheduled_completed(sooner.id).unwrap());
        assert!(db.list_scheduled_workouts().unwrap()[0].is_completed);
        assert!(db.delete_scheduled_workout(later.id).unwrap());
        assert!(!db.mark_scheduled_completed(later.id).unwrap());
    }

    #[test]
    fn file_backed_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regatta.db");
        let program = WorkoutMode::Circuit.generate_program("Circuit", 3);
        {
            let db = Database::open_at(&path).unwrap();
            db.save_program(&program).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.fetch_program(program.id).unwrap(), Some(program));
    }
}
