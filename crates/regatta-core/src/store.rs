//! Persistence seams consumed by the ghost comparator and session recorder.
//!
//! [`crate::Database`] implements all three; tests substitute fakes.

use uuid::Uuid;

use crate::error::Result;
use crate::program::Program;
use crate::session::SessionResult;

pub trait ProgramSource {
    fn fetch_program(&self, id: Uuid) -> Result<Option<Program>>;
}

pub trait BestSessionSource {
    /// The minimum-`total_time` session recorded for `program_id`.
    fn fetch_best_session(&self, program_id: Uuid) -> Result<Option<SessionResult>>;
}

pub trait SessionSink {
    fn save_session(&self, session: &SessionResult) -> Result<()>;
}

impl<T: ProgramSource + ?Sized> ProgramSource for &T {
    fn fetch_program(&self, id: Uuid) -> Result<Option<Program>> {
        (**self).fetch_program(id)
    }
}

impl<T: BestSessionSource + ?Sized> BestSessionSource for &T {
    fn fetch_best_session(&self, program_id: Uuid) -> Result<Option<SessionResult>> {
        (**self).fetch_best_session(program_id)
    }
}

impl<T: SessionSink + ?Sized> SessionSink for &T {
    fn save_session(&self, session: &SessionResult) -> Result<()> {
        (**self).save_session(session)
    }
}
