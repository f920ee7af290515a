//! Pace ghost: where the best previous run of a program would be right now.

use uuid::Uuid;

use crate::program::Program;
use crate::session::SessionResult;
use crate::store::{BestSessionSource, ProgramSource};

/// Projects a program's personal record onto the live run's progress.
pub struct PaceGhost<S> {
    store: S,
}

impl<S: ProgramSource + BestSessionSource> PaceGhost<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// True when a best session exists for `program_id`.
    pub fn has_ghost(&self, program_id: Uuid) -> bool {
        self.best_session(program_id).is_some()
    }

    /// Ghost position in `[0, 1]` for a run currently at `current_progress`.
    /// `None` when there is nothing to compare against.
    pub fn ghost_position(&self, program_id: Uuid, current_progress: f64) -> Option<f64> {
        let best = self.best_session(program_id)?;
        let program = match self.store.fetch_program(program_id) {
            Ok(Some(p)) => p,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(%program_id, error = %e, "ghost program lookup failed");
                return None;
            }
        };
        project(&best, &program, current_progress)
    }

    fn best_session(&self, program_id: Uuid) -> Option<SessionResult> {
        match self.store.fetch_best_session(program_id) {
            Ok(best) => best,
            Err(e) => {
                tracing::warn!(%program_id, error = %e, "ghost best session lookup failed");
                None
            }
        }
    }
}

/// Position of `best` when the live run of `program` is at `current_progress`.
pub fn project(best: &SessionResult, program: &Program, current_progress: f64) -> Option<f64> {
    let total = program.total_duration_secs();
    if total <= 0.0 || !current_progress.is_finite() {
        return None;
    }
    let ghost_ratio = best.total_time_secs / total;
    if !ghost_ratio.is_finite() || ghost_ratio <= 0.0 {
        return None;
    }

    let baseline = best.progress();
    if baseline >= 1.0 && current_progress < 1.0 {
        return Some(1.0);
    }
    // Faster and slower ghosts reduce to the same product.
    let position = baseline * (current_progress / ghost_ratio);
    Some(position.clamp(0.0, 1.0))
}
