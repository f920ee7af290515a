use std::collections::HashMap;

use uuid::Uuid;

use crate::session::SessionResult;

/// Group sessions by the program they ran.
pub fn sessions_by_program(sessions: &[SessionResult]) -> HashMap<Uuid, Vec<SessionResult>> {
    let mut grouped: HashMap<Uuid, Vec<SessionResult>> = HashMap::new();
    for session in sessions {
        grouped.entry(session.program_id).or_default().push(session.clone());
    }
    grouped
}

/// Fastest session per program. Ties go to the earlier session.
pub fn personal_records(sessions: &[SessionResult]) -> HashMap<Uuid, SessionResult> {
    let mut records: HashMap<Uuid, SessionResult> = HashMap::new();
    for session in sessions {
        let faster = records.get(&session.program_id).map_or(true, |best| {
            session.total_time_secs < best.total_time_secs
                || (session.total_time_secs == best.total_time_secs && session.date < best.date)
        });
        if faster {
            records.insert(session.program_id, session.clone());
        }
    }
    records
}
