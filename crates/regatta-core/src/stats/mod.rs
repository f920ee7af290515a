//! Statistics module for Regatta
//!
//! Read-only views over session history: personal records per program and
//! weekly/monthly summaries.

mod period;
mod records;

pub use period::{format_span, PeriodStats};
pub use records::{personal_records, sessions_by_program};
