//! Audio cue sink.
//!
//! The engine calls these hooks at countdown, interval end, start and finish.
//! What actually plays is up to the implementation.

use std::io::Write;

use crate::program::IntervalType;

pub trait AudioSink: Send + Sync {
    /// `seconds_remaining` is 3, 2 or 1.
    fn play_countdown(&self, seconds_remaining: u8);
    fn play_interval_end(&self, interval_type: IntervalType);
    fn play_start(&self);
    fn play_finish(&self);
}

/// Discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_countdown(&self, _seconds_remaining: u8) {}
    fn play_interval_end(&self, _interval_type: IntervalType) {}
    fn play_start(&self) {}
    fn play_finish(&self) {}
}

/// Rings the terminal bell on stderr.
///
/// With `bell` off it only logs the cue, which keeps stdout and stderr clean
/// when output is piped.
#[derive(Debug, Clone, Copy)]
pub struct TerminalBell {
    bell: bool,
}

impl TerminalBell {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }

    fn ring(&self, times: usize, cue: &str) {
        tracing::debug!(cue, "audio cue");
        if !self.bell {
            return;
        }
        let mut err = std::io::stderr().lock();
        for _ in 0..times {
            let _ = err.write_all(b"\x07");
        }
        let _ = err.flush();
    }
}

impl AudioSink for TerminalBell {
    fn play_countdown(&self, seconds_remaining: u8) {
        self.ring(1, &format!("countdown {seconds_remaining}"));
    }

    fn play_interval_end(&self, interval_type: IntervalType) {
        // Work ends get a double ring so they stand out from rest ends.
        let times = if interval_type == IntervalType::Work { 2 } else { 1 };
        self.ring(times, &format!("{} end", interval_type.as_str()));
    }

    fn play_start(&self) {
        self.ring(1, "start");
    }

    fn play_finish(&self) {
        self.ring(3, "finish");
    }
}
