//! Interval timer engine.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically and for firing a pending rest gap once it is due
//! (see [`crate::timer::TimerRunner`] for a tokio driver that does both).
//!
//! ## State Transitions
//!
//! ```text
//! Ready -> Running <-> Paused -> Finished
//! ```
//!
//! Elapsed time is always `now - virtual_start`. Pausing freezes the run;
//! resuming moves `virtual_start` forward by the paused span, so time spent
//! paused never counts.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(Arc::new(SystemClock::new()), Arc::new(NullAudio));
//! engine.start(program)?;
//! // In a loop:
//! engine.tick();
//! engine.poll_rest_gap();
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use crate::audio::AudioSink;
use crate::error::InvalidProgram;
use crate::events::Event;
use crate::program::{Interval, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Ready,
    Running,
    Paused,
    Finished,
}

/// A scheduled rest between two intervals.
///
/// `token` identifies this particular gap; completing a gap with a stale
/// token is ignored, so a late timer cannot resume a run that was stopped
/// or skipped in the meantime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestGap {
    pub token: u64,
    /// Index of the interval that just ended.
    pub after_index: usize,
    pub duration: Duration,
    /// Clock reading at which the next interval should begin.
    pub due_at: Duration,
}

type IntervalChangeHook = Box<dyn FnMut(usize) + Send>;
type FinishHook = Box<dyn FnMut() + Send>;
type EventHook = Box<dyn FnMut(&Event) + Send>;

#[derive(Default)]
struct Hooks {
    interval_change: Vec<IntervalChangeHook>,
    finish: Vec<FinishHook>,
    events: Vec<EventHook>,
}

/// Default number of final seconds announced through [`AudioSink::play_countdown`].
pub const DEFAULT_COUNTDOWN_SECS: u8 = 3;

/// Core timer engine.
///
/// Operates on wall-clock readings from an injected [`Clock`].
/// The caller is responsible for calling `tick()` periodically.
pub struct TimerEngine {
    clock: Arc<dyn Clock>,
    audio: Arc<dyn AudioSink>,
    hooks: Hooks,
    countdown_from: u8,

    program: Option<Program>,
    state: TimerState,
    current_index: usize,
    remaining_secs: f64,
    total_elapsed_secs: f64,
    total_progress: f64,
    /// Clock reading the run's elapsed time is measured from.
    virtual_start: Duration,
    /// Run time at which the current interval began.
    interval_anchor_secs: f64,
    /// Remaining time at the last countdown check.
    countdown_mark: f64,
    pending_rest: Option<RestGap>,
    rest_generation: u64,
}

impl TimerEngine {
    pub fn new(clock: Arc<dyn Clock>, audio: Arc<dyn AudioSink>) -> Self {
        Self {
            clock,
            audio,
            hooks: Hooks::default(),
            countdown_from: DEFAULT_COUNTDOWN_SECS,
            program: None,
            state: TimerState::Ready,
            current_index: 0,
            remaining_secs: 0.0,
            total_elapsed_secs: 0.0,
            total_progress: 0.0,
            virtual_start: Duration::ZERO,
            interval_anchor_secs: 0.0,
            countdown_mark: 0.0,
            pending_rest: None,
            rest_generation: 0,
        }
    }

    /// Announce the final `secs` seconds of each interval (at most 3).
    pub fn with_countdown(mut self, secs: u8) -> Self {
        self.countdown_from = secs.min(DEFAULT_COUNTDOWN_SECS);
        self
    }

    // ── Hooks ────────────────────────────────────────────────────────

    /// Called with the new index whenever a run enters an interval,
    /// including index 0 at start.
    pub fn on_interval_change(&mut self, hook: impl FnMut(usize) + Send + 'static) {
        self.hooks.interval_change.push(Box::new(hook));
    }

    /// Called once per run when it finishes, naturally or via `stop()`.
    pub fn on_finish(&mut self, hook: impl FnMut() + Send + 'static) {
        self.hooks.finish.push(Box::new(hook));
    }

    /// Called for every [`Event`] the engine produces.
    pub fn on_event(&mut self, hook: impl FnMut(&Event) + Send + 'static) {
        self.hooks.events.push(Box::new(hook));
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn current_interval_index(&self) -> usize {
        self.current_index
    }

    pub fn time_remaining_in_interval(&self) -> f64 {
        self.remaining_secs
    }

    pub fn total_elapsed_secs(&self) -> f64 {
        self.total_elapsed_secs
    }

    /// 0.0 .. 1.0 progress across the program's nominal duration.
    pub fn total_progress(&self) -> f64 {
        self.total_progress
    }

    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    pub fn current_interval(&self) -> Option<&Interval> {
        self.program.as_ref()?.intervals.get(self.current_index)
    }

    /// Intervals fully traversed. Every interval counts once the run is finished.
    pub fn completed_intervals(&self) -> usize {
        match &self.program {
            None => 0,
            Some(p) if self.state == TimerState::Finished => p.intervals.len(),
            Some(_) => self.current_index,
        }
    }

    /// True while paused for a rest gap rather than by the user.
    pub fn is_resting(&self) -> bool {
        self.pending_rest.is_some()
    }

    pub fn pending_rest(&self) -> Option<RestGap> {
        self.pending_rest
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let interval = self.current_interval();
        Event::StateSnapshot {
            state: self.state,
            interval_index: self.current_index,
            interval_type: interval.map(|i| i.interval_type),
            interval_name: interval.map(|i| i.name.clone()).unwrap_or_default(),
            remaining_secs: self.remaining_secs,
            total_elapsed_secs: self.total_elapsed_secs,
            total_progress: self.total_progress,
            resting: self.is_resting(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fresh run of `program`.
    ///
    /// Accepted from any state; an in-flight run is abandoned without a
    /// finish event.
    ///
    /// # Errors
    /// Returns [`InvalidProgram`] and leaves the engine untouched if the
    /// program has no intervals or any interval has a non-positive duration.
    pub fn start(&mut self, program: Program) -> Result<(), InvalidProgram> {
        program.validate()?;

        let first_duration = program.intervals[0].duration_secs;
        self.pending_rest = None;
        self.state = TimerState::Running;
        self.current_index = 0;
        self.remaining_secs = first_duration;
        self.countdown_mark = first_duration;
        self.total_elapsed_secs = 0.0;
        self.total_progress = 0.0;
        self.interval_anchor_secs = 0.0;
        self.virtual_start = self.clock.now();

        tracing::info!(
            program = %program.name,
            intervals = program.intervals.len(),
            total_secs = program.total_duration_secs(),
            "run started"
        );
        let started = Event::RunStarted {
            program_id: program.id,
            program_name: program.name.clone(),
            interval_count: program.intervals.len(),
            total_duration_secs: program.total_duration_secs(),
            at: Utc::now(),
        };
        self.program = Some(program);

        self.audio.play_start();
        self.emit(started);
        self.notify_interval_change();
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state != TimerState::Running {
            return;
        }
        self.refresh();
        self.state = TimerState::Paused;
        tracing::debug!(remaining = self.remaining_secs, "paused");
        self.emit(Event::Paused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        });
    }

    /// Resume a user pause. A rest gap resumes on its own and ignores this.
    pub fn resume(&mut self) {
        if self.state != TimerState::Paused || self.pending_rest.is_some() {
            return;
        }
        self.reanchor();
        self.state = TimerState::Running;
        tracing::debug!(remaining = self.remaining_secs, "resumed");
        self.emit(Event::Resumed {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        });
    }

    /// Finish the run now, whatever interval it is in.
    pub fn stop(&mut self) {
        match self.state {
            TimerState::Running => self.refresh(),
            TimerState::Paused => {}
            TimerState::Ready | TimerState::Finished => return,
        }
        if self.pending_rest.take().is_some() {
            tracing::debug!("pending rest gap cancelled by stop");
        }
        self.finish();
    }

    /// Jump to the start of the next interval, bypassing any rest gap.
    /// On the last interval this is `stop()`.
    pub fn skip_to_next_interval(&mut self) {
        let len = match (&self.program, self.state) {
            (Some(p), TimerState::Running | TimerState::Paused) => p.intervals.len(),
            _ => return,
        };
        if self.current_index + 1 >= len {
            self.stop();
            return;
        }

        if self.state == TimerState::Running {
            self.refresh();
        }
        if self.pending_rest.take().is_some() {
            self.reanchor();
            self.state = TimerState::Running;
        }

        let from = self.current_index;
        let anchor = self.total_elapsed_secs;
        self.advance_to(from + 1, anchor);
        self.emit(Event::Skipped {
            from_index: from,
            to_index: self.current_index,
            at: Utc::now(),
        });
    }

    /// Call periodically while running. Updates elapsed, remaining and
    /// progress, fires countdown cues, and moves through finished intervals.
    pub fn tick(&mut self) {
        if self.state != TimerState::Running {
            return;
        }
        self.refresh();
        self.announce_countdown();

        // A stalled tick source can skip past several boundaries at once.
        while self.state == TimerState::Running && self.remaining_secs <= 0.0 {
            self.complete_interval();
            if self.state == TimerState::Running {
                self.refresh();
                self.announce_countdown();
            }
        }
    }

    /// End the rest gap identified by `token` and enter the next interval.
    ///
    /// Returns false if that gap is no longer pending.
    pub fn complete_rest_gap(&mut self, token: u64) -> bool {
        let gap = match self.pending_rest {
            Some(gap) if gap.token == token && self.state == TimerState::Paused => gap,
            _ => return false,
        };
        self.pending_rest = None;
        self.reanchor();
        self.state = TimerState::Running;

        let anchor = self.interval_anchor_secs + self.duration_of(gap.after_index);
        self.advance_to(gap.after_index + 1, anchor);
        true
    }

    /// Complete the pending rest gap if the clock says it is due.
    pub fn poll_rest_gap(&mut self) -> bool {
        match self.pending_rest {
            Some(gap) if self.clock.now() >= gap.due_at => self.complete_rest_gap(gap.token),
            _ => false,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn duration_of(&self, index: usize) -> f64 {
        self.program
            .as_ref()
            .and_then(|p| p.intervals.get(index))
            .map(|i| i.duration_secs)
            .unwrap_or(0.0)
    }

    fn elapsed_now(&self) -> f64 {
        self.clock.now().saturating_sub(self.virtual_start).as_secs_f64()
    }

    /// Move `virtual_start` so that `now - virtual_start` equals the elapsed
    /// time already banked.
    fn reanchor(&mut self) {
        let banked = Duration::try_from_secs_f64(self.total_elapsed_secs).unwrap_or(Duration::ZERO);
        self.virtual_start = self.clock.now().saturating_sub(banked);
    }

    fn refresh(&mut self) {
        self.total_elapsed_secs = self.elapsed_now();
        let duration = self.duration_of(self.current_index);
        let in_interval = self.total_elapsed_secs - self.interval_anchor_secs;
        self.remaining_secs = (duration - in_interval).clamp(0.0, duration);
        self.update_progress();
    }

    fn update_progress(&mut self) {
        let Some(program) = &self.program else {
            self.total_progress = 0.0;
            return;
        };
        let total = program.total_duration_secs();
        if total <= 0.0 {
            self.total_progress = 0.0;
            return;
        }
        let done = program.cumulative_secs(self.current_index)
            + (self.duration_of(self.current_index) - self.remaining_secs);
        self.total_progress = (done / total).clamp(0.0, 1.0);
    }

    fn announce_countdown(&mut self) {
        let before = self.countdown_mark;
        let now = self.remaining_secs;
        for n in (1..=self.countdown_from).rev() {
            let boundary = f64::from(n);
            // Half-open so an interval exactly `n` seconds long still announces `n`.
            if before >= boundary && now < boundary {
                self.audio.play_countdown(n);
                self.emit(Event::Countdown {
                    index: self.current_index,
                    seconds_remaining: n,
                    at: Utc::now(),
                });
            }
        }
        self.countdown_mark = now;
    }

    fn complete_interval(&mut self) {
        let Some(program) = &self.program else {
            return;
        };
        let index = self.current_index;
        let interval_type = program.intervals[index].interval_type;
        let is_last = index + 1 >= program.intervals.len();
        let rest_secs = program.rest_between_intervals;

        self.audio.play_interval_end(interval_type);
        self.emit(Event::IntervalCompleted {
            index,
            interval_type,
            at: Utc::now(),
        });

        if is_last {
            self.finish();
        } else if rest_secs > 0.0 {
            // A late tick overshoots the boundary; the overshoot is not run time.
            self.total_elapsed_secs = self.interval_anchor_secs + self.duration_of(index);
            self.remaining_secs = 0.0;
            self.update_progress();
            let duration = Duration::try_from_secs_f64(rest_secs).unwrap_or(Duration::ZERO);
            self.rest_generation += 1;
            self.pending_rest = Some(RestGap {
                token: self.rest_generation,
                after_index: index,
                duration,
                due_at: self.clock.now() + duration,
            });
            self.state = TimerState::Paused;
            tracing::debug!(after = index, rest_secs, "rest gap started");
            self.emit(Event::RestStarted {
                after_index: index,
                rest_secs,
                at: Utc::now(),
            });
        } else {
            let anchor = self.interval_anchor_secs + self.duration_of(index);
            self.advance_to(index + 1, anchor);
        }
    }

    fn advance_to(&mut self, index: usize, anchor_secs: f64) {
        self.current_index = index;
        self.interval_anchor_secs = anchor_secs;
        self.remaining_secs = self.duration_of(index);
        self.countdown_mark = self.remaining_secs;
        self.update_progress();
        self.notify_interval_change();
    }

    fn finish(&mut self) {
        self.state = TimerState::Finished;
        let total_intervals = self.program.as_ref().map(|p| p.intervals.len()).unwrap_or(0);
        tracing::info!(
            elapsed = self.total_elapsed_secs,
            completed = self.completed_intervals(),
            total_intervals,
            "run finished"
        );
        self.audio.play_finish();
        for hook in &mut self.hooks.finish {
            hook();
        }
        let event = Event::Finished {
            completed_intervals: self.completed_intervals(),
            total_intervals,
            total_elapsed_secs: self.total_elapsed_secs,
            at: Utc::now(),
        };
        self.emit(event);
    }

    fn notify_interval_change(&mut self) {
        let index = self.current_index;
        for hook in &mut self.hooks.interval_change {
            hook(index);
        }
        let event = self.current_interval().map(|interval| Event::IntervalChanged {
            index,
            interval_type: interval.interval_type,
            name: interval.name.clone(),
            duration_secs: interval.duration_secs,
            at: Utc::now(),
        });
        if let Some(event) = event {
            self.emit(event);
        }
    }

    fn emit(&mut self, event: Event) {
        for hook in &mut self.hooks.events {
            hook(&event);
        }
    }
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("program", &self.program.as_ref().map(|p| &p.name))
            .field("state", &self.state)
            .field("current_index", &self.current_index)
            .field("remaining_secs", &self.remaining_secs)
            .field("total_elapsed_secs", &self.total_elapsed_secs)
            .field("total_progress", &self.total_progress)
            .field("pending_rest", &self.pending_rest)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{IntervalType, Program};
    use crate::timer::clock::ManualClock;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingAudio {
        cues: Mutex<Vec<String>>,
    }

    impl RecordingAudio {
        fn cues(&self) -> Vec<String> {
            self.cues.lock().unwrap().clone()
        }
    }

    impl AudioSink for RecordingAudio {
        fn play_countdown(&self, n: u8) {
            self.cues.lock().unwrap().push(format!("countdown:{n}"));
        }
        fn play_interval_end(&self, t: IntervalType) {
            self.cues.lock().unwrap().push(format!("end:{}", t.as_str()));
        }
        fn play_start(&self) {
            self.cues.lock().unwrap().push("start".into());
        }
        fn play_finish(&self) {
            self.cues.lock().unwrap().push("finish".into());
        }
    }

    struct Rig {
        clock: Arc<ManualClock>,
        audio: Arc<RecordingAudio>,
        engine: TimerEngine,
        changes: Arc<Mutex<Vec<usize>>>,
        finishes: Arc<Mutex<usize>>,
    }

    impl Rig {
        fn new() -> Self {
            let clock = Arc::new(ManualClock::new());
            clock.set(Duration::from_secs(1_000));
            let audio = Arc::new(RecordingAudio::default());
            let mut engine = TimerEngine::new(clock.clone(), audio.clone());
            let changes = Arc::new(Mutex::new(Vec::new()));
            let finishes = Arc::new(Mutex::new(0));
            let c = changes.clone();
            engine.on_interval_change(move |i| c.lock().unwrap().push(i));
            let f = finishes.clone();
            engine.on_finish(move || *f.lock().unwrap() += 1);
            Self {
                clock,
                audio,
                engine,
                changes,
                finishes,
            }
        }

        /// Advance the clock in 100ms steps, ticking after each.
        fn run_for(&mut self, secs: f64) {
            let steps = (secs * 10.0).round() as u64;
            for _ in 0..steps {
                self.clock.advance(Duration::from_millis(100));
                self.engine.tick();
            }
        }

        fn finishes(&self) -> usize {
            *self.finishes.lock().unwrap()
        }
    }

    fn work_rest(rest_gap: f64) -> Program {
        Program::new(
            "Intervals",
            vec![
                crate::program::Interval::new(0, "Work", 10.0, IntervalType::Work),
                crate::program::Interval::new(1, "Rest", 5.0, IntervalType::Rest),
            ],
        )
        .with_rest_between_intervals(rest_gap)
    }

    fn two_tens(rest_gap: f64) -> Program {
        Program::new(
            "Tens",
            vec![
                crate::program::Interval::new(0, "A", 10.0, IntervalType::Work),
                crate::program::Interval::new(1, "B", 10.0, IntervalType::Work),
            ],
        )
        .with_rest_between_intervals(rest_gap)
    }

    #[test]
    fn start_initializes_run_state() {
        let mut rig = Rig::new();
        rig.engine.start(work_rest(0.0)).unwrap();
        assert_eq!(rig.engine.state(), TimerState::Running);
        assert_eq!(rig.engine.current_interval_index(), 0);
        assert_eq!(rig.engine.time_remaining_in_interval(), 10.0);
        assert_eq!(rig.engine.total_progress(), 0.0);
        assert_eq!(*rig.changes.lock().unwrap(), vec![0]);
        assert_eq!(rig.audio.cues(), vec!["start"]);
    }

    #[test]
    fn start_rejects_unrunnable_programs_without_touching_state() {
        let mut rig = Rig::new();
        let err = rig.engine.start(Program::new("Empty", vec![])).unwrap_err();
        assert_eq!(err, InvalidProgram::NoIntervals);
        assert_eq!(rig.engine.state(), TimerState::Ready);

        let mut bad = work_rest(0.0);
        bad.intervals[0].duration_secs = -3.0;
        assert!(rig.engine.start(bad).is_err());
        assert_eq!(rig.engine.state(), TimerState::Ready);
        assert!(rig.engine.program().is_none());
        assert!(rig.changes.lock().unwrap().is_empty());
    }

    #[test]
    fn advances_without_rest_gap_and_finishes() {
        let mut rig = Rig::new();
        rig.engine.start(work_rest(0.0)).unwrap();

        rig.run_for(10.0);
        assert_eq!(rig.engine.current_interval_index(), 1);
        assert!((rig.engine.time_remaining_in_interval() - 5.0).abs() < 1e-9);
        assert_eq!(rig.engine.completed_intervals(), 1);

        rig.run_for(5.0);
        assert_eq!(rig.engine.state(), TimerState::Finished);
        assert_eq!(rig.engine.completed_intervals(), 2);
        assert_eq!(rig.engine.total_progress(), 1.0);
        assert_eq!(rig.finishes(), 1);
        assert_eq!(*rig.changes.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn rest_gap_pauses_then_enters_next_interval() {
        let mut rig = Rig::new();
        rig.engine.start(two_tens(20.0)).unwrap();

        rig.run_for(10.0);
        assert_eq!(rig.engine.state(), TimerState::Paused);
        assert!(rig.engine.is_resting());
        assert_eq!(rig.engine.current_interval_index(), 0);

        rig.clock.advance(Duration::from_secs(19));
        assert!(!rig.engine.poll_rest_gap());
        assert_eq!(rig.engine.state(), TimerState::Paused);

        rig.clock.advance(Duration::from_secs(1));
        assert!(rig.engine.poll_rest_gap());
        assert_eq!(rig.engine.state(), TimerState::Running);
        assert_eq!(rig.engine.current_interval_index(), 1);
        assert_eq!(rig.engine.time_remaining_in_interval(), 10.0);
        assert_eq!(*rig.changes.lock().unwrap(), vec![0, 1]);

        // The rest gap is not run time.
        rig.run_for(10.0);
        assert_eq!(rig.engine.state(), TimerState::Finished);
        assert!((rig.engine.total_elapsed_secs() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn late_tick_before_rest_gap_keeps_next_interval_whole() {
        let mut rig = Rig::new();
        rig.engine.start(two_tens(20.0)).unwrap();

        rig.clock.advance(Duration::from_secs(15));
        rig.engine.tick();
        assert!(rig.engine.is_resting());
        assert_eq!(rig.engine.total_elapsed_secs(), 10.0);

        rig.clock.advance(Duration::from_secs(20));
        assert!(rig.engine.poll_rest_gap());
        assert_eq!(rig.engine.time_remaining_in_interval(), 10.0);

        rig.clock.advance(Duration::from_secs(1));
        rig.engine.tick();
        assert_eq!(rig.engine.state(), TimerState::Running);
        assert!((rig.engine.time_remaining_in_interval() - 9.0).abs() < 1e-9);
        assert!((rig.engine.total_elapsed_secs() - 11.0).abs() < 1e-9);
    }

    #[test]
    fn user_resume_does_not_cut_a_rest_gap_short() {
        let mut rig = Rig::new();
        rig.engine.start(two_tens(20.0)).unwrap();
        rig.run_for(10.0);
        rig.engine.resume();
        rig.engine.pause();
        assert_eq!(rig.engine.state(), TimerState::Paused);
        assert!(rig.engine.is_resting());
    }

    #[test]
    fn stop_during_rest_gap_cancels_the_resume() {
        let mut rig = Rig::new();
        rig.engine.start(two_tens(20.0)).unwrap();
        rig.run_for(10.0);
        let gap = rig.engine.pending_rest().unwrap();

        rig.engine.stop();
        assert_eq!(rig.engine.state(), TimerState::Finished);
        assert!(rig.engine.pending_rest().is_none());

        rig.clock.advance(Duration::from_secs(30));
        assert!(!rig.engine.complete_rest_gap(gap.token));
        assert!(!rig.engine.poll_rest_gap());
        assert_eq!(rig.engine.state(), TimerState::Finished);
        assert_eq!(rig.finishes(), 1);
    }

    #[test]
    fn skip_during_rest_gap_resumes_into_next_interval() {
        let mut rig = Rig::new();
        rig.engine.start(two_tens(20.0)).unwrap();
        rig.run_for(10.0);
        let gap = rig.engine.pending_rest().unwrap();

        rig.engine.skip_to_next_interval();
        assert_eq!(rig.engine.state(), TimerState::Running);
        assert_eq!(rig.engine.current_interval_index(), 1);
        assert!(!rig.engine.complete_rest_gap(gap.token));

        rig.run_for(4.0);
        assert!((rig.engine.time_remaining_in_interval() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn pause_is_idempotent() {
        let mut rig = Rig::new();
        rig.engine.start(work_rest(0.0)).unwrap();
        rig.run_for(2.0);
        rig.engine.pause();
        let remaining = rig.engine.time_remaining_in_interval();

        rig.clock.advance(Duration::from_secs(3));
        rig.engine.pause();
        assert_eq!(rig.engine.state(), TimerState::Paused);
        assert_eq!(rig.engine.time_remaining_in_interval(), remaining);
    }

    #[test]
    fn paused_time_is_not_counted() {
        let mut rig = Rig::new();
        rig.engine.start(work_rest(0.0)).unwrap();
        rig.run_for(3.0);
        rig.engine.pause();

        rig.clock.advance(Duration::from_secs(120));
        rig.engine.tick();
        assert!((rig.engine.time_remaining_in_interval() - 7.0).abs() < 1e-9);

        rig.engine.resume();
        rig.run_for(1.0);
        assert!((rig.engine.time_remaining_in_interval() - 6.0).abs() < 1e-9);
        assert!((rig.engine.total_elapsed_secs() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_transitions_are_no_ops() {
        let mut rig = Rig::new();
        rig.engine.pause();
        rig.engine.resume();
        rig.engine.stop();
        rig.engine.skip_to_next_interval();
        rig.engine.tick();
        assert_eq!(rig.engine.state(), TimerState::Ready);
        assert_eq!(rig.finishes(), 0);

        rig.engine.start(work_rest(0.0)).unwrap();
        rig.engine.resume();
        assert_eq!(rig.engine.state(), TimerState::Running);
        rig.engine.stop();
        rig.engine.stop();
        assert_eq!(rig.finishes(), 1);
    }

    #[test]
    fn skip_on_last_interval_is_stop() {
        let mut rig = Rig::new();
        rig.engine.start(work_rest(0.0)).unwrap();
        rig.engine.skip_to_next_interval();
        assert_eq!(rig.engine.current_interval_index(), 1);
        assert_eq!(rig.engine.time_remaining_in_interval(), 5.0);

        rig.engine.skip_to_next_interval();
        assert_eq!(rig.engine.state(), TimerState::Finished);
        assert_eq!(rig.engine.completed_intervals(), 2);
        assert_eq!(rig.finishes(), 1);
    }

    #[test]
    fn skipped_interval_starts_with_full_duration() {
        let mut rig = Rig::new();
        rig.engine.start(work_rest(0.0)).unwrap();
        rig.run_for(2.0);
        rig.engine.skip_to_next_interval();
        rig.run_for(1.0);
        assert!((rig.engine.time_remaining_in_interval() - 4.0).abs() < 1e-9);
        // Skipped work counts as program progress.
        assert!((rig.engine.total_progress() - 11.0 / 15.0).abs() < 1e-9);
    }

    #[test]
    fn countdown_fires_once_per_boundary() {
        let mut rig = Rig::new();
        rig.engine.start(work_rest(0.0)).unwrap();
        // Uneven tick spacing straddling the boundaries.
        for ms in [6_950u64, 120, 990, 30, 1_000, 905, 5] {
            rig.clock.advance(Duration::from_millis(ms));
            rig.engine.tick();
        }
        let countdowns: Vec<String> = rig
            .audio
            .cues()
            .into_iter()
            .filter(|c| c.starts_with("countdown"))
            .collect();
        assert_eq!(countdowns, vec!["countdown:3", "countdown:2", "countdown:1"]);
        assert_eq!(rig.engine.current_interval_index(), 1);
    }

    #[test]
    fn interval_of_exactly_countdown_length_announces_every_second() {
        let mut rig = Rig::new();
        let program = Program::new(
            "Short",
            vec![
                crate::program::Interval::new(0, "Three", 3.0, IntervalType::Work),
                crate::program::Interval::new(1, "Two", 2.0, IntervalType::Rest),
            ],
        );
        rig.engine.start(program).unwrap();
        rig.run_for(5.0);
        let countdowns: Vec<String> = rig
            .audio
            .cues()
            .into_iter()
            .filter(|c| c.starts_with("countdown"))
            .collect();
        assert_eq!(
            countdowns,
            vec!["countdown:3", "countdown:2", "countdown:1", "countdown:2", "countdown:1"]
        );
    }

    #[test]
    fn stalled_tick_walks_through_every_boundary() {
        let mut rig = Rig::new();
        rig.engine.start(work_rest(0.0)).unwrap();
        rig.clock.advance(Duration::from_secs(60));
        rig.engine.tick();
        assert_eq!(rig.engine.state(), TimerState::Finished);
        assert_eq!(*rig.changes.lock().unwrap(), vec![0, 1]);
        assert_eq!(
            rig.audio.cues().iter().filter(|c| c.starts_with("end:")).count(),
            2
        );
    }

    #[test]
    fn restart_after_finish_reinitializes() {
        let mut rig = Rig::new();
        rig.engine.start(work_rest(0.0)).unwrap();
        rig.engine.stop();
        rig.engine.start(two_tens(0.0)).unwrap();
        assert_eq!(rig.engine.state(), TimerState::Running);
        assert_eq!(rig.engine.total_elapsed_secs(), 0.0);
        assert_eq!(rig.engine.completed_intervals(), 0);
    }

    #[test]
    fn events_are_emitted_after_state_updates() {
        let mut rig = Rig::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        rig.engine.on_event(move |e| {
            let tag = serde_json::to_value(e).unwrap()["type"].as_str().unwrap().to_string();
            s.lock().unwrap().push(tag);
        });
        rig.engine.start(work_rest(0.0)).unwrap();
        rig.run_for(15.0);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.first().map(String::as_str), Some("RunStarted"));
        assert_eq!(seen.last().map(String::as_str), Some("Finished"));
        assert_eq!(seen.iter().filter(|t| *t == "IntervalChanged").count(), 2);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn progress_is_monotonic_and_ends_at_one(
                durations in prop::collection::vec(1u32..30, 1..6),
                steps in prop::collection::vec(50u64..700, 1..400),
            ) {
                let mut rig = Rig::new();
                let intervals = durations
                    .iter()
                    .enumerate()
                    .map(|(i, d)| crate::program::Interval::new(i as u32, format!("I{i}"), f64::from(*d), IntervalType::Work))
                    .collect();
                rig.engine.start(Program::new("Prop", intervals)).unwrap();

                let mut last = 0.0;
                let mut cycle = steps.iter().cycle();
                while rig.engine.state() != TimerState::Finished {
                    let ms = *cycle.next().unwrap();
                    rig.clock.advance(Duration::from_millis(ms));
                    rig.engine.tick();
                    let p = rig.engine.total_progress();
                    prop_assert!(p >= last);
                    last = p;
                }
                prop_assert_eq!(rig.engine.total_progress(), 1.0);
                prop_assert_eq!(rig.finishes(), 1);
            }
        }
    }
}
