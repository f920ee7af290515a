//! Tokio driver for [`TimerEngine`].
//!
//! The runner owns the engine behind a mutex so every transition is
//! serialized, runs the periodic tick as a task that is aborted whenever the
//! run stops moving, and schedules rest gaps as one-shot tasks that `stop()`
//! and `skip()` cancel.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::engine::{RestGap, TimerEngine, TimerState};
use crate::error::InvalidProgram;
use crate::events::Event;
use crate::program::Program;

/// Default period between engine ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone)]
pub struct TimerRunner {
    engine: Arc<Mutex<TimerEngine>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    rest_task: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
}

impl TimerRunner {
    /// Wrap a configured engine. Register hooks before handing it over;
    /// hooks run under the runner's lock and must not call back into it.
    pub fn new(engine: TimerEngine, tick_interval: Duration) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            ticker: Arc::new(Mutex::new(None)),
            rest_task: Arc::new(Mutex::new(None)),
            tick_interval: tick_interval.max(Duration::from_millis(1)),
        }
    }

    /// Exclusive access to the engine.
    pub fn engine(&self) -> MutexGuard<'_, TimerEngine> {
        self.engine.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> Event {
        self.engine().snapshot()
    }

    pub fn state(&self) -> TimerState {
        self.engine().state()
    }

    /// True while a tick task is alive.
    pub fn is_ticking(&self) -> bool {
        slot_alive(&self.ticker)
    }

    /// True while a rest-gap resume is scheduled.
    pub fn has_pending_rest(&self) -> bool {
        slot_alive(&self.rest_task)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start `program` and begin ticking. Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// Returns [`InvalidProgram`] without touching the current run.
    pub fn start(&self, program: Program) -> Result<(), InvalidProgram> {
        self.engine().start(program)?;
        abort_slot(&self.rest_task);
        self.spawn_ticker();
        Ok(())
    }

    pub fn pause(&self) {
        let state = {
            let mut engine = self.engine();
            engine.pause();
            engine.state()
        };
        if state != TimerState::Running {
            abort_slot(&self.ticker);
        }
    }

    pub fn resume(&self) {
        let state = {
            let mut engine = self.engine();
            engine.resume();
            engine.state()
        };
        if state == TimerState::Running && !self.is_ticking() {
            self.spawn_ticker();
        }
    }

    pub fn stop(&self) {
        self.engine().stop();
        abort_slot(&self.rest_task);
        abort_slot(&self.ticker);
    }

    pub fn skip(&self) {
        let (state, resting) = {
            let mut engine = self.engine();
            engine.skip_to_next_interval();
            (engine.state(), engine.is_resting())
        };
        if !resting {
            abort_slot(&self.rest_task);
        }
        match state {
            TimerState::Running if !self.is_ticking() => self.spawn_ticker(),
            TimerState::Finished => abort_slot(&self.ticker),
            _ => {}
        }
    }

    /// Cancel every scheduled task without finishing the run.
    pub fn shutdown(&self) {
        abort_slot(&self.rest_task);
        abort_slot(&self.ticker);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn spawn_ticker(&self) {
        let runner = self.clone();
        let handle = tokio::spawn(async move { runner.tick_loop().await });
        replace_slot(&self.ticker, handle);
    }

    async fn tick_loop(self) {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            let (state, rest) = {
                let mut engine = self.engine();
                engine.tick();
                (engine.state(), engine.pending_rest())
            };
            if state == TimerState::Running {
                continue;
            }
            if let Some(gap) = rest {
                self.spawn_rest(gap);
            }
            break;
        }
    }

    fn spawn_rest(&self, gap: RestGap) {
        tracing::debug!(secs = gap.duration.as_secs_f64(), "scheduling rest gap resume");
        let runner = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(gap.duration).await;
            let resumed = runner.engine().complete_rest_gap(gap.token);
            if resumed {
                runner.spawn_ticker();
            }
        });
        replace_slot(&self.rest_task, handle);
    }
}

fn lock_slot(slot: &Mutex<Option<JoinHandle<()>>>) -> MutexGuard<'_, Option<JoinHandle<()>>> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}

fn slot_alive(slot: &Mutex<Option<JoinHandle<()>>>) -> bool {
    lock_slot(slot).as_ref().is_some_and(|h| !h.is_finished())
}

fn abort_slot(slot: &Mutex<Option<JoinHandle<()>>>) {
    if let Some(handle) = lock_slot(slot).take() {
        handle.abort();
    }
}

fn replace_slot(slot: &Mutex<Option<JoinHandle<()>>>, handle: JoinHandle<()>) {
    if let Some(old) = lock_slot(slot).replace(handle) {
        old.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudio;
    use crate::program::{Interval, IntervalType};
    use crate::timer::clock::SystemClock;

    fn runner_with_finish_count() -> (TimerRunner, Arc<Mutex<usize>>) {
        let mut engine = TimerEngine::new(Arc::new(SystemClock::new()), Arc::new(NullAudio));
        let finishes = Arc::new(Mutex::new(0));
        let f = finishes.clone();
        engine.on_finish(move || *f.lock().unwrap() += 1);
        (TimerRunner::new(engine, DEFAULT_TICK_INTERVAL), finishes)
    }

    fn two_tens(rest: f64) -> Program {
        Program::new(
            "Tens",
            vec![
                Interval::new(0, "A", 10.0, IntervalType::Work),
                Interval::new(1, "B", 10.0, IntervalType::Work),
            ],
        )
        .with_rest_between_intervals(rest)
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn rest_gap_resumes_on_its_own() {
        let (runner, finishes) = runner_with_finish_count();
        runner.start(two_tens(20.0)).unwrap();

        sleep_ms(10_050).await;
        assert_eq!(runner.state(), TimerState::Paused);
        assert!(runner.engine().is_resting());
        assert!(!runner.is_ticking());
        assert!(runner.has_pending_rest());

        sleep_ms(19_000).await;
        assert_eq!(runner.state(), TimerState::Paused);

        sleep_ms(1_000).await;
        assert_eq!(runner.state(), TimerState::Running);
        assert_eq!(runner.engine().current_interval_index(), 1);

        sleep_ms(10_500).await;
        assert_eq!(runner.state(), TimerState::Finished);
        assert_eq!(*finishes.lock().unwrap(), 1);
        assert!((runner.engine().total_elapsed_secs() - 20.0).abs() < 0.2);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_cancels_the_ticker() {
        let (runner, _) = runner_with_finish_count();
        runner.start(two_tens(0.0)).unwrap();
        sleep_ms(2_050).await;
        runner.pause();
        assert!(!runner.is_ticking());
        let remaining = runner.engine().time_remaining_in_interval();

        sleep_ms(60_000).await;
        assert_eq!(runner.engine().time_remaining_in_interval(), remaining);

        runner.resume();
        assert!(runner.is_ticking());
        sleep_ms(1_000).await;
        assert!((runner.engine().time_remaining_in_interval() - (remaining - 1.0)).abs() < 0.15);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_mid_rest_never_resumes() {
        let (runner, finishes) = runner_with_finish_count();
        runner.start(two_tens(20.0)).unwrap();
        sleep_ms(10_050).await;
        runner.stop();
        assert!(!runner.has_pending_rest());

        sleep_ms(40_000).await;
        assert_eq!(runner.state(), TimerState::Finished);
        assert_eq!(runner.engine().current_interval_index(), 0);
        assert_eq!(*finishes.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn skip_mid_rest_restarts_ticking() {
        let (runner, _) = runner_with_finish_count();
        runner.start(two_tens(20.0)).unwrap();
        sleep_ms(10_050).await;
        runner.skip();
        assert!(!runner.has_pending_rest());
        assert!(runner.is_ticking());
        assert_eq!(runner.engine().current_interval_index(), 1);

        sleep_ms(10_100).await;
        assert_eq!(runner.state(), TimerState::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_program_leaves_runner_idle() {
        let (runner, _) = runner_with_finish_count();
        assert!(runner.start(Program::new("Empty", vec![])).is_err());
        assert_eq!(runner.state(), TimerState::Ready);
        assert!(!runner.is_ticking());
    }
}
