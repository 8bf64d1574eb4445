//! Scheduler - Cooperative turn-based task queue with a virtual clock.
//!
//! Stands in for the host event loop:
//! - `defer(f)` runs `f` on the next turn
//! - `timer(f, delay)` runs `f` once the clock has advanced by `delay`
//!
//! Nothing runs until the host drives the loop with [`Scheduler::run_pending`],
//! [`Scheduler::run_until_idle`] or [`Scheduler::advance`]. Tasks never run
//! re-entrantly inside the call that scheduled them.
//!
//! # Example
//!
//! ```ignore
//! let scheduler = Scheduler::new();
//! scheduler.defer(|| println!("next turn"));
//! let handle = scheduler.timer(|| println!("later"), Duration::from_millis(100));
//! scheduler.run_until_idle();      // prints "next turn"
//! scheduler.advance(Duration::from_millis(100)); // prints "later"
//! handle.cancel();                 // no-op, already fired
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

/// Upper bound on turns executed by a single `run_until_idle` call.
const MAX_TURNS: usize = 10_000;

type Task = Box<dyn FnOnce()>;

struct Timer {
    due: Duration,
    seq: u64,
    cancelled: Rc<Cell<bool>>,
    task: Task,
}

#[derive(Default)]
struct SchedulerInner {
    now: Cell<Duration>,
    queue: RefCell<VecDeque<Task>>,
    timers: RefCell<Vec<Timer>>,
    next_seq: Cell<u64>,
}

/// Cancellation handle for a scheduled timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TimerHandle {
    /// Prevent the timer from running (no-op if it already ran).
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Shared handle to the task queue.
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<SchedulerInner>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.now.get()
    }

    /// Run `task` on the next turn.
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.inner.queue.borrow_mut().push_back(Box::new(task));
    }

    /// Run `task` once `delay` has elapsed on the virtual clock.
    pub fn timer(&self, task: impl FnOnce() + 'static, delay: Duration) -> TimerHandle {
        let cancelled = Rc::new(Cell::new(false));
        let seq = self.inner.next_seq.get();
        self.inner.next_seq.set(seq + 1);
        self.inner.timers.borrow_mut().push(Timer {
            due: self.now() + delay,
            seq,
            cancelled: cancelled.clone(),
            task: Box::new(task),
        });
        TimerHandle { cancelled }
    }

    /// Number of deferred tasks plus live timers.
    pub fn pending(&self) -> usize {
        let timers = self
            .inner
            .timers
            .borrow()
            .iter()
            .filter(|t| !t.cancelled.get())
            .count();
        self.inner.queue.borrow().len() + timers
    }

    /// Run one turn: every task deferred before this call.
    ///
    /// Tasks deferred while the turn runs wait for the next turn.
    pub fn run_pending(&self) -> usize {
        let batch: Vec<Task> = self.inner.queue.borrow_mut().drain(..).collect();
        let count = batch.len();
        for task in batch {
            task();
        }
        count
    }

    /// Run turns until no deferred task remains, firing timers already due.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        for _ in 0..MAX_TURNS {
            let ran = self.run_pending() + self.fire_due(self.now());
            if ran == 0 {
                return total;
            }
            total += ran;
        }
        tracing::warn!(turns = MAX_TURNS, "scheduler did not settle");
        total
    }

    /// Advance the virtual clock by `by`, firing timers in due order and
    /// settling deferred work between them.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut total = self.run_until_idle();
        while let Some(timer) = self.take_next_due(target) {
            self.inner.now.set(timer.due.max(self.now()));
            (timer.task)();
            total += 1 + self.run_until_idle();
        }
        self.inner.now.set(target);
        total
    }

    fn fire_due(&self, now: Duration) -> usize {
        let mut count = 0;
        while let Some(timer) = self.take_next_due(now) {
            (timer.task)();
            count += 1;
        }
        count
    }

    /// Remove and return the earliest live timer due at or before `limit`.
    fn take_next_due(&self, limit: Duration) -> Option<Timer> {
        let mut timers = self.inner.timers.borrow_mut();
        timers.retain(|t| !t.cancelled.get());
        let idx = timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= limit)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;
        Some(timers.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Scheduler, Rc<RefCell<Vec<&'static str>>>) {
        (Scheduler::new(), Rc::new(RefCell::new(Vec::new())))
    }

    #[test]
    fn test_defer_waits_for_turn() {
        let (s, log) = setup();
        let l = log.clone();
        s.defer(move || l.borrow_mut().push("a"));
        assert!(log.borrow().is_empty());
        assert_eq!(s.run_pending(), 1);
        assert_eq!(*log.borrow(), vec!["a"]);
    }

    #[test]
    fn test_nested_defer_runs_next_turn() {
        let (s, log) = setup();
        let (s2, l) = (s.clone(), log.clone());
        s.defer(move || {
            l.borrow_mut().push("outer");
            let l = l.clone();
            s2.defer(move || l.borrow_mut().push("inner"));
        });
        s.run_pending();
        assert_eq!(*log.borrow(), vec!["outer"]);
        s.run_pending();
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_timer_fires_on_advance() {
        let (s, log) = setup();
        let l = log.clone();
        s.timer(move || l.borrow_mut().push("late"), Duration::from_millis(100));
        let l = log.clone();
        s.timer(move || l.borrow_mut().push("early"), Duration::from_millis(50));

        s.run_until_idle();
        assert!(log.borrow().is_empty());
        s.advance(Duration::from_millis(60));
        assert_eq!(*log.borrow(), vec!["early"]);
        s.advance(Duration::from_millis(40));
        assert_eq!(*log.borrow(), vec!["early", "late"]);
        assert_eq!(s.now(), Duration::from_millis(100));
    }

    #[test]
    fn test_cancelled_timer_never_runs() {
        let (s, log) = setup();
        let l = log.clone();
        let handle = s.timer(move || l.borrow_mut().push("x"), Duration::from_millis(10));
        handle.cancel();
        assert_eq!(s.pending(), 0);
        s.advance(Duration::from_secs(1));
        assert!(log.borrow().is_empty());
    }
}
