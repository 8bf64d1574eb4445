//! Reconfigure - Re-entrancy guarded, cancellable two phase relayout trigger.
//!
//! A reconfigure runs an immediate pass synchronously (layouts, resize check)
//! and then schedules a deferred pass for once the surface has settled. A newer
//! reconfigure cancels the deferred pass of an older one, so any burst of
//! synchronous reconfigures executes at most one deferred pass.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::engine::Scheduler;
use crate::types::BoxSize;

/// Clears a `running` flag when dropped, so the flag resets on unwind too.
pub(crate) struct RunningGuard<'a>(&'a Cell<bool>);

impl<'a> RunningGuard<'a> {
    /// Wrap a flag the caller has already raised.
    pub(crate) fn new(flag: &'a Cell<bool>) -> Self {
        Self(flag)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[derive(Default)]
pub struct ReconfigureScheduler {
    running: Cell<bool>,
    /// Cancellation flag of the outstanding deferred pass.
    pending: RefCell<Option<Rc<Cell<bool>>>>,
    last_box: Cell<BoxSize>,
}

impl ReconfigureScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// True while a deferred pass is scheduled and not yet run or cancelled.
    pub fn has_pending(&self) -> bool {
        self.pending
            .borrow()
            .as_ref()
            .is_some_and(|done| !done.get())
    }

    pub fn cancel_pending(&self) {
        if let Some(done) = self.pending.borrow_mut().take() {
            done.set(true);
        }
    }

    /// Run `immediate` now and schedule `deferred` for the next turn.
    ///
    /// Returns false (doing nothing) when called from within `immediate`.
    pub fn trigger(
        &self,
        scheduler: &Scheduler,
        immediate: impl FnOnce(),
        deferred: impl FnOnce() + 'static,
    ) -> bool {
        if self.running.replace(true) {
            return false;
        }
        self.cancel_pending();
        {
            let _running = RunningGuard::new(&self.running);
            immediate();
        }

        let done = Rc::new(Cell::new(false));
        *self.pending.borrow_mut() = Some(done.clone());
        scheduler.defer(move || {
            if !done.replace(true) {
                deferred();
            }
        });
        true
    }

    /// Whether `current` differs from the last recorded box.
    ///
    /// Without a surface there is nothing to compare, so never resized.
    pub fn is_resized(&self, current: Option<BoxSize>) -> bool {
        current.is_some_and(|size| size != self.last_box.get())
    }

    /// Record `current` if it changed. Returns whether it changed.
    pub fn assert_resize(&self, current: Option<BoxSize>) -> bool {
        match current {
            Some(size) if size != self.last_box.get() => {
                self.last_box.set(size);
                true
            }
            _ => false,
        }
    }

    pub fn last_box(&self) -> BoxSize {
        self.last_box.get()
    }
}
