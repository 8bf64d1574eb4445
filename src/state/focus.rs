//! Focus System - Per-component focus/blur state machine.
//!
//! Platform focus is unreliable: an element may refuse focus, lose it while
//! hidden, or bounce between siblings of the same component. The controller
//! tracks the component's own notion of focus and reconciles it with the
//! document:
//! - Mirrored `focus`/`blur` transitions with `scheduled`/`running` guards
//! - Deferred transitions (focus defers by default) that a later opposite
//!   request cancels
//! - `safe_focus`: immediate attempt, a retry next turn, a timed retry, then a
//!   forced blur of the owner
//! - Multiple managed elements: blur is deferred so focus can move between
//!   them without the component losing focus
//!
//! # Example
//!
//! ```ignore
//! let controller = FocusBlurController::new(&runtime);
//! controller.set_host(Rc::downgrade(&host));
//! controller.manage_focus_el(&input);
//! controller.focus(); // deferred until the next turn
//! runtime.run_until_idle();
//! assert!(controller.has_focus());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::engine::{Runtime, Scheduler};
use crate::events::{EventType, UiEvent};
use crate::surface::{Document, Element};

// =============================================================================
// Host contract
// =============================================================================

/// The component side of a focus controller.
pub trait FocusHost {
    /// Focus was gained through an event driven transition.
    fn focus_gained(&self);
    /// Focus was lost through an event driven (or forced) transition.
    fn focus_lost(&self);
    /// Present (or remove) the focused state.
    fn apply_focus_style(&self, focused: bool);
}

// =============================================================================
// Controller
// =============================================================================

struct FocusInner {
    scheduler: Scheduler,
    document: Document,
    retry_delay: Duration,
    host: RefCell<Option<Weak<dyn FocusHost>>>,
    pseudo_focus_el: RefCell<Option<Element>>,
    focal_elements: RefCell<Vec<Element>>,
    focus_deferred: Cell<bool>,
    blur_deferred: Cell<bool>,
    focus_scheduled: Cell<bool>,
    focus_running: Cell<bool>,
    blur_scheduled: Cell<bool>,
    blur_running: Cell<bool>,
    has_focus: Cell<bool>,
}

/// Focus/blur state machine. Cloning shares the state.
#[derive(Clone)]
pub struct FocusBlurController {
    inner: Rc<FocusInner>,
}

impl FocusBlurController {
    pub fn new(runtime: &Runtime) -> Self {
        Self {
            inner: Rc::new(FocusInner {
                scheduler: runtime.scheduler().clone(),
                document: runtime.document().clone(),
                retry_delay: runtime.config().focus_retry_delay,
                host: RefCell::new(None),
                pseudo_focus_el: RefCell::new(None),
                focal_elements: RefCell::new(Vec::new()),
                focus_deferred: Cell::new(true),
                blur_deferred: Cell::new(false),
                focus_scheduled: Cell::new(false),
                focus_running: Cell::new(false),
                blur_scheduled: Cell::new(false),
                blur_running: Cell::new(false),
                has_focus: Cell::new(false),
            }),
        }
    }

    pub fn set_host(&self, host: Weak<dyn FocusHost>) {
        *self.inner.host.borrow_mut() = Some(host);
    }

    fn host(&self) -> Option<Rc<dyn FocusHost>> {
        self.inner.host.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn downgrade(&self) -> Weak<FocusInner> {
        Rc::downgrade(&self.inner)
    }

    fn upgrade(weak: &Weak<FocusInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    // -------------------------------------------------------------------------
    // Configuration & state
    // -------------------------------------------------------------------------

    pub fn set_focus_deferred(&self, deferred: bool) {
        self.inner.focus_deferred.set(deferred);
    }

    pub fn set_blur_deferred(&self, deferred: bool) {
        self.inner.blur_deferred.set(deferred);
    }

    pub fn has_focus(&self) -> bool {
        self.inner.has_focus.get()
    }

    pub fn is_focus_scheduled(&self) -> bool {
        self.inner.focus_scheduled.get()
    }

    pub fn is_blur_scheduled(&self) -> bool {
        self.inner.blur_scheduled.get()
    }

    /// The element focus is applied to: the pseudo element if generated,
    /// otherwise the first managed element.
    pub fn focus_el(&self) -> Option<Element> {
        if let Some(el) = self.inner.pseudo_focus_el.borrow().clone() {
            return Some(el);
        }
        self.inner.focal_elements.borrow().first().cloned()
    }

    /// Put `el` under focus management (ignored if already managed).
    pub fn manage_focus_el(&self, el: &Element) {
        let mut focal = self.inner.focal_elements.borrow_mut();
        if !focal.contains(el) {
            focal.push(el.clone());
        }
    }

    pub fn managed_count(&self) -> usize {
        self.inner.focal_elements.borrow().len()
    }

    fn is_managed(&self, el: &Element) -> bool {
        self.inner.focal_elements.borrow().contains(el)
    }

    /// Use `root` as the focus element when nothing else is managed.
    pub fn generate_focus_el(&self, root: &Element) -> Element {
        let mut pseudo = self.inner.pseudo_focus_el.borrow_mut();
        pseudo.get_or_insert_with(|| root.clone()).clone()
    }

    /// Forget every element reference (used on dispose).
    pub fn release(&self) {
        self.inner.focal_elements.borrow_mut().clear();
        self.inner.pseudo_focus_el.borrow_mut().take();
        self.inner.focus_scheduled.set(false);
        self.inner.blur_scheduled.set(false);
    }

    pub fn enable(&self) {
        if let Some(el) = self.focus_el() {
            el.remove_attribute("disabled");
        }
    }

    pub fn disable(&self) {
        if let Some(el) = self.focus_el() {
            el.set_attribute("disabled", "");
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Focus using the configured deferral; does not notify the host.
    pub fn focus(&self) {
        self.focus_with(self.inner.focus_deferred.get(), false);
    }

    /// Blur using the configured deferral; does not notify the host.
    pub fn blur(&self) {
        self.blur_with(self.inner.blur_deferred.get(), false);
    }

    pub fn cancel_deferred_focus(&self) {
        self.inner.focus_scheduled.set(false);
    }

    pub fn cancel_deferred_blur(&self) {
        self.inner.blur_scheduled.set(false);
    }

    /// Adopt a focus state observed on the surface without touching the
    /// document. Returns whether the state changed.
    pub(crate) fn sync_focus(&self, focused: bool) -> bool {
        if self.inner.has_focus.get() == focused {
            return false;
        }
        if focused {
            self.cancel_deferred_blur();
        } else {
            self.cancel_deferred_focus();
        }
        self.inner.has_focus.set(focused);
        if let Some(host) = self.host() {
            host.apply_focus_style(focused);
        }
        true
    }

    fn focus_with(&self, deferred: bool, notify: bool) {
        self.cancel_deferred_blur();
        if self.inner.focus_scheduled.get() || self.inner.has_focus.get() {
            return;
        }
        self.inner.focus_scheduled.set(true);
        if !deferred {
            self.run_focus(notify);
            return;
        }
        let weak = self.downgrade();
        self.inner.scheduler.defer(move || {
            if let Some(this) = Self::upgrade(&weak) {
                if this.inner.focus_scheduled.get() {
                    this.run_focus(notify);
                }
            }
        });
    }

    fn run_focus(&self, notify: bool) {
        if self.inner.focus_running.replace(true) {
            return;
        }
        self.inner.has_focus.set(true);
        self.render_focus();
        self.inner.focus_scheduled.set(false);
        self.inner.focus_running.set(false);
        if notify {
            if let Some(host) = self.host() {
                host.focus_gained();
            }
        }
    }

    fn blur_with(&self, deferred: bool, notify: bool) {
        self.cancel_deferred_focus();
        if self.inner.blur_scheduled.get() || !self.inner.has_focus.get() {
            return;
        }
        self.inner.blur_scheduled.set(true);
        if !deferred {
            self.run_blur(notify);
            return;
        }
        let weak = self.downgrade();
        self.inner.scheduler.defer(move || {
            if let Some(this) = Self::upgrade(&weak) {
                if this.inner.blur_scheduled.get() {
                    this.run_blur(notify);
                }
            }
        });
    }

    fn run_blur(&self, notify: bool) {
        if self.inner.blur_running.replace(true) {
            return;
        }
        self.inner.has_focus.set(false);
        self.render_blur();
        self.inner.blur_scheduled.set(false);
        self.inner.blur_running.set(false);
        if notify {
            if let Some(host) = self.host() {
                host.focus_lost();
            }
        }
    }

    fn render_focus(&self) {
        if let Some(el) = self.focus_el() {
            self.safe_focus(&el);
        }
        if let Some(host) = self.host() {
            host.apply_focus_style(true);
        }
    }

    fn render_blur(&self) {
        if let Some(el) = self.focus_el() {
            self.inner.document.blur(&el);
        }
        if let Some(host) = self.host() {
            host.apply_focus_style(false);
        }
    }

    /// Focus `el`, retrying next turn and then after the retry delay. If the
    /// document still does not report it active, the owner is blurred.
    pub fn safe_focus(&self, el: &Element) {
        let document = &self.inner.document;
        if document.focus(el) && document.has_focus(el) {
            return;
        }
        let weak = self.downgrade();
        let el = el.clone();
        self.inner.scheduler.defer(move || {
            let Some(this) = Self::upgrade(&weak) else { return };
            let document = this.inner.document.clone();
            if document.focus(&el) && document.has_focus(&el) {
                return;
            }
            let weak = this.downgrade();
            this.inner.scheduler.timer(
                move || {
                    let Some(this) = Self::upgrade(&weak) else { return };
                    if this.inner.document.focus(&el) && this.inner.document.has_focus(&el) {
                        return;
                    }
                    tracing::debug!("focus target never became active, blurring owner");
                    this.blur_with(false, true);
                },
                this.inner.retry_delay,
            );
        });
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Handle focus and blur events on managed elements.
    pub fn handle_event(&self, event: &UiEvent<'_>) -> bool {
        if event.is_event(&[EventType::Focus]) && self.is_managed(event.target()) {
            if self.inner.blur_scheduled.get() {
                // Moving between managed elements.
                self.cancel_deferred_blur();
            } else {
                self.focus_with(self.inner.focus_deferred.get(), true);
            }
            event.stop_event();
            return true;
        }
        if event.is_event(&[EventType::Blur]) && self.is_managed(event.target()) {
            let deferred = self.inner.blur_deferred.get() || self.managed_count() > 1;
            self.blur_with(deferred, true);
            event.stop_event();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RawEvent;

    #[derive(Default)]
    struct Host {
        gained: Cell<u32>,
        lost: Cell<u32>,
        styled: Cell<bool>,
    }

    impl FocusHost for Host {
        fn focus_gained(&self) {
            self.gained.set(self.gained.get() + 1);
        }
        fn focus_lost(&self) {
            self.lost.set(self.lost.get() + 1);
        }
        fn apply_focus_style(&self, focused: bool) {
            self.styled.set(focused);
        }
    }

    fn setup() -> (Runtime, FocusBlurController, Rc<Host>) {
        let rt = Runtime::default();
        let controller = FocusBlurController::new(&rt);
        let host = Rc::new(Host::default());
        let weak: Weak<dyn FocusHost> = Rc::downgrade(&(host.clone() as Rc<dyn FocusHost>));
        controller.set_host(weak);
        (rt, controller, host)
    }

    fn event(kind: EventType, el: &Element) -> RawEvent {
        RawEvent::new(kind, el)
    }

    #[test]
    fn test_deferred_focus_runs_next_turn() {
        let (rt, controller, host) = setup();
        let input = rt.document().body().create_child("input");
        controller.manage_focus_el(&input);

        controller.focus();
        assert!(!controller.has_focus());
        assert!(controller.is_focus_scheduled());

        rt.run_until_idle();
        assert!(controller.has_focus());
        assert!(host.styled.get());
        assert!(rt.document().has_focus(&input));
    }

    #[test]
    fn test_blur_cancels_pending_focus() {
        let (rt, controller, _) = setup();
        let input = rt.document().body().create_child("input");
        controller.manage_focus_el(&input);

        controller.focus();
        controller.blur();
        rt.run_until_idle();
        assert!(!controller.has_focus());
        assert!(rt.document().active_element().is_none());
    }

    #[test]
    fn test_focus_idempotent() {
        let (rt, controller, host) = setup();
        let input = rt.document().body().create_child("input");
        controller.manage_focus_el(&input);

        let raw = event(EventType::Focus, &input);
        controller.handle_event(&UiEvent::new(&raw));
        let raw = event(EventType::Focus, &input);
        controller.handle_event(&UiEvent::new(&raw));
        rt.run_until_idle();
        assert_eq!(host.gained.get(), 1);
    }

    #[test]
    fn test_blur_between_managed_elements_is_cancelled() {
        let (rt, controller, host) = setup();
        let a = rt.document().body().create_child("input");
        let b = rt.document().body().create_child("input");
        controller.manage_focus_el(&a);
        controller.manage_focus_el(&b);
        controller.set_focus_deferred(false);

        let raw = event(EventType::Focus, &a);
        assert!(controller.handle_event(&UiEvent::new(&raw)));
        assert!(controller.has_focus());

        let blur_a = event(EventType::Blur, &a);
        controller.handle_event(&UiEvent::new(&blur_a));
        assert!(controller.is_blur_scheduled());
        let focus_b = event(EventType::Focus, &b);
        controller.handle_event(&UiEvent::new(&focus_b));
        rt.run_until_idle();

        assert!(controller.has_focus());
        assert_eq!(host.lost.get(), 0);
        assert_eq!(host.gained.get(), 1);
    }

    #[test]
    fn test_single_element_blur_is_immediate() {
        let (rt, controller, host) = setup();
        let a = rt.document().body().create_child("input");
        controller.manage_focus_el(&a);
        controller.set_focus_deferred(false);
        controller.handle_event(&UiEvent::new(&event(EventType::Focus, &a)));

        controller.handle_event(&UiEvent::new(&event(EventType::Blur, &a)));
        assert!(!controller.has_focus());
        assert_eq!(host.lost.get(), 1);
    }

    #[test]
    fn test_safe_focus_gives_up_and_blurs() {
        let (rt, controller, host) = setup();
        let stubborn = rt.document().body().create_child("input");
        stubborn.set_accepts_focus(false);
        controller.manage_focus_el(&stubborn);
        controller.set_focus_deferred(false);

        controller.focus();
        assert!(controller.has_focus());
        rt.run_until_idle();
        assert!(controller.has_focus());

        rt.advance(Duration::from_millis(100));
        assert!(!controller.has_focus());
        assert_eq!(host.lost.get(), 1);
        assert!(!host.styled.get());
    }

    #[test]
    fn test_safe_focus_recovers_on_retry() {
        let (rt, controller, host) = setup();
        let late = rt.document().body().create_child("input");
        late.set_accepts_focus(false);
        controller.manage_focus_el(&late);
        controller.set_focus_deferred(false);
        controller.focus();

        late.set_accepts_focus(true);
        rt.run_until_idle();
        rt.advance(Duration::from_millis(200));
        assert!(controller.has_focus());
        assert!(rt.document().has_focus(&late));
        assert_eq!(host.lost.get(), 0);
    }

    #[test]
    fn test_disable_marks_focus_el() {
        let (rt, controller, _) = setup();
        let root = rt.document().body().create_child("div");
        controller.generate_focus_el(&root);
        controller.disable();
        assert!(root.has_attribute("disabled"));
        controller.enable();
        assert!(!root.has_attribute("disabled"));
    }

    #[test]
    fn test_unmanaged_events_ignored() {
        let (rt, controller, _) = setup();
        let other = rt.document().body().create_child("input");
        let raw = event(EventType::Focus, &other);
        assert!(!controller.handle_event(&UiEvent::new(&raw)));
        assert!(!raw.is_stopped());
    }
}
