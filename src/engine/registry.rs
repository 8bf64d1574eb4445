//! Dispatch Registry - Element to listener mapping for event delivery.
//!
//! Attaching a component registers its root surface here; detaching removes
//! the registration. A dispatched event goes to the nearest registered
//! ancestor of its target, then to further registered ancestors until a
//! listener stops it.
//!
//! Preview handlers see every event first and may cancel it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::events::RawEvent;
use crate::surface::Element;

// =============================================================================
// TYPES
// =============================================================================

/// Receiver of dispatched raw events.
pub trait EventListener {
    fn on_browser_event(&self, event: &RawEvent);
}

/// Handle returned by [`DispatchRegistry::add_preview`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewId(u64);

/// Returns `false` to cancel the event.
type Preview = Rc<dyn Fn(&RawEvent) -> bool>;

struct Registration {
    element: Element,
    listener: Weak<dyn EventListener>,
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Default)]
pub struct DispatchRegistry {
    entries: RefCell<Vec<Registration>>,
    previews: RefCell<Vec<(PreviewId, Preview)>>,
    next_preview: Cell<u64>,
}

impl DispatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for events reaching `element`, replacing any
    /// existing registration for the element.
    pub fn register(&self, element: &Element, listener: Weak<dyn EventListener>) {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|r| &r.element != element);
        entries.push(Registration {
            element: element.clone(),
            listener,
        });
    }

    /// Remove the registration for `element`. Returns whether one existed.
    pub fn deregister(&self, element: &Element) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|r| &r.element != element);
        entries.len() != before
    }

    pub fn is_registered(&self, element: &Element) -> bool {
        self.entries.borrow().iter().any(|r| &r.element == element)
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn listener_for(&self, element: &Element) -> Option<Rc<dyn EventListener>> {
        self.entries
            .borrow()
            .iter()
            .find(|r| &r.element == element)
            .and_then(|r| r.listener.upgrade())
    }

    // -------------------------------------------------------------------------
    // Preview
    // -------------------------------------------------------------------------

    /// Install a preview handler. Returning `false` cancels the event.
    pub fn add_preview(&self, preview: impl Fn(&RawEvent) -> bool + 'static) -> PreviewId {
        let id = PreviewId(self.next_preview.get());
        self.next_preview.set(id.0 + 1);
        self.previews.borrow_mut().push((id, Rc::new(preview)));
        id
    }

    pub fn remove_preview(&self, id: PreviewId) -> bool {
        let mut previews = self.previews.borrow_mut();
        let before = previews.len();
        previews.retain(|(pid, _)| *pid != id);
        previews.len() != before
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Deliver `event` to registered ancestors of its target.
    ///
    /// Returns the number of listeners that received it.
    pub fn dispatch(&self, event: &RawEvent) -> usize {
        let previews: Vec<Preview> = self
            .previews
            .borrow()
            .iter()
            .map(|(_, p)| p.clone())
            .collect();
        for preview in previews {
            if !preview(event) {
                event.stop_propagation();
                event.prevent_default();
                return 0;
            }
        }

        let mut delivered = 0;
        let mut current = Some(event.target().clone());
        while let Some(el) = current {
            if let Some(listener) = self.listener_for(&el) {
                listener.on_browser_event(event);
                delivered += 1;
                if event.is_stopped() {
                    break;
                }
            }
            current = el.parent();
        }
        delivered
    }
}
