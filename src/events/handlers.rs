//! Handler chain - Prioritized UI event handlers registered on a component.
//!
//! Handlers run in registration order until one returns `true`. Priority
//! registration puts a handler at the front. A replacement key atomically
//! removes (and disposes) every handler previously registered under it.
//!
//! # Example
//!
//! ```ignore
//! let h = handler_fn(|event| event.is_key("Enter"));
//! component.register_event_handler(h.clone(), Some("submit"), false);
//! component.remove_event_handler(&h);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::{EventType, UiEvent};
use crate::error::{isolate, isolate_step};
use crate::renderer::Selector;
use crate::surface::Element;
use crate::types::Capabilities;

// =============================================================================
// Handler trait
// =============================================================================

/// A UI event handler.
///
/// Optional behaviour is advertised through [`UiEventHandler::capabilities`]:
/// `DISPOSABLE` handlers get [`dispose`](UiEventHandler::dispose) when they are
/// removed or replaced, `SELECTABLE` handlers get
/// [`select`](UiEventHandler::select) after every render.
pub trait UiEventHandler {
    /// Returns `true` when the event was handled.
    fn handle_event(&self, event: &UiEvent<'_>) -> bool;

    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    fn dispose(&self) {}

    /// Receives the root surface and the renderer's selector after a render.
    fn select(&self, _root: &Element, _selector: Option<&Selector>) {}
}

impl<F> UiEventHandler for F
where
    F: Fn(&UiEvent<'_>) -> bool,
{
    fn handle_event(&self, event: &UiEvent<'_>) -> bool {
        self(event)
    }
}

/// Wrap a closure as a shareable handler.
pub fn handler_fn(f: impl Fn(&UiEvent<'_>) -> bool + 'static) -> Rc<dyn UiEventHandler> {
    Rc::new(f)
}

fn same_handler(a: &Rc<dyn UiEventHandler>, b: &Rc<dyn UiEventHandler>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

fn dispose_if_disposable(handler: &Rc<dyn UiEventHandler>) {
    if handler.capabilities().contains(Capabilities::DISPOSABLE) {
        isolate_step("dispose handler", &"event handler", || handler.dispose());
    }
}

// =============================================================================
// Handler chain
// =============================================================================

struct HandlerEntry {
    handler: Rc<dyn UiEventHandler>,
    key: Option<String>,
}

/// Ordered list of handlers owned by a component.
#[derive(Default)]
pub struct HandlerChain {
    entries: RefCell<Vec<HandlerEntry>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, handler: &Rc<dyn UiEventHandler>) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|e| same_handler(&e.handler, handler))
    }

    /// Register `handler`. Returns false if it is already registered.
    pub fn register(
        &self,
        handler: Rc<dyn UiEventHandler>,
        key: Option<&str>,
        priority: bool,
    ) -> bool {
        if self.contains(&handler) {
            return false;
        }
        let replaced = match key {
            Some(key) => self.take_where(|e| e.key.as_deref() == Some(key)),
            None => Vec::new(),
        };
        let entry = HandlerEntry {
            handler,
            key: key.map(str::to_string),
        };
        {
            let mut entries = self.entries.borrow_mut();
            if priority {
                entries.insert(0, entry);
            } else {
                entries.push(entry);
            }
        }
        replaced.iter().for_each(dispose_if_disposable);
        true
    }

    /// Remove `handler`, disposing it if it is disposable.
    pub fn remove(&self, handler: &Rc<dyn UiEventHandler>) -> bool {
        let removed = self.take_where(|e| same_handler(&e.handler, handler));
        removed.iter().for_each(dispose_if_disposable);
        !removed.is_empty()
    }

    /// Remove and dispose every handler.
    pub fn dispose_all(&self) {
        let removed = self.take_where(|_| true);
        removed.iter().for_each(dispose_if_disposable);
    }

    /// Hand the root and selector to every selectable handler.
    pub fn select_all(&self, root: &Element, selector: Option<&Selector>) {
        for handler in self.snapshot() {
            if handler.capabilities().contains(Capabilities::SELECTABLE) {
                handler.select(root, selector);
            }
        }
    }

    /// Run handlers in order until one claims the event.
    ///
    /// A claimed event is stopped unless its kind keeps propagating (keys,
    /// paste, drag and drop). Handler panics are logged and treated as
    /// unhandled.
    pub fn dispatch(&self, owner: &dyn fmt::Display, event: &UiEvent<'_>) -> bool {
        for handler in self.snapshot() {
            let handled = isolate("handle_event", owner, || Ok(handler.handle_event(event)));
            if handled == Some(true) {
                if !event.is_event(EventType::PROPAGATING) {
                    event.stop_event();
                }
                return true;
            }
        }
        false
    }

    fn snapshot(&self) -> Vec<Rc<dyn UiEventHandler>> {
        self.entries.borrow().iter().map(|e| e.handler.clone()).collect()
    }

    fn take_where(&self, pred: impl Fn(&HandlerEntry) -> bool) -> Vec<Rc<dyn UiEventHandler>> {
        let mut entries = self.entries.borrow_mut();
        let mut taken = Vec::new();
        entries.retain(|e| {
            if pred(e) {
                taken.push(e.handler.clone());
                false
            } else {
                true
            }
        });
        taken
    }
}
