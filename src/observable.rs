//! Observable - Typed listener registry.
//!
//! Components announce lifecycle changes (render, show, hide, focus, ...)
//! through an [`Observable<Notification>`]. Listeners are closures keyed by a
//! [`ListenerId`] so they can be removed again.
//!
//! # Example
//!
//! ```ignore
//! let id = component.notifications().add_listener(|n| {
//!     if n.kind == NotificationKind::Show {
//!         println!("{} shown", n.source);
//!     }
//! });
//! component.notifications().remove_listener(id);
//! ```

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use crate::error::panic_message;
use crate::types::{BoxSize, ComponentId};

// =============================================================================
// Notifications
// =============================================================================

/// What happened to the component that fired a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Render complete (fired once the renderer and post-render hooks ran).
    Render,
    /// Initial reconfigure after render complete.
    RenderConfigured,
    Show,
    Hide,
    Enable,
    Disable,
    Focus,
    Blur,
    Reconfigure,
    Resize,
    ChildAdded(ComponentId),
    ChildRemoved(ComponentId),
    Dispose,
    Activate,
}

/// Lifecycle notification emitted by a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub source: ComponentId,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(source: ComponentId, kind: NotificationKind) -> Self {
        Self { source, kind }
    }
}

/// Window level notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Resize(BoxSize),
    Scroll { x: i32, y: i32 },
}

// =============================================================================
// Observable
// =============================================================================

/// Handle returned by [`Observable::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Rc<dyn Fn(&E)>;

/// A list of listeners for events of type `E`.
pub struct Observable<E> {
    listeners: RefCell<Vec<(ListenerId, Listener<E>)>>,
    next_id: Cell<u64>,
}

impl<E> Default for Observable<E> {
    fn default() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<E: 'static> Observable<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn add_listener(&self, listener: impl Fn(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Drop every listener.
    pub fn remove_all(&self) {
        self.listeners.borrow_mut().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver `event` to every listener registered at the time of the call.
    ///
    /// Listeners may add or remove listeners while being notified. A panicking
    /// listener is logged and skipped; the rest still run.
    pub fn fire(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in snapshot {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                tracing::error!(panic = %panic_message(payload.as_ref()), "listener panicked");
            }
        }
    }

    /// Forward every event fired here to `target` for as long as it lives.
    pub fn convey(&self, target: &Rc<Observable<E>>) -> ListenerId {
        let target: Weak<Observable<E>> = Rc::downgrade(target);
        self.add_listener(move |event| {
            if let Some(target) = target.upgrade() {
                target.fire(event);
            }
        })
    }
}
