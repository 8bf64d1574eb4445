//! Window - Window level resize and scroll notifications.
//!
//! Components that monitor the window register listeners here while they are
//! attached and remove them on detach.

use std::cell::Cell;

use crate::observable::{ListenerId, Observable, WindowEvent};
use crate::types::BoxSize;

#[derive(Default)]
pub struct Window {
    events: Observable<WindowEvent>,
    size: Cell<BoxSize>,
    scroll: Cell<(i32, i32)>,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> BoxSize {
        self.size.get()
    }

    pub fn scroll_position(&self) -> (i32, i32) {
        self.scroll.get()
    }

    pub fn add_listener(&self, listener: impl Fn(&WindowEvent) + 'static) -> ListenerId {
        self.events.add_listener(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.events.remove_listener(id)
    }

    pub fn listener_count(&self) -> usize {
        self.events.listener_count()
    }

    /// Record a new window size and notify listeners.
    pub fn fire_resize(&self, size: BoxSize) {
        self.size.set(size);
        self.events.fire(&WindowEvent::Resize(size));
    }

    /// Record a new scroll position and notify listeners.
    pub fn fire_scroll(&self, x: i32, y: i32) {
        self.scroll.set((x, y));
        self.events.fire(&WindowEvent::Scroll { x, y });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_resize_updates_size_and_notifies() {
        let window = Window::new();
        let seen = Rc::new(Cell::new(None));
        let s = seen.clone();
        let id = window.add_listener(move |ev| s.set(Some(*ev)));

        window.fire_resize(BoxSize::new(80, 24));
        assert_eq!(window.size(), BoxSize::new(80, 24));
        assert_eq!(seen.get(), Some(WindowEvent::Resize(BoxSize::new(80, 24))));

        assert!(window.remove_listener(id));
        window.fire_scroll(0, 5);
        assert_eq!(window.scroll_position(), (0, 5));
        assert_eq!(seen.get(), Some(WindowEvent::Resize(BoxSize::new(80, 24))));
    }
}
