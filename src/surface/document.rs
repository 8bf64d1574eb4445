//! Document - Active element tracking.
//!
//! The platform confirms focus through the active element reference. The
//! document only grants focus to elements that accept it, are visible and are
//! not disabled; anything else leaves the active element untouched, which is
//! exactly the "flaky focus" the focus controller has to cope with.

use std::cell::RefCell;
use std::rc::Rc;

use super::element::Element;

struct DocumentInner {
    body: Element,
    active: RefCell<Option<Element>>,
}

/// Shared handle to the host document.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(DocumentInner {
                body: Element::new("body"),
                active: RefCell::new(None),
            }),
        }
    }

    /// The document body, a convenient mount point.
    pub fn body(&self) -> Element {
        self.inner.body.clone()
    }

    pub fn create_element(&self, tag: impl Into<String>) -> Element {
        Element::new(tag)
    }

    pub fn active_element(&self) -> Option<Element> {
        self.inner.active.borrow().clone()
    }

    /// Whether `el` is the active element.
    pub fn has_focus(&self, el: &Element) -> bool {
        self.inner.active.borrow().as_ref() == Some(el)
    }

    /// Attempt to focus `el`. Returns whether the platform granted focus.
    pub fn focus(&self, el: &Element) -> bool {
        if !el.accepts_focus() || !el.is_visible() || el.has_attribute("disabled") {
            return false;
        }
        *self.inner.active.borrow_mut() = Some(el.clone());
        true
    }

    /// Remove focus from `el` if it holds it.
    pub fn blur(&self, el: &Element) {
        let mut active = self.inner.active.borrow_mut();
        if active.as_ref() == Some(el) {
            *active = None;
        }
    }
}
