//! Element - In-memory host surface node.
//!
//! A small retained element tree standing in for the platform surface:
//! - Parent/child structure with ordered insertion and relocation
//! - Ids, attributes, classes and text content
//! - Display flag (`hide`/`show` presentation)
//! - Client box size used by the resize checks
//! - Focus acceptance (lets hosts and tests model elements that refuse focus)
//!
//! Elements are reference counted handles; cloning shares the node and
//! equality is identity.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::types::BoxSize;

struct ElementNode {
    tag: String,
    id: RefCell<Option<String>>,
    attributes: RefCell<BTreeMap<String, String>>,
    classes: RefCell<Vec<String>>,
    text: RefCell<String>,
    children: RefCell<Vec<Element>>,
    parent: RefCell<Weak<ElementNode>>,
    displayed: Cell<bool>,
    size: Cell<BoxSize>,
    accepts_focus: Cell<bool>,
}

/// Handle to a surface element.
#[derive(Clone)]
pub struct Element(Rc<ElementNode>);

impl Element {
    /// Create a detached element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Rc::new(ElementNode {
            tag: tag.into(),
            id: RefCell::new(None),
            attributes: RefCell::new(BTreeMap::new()),
            classes: RefCell::new(Vec::new()),
            text: RefCell::new(String::new()),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            displayed: Cell::new(true),
            size: Cell::new(BoxSize::default()),
            accepts_focus: Cell::new(true),
        }))
    }

    /// Convenience for `div` elements.
    pub fn div() -> Self {
        Self::new("div")
    }

    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    // -------------------------------------------------------------------------
    // Identity & attributes
    // -------------------------------------------------------------------------

    pub fn id(&self) -> Option<String> {
        self.0.id.borrow().clone()
    }

    pub fn set_id(&self, id: impl Into<String>) {
        *self.0.id.borrow_mut() = Some(id.into());
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow().get(name).cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.0.attributes.borrow().contains_key(name)
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.0
            .attributes
            .borrow_mut()
            .insert(name.into(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.0.attributes.borrow_mut().remove(name);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.classes.borrow().iter().any(|c| c == class)
    }

    pub fn add_class(&self, class: &str) {
        if !self.has_class(class) {
            self.0.classes.borrow_mut().push(class.to_string());
        }
    }

    pub fn remove_class(&self, class: &str) {
        self.0.classes.borrow_mut().retain(|c| c != class);
    }

    pub fn classes(&self) -> Vec<String> {
        self.0.classes.borrow().clone()
    }

    pub fn text(&self) -> String {
        self.0.text.borrow().clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        *self.0.text.borrow_mut() = text.into();
    }

    // -------------------------------------------------------------------------
    // Tree structure
    // -------------------------------------------------------------------------

    pub fn parent(&self) -> Option<Element> {
        self.0.parent.borrow().upgrade().map(Element)
    }

    pub fn children(&self) -> Vec<Element> {
        self.0.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    pub fn child_at(&self, index: usize) -> Option<Element> {
        self.0.children.borrow().get(index).cloned()
    }

    /// Position of `child` among this element's children.
    pub fn index_of(&self, child: &Element) -> Option<usize> {
        self.0.children.borrow().iter().position(|c| c == child)
    }

    /// Append `child`, relocating it if it already has a parent.
    pub fn append_child(&self, child: &Element) {
        self.insert_child(child, -1);
    }

    /// Insert `child` at `index`; a negative or out of range index appends.
    ///
    /// Relocates the child if it already has a parent. Inserting an ancestor
    /// (or the element itself) is ignored.
    pub fn insert_child(&self, child: &Element, index: isize) {
        if child.contains(self) {
            tracing::warn!(tag = %self.tag(), "refusing to insert an ancestor as a child");
            return;
        }
        child.remove();
        let mut children = self.0.children.borrow_mut();
        let len = children.len();
        let at = if index < 0 { len } else { (index as usize).min(len) };
        children.insert(at, child.clone());
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
    }

    /// Create a child element and append it.
    pub fn create_child(&self, tag: impl Into<String>) -> Element {
        let child = Element::new(tag);
        self.append_child(&child);
        child
    }

    /// Detach this element from its parent (no-op when unparented).
    pub fn remove(&self) {
        let parent = self.0.parent.replace(Weak::new()).upgrade();
        if let Some(parent) = parent {
            parent.children.borrow_mut().retain(|c| c != self);
        }
    }

    /// Detach every child of this element.
    pub fn remove_all_children(&self) {
        let children = std::mem::take(&mut *self.0.children.borrow_mut());
        for child in children {
            *child.0.parent.borrow_mut() = Weak::new();
        }
    }

    /// True when `other` is this element or one of its descendants.
    pub fn contains(&self, other: &Element) -> bool {
        let mut current = Some(other.clone());
        while let Some(el) = current {
            if &el == self {
                return true;
            }
            current = el.parent();
        }
        false
    }

    /// True when this element lies within `ancestor` (inclusive).
    pub fn is_child_of(&self, ancestor: &Element) -> bool {
        ancestor.contains(self)
    }

    /// Depth-first search for a descendant (or self) with the given id.
    pub fn find_by_id(&self, id: &str) -> Option<Element> {
        if self.id().as_deref() == Some(id) {
            return Some(self.clone());
        }
        self.children().iter().find_map(|c| c.find_by_id(id))
    }

    // -------------------------------------------------------------------------
    // Presentation
    // -------------------------------------------------------------------------

    pub fn is_displayed(&self) -> bool {
        self.0.displayed.get()
    }

    pub fn set_displayed(&self, displayed: bool) {
        self.0.displayed.set(displayed);
    }

    /// True when this element and every ancestor is displayed.
    pub fn is_visible(&self) -> bool {
        let mut current = Some(self.clone());
        while let Some(el) = current {
            if !el.is_displayed() {
                return false;
            }
            current = el.parent();
        }
        true
    }

    pub fn client_size(&self) -> BoxSize {
        self.0.size.get()
    }

    pub fn set_client_size(&self, size: BoxSize) {
        self.0.size.set(size);
    }

    pub fn accepts_focus(&self) -> bool {
        self.0.accepts_focus.get()
    }

    pub fn set_accepts_focus(&self, accepts: bool) {
        self.0.accepts_focus.set(accepts);
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.0.tag)
            .field("id", &self.id())
            .field("children", &self.child_count())
            .finish()
    }
}
