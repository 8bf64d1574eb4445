//! AttachmentSlot - A single child mounted on a target element.
//!
//! Unlike a region there is no layout: the child's root is rendered straight
//! into the target element at index 0 as soon as both the element and the
//! component are known. Replacing either re-renders.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::Parent;
use crate::component::{Component, ComponentRef};
use crate::observable::{ListenerId, NotificationKind};
use crate::surface::Element;

pub struct AttachmentSlot {
    name: String,
    this: Weak<AttachmentSlot>,
    owner: Weak<Component>,
    element: RefCell<Option<Element>>,
    component: RefCell<Option<ComponentRef>>,
    resize_listener: Cell<Option<ListenerId>>,
}

impl AttachmentSlot {
    pub(crate) fn new(name: &str, owner: Weak<Component>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            name: name.to_string(),
            this: this.clone(),
            owner,
            element: RefCell::new(None),
            component: RefCell::new(None),
            resize_listener: Cell::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Option<ComponentRef> {
        self.owner.upgrade()
    }

    pub fn element(&self) -> Option<Element> {
        self.element.borrow().clone()
    }

    pub fn component(&self) -> Option<ComponentRef> {
        self.component.borrow().clone()
    }

    /// Set the target element and render into it.
    pub fn set_element(&self, el: &Element) {
        *self.element.borrow_mut() = Some(el.clone());
        self.render();
    }

    /// Replace the mounted component. The previous one is orphaned (not
    /// disposed).
    pub fn set_component(&self, component: Option<ComponentRef>) {
        let previous = self.component();
        if let (Some(prev), Some(next)) = (&previous, &component) {
            if Rc::ptr_eq(prev, next) {
                return;
            }
        }
        if let Some(prev) = previous {
            prev.orphan();
            if let Some(root) = prev.root() {
                root.remove();
            }
        }
        if let Some(next) = &component {
            let parent: Weak<dyn Parent> = self.this.clone();
            next.set_parent(Some(parent));
            let slot = self.this.clone();
            let id = next.notifications().add_listener(move |n| {
                if n.kind != NotificationKind::Resize {
                    return;
                }
                if let Some(owner) = slot.upgrade().and_then(|s| s.owner()) {
                    owner.reconfigure();
                }
            });
            self.resize_listener.set(Some(id));
        }
        *self.component.borrow_mut() = component;
        self.render();
    }

    /// Render the component into the element (both must be set), attaching it
    /// when the owner is attached.
    pub fn render(&self) {
        let (Some(el), Some(cpt)) = (self.element(), self.component()) else {
            return;
        };
        cpt.render(&el, 0);
        if self.owner().is_some_and(|o| o.is_attached()) {
            cpt.attach();
        }
    }

    pub(crate) fn attach(&self) {
        let (Some(el), Some(cpt)) = (self.element(), self.component()) else {
            return;
        };
        if let Some(root) = cpt.root() {
            if !el.contains(&root) {
                el.insert_child(&root, 0);
            }
            cpt.attach();
        }
    }

    pub(crate) fn detach(&self) {
        let Some(cpt) = self.component() else { return };
        if let Some(root) = cpt.root() {
            root.remove();
        }
        cpt.detach();
    }

    /// Forget the element and the component without disposing it.
    pub(crate) fn clear(&self) {
        if let Some(cpt) = self.component.borrow_mut().take() {
            if let Some(id) = self.resize_listener.take() {
                cpt.notifications().remove_listener(id);
            }
        }
        *self.element.borrow_mut() = None;
    }
}

impl Parent for AttachmentSlot {
    fn orphan_child(&self, child: &Component) {
        let is_mine = self
            .component
            .borrow()
            .as_ref()
            .is_some_and(|c| std::ptr::eq(c.as_ref(), child));
        if !is_mine {
            return;
        }
        let removed = self.component.borrow_mut().take();
        if let (Some(cpt), Some(id)) = (removed, self.resize_listener.take()) {
            cpt.notifications().remove_listener(id);
        }
    }

    fn is_attached(&self) -> bool {
        self.owner().is_some_and(|o| o.is_attached())
    }

    fn test_id(&self) -> Option<String> {
        self.owner().map(|o| o.test_id())
    }
}
