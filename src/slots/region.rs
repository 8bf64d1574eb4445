//! RegionSlot - Ordered, laid out container of child components.
//!
//! A region belongs to an owning component and is bound to an element of the
//! owner's surface. Children are kept in order without duplicates; the
//! region's [`Layout`] renders them into the element during the owner's
//! reconfigure.
//!
//! # Example
//!
//! ```ignore
//! let body = cpt.region("body");
//! body.add(child_a.clone());
//! body.insert(child_b.clone(), 0, None); // child_b, child_a
//! body.insert(child_b.clone(), -1, None); // child_a, child_b
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::Parent;
use crate::component::{Component, ComponentRef};
use crate::error::{ComponentError, isolate, isolate_step, report};
use crate::events::{RawEvent, UiEvent};
use crate::layout::{FlowLayout, Layout};
use crate::observable::{ListenerId, NotificationKind};
use crate::surface::Element;
use crate::types::{ComponentId, LayoutData};

pub struct RegionSlot {
    name: String,
    this: Weak<RegionSlot>,
    owner: Weak<Component>,
    element: RefCell<Option<Element>>,
    layout: RefCell<Option<Rc<dyn Layout>>>,
    items: RefCell<Vec<ComponentRef>>,
    dirty: Cell<bool>,
    /// Suppresses per-child reconfigures during bulk disposal.
    block_reconfigure: Cell<bool>,
    resize_listeners: RefCell<Vec<(ComponentId, ListenerId)>>,
}

impl RegionSlot {
    pub(crate) fn new(name: &str, owner: Weak<Component>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            name: name.to_string(),
            this: this.clone(),
            owner,
            element: RefCell::new(None),
            layout: RefCell::new(None),
            items: RefCell::new(Vec::new()),
            dirty: Cell::new(true),
            block_reconfigure: Cell::new(false),
            resize_listeners: RefCell::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Option<ComponentRef> {
        self.owner.upgrade()
    }

    // -------------------------------------------------------------------------
    // Surface & layout
    // -------------------------------------------------------------------------

    pub fn element(&self) -> Option<Element> {
        self.element.borrow().clone()
    }

    /// Bind the region to the element its children render into.
    pub fn set_element(&self, el: &Element) {
        *self.element.borrow_mut() = Some(el.clone());
        self.mark_dirty();
    }

    /// Whether the owning component has a surface.
    pub fn is_rendered(&self) -> bool {
        self.owner().is_some_and(|o| o.is_rendered())
    }

    /// The region's layout, creating the default flow layout on first use.
    pub fn current_layout(&self) -> Rc<dyn Layout> {
        if let Some(layout) = self.layout.borrow().clone() {
            return layout;
        }
        let layout = FlowLayout::shared();
        self.set_layout(layout.clone());
        layout
    }

    pub fn set_layout(&self, layout: Rc<dyn Layout>) {
        let previous = self.layout.borrow_mut().replace(layout.clone());
        if let Some(previous) = previous {
            previous.set_layout_target(None);
        }
        layout.set_layout_target(Some(self.this.clone()));
        self.mark_dirty();
    }

    /// Lay the children out. Returns false when the region has no element or
    /// the layout did not run.
    pub fn layout(&self, force: bool) -> bool {
        if self.element().is_none() {
            return false;
        }
        let layout = self.current_layout();
        let ran = match self.owner() {
            Some(owner) => isolate("layout", owner.as_ref(), || Ok(layout.layout(force))),
            None => isolate("layout", &self.name, || Ok(layout.layout(force))),
        };
        ran.unwrap_or(false)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    pub fn clear_dirty(&self) {
        self.dirty.set(false);
    }

    /// Called by the layout once children have been placed.
    pub fn on_layout_executed(&self) {
        let Some(owner) = self.owner() else { return };
        if owner.is_attached() {
            self.attach();
        }
        let behaviour = owner.behaviour();
        isolate_step("on_region_layout_executed", owner.as_ref(), || {
            behaviour.on_region_layout_executed(&owner, self)
        });
    }

    // -------------------------------------------------------------------------
    // Children
    // -------------------------------------------------------------------------

    pub fn items(&self) -> Vec<ComponentRef> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn item_at(&self, index: usize) -> Option<ComponentRef> {
        self.items.borrow().get(index).cloned()
    }

    pub fn index_of(&self, component: &Component) -> Option<usize> {
        self.items
            .borrow()
            .iter()
            .position(|c| std::ptr::eq(c.as_ref(), component))
    }

    /// True if `component` is a child or lies anywhere beneath one.
    pub fn contains(&self, component: &Component) -> bool {
        self.items()
            .iter()
            .any(|item| std::ptr::eq(item.as_ref(), component) || item.contains(component))
    }

    /// Append `component`.
    pub fn add(&self, component: ComponentRef) -> bool {
        self.insert(component, -1, None)
    }

    /// Insert `component` at `index`.
    ///
    /// The index wraps modulo `len + 1` (negative counts from the end, so -1
    /// appends). Moving a child that already sits before `index` accounts for
    /// its own removal. The component is orphaned from its current parent and
    /// pulled off the surface; the layout places it again.
    pub fn insert(
        &self,
        component: impl Into<Option<ComponentRef>>,
        index: isize,
        layout_data: Option<LayoutData>,
    ) -> bool {
        let Some(component) = component.into() else {
            report(&ComponentError::MissingComponent {
                region: self.name.clone(),
            });
            return false;
        };
        if component.is_disposed() {
            report(&ComponentError::Disposed {
                component: component.to_string(),
                action: "inserted",
            });
            return false;
        }
        if let Some(owner) = self.owner() {
            if Rc::ptr_eq(&owner, &component) || component.contains(&owner) {
                report(&ComponentError::SelfInsertion {
                    component: component.to_string(),
                });
                return false;
            }
        }

        if layout_data.is_some() {
            component.set_layout_data(layout_data);
        }

        let mut index = {
            let len = self.len() as isize;
            if len == 0 {
                0
            } else {
                let wrapped = index % (len + 1);
                if wrapped < 0 { len + 1 + wrapped } else { wrapped }
            }
        };
        if let Some(current) = self.index_of(&component) {
            if (current as isize) < index {
                index -= 1;
            }
        }

        let parent: Weak<dyn Parent> = self.this.clone();
        component.set_parent(Some(parent));
        if let Some(root) = component.root() {
            root.remove();
        }

        {
            let mut items = self.items.borrow_mut();
            let at = (index.max(0) as usize).min(items.len());
            items.insert(at, component.clone());
        }
        self.watch_resize(&component);

        if let Some(owner) = self.owner() {
            owner.notify(NotificationKind::ChildAdded(component.id()));
        }
        self.mark_dirty();
        self.relayout_owner();
        true
    }

    /// Dispose every child, then reconfigure the owner once.
    pub fn dispose_all(&self) {
        let snapshot = self.items();
        if snapshot.is_empty() {
            return;
        }
        self.block_reconfigure.set(true);
        for child in &snapshot {
            child.dispose();
        }
        self.block_reconfigure.set(false);
        self.mark_dirty();
        self.relayout_owner();
    }

    fn relayout_owner(&self) {
        if let Some(owner) = self.owner() {
            if owner.state().is_drawn() && owner.config().layout_on_change {
                owner.reconfigure();
            }
        }
    }

    // -------------------------------------------------------------------------
    // Child resize tracking
    // -------------------------------------------------------------------------

    fn watch_resize(&self, child: &ComponentRef) {
        let region = self.this.clone();
        let id = child.notifications().add_listener(move |n| {
            if n.kind != NotificationKind::Resize {
                return;
            }
            let Some(region) = region.upgrade() else { return };
            let is_child = region.items.borrow().iter().any(|c| c.id() == n.source);
            if is_child {
                if let Some(owner) = region.owner() {
                    owner.reconfigure();
                }
            }
        });
        self.resize_listeners.borrow_mut().push((child.id(), id));
    }

    fn unwatch_resize(&self, child: &Component) {
        let ids: Vec<ListenerId> = {
            let mut listeners = self.resize_listeners.borrow_mut();
            let (mine, rest): (Vec<_>, Vec<_>) =
                listeners.drain(..).partition(|(cid, _)| *cid == child.id());
            *listeners = rest;
            mine.into_iter().map(|(_, id)| id).collect()
        };
        for id in ids {
            child.notifications().remove_listener(id);
        }
    }

    // -------------------------------------------------------------------------
    // Attach / detach / events
    // -------------------------------------------------------------------------

    pub(crate) fn attach(&self) {
        for item in self.items() {
            if item.is_rendered() {
                item.attach();
            }
        }
    }

    pub(crate) fn detach(&self) {
        for item in self.items() {
            if item.is_rendered() {
                item.detach();
            }
        }
    }

    /// Offer an event to the layout. Claims every event targeted inside the
    /// region's element.
    pub(crate) fn on_browser_event(&self, raw: &RawEvent) -> bool {
        let Some(el) = self.element() else { return false };
        if !el.contains(raw.target()) {
            return false;
        }
        let layout = self.current_layout();
        isolate_step("layout event", &self.name, || {
            layout.on_browser_event(&UiEvent::new(raw))
        });
        true
    }

    /// Dispose every child except those `keep` selects, which are only
    /// orphaned. The owner is not reconfigured.
    pub(crate) fn release_children(&self, keep: impl Fn(&Component) -> bool) {
        self.block_reconfigure.set(true);
        for child in self.items() {
            if keep(&child) {
                child.orphan();
            } else {
                child.dispose();
            }
        }
        self.block_reconfigure.set(false);
        self.clear();
    }

    /// Drop all children without disposing them.
    pub(crate) fn clear(&self) {
        let items = std::mem::take(&mut *self.items.borrow_mut());
        for child in &items {
            self.unwatch_resize(child);
        }
        if let Some(layout) = self.layout.borrow_mut().take() {
            layout.set_layout_target(None);
        }
    }
}

impl Parent for RegionSlot {
    fn orphan_child(&self, child: &Component) {
        let removed = {
            let mut items = self.items.borrow_mut();
            match items.iter().position(|c| std::ptr::eq(c.as_ref(), child)) {
                Some(idx) => items.remove(idx),
                None => return,
            }
        };
        self.unwatch_resize(&removed);
        if let Some(owner) = self.owner() {
            owner.notify(NotificationKind::ChildRemoved(removed.id()));
        }
        if !self.block_reconfigure.get() {
            self.mark_dirty();
            self.relayout_owner();
        }
    }

    fn is_attached(&self) -> bool {
        self.owner().is_some_and(|o| o.is_attached())
    }

    fn test_id(&self) -> Option<String> {
        self.owner().map(|o| o.test_id())
    }
}
