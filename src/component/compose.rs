//! Regions, attachments, containment and broadcast.

use std::any::Any;
use std::rc::Rc;

use super::{Component, ComponentEvent, ComponentRef};
use crate::error::isolate;
use crate::slots::{AttachmentSlot, RegionSlot};
use crate::surface::Element;

impl Component {
    // =========================================================================
    // Regions
    // =========================================================================

    /// The region called `name`, created on first use.
    pub fn region(&self, name: &str) -> Rc<RegionSlot> {
        if let Some(region) = self.find_region(name) {
            return region;
        }
        let region = RegionSlot::new(name, self.this.clone());
        self.regions.borrow_mut().push(region.clone());
        region
    }

    pub fn find_region(&self, name: &str) -> Option<Rc<RegionSlot>> {
        self.regions
            .borrow()
            .iter()
            .find(|r| r.name() == name)
            .cloned()
    }

    pub fn regions(&self) -> Vec<Rc<RegionSlot>> {
        self.regions.borrow().clone()
    }

    // =========================================================================
    // Attachments
    // =========================================================================

    /// The attachment slot called `name`, created on first use.
    pub fn attachment(&self, name: &str) -> Rc<AttachmentSlot> {
        if let Some(attachment) = self.find_attachment(name) {
            return attachment;
        }
        let attachment = AttachmentSlot::new(name, self.this.clone());
        self.attachments.borrow_mut().push(attachment.clone());
        attachment
    }

    pub fn find_attachment(&self, name: &str) -> Option<Rc<AttachmentSlot>> {
        self.attachments
            .borrow()
            .iter()
            .find(|a| a.name() == name)
            .cloned()
    }

    pub fn attachments(&self) -> Vec<Rc<AttachmentSlot>> {
        self.attachments.borrow().clone()
    }

    /// Mount `child` on `el` through an anonymous attachment slot.
    pub fn register_component(&self, child: ComponentRef, el: &Element) -> Rc<AttachmentSlot> {
        let attachment = self.attachment(&format!("cpt-{}", child.id()));
        attachment.set_component(Some(child));
        attachment.set_element(el);
        attachment
    }

    /// Detach and drop the attachment slot `name`. Its component is orphaned
    /// but not disposed.
    pub fn deregister_attachment(&self, name: &str) -> bool {
        let Some(attachment) = self.find_attachment(name) else {
            return false;
        };
        attachment.detach();
        if let Some(child) = attachment.component() {
            child.orphan();
        }
        attachment.clear();
        self.attachments
            .borrow_mut()
            .retain(|a| !Rc::ptr_eq(a, &attachment));
        true
    }

    // =========================================================================
    // Children & containment
    // =========================================================================

    /// Direct children: region items, attached components and managed
    /// children, in that order.
    pub fn children(&self) -> Vec<ComponentRef> {
        let mut children = Vec::new();
        for region in self.regions() {
            children.extend(region.items());
        }
        for attachment in self.attachments() {
            children.extend(attachment.component());
        }
        children.extend(self.managed());
        children
    }

    pub fn for_each(&self, mut visitor: impl FnMut(&ComponentRef)) {
        for child in self.children() {
            visitor(&child);
        }
    }

    /// Whether `other` is anywhere beneath this component.
    pub fn contains(&self, other: &Component) -> bool {
        self.children()
            .iter()
            .any(|child| std::ptr::eq(child.as_ref(), other) || child.contains(other))
    }

    /// Whether `el` lies inside the root surface.
    pub fn contains_element(&self, el: &Element) -> bool {
        self.root().is_some_and(|root| root.contains(el))
    }

    /// Keep `child` alive across a rerender (it is orphaned, not disposed).
    pub fn mark_reused(&self, child: ComponentRef) {
        let mut reused = self.reused.borrow_mut();
        if !reused.iter().any(|c| Rc::ptr_eq(c, &child)) {
            reused.push(child);
        }
    }

    // =========================================================================
    // Broadcast
    // =========================================================================

    /// Send `message` depth first to descendants. A descendant whose behaviour
    /// returns false does not pass it on to its own children.
    pub fn broadcast(&self, message: Rc<dyn Any>) {
        let event = ComponentEvent::new(self.id, message);
        self.broadcast_to_children(&event, 1);
    }

    fn broadcast_to_children(&self, event: &ComponentEvent, depth: usize) {
        for child in self.children() {
            event.set_depth(depth);
            child.inbound.fire(event);
            let behaviour = child.behaviour();
            let propagate = isolate("on_component_event", child.as_ref(), || {
                Ok(behaviour.on_component_event(&child, event))
            });
            if propagate == Some(true) {
                child.broadcast_to_children(event, depth + 1);
            }
        }
    }
}
