//! Attach / detach and parent relationships.
//!
//! Attaching registers the root surface with the dispatch registry (so the
//! component receives events) and cascades to every child. A component has at
//! most one parent: setting a new one always orphans from the old one first.

use std::rc::Weak;

use super::{Component, ComponentRef};
use crate::engine::EventListener;
use crate::error::isolate_step;
use crate::observable::NotificationKind;
use crate::slots::Parent;
use crate::types::DebugFlags;

impl Component {
    /// Register with the dispatch registry and attach all children.
    /// Idempotent; requires a root surface.
    pub fn attach(&self) {
        if self.attached.get() || self.disposed.get() {
            return;
        }
        let Some(root) = self.root() else { return };
        self.trace(DebugFlags::LIFECYCLE, "attach");

        let listener: Weak<dyn EventListener> = self.this.clone();
        self.runtime.dispatch_registry().register(&root, listener);
        self.attached.set(true);

        for attachment in self.attachments() {
            attachment.attach();
        }
        for region in self.regions() {
            region.attach();
        }
        for child in self.managed() {
            if child.is_rendered() {
                child.attach();
            }
        }

        self.install_window_monitors();
        let behaviour = self.behaviour();
        isolate_step("on_attach", self, || behaviour.on_attach(self));
    }

    /// Detach all children, then deregister. Idempotent.
    pub fn detach(&self) {
        if !self.attached.get() {
            return;
        }
        self.trace(DebugFlags::LIFECYCLE, "detach");

        for attachment in self.attachments() {
            attachment.detach();
        }
        for region in self.regions() {
            region.detach();
        }
        for child in self.managed() {
            child.detach();
        }

        if let Some(root) = self.root() {
            self.runtime.dispatch_registry().deregister(&root);
        }
        self.remove_window_monitors();
        self.attached.set(false);
        let behaviour = self.behaviour();
        isolate_step("on_detach", self, || behaviour.on_detach(self));
    }

    /// Move under `parent` (orphaning first). Attaches when the new parent is
    /// attached.
    pub(crate) fn set_parent(&self, parent: Option<Weak<dyn Parent>>) {
        let _keep_alive = self.this.upgrade();
        self.orphan();
        let Some(parent) = parent else { return };
        let attach = parent.upgrade().is_some_and(|p| p.is_attached());
        *self.parent.borrow_mut() = Some(parent);
        self.test_id_cache.borrow_mut().take();

        if attach && self.is_rendered() {
            self.attach();
        }
        self.apply_test_attributes();
    }

    /// Leave the current parent (detaching when attached).
    pub fn orphan(&self) {
        let _keep_alive = self.this.upgrade();
        let parent = self.parent.borrow_mut().take();
        self.test_id_cache.borrow_mut().take();
        if let Some(parent) = parent.and_then(|p| p.upgrade()) {
            parent.orphan_child(self);
        }
        self.detach();
    }

    /// Take `child` on as a managed child (not placed in any slot).
    pub fn adopt(&self, child: ComponentRef) {
        if std::ptr::eq(child.as_ref(), self) || self.managed_contains(&child) {
            return;
        }
        let parent: Weak<dyn Parent> = self.this.clone();
        child.set_parent(Some(parent));
        self.managed.borrow_mut().push(child.clone());
        self.notify(NotificationKind::ChildAdded(child.id()));
    }

    pub fn managed(&self) -> Vec<ComponentRef> {
        self.managed.borrow().clone()
    }

    fn managed_contains(&self, child: &Component) -> bool {
        self.managed
            .borrow()
            .iter()
            .any(|c| std::ptr::eq(c.as_ref(), child))
    }
}
