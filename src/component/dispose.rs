//! Dispose - Terminal teardown of a component and its subtree.

use super::Component;
use crate::error::{isolate, isolate_step};
use crate::observable::NotificationKind;
use crate::types::{ComponentId, DebugFlags, RenderState};

impl Component {
    /// Tear the component down. Safe to call before rendering and more than
    /// once; every step is isolated so a failing one never stops the rest.
    ///
    /// Order: dispose notification, orphan (which detaches), children,
    /// handlers, root surface, then the `on_dispose` hook.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let _keep_alive = self.this.upgrade();
        self.trace(DebugFlags::LIFECYCLE, "dispose");

        isolate_step("dispose notification", self, || {
            self.notify(NotificationKind::Dispose)
        });
        isolate_step("orphan", self, || self.orphan());
        isolate_step("dispose children", self, || self.dispose_children(&[]));
        isolate_step("dispose reused", self, || {
            let reused = std::mem::take(&mut *self.reused.borrow_mut());
            for child in reused {
                if child.parent().is_none() {
                    child.dispose();
                }
            }
        });
        isolate_step("dispose handlers", self, || self.handlers.dispose_all());
        isolate_step("release root", self, || {
            let root = self.root.borrow_mut().take();
            if let Some(root) = root {
                self.runtime.dispatch_registry().deregister(&root);
                root.remove();
            }
            self.remove_window_monitors();
            self.attached.set(false);
        });

        self.focus.release();
        self.reconfigure.cancel_pending();
        self.configurators.borrow_mut().clear();
        self.selector.borrow_mut().take();
        self.state.set(RenderState::Pending);

        let behaviour = self.behaviour();
        isolate("on_dispose", self, || behaviour.on_dispose(self));

        self.notifications.remove_all();
        self.inbound.remove_all();
    }

    /// Dispose every child except the ids in `keep`, which are orphaned, and
    /// drop all regions and attachment slots.
    pub(crate) fn dispose_children(&self, keep: &[ComponentId]) {
        let regions = std::mem::take(&mut *self.regions.borrow_mut());
        for region in regions {
            region.release_children(|child| keep.contains(&child.id()));
        }

        let attachments = std::mem::take(&mut *self.attachments.borrow_mut());
        for attachment in attachments {
            if let Some(child) = attachment.component() {
                if keep.contains(&child.id()) {
                    child.orphan();
                } else {
                    child.dispose();
                }
            }
            attachment.clear();
        }

        for child in self.managed() {
            if keep.contains(&child.id()) {
                child.orphan();
            } else {
                child.dispose();
            }
        }
        self.managed.borrow_mut().clear();
    }
}
