//! Mount API - Root binding and the terminal event loop.
//!
//! A [`RootBinding`] hosts top-level components on a host element. It always
//! reports itself attached, so anything added to it is rendered (appended) and
//! attached straight away.
//!
//! # Example
//!
//! ```ignore
//! use spark_ui_core::pipeline::{mount, run};
//!
//! let root = mount(&runtime, &runtime.document().body());
//! root.add(app.clone());
//!
//! // Option 1: blocking event loop
//! run(&root)?;
//!
//! // Option 2: tick manually in your own loop
//! while tick(&root, Duration::from_millis(16))? {
//!     // Your logic here
//! }
//!
//! root.unmount();
//! ```

use std::cell::{Cell, RefCell};
use std::io;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::component::{Component, ComponentRef};
use crate::engine::Runtime;
use crate::events::input;
use crate::slots::Parent;
use crate::surface::Element;

// =============================================================================
// Root Binding
// =============================================================================

pub struct RootBinding {
    this: Weak<RootBinding>,
    runtime: Runtime,
    element: Element,
    children: RefCell<Vec<ComponentRef>>,
    running: Cell<bool>,
}

impl RootBinding {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn children(&self) -> Vec<ComponentRef> {
        self.children.borrow().clone()
    }

    /// Render `component` at the end of the host element and attach it.
    pub fn add(&self, component: ComponentRef) {
        if self
            .children
            .borrow()
            .iter()
            .any(|c| Rc::ptr_eq(c, &component))
        {
            return;
        }
        component.render(&self.element, -1);
        let parent: Weak<dyn Parent> = self.this.clone();
        component.set_parent(Some(parent));
        self.children.borrow_mut().push(component);
    }

    /// Take `component` off the host (detached, not disposed).
    pub fn remove(&self, component: &Component) -> bool {
        let present = self
            .children
            .borrow()
            .iter()
            .any(|c| std::ptr::eq(c.as_ref(), component));
        if !present {
            return false;
        }
        component.orphan();
        if let Some(root) = component.root() {
            root.remove();
        }
        true
    }

    /// Detach every child and stop the event loop.
    pub fn unmount(&self) {
        for child in self.children() {
            child.orphan();
        }
        self.stop();
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Ask the event loop to stop after the current tick.
    pub fn stop(&self) {
        self.running.set(false);
    }
}

impl Parent for RootBinding {
    fn orphan_child(&self, child: &Component) {
        // Released after the borrow ends.
        let _removed = {
            let mut children = self.children.borrow_mut();
            children
                .iter()
                .position(|c| std::ptr::eq(c.as_ref(), child))
                .map(|idx| children.remove(idx))
        };
    }

    fn is_attached(&self) -> bool {
        true
    }

    fn test_id(&self) -> Option<String> {
        None
    }
}

/// Bind a root host onto `element`.
pub fn mount(runtime: &Runtime, element: &Element) -> Rc<RootBinding> {
    Rc::new_cyclic(|this| RootBinding {
        this: this.clone(),
        runtime: runtime.clone(),
        element: element.clone(),
        children: RefCell::new(Vec::new()),
        running: Cell::new(true),
    })
}

/// Bind a root host onto the document body.
pub fn mount_body(runtime: &Runtime) -> Rc<RootBinding> {
    mount(runtime, &runtime.document().body())
}

// =============================================================================
// Event Loop
// =============================================================================

/// Run one iteration: route at most one terminal event, then settle the
/// scheduler.
///
/// Returns `Ok(false)` once [`RootBinding::stop`] was called.
pub fn tick(root: &RootBinding, timeout: Duration) -> io::Result<bool> {
    if !root.is_running() {
        return Ok(false);
    }
    if let Some(event) = input::poll_event(timeout)? {
        input::route_event(&root.runtime, event);
    }
    root.runtime.run_until_idle();
    Ok(root.is_running())
}

/// Run the event loop until stopped, with mouse capture enabled.
pub fn run(root: &RootBinding) -> io::Result<()> {
    input::enable_mouse()?;
    let result = loop {
        match tick(root, Duration::from_millis(16)) {
            Ok(true) => continue,
            Ok(false) => break Ok(()),
            Err(e) => break Err(e),
        }
    };
    let _ = input::disable_mouse();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RenderState;

    fn setup() -> (Runtime, Rc<RootBinding>) {
        let runtime = Runtime::default();
        let root = mount_body(&runtime);
        (runtime, root)
    }

    #[test]
    fn test_add_renders_and_attaches() {
        let (runtime, root) = setup();
        let cpt = Component::named(&runtime, "App");
        root.add(cpt.clone());

        assert_eq!(cpt.state(), RenderState::Configured);
        assert!(cpt.is_attached());
        let el = cpt.root().unwrap();
        assert_eq!(el.parent().as_ref(), Some(root.element()));
        assert!(runtime.dispatch_registry().is_registered(&el));
    }

    #[test]
    fn test_remove_detaches_without_disposing() {
        let (runtime, root) = setup();
        let cpt = Component::named(&runtime, "App");
        root.add(cpt.clone());

        assert!(root.remove(&cpt));
        assert!(!cpt.is_attached());
        assert!(!cpt.is_disposed());
        assert!(root.children().is_empty());
        assert!(!root.remove(&cpt));
    }

    #[test]
    fn test_unmount_detaches_all_and_stops() {
        let (runtime, root) = setup();
        let a = Component::named(&runtime, "A");
        let b = Component::named(&runtime, "B");
        root.add(a.clone());
        root.add(b.clone());

        root.unmount();
        assert!(!a.is_attached());
        assert!(!b.is_attached());
        assert!(!root.is_running());
        assert!(!tick(&root, Duration::ZERO).unwrap());
    }

    #[test]
    fn test_root_has_no_test_id_prefix() {
        let (runtime, root) = setup();
        let cpt = Component::named(&runtime, "App");
        root.add(cpt.clone());
        assert_eq!(cpt.test_id(), "app");
    }
}
