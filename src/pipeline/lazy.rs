//! Lazy child - A component whose content is resolved on demand.
//!
//! The container renders a placeholder immediately and asks its resolver for
//! the real child once it has been rendered (or shown). The resolver answers
//! through a [`Resolution`], synchronously or on a later turn. A failed
//! attempt is retried after the runtime's backoff until the retry budget is
//! spent, after which an error placeholder replaces the loading one.
//!
//! # Example
//!
//! ```ignore
//! let lazy = LazyChild::new(&runtime, "Reports", move |resolution| {
//!     let runtime = runtime.clone();
//!     runtime.clone().defer(move || resolution.success(build_reports(&runtime)));
//!     Ok(())
//! });
//! lazy.run(|child| child.focus());
//! root.add(lazy.component().clone());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::component::{Behaviour, Component, ComponentProps, ComponentRef};
use crate::engine::Runtime;
use crate::error::{ComponentError, HookResult, isolate, isolate_step, report};
use crate::renderer::{RenderOutput, renderer_fn};

/// Attachment slot the resolved child is mounted through.
pub const CONTENT_SLOT: &str = "content";

const PLACEHOLDER_CLASS: &str = "lazy-placeholder";
const ERROR_CLASS: &str = "lazy-error";

type Resolver = Rc<dyn Fn(Resolution) -> HookResult>;
type OnLoad = Box<dyn FnOnce(&ComponentRef)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LazyStatus {
    #[default]
    Pending,
    Loading,
    Loaded,
    Failed,
}

// =============================================================================
// Resolution
// =============================================================================

/// Answer to a single resolution attempt. Consumed by either outcome.
pub struct Resolution {
    state: Weak<LazyState>,
    attempt: u32,
    remaining: u32,
}

impl Resolution {
    pub fn success(self, child: ComponentRef) {
        if let Some(state) = self.state.upgrade() {
            state.on_success(self.attempt, child);
        }
    }

    pub fn failure(self) {
        if let Some(state) = self.state.upgrade() {
            state.on_failure(self.attempt, self.remaining);
        }
    }

    /// 1-based number of this attempt.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

// =============================================================================
// State (the container's behaviour)
// =============================================================================

struct LazyState {
    this: Weak<LazyState>,
    runtime: Runtime,
    resolver: Resolver,
    owner: RefCell<Weak<Component>>,
    status: Cell<LazyStatus>,
    attempts: Cell<u32>,
    child: RefCell<Option<ComponentRef>>,
    show_on_load: Cell<bool>,
    on_load: RefCell<Vec<OnLoad>>,
}

impl LazyState {
    fn owner(&self) -> Option<ComponentRef> {
        self.owner.borrow().upgrade()
    }

    /// Hooks only see `&self`.
    fn load_shared(&self) {
        if let Some(state) = self.this.upgrade() {
            state.load();
        }
    }

    fn load(self: &Rc<Self>) {
        if self.status.get() != LazyStatus::Pending {
            return;
        }
        self.status.set(LazyStatus::Loading);
        self.attempt(self.runtime.config().lazy_max_retries);
    }

    fn attempt(self: &Rc<Self>, remaining: u32) {
        let Some(owner) = self.owner() else { return };
        if owner.is_disposed() {
            return;
        }
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        let resolution = Resolution {
            state: Rc::downgrade(self),
            attempt,
            remaining,
        };
        let resolver = self.resolver.clone();
        if isolate("lazy resolver", owner.as_ref(), || resolver(resolution)).is_none() {
            self.on_failure(attempt, remaining);
        }
    }

    fn is_current(&self, attempt: u32) -> bool {
        self.status.get() == LazyStatus::Loading && self.attempts.get() == attempt
    }

    fn on_failure(self: &Rc<Self>, attempt: u32, remaining: u32) {
        if !self.is_current(attempt) {
            return;
        }
        if remaining == 0 {
            self.fail();
            return;
        }
        let weak = Rc::downgrade(self);
        self.runtime.timer(
            move || {
                if let Some(state) = weak.upgrade() {
                    state.attempt(remaining - 1);
                }
            },
            self.runtime.config().lazy_backoff,
        );
    }

    fn fail(&self) {
        self.status.set(LazyStatus::Failed);
        report(&ComponentError::ResolveExhausted {
            attempts: self.attempts.get(),
        });
        if let Some(root) = self.owner().and_then(|o| o.root()) {
            root.remove_all_children();
            let error = root.create_child("div");
            error.add_class(ERROR_CLASS);
            error.set_text("Unable to load content");
        }
    }

    /// Swap the placeholder for the content slot's surface.
    fn mount_content(&self, owner: &Component) {
        let Some(root) = owner.root() else { return };
        root.remove_all_children();
        owner.attachment(CONTENT_SLOT).set_element(&root);
    }

    fn on_success(&self, attempt: u32, child: ComponentRef) {
        if !self.is_current(attempt) {
            return;
        }
        let Some(owner) = self.owner() else { return };
        if owner.is_disposed() {
            return;
        }
        self.status.set(LazyStatus::Loaded);
        *self.child.borrow_mut() = Some(child.clone());

        owner.attachment(CONTENT_SLOT).set_component(Some(child.clone()));
        self.mount_content(&owner);
        if self.show_on_load.get() {
            child.show();
        }

        let queued = std::mem::take(&mut *self.on_load.borrow_mut());
        for run in queued {
            isolate_step("lazy on load", owner.as_ref(), || run(&child));
        }

        if owner.is_rendered() {
            child.activate();
        }
    }
}

impl Behaviour for LazyState {
    fn on_after_render(&self, cpt: &Component) -> HookResult {
        match self.status.get() {
            LazyStatus::Pending => self.load_shared(),
            LazyStatus::Loaded => self.mount_content(cpt),
            LazyStatus::Loading | LazyStatus::Failed => {}
        }
        Ok(())
    }

    fn on_show(&self, _cpt: &Component) {
        if self.status.get() == LazyStatus::Loaded {
            if let Some(child) = self.child.borrow().clone() {
                child.show();
            }
        } else {
            self.show_on_load.set(true);
            self.load_shared();
        }
    }
}

// =============================================================================
// LazyChild
// =============================================================================

/// Handle to a lazily resolved container.
#[derive(Clone)]
pub struct LazyChild {
    component: ComponentRef,
    state: Rc<LazyState>,
}

impl LazyChild {
    /// Create the container. `resolver` is called for every attempt.
    pub fn new(
        runtime: &Runtime,
        name: impl Into<String>,
        resolver: impl Fn(Resolution) -> HookResult + 'static,
    ) -> Self {
        let state = Rc::new_cyclic(|this| LazyState {
            this: this.clone(),
            runtime: runtime.clone(),
            resolver: Rc::new(resolver),
            owner: RefCell::new(Weak::new()),
            status: Cell::new(LazyStatus::Pending),
            attempts: Cell::new(0),
            child: RefCell::new(None),
            show_on_load: Cell::new(false),
            on_load: RefCell::new(Vec::new()),
        });
        let renderer = renderer_fn(|root, _cpt| {
            let placeholder = root.create_child("div");
            placeholder.add_class(PLACEHOLDER_CLASS);
            Ok(RenderOutput::default())
        });
        let component = Component::create(
            runtime,
            ComponentProps::named(name)
                .with_renderer(renderer)
                .with_behaviour(state.clone()),
        );
        *state.owner.borrow_mut() = Rc::downgrade(&component);
        Self { component, state }
    }

    pub fn component(&self) -> &ComponentRef {
        &self.component
    }

    pub fn status(&self) -> LazyStatus {
        self.state.status.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.status() == LazyStatus::Loaded
    }

    /// The resolved child, once loaded.
    pub fn child(&self) -> Option<ComponentRef> {
        self.state.child.borrow().clone()
    }

    /// Number of resolution attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.state.attempts.get()
    }

    /// Run `f` with the child now if loaded, otherwise once it loads.
    pub fn run(&self, f: impl FnOnce(&ComponentRef) + 'static) {
        match self.child() {
            Some(child) if self.is_loaded() => f(&child),
            _ => self.state.on_load.borrow_mut().push(Box::new(f)),
        }
    }

    /// Start resolving now rather than waiting for render or show.
    pub fn load(&self) {
        self.state.load();
    }
}
