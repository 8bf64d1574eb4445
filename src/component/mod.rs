//! Component - The lifecycle and composition node.
//!
//! A component is created unrendered, renders a root surface into a target
//! element, gets attached to the dispatch registry, composes children through
//! regions, attachments and adopted (managed) children, and is finally
//! disposed. All of its state machines are single threaded and guarded
//! against re-entrance with flags.
//!
//! The implementation is split by concern:
//! - `lifecycle` - render, show/hide, enable/disable, mask, focus, reconfigure
//! - `attach` - attach/detach and parent relationships
//! - `compose` - regions, attachments, containment, broadcast
//! - `dispose` - teardown
//!
//! # Example
//!
//! ```ignore
//! let runtime = Runtime::default();
//! let panel = Component::create(&runtime, ComponentProps::named("Panel").with_renderer(
//!     renderer_fn(|root, cpt| {
//!         let body = root.create_child("div");
//!         cpt.region("body").set_element(&body);
//!         Ok(RenderOutput::default())
//!     }),
//! ));
//! let host = mount_body(&runtime);
//! host.add(panel.clone());
//! panel.region("body").add(Component::create(&runtime, ComponentProps::named("Item")));
//! runtime.run_until_idle();
//! ```

mod attach;
mod behaviour;
mod compose;
mod config;
mod dispose;
mod lifecycle;

pub use behaviour::{Behaviour, ComponentEvent, DefaultBehaviour};
pub use config::{AdornFn, ComponentConfig, ComponentProps};

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::engine::{EventListener, Runtime};
use crate::error::isolate_step;
use crate::events::{HandlerChain, RawEvent, UiEventHandler, router};
use crate::observable::{ListenerId, Notification, NotificationKind, Observable};
use crate::renderer::{Renderer, Selector};
use crate::slots::{AttachmentSlot, Parent, RegionSlot};
use crate::state::{FocusBlurController, FocusHost, ReconfigureScheduler};
use crate::surface::Element;
use crate::types::{ComponentId, DebugFlags, LayoutData, RenderState};

/// Shared handle to a component.
pub type ComponentRef = Rc<Component>;

/// Key under which the renderer's handler is registered.
pub(crate) const ON_RENDER_KEY: &str = "onRender";

type Configurator = Rc<dyn Fn(&Component)>;

// =============================================================================
// Component
// =============================================================================

pub struct Component {
    this: Weak<Component>,
    runtime: Runtime,
    id: ComponentId,
    name: String,
    config: RefCell<ComponentConfig>,
    renderer: RefCell<Option<Rc<dyn Renderer>>>,
    behaviour: Rc<dyn Behaviour>,

    // State
    state: Cell<RenderState>,
    attached: Cell<bool>,
    hidden: Cell<bool>,
    pre_render_hide: Cell<bool>,
    disabled: Cell<bool>,
    masked: Cell<bool>,
    disposed: Cell<bool>,
    reconfigure_suspended: Cell<bool>,
    enable_stack: RefCell<Vec<bool>>,

    // Surface & parent
    root: RefCell<Option<Element>>,
    parent: RefCell<Option<Weak<dyn Parent>>>,
    test_id_cache: RefCell<Option<String>>,
    layout_data: RefCell<Option<LayoutData>>,

    // Children
    regions: RefCell<Vec<Rc<RegionSlot>>>,
    attachments: RefCell<Vec<Rc<AttachmentSlot>>>,
    managed: RefCell<Vec<ComponentRef>>,
    reused: RefCell<Vec<ComponentRef>>,

    // Events
    handlers: HandlerChain,
    configurators: RefCell<Vec<Configurator>>,
    selector: RefCell<Option<Selector>>,
    notifications: Rc<Observable<Notification>>,
    inbound: Rc<Observable<ComponentEvent>>,
    window_resize: Cell<Option<ListenerId>>,
    window_scroll: Cell<Option<ListenerId>>,

    focus: FocusBlurController,
    reconfigure: ReconfigureScheduler,
}

impl Component {
    /// Create an unrendered component.
    pub fn create(runtime: &Runtime, props: ComponentProps) -> ComponentRef {
        let id = runtime.next_component_id();
        let focus = FocusBlurController::new(runtime);
        let component = Rc::new_cyclic(|this: &Weak<Component>| {
            let host: Weak<dyn FocusHost> = this.clone();
            focus.set_host(host);
            Component {
                this: this.clone(),
                runtime: runtime.clone(),
                id,
                name: props.name,
                config: RefCell::new(props.config),
                renderer: RefCell::new(props.renderer),
                behaviour: props.behaviour,
                state: Cell::new(RenderState::Pending),
                attached: Cell::new(false),
                hidden: Cell::new(false),
                pre_render_hide: Cell::new(false),
                disabled: Cell::new(false),
                masked: Cell::new(false),
                disposed: Cell::new(false),
                reconfigure_suspended: Cell::new(false),
                enable_stack: RefCell::new(Vec::new()),
                root: RefCell::new(None),
                parent: RefCell::new(None),
                test_id_cache: RefCell::new(None),
                layout_data: RefCell::new(None),
                regions: RefCell::new(Vec::new()),
                attachments: RefCell::new(Vec::new()),
                managed: RefCell::new(Vec::new()),
                reused: RefCell::new(Vec::new()),
                handlers: HandlerChain::new(),
                configurators: RefCell::new(Vec::new()),
                selector: RefCell::new(None),
                notifications: Rc::new(Observable::new()),
                inbound: Rc::new(Observable::new()),
                window_resize: Cell::new(None),
                window_scroll: Cell::new(None),
                focus: focus.clone(),
                reconfigure: ReconfigureScheduler::new(),
            }
        });
        if runtime.is_debug(DebugFlags::LIFECYCLE) {
            tracing::debug!(component = %component, "created");
        }
        component
    }

    /// Shorthand for a component with default props and the given name.
    pub fn named(runtime: &Runtime, name: impl Into<String>) -> ComponentRef {
        Self::create(runtime, ComponentProps::named(name))
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn config(&self) -> Ref<'_, ComponentConfig> {
        self.config.borrow()
    }

    pub fn update_config(&self, f: impl FnOnce(&mut ComponentConfig)) {
        f(&mut self.config.borrow_mut());
    }

    pub fn set_renderer(&self, renderer: Option<Rc<dyn Renderer>>) {
        *self.renderer.borrow_mut() = renderer;
    }

    pub fn behaviour(&self) -> Rc<dyn Behaviour> {
        self.behaviour.clone()
    }

    pub fn state(&self) -> RenderState {
        self.state.get()
    }

    /// The root surface; present from the start of rendering until dispose.
    pub fn root(&self) -> Option<Element> {
        self.root.borrow().clone()
    }

    pub fn is_rendered(&self) -> bool {
        self.root.borrow().is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    /// Hidden, or asked to hide before rendering.
    pub fn is_hidden(&self) -> bool {
        self.hidden.get() || self.pre_render_hide.get()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    pub fn is_masked(&self) -> bool {
        self.masked.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Id assigned to the root surface.
    pub fn element_id(&self) -> String {
        self.config
            .borrow()
            .element_id
            .clone()
            .unwrap_or_else(|| format!("cpt{}", self.id))
    }

    pub fn parent(&self) -> Option<Rc<dyn Parent>> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub fn layout_data(&self) -> Option<LayoutData> {
        self.layout_data.borrow().clone()
    }

    pub fn set_layout_data(&self, data: Option<LayoutData>) {
        *self.layout_data.borrow_mut() = data;
    }

    /// Named elements returned by the last render.
    pub fn selector(&self) -> Option<Selector> {
        self.selector.borrow().clone()
    }

    pub fn focus_controller(&self) -> &FocusBlurController {
        &self.focus
    }

    pub fn reconfigure_scheduler(&self) -> &ReconfigureScheduler {
        &self.reconfigure
    }

    pub fn handlers(&self) -> &HandlerChain {
        &self.handlers
    }

    // -------------------------------------------------------------------------
    // Notifications
    // -------------------------------------------------------------------------

    /// Outbound lifecycle notifications.
    pub fn notifications(&self) -> &Rc<Observable<Notification>> {
        &self.notifications
    }

    /// Inbound component events (broadcasts reaching this component).
    pub fn inbound(&self) -> &Rc<Observable<ComponentEvent>> {
        &self.inbound
    }

    pub fn on_notification(&self, listener: impl Fn(&Notification) + 'static) -> ListenerId {
        self.notifications.add_listener(listener)
    }

    pub(crate) fn notify(&self, kind: NotificationKind) {
        self.notifications.fire(&Notification::new(self.id, kind));
    }

    pub(crate) fn trace(&self, flag: DebugFlags, what: &str) {
        if self.runtime.is_debug(flag) {
            tracing::debug!(component = %self, "{what}");
        }
    }

    // -------------------------------------------------------------------------
    // Handlers
    // -------------------------------------------------------------------------

    /// Register a UI event handler. A `key` replaces every handler previously
    /// registered under it; `priority` puts the handler first.
    pub fn register_event_handler(
        &self,
        handler: Rc<dyn UiEventHandler>,
        key: Option<&str>,
        priority: bool,
    ) -> bool {
        let added = self.handlers.register(handler.clone(), key, priority);
        if added && self.is_rendered() {
            if let Some(root) = self.root() {
                if handler.capabilities().contains(crate::types::Capabilities::SELECTABLE) {
                    handler.select(&root, self.selector.borrow().as_ref());
                }
            }
        }
        added
    }

    pub fn remove_event_handler(&self, handler: &Rc<dyn UiEventHandler>) -> bool {
        self.handlers.remove(handler)
    }

    /// Run `f` after every render, and right away if already rendered.
    pub fn configure_on_render(&self, f: impl Fn(&Component) + 'static) {
        let f: Configurator = Rc::new(f);
        self.configurators.borrow_mut().push(f.clone());
        if self.is_rendered() {
            isolate_step("configure_on_render", self, || f(self));
        }
    }

    // -------------------------------------------------------------------------
    // Test identifiers
    // -------------------------------------------------------------------------

    /// Parent's test id and own test id joined with `.`.
    ///
    /// The own part is the configured test id or the lowercased name. Only
    /// cached while parented, since reparenting changes the prefix.
    pub fn test_id(&self) -> String {
        if let Some(cached) = self.test_id_cache.borrow().clone() {
            return cached;
        }
        let own = self
            .config
            .borrow()
            .test_id
            .clone()
            .unwrap_or_else(|| self.name.to_lowercase());
        let parent = self.parent();
        let id = match parent.as_ref().and_then(|p| p.test_id()) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}.{own}"),
            _ => own,
        };
        if parent.is_some() {
            *self.test_id_cache.borrow_mut() = Some(id.clone());
        }
        id
    }

    /// Test id with `-ext` appended.
    pub fn build_test_id(&self, ext: &str) -> String {
        format!("{}-{}", self.test_id(), ext)
    }

    fn apply_test_attributes(&self) {
        if !self.runtime.is_test_mode() {
            return;
        }
        if let Some(root) = self.root() {
            root.set_attribute("test-id", self.test_id());
            root.set_attribute("test-cpt", self.name.clone());
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state.get())
            .field("attached", &self.attached.get())
            .field("disposed", &self.disposed.get())
            .finish()
    }
}

// =============================================================================
// Host contracts
// =============================================================================

impl EventListener for Component {
    fn on_browser_event(&self, event: &RawEvent) {
        if self.disposed.get() {
            return;
        }
        router::route(self, event);
    }
}

impl FocusHost for Component {
    fn focus_gained(&self) {
        self.notify(NotificationKind::Focus);
    }

    fn focus_lost(&self) {
        self.notify(NotificationKind::Blur);
    }

    fn apply_focus_style(&self, focused: bool) {
        if let Some(root) = self.root() {
            if focused {
                root.add_class("focused");
            } else {
                root.remove_class("focused");
            }
        }
    }
}

/// Components host their adopted (managed) children.
impl Parent for Component {
    fn orphan_child(&self, child: &Component) {
        let removed = {
            let mut managed = self.managed.borrow_mut();
            managed
                .iter()
                .position(|c| std::ptr::eq(c.as_ref(), child))
                .map(|idx| managed.remove(idx))
        };
        if let Some(removed) = removed {
            self.notify(NotificationKind::ChildRemoved(removed.id()));
        }
    }

    fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn test_id(&self) -> Option<String> {
        Some(Component::test_id(self))
    }
}
