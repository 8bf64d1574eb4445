//! Render, display state, focus and reconfigure.

use super::{Component, ComponentConfig, ON_RENDER_KEY};
use crate::error::{ComponentError, isolate, isolate_step, report};
use crate::observable::{NotificationKind, WindowEvent};
use crate::renderer::RenderOutput;
use crate::surface::Element;
use crate::types::{BoxSize, Capabilities, DebugFlags, RenderState};

// =============================================================================
// Render
// =============================================================================

impl Component {
    /// Render into `target` at `index` (negative appends).
    ///
    /// An already rendered component only has its root relocated.
    pub fn render(&self, target: &Element, index: isize) {
        if self.disposed.get() {
            report(&ComponentError::Disposed {
                component: self.to_string(),
                action: "rendered",
            });
            return;
        }
        if let Some(root) = self.root() {
            target.insert_child(&root, index);
            return;
        }
        let _keep_alive = self.this.upgrade();
        self.trace(DebugFlags::RENDER, "render");

        self.state.set(RenderState::Started);
        let root = self.create_root();
        target.insert_child(&root, index);
        *self.root.borrow_mut() = Some(root.clone());
        self.draw(&root);
    }

    /// Dispose children (except reused ones), clear the root and render again.
    /// Does nothing when not rendered.
    pub fn rerender(&self) {
        let Some(root) = self.root() else { return };
        if self.disposed.get() {
            return;
        }
        let _keep_alive = self.this.upgrade();
        self.trace(DebugFlags::RENDER, "rerender");

        let keep: Vec<_> = self.reused.borrow().iter().map(|c| c.id()).collect();
        self.dispose_children(&keep);
        root.remove_all_children();
        self.state.set(RenderState::Started);
        self.draw(&root);
    }

    /// Replace the configuration, then [`rerender`](Self::rerender).
    pub fn rerender_with(&self, config: ComponentConfig) {
        *self.config.borrow_mut() = config;
        self.rerender();
    }

    fn create_root(&self) -> Element {
        let (tag, styles, adorn) = {
            let config = self.config.borrow();
            (config.root_tag.clone(), config.styles.clone(), config.adorn.clone())
        };
        let root = self.runtime.document().create_element(tag);
        for style in &styles {
            root.add_class(style);
        }
        if let Some(adorn) = adorn {
            isolate_step("adorn", self, || adorn(&root));
        }
        root
    }

    /// STARTED -> DRAWN, then the post-render sequence.
    fn draw(&self, root: &Element) {
        let behaviour = self.behaviour();
        isolate_step("on_before_render", self, || behaviour.on_before_render(self));

        let renderer = self.renderer.borrow().clone();
        let output = match renderer {
            Some(renderer) => isolate("render", self, || renderer.render(root, self)),
            None => {
                tracing::debug!(component = %self, "no renderer, root left empty");
                None
            }
        };
        self.apply_render_output(root, output.unwrap_or_default());

        let configurators = self.configurators.borrow().clone();
        for configurator in configurators {
            isolate_step("configure_on_render", self, || configurator(self));
        }

        self.state.set(RenderState::Drawn);
        self.post_render(root);
    }

    fn apply_render_output(&self, root: &Element, output: RenderOutput) {
        let RenderOutput {
            handler,
            selector,
            adopt,
        } = output;
        if let Some(handler) = handler {
            self.handlers.register(handler, Some(ON_RENDER_KEY), false);
        }
        *self.selector.borrow_mut() = selector.clone();
        self.handlers.select_all(root, selector.as_ref());
        for child in adopt {
            self.adopt(child);
        }
    }

    fn post_render(&self, root: &Element) {
        root.set_id(self.element_id());

        if self.pre_render_hide.replace(false) {
            self.hide();
        }

        let behaviour = self.behaviour();
        isolate("on_after_render", self, || behaviour.on_after_render(self));

        if self.runtime.is_debug(DebugFlags::NAME) {
            root.set_attribute("component", self.to_string());
        }
        if self.runtime.is_debug(DebugFlags::OUTLINE) {
            root.set_attribute("style", "border: 1px dashed #eee");
        }

        if self.focus.focus_el().is_none() {
            self.focus.generate_focus_el(root);
        }
        if self.disabled.get() {
            self.apply_disabled(true);
        }
        if self.masked.get() {
            root.add_class("masked");
        }

        self.notify(NotificationKind::Render);
        self.reconfigure();
        self.notify(NotificationKind::RenderConfigured);
        self.state.set(RenderState::Configured);
        isolate_step("on_after_render_and_reconfigure", self, || {
            behaviour.on_after_render_and_reconfigure(self)
        });

        self.apply_test_attributes();
    }

    // =========================================================================
    // Show / hide
    // =========================================================================

    pub fn hide(&self) {
        let Some(root) = self.root() else {
            self.pre_render_hide.set(true);
            return;
        };
        if self.hidden.replace(true) {
            return;
        }
        root.set_displayed(false);
        let behaviour = self.behaviour();
        isolate_step("on_hide", self, || behaviour.on_hide(self));
        self.notify(NotificationKind::Resize);
        self.notify(NotificationKind::Hide);
    }

    /// Show the component. Before rendering this only cancels a pending hide.
    pub fn show(&self) {
        let Some(root) = self.root() else {
            self.hidden.set(false);
            self.pre_render_hide.set(false);
            return;
        };
        if !self.hidden.replace(false) {
            return;
        }
        root.set_displayed(true);
        let behaviour = self.behaviour();
        isolate_step("on_show", self, || behaviour.on_show(self));
        self.notify(NotificationKind::Resize);
        self.notify(NotificationKind::Show);
    }

    // =========================================================================
    // Enable / disable / mask
    // =========================================================================

    pub fn enable(&self) {
        if !self.disabled.replace(false) {
            return;
        }
        if self.is_rendered() {
            self.apply_disabled(false);
        }
        let behaviour = self.behaviour();
        isolate_step("on_enable", self, || behaviour.on_enable(self));
        self.notify(NotificationKind::Enable);
    }

    pub fn disable(&self) {
        if self.disabled.replace(true) {
            return;
        }
        if self.is_rendered() {
            self.apply_disabled(true);
        }
        let behaviour = self.behaviour();
        isolate_step("on_disable", self, || behaviour.on_disable(self));
        self.notify(NotificationKind::Disable);
    }

    pub fn set_enabled(&self, enabled: bool) {
        if enabled {
            self.enable();
        } else {
            self.disable();
        }
    }

    /// Remember the current enabled state.
    pub fn push_enable_state(&self) {
        self.enable_stack.borrow_mut().push(!self.disabled.get());
    }

    /// Restore the most recently pushed enabled state (no-op if none).
    pub fn pop_enable_state(&self) {
        let popped = self.enable_stack.borrow_mut().pop();
        if let Some(enabled) = popped {
            self.set_enabled(enabled);
        }
    }

    fn apply_disabled(&self, disabled: bool) {
        let Some(root) = self.root() else { return };
        if disabled {
            root.add_class("disabled");
            self.focus.disable();
        } else {
            root.remove_class("disabled");
            self.focus.enable();
        }
    }

    pub fn mask(&self) {
        self.masked.set(true);
        if let Some(root) = self.root() {
            root.add_class("masked");
        }
    }

    pub fn unmask(&self) {
        self.masked.set(false);
        if let Some(root) = self.root() {
            root.remove_class("masked");
        }
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Give the component focus (deferred to the next turn by default).
    pub fn focus(&self) {
        if self.focus.has_focus() || self.focus.is_focus_scheduled() {
            return;
        }
        self.focus.focus();
        self.notify(NotificationKind::Focus);
    }

    pub fn blur(&self) {
        if !self.focus.has_focus() && !self.focus.is_focus_scheduled() {
            return;
        }
        self.focus.blur();
        self.notify(NotificationKind::Blur);
    }

    pub fn has_focus(&self) -> bool {
        self.focus.has_focus()
    }

    /// Put `el` under focus management.
    pub fn manage_focus(&self, el: &Element) {
        self.focus.manage_focus_el(el);
    }

    /// Focus observed on the surface that no handler claimed.
    pub(crate) fn on_focus_ui(&self) {
        if self.focus.sync_focus(true) {
            self.notify(NotificationKind::Focus);
        }
    }

    pub(crate) fn on_blur_ui(&self) {
        if self.focus.sync_focus(false) {
            self.notify(NotificationKind::Blur);
        }
    }

    // =========================================================================
    // Reconfigure
    // =========================================================================

    /// Lay out regions now, and resize slots on the next turn.
    ///
    /// Ignored while a reconfigure is running, before rendering and after
    /// dispose. A later call supersedes a pending deferred pass.
    pub fn reconfigure(&self) {
        if self.disposed.get() || self.reconfigure_suspended.get() || !self.is_rendered() {
            return;
        }
        let weak = self.this.clone();
        self.reconfigure.trigger(
            self.runtime.scheduler(),
            || self.run_reconfigure(),
            move || {
                if let Some(cpt) = weak.upgrade() {
                    cpt.run_deferred_reconfigure();
                }
            },
        );
    }

    /// Suspend (or resume) reconfiguration.
    pub fn set_reconfigure_suspended(&self, suspended: bool) {
        self.reconfigure_suspended.set(suspended);
    }

    fn root_box(&self) -> Option<BoxSize> {
        self.root().map(|root| root.client_size())
    }

    fn run_reconfigure(&self) {
        self.trace(DebugFlags::RENDER, "reconfigure");
        let behaviour = self.behaviour();
        isolate_step("on_reconfigure", self, || behaviour.on_reconfigure(self));
        self.notify(NotificationKind::Reconfigure);

        let resized = self.reconfigure.is_resized(self.root_box());
        for region in self.regions() {
            region.layout(resized);
        }
        self.assert_resize();
    }

    fn run_deferred_reconfigure(&self) {
        if self.disposed.get() || !self.is_rendered() {
            return;
        }
        let behaviour = self.behaviour();
        for attachment in self.attachments() {
            isolate_step("on_resize_attachment", self, || {
                behaviour.on_resize_attachment(self, &attachment)
            });
        }
        for region in self.regions() {
            isolate_step("on_resize_region", self, || behaviour.on_resize_region(self, &region));
        }
        isolate_step("on_deferred_reconfigure", self, || {
            behaviour.on_deferred_reconfigure(self)
        });
        self.assert_resize();
    }

    /// Fire a resize notification if the root box changed.
    pub fn assert_resize(&self) {
        if self.reconfigure.assert_resize(self.root_box()) {
            self.notify(NotificationKind::Resize);
        }
    }

    // =========================================================================
    // Window monitoring
    // =========================================================================

    pub fn set_monitor_window_resize(&self, monitor: bool) {
        self.config.borrow_mut().monitor_window_resize = monitor;
        if !self.attached.get() {
            return;
        }
        if monitor {
            self.install_window_monitors();
        } else if let Some(id) = self.window_resize.take() {
            self.runtime.window().remove_listener(id);
        }
    }

    pub fn set_monitor_window_scroll(&self, monitor: bool) {
        self.config.borrow_mut().monitor_window_scroll = monitor;
        if !self.attached.get() {
            return;
        }
        if monitor {
            self.install_window_monitors();
        } else if let Some(id) = self.window_scroll.take() {
            self.runtime.window().remove_listener(id);
        }
    }

    /// Register the configured window listeners (not already registered).
    /// Hooks are delivered a turn after the window event.
    pub(crate) fn install_window_monitors(&self) {
        let (resize, scroll) = {
            let config = self.config.borrow();
            (config.monitor_window_resize, config.monitor_window_scroll)
        };
        let window = self.runtime.window();
        if resize && self.window_resize.get().is_none() {
            let weak = self.this.clone();
            let scheduler = self.runtime.scheduler().clone();
            let id = window.add_listener(move |event| {
                let WindowEvent::Resize(size) = *event else { return };
                let weak = weak.clone();
                scheduler.defer(move || {
                    if let Some(cpt) = weak.upgrade() {
                        let behaviour = cpt.behaviour();
                        isolate_step("on_window_resize", cpt.as_ref(), || {
                            behaviour.on_window_resize(&cpt, size)
                        });
                    }
                });
            });
            self.window_resize.set(Some(id));
        }
        if scroll && self.window_scroll.get().is_none() {
            let weak = self.this.clone();
            let scheduler = self.runtime.scheduler().clone();
            let id = window.add_listener(move |event| {
                let WindowEvent::Scroll { x, y } = *event else { return };
                let weak = weak.clone();
                scheduler.defer(move || {
                    if let Some(cpt) = weak.upgrade() {
                        let size = cpt.runtime().window().size();
                        let behaviour = cpt.behaviour();
                        isolate_step("on_window_scroll", cpt.as_ref(), || {
                            behaviour.on_window_scroll(&cpt, size, x, y)
                        });
                    }
                });
            });
            self.window_scroll.set(Some(id));
        }
    }

    pub(crate) fn remove_window_monitors(&self) {
        let window = self.runtime.window();
        if let Some(id) = self.window_resize.take() {
            window.remove_listener(id);
        }
        if let Some(id) = self.window_scroll.take() {
            window.remove_listener(id);
        }
    }

    // =========================================================================
    // Activation
    // =========================================================================

    /// Make this the active content: navigation aware behaviours are told they
    /// were navigated to, otherwise activate aware ones are activated.
    pub fn activate(&self) {
        let behaviour = self.behaviour();
        let caps = behaviour.capabilities();
        if caps.contains(Capabilities::NAVIGATION_AWARE) {
            isolate_step("on_navigate_to", self, || behaviour.on_navigate_to(self));
        } else if caps.contains(Capabilities::ACTIVATE_AWARE) {
            isolate_step("on_activated", self, || behaviour.on_activated(self));
        }
        self.notify(NotificationKind::Activate);
    }
}
