//! Behaviour - Overridable hooks of a component.
//!
//! Every hook has a no-op default, so a behaviour only implements what it
//! cares about. Hooks are always called through the isolation boundary: a
//! failing or panicking hook is logged and the lifecycle carries on.

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use super::Component;
use crate::error::HookResult;
use crate::events::UiEvent;
use crate::slots::{AttachmentSlot, RegionSlot};
use crate::types::{BoxSize, Capabilities, ComponentId};

// =============================================================================
// Component events (broadcast)
// =============================================================================

/// A message broadcast down the component tree.
pub struct ComponentEvent {
    source: ComponentId,
    message: Rc<dyn Any>,
    depth: Cell<usize>,
}

impl ComponentEvent {
    pub fn new(source: ComponentId, message: Rc<dyn Any>) -> Self {
        Self {
            source,
            message,
            depth: Cell::new(0),
        }
    }

    pub fn source(&self) -> ComponentId {
        self.source
    }

    pub fn message(&self) -> &dyn Any {
        self.message.as_ref()
    }

    pub fn downcast<T: 'static>(&self) -> Option<&T> {
        self.message.downcast_ref::<T>()
    }

    /// Distance from the broadcasting component (children are at depth 1).
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub(crate) fn set_depth(&self, depth: usize) {
        self.depth.set(depth);
    }
}

// =============================================================================
// Behaviour
// =============================================================================

#[allow(unused_variables)]
pub trait Behaviour {
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    // Render ------------------------------------------------------------------

    /// Before the renderer runs (root exists, still empty).
    fn on_before_render(&self, cpt: &Component) {}

    /// After the renderer and configurators, before the render notification.
    fn on_after_render(&self, cpt: &Component) -> HookResult {
        Ok(())
    }

    /// After the initial reconfigure of a render pass.
    fn on_after_render_and_reconfigure(&self, cpt: &Component) {}

    // Visibility & state --------------------------------------------------------

    fn on_show(&self, cpt: &Component) {}

    fn on_hide(&self, cpt: &Component) {}

    fn on_enable(&self, cpt: &Component) {}

    fn on_disable(&self, cpt: &Component) {}

    // Events ----------------------------------------------------------------------

    /// Consulted after the handler chain. Return true to claim the event.
    fn handle_event(&self, cpt: &Component, event: &UiEvent<'_>) -> bool {
        false
    }

    /// Consulted last, after the focus controller.
    fn alternative_handle_event(&self, cpt: &Component, event: &UiEvent<'_>) -> bool {
        false
    }

    /// A broadcast reached this component. Return true to pass it on to the
    /// component's own children.
    fn on_component_event(&self, cpt: &Component, event: &ComponentEvent) -> bool {
        true
    }

    // Attach ------------------------------------------------------------------------

    fn on_attach(&self, cpt: &Component) {}

    fn on_detach(&self, cpt: &Component) {}

    // Reconfigure ---------------------------------------------------------------------

    /// Immediate phase of a reconfigure, before regions lay out.
    fn on_reconfigure(&self, cpt: &Component) {}

    /// Deferred phase of a reconfigure, after slots were resized.
    fn on_deferred_reconfigure(&self, cpt: &Component) {}

    fn on_resize_region(&self, cpt: &Component, region: &RegionSlot) {}

    fn on_resize_attachment(&self, cpt: &Component, attachment: &AttachmentSlot) {}

    fn on_region_layout_executed(&self, cpt: &Component, region: &RegionSlot) {}

    // Window --------------------------------------------------------------------------

    /// The window was resized (delivered a turn after the resize).
    fn on_window_resize(&self, cpt: &Component, size: BoxSize) {}

    fn on_window_scroll(&self, cpt: &Component, size: BoxSize, x: i32, y: i32) {}

    // Activation ------------------------------------------------------------------------

    fn on_activated(&self, cpt: &Component) {}

    fn on_navigate_to(&self, cpt: &Component) {}

    // Disposal ----------------------------------------------------------------------------

    /// Last step of dispose.
    fn on_dispose(&self, cpt: &Component) -> HookResult {
        Ok(())
    }
}

/// Behaviour with every hook left at its default.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBehaviour;

impl Behaviour for DefaultBehaviour {}
