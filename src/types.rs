//! Core types shared across the kernel.
//!
//! - [`RenderState`] - render progression of a component
//! - [`ComponentId`] - stable identity assigned by the runtime registry
//! - [`DebugFlags`] - runtime debug modes (bitflags)
//! - [`Capabilities`] - optional capabilities advertised by behaviours and handlers
//! - [`BoxSize`] - client box of a surface

use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

// =============================================================================
// Render State
// =============================================================================

/// Render progression of a component.
///
/// Transitions are monotonic except for a full re-render, which restarts the
/// build path from `Started`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum RenderState {
    /// Created, nothing drawn yet.
    #[default]
    Pending,
    /// Root surface created, renderer running.
    Started,
    /// Renderer finished, post-render hooks running.
    Drawn,
    /// Initial reconfigure complete.
    Configured,
}

impl RenderState {
    /// True once the renderer has completed at least once.
    pub fn is_drawn(self) -> bool {
        self >= RenderState::Drawn
    }
}

// =============================================================================
// Component Identity
// =============================================================================

/// Monotonic creation-order identity of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(pub u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Debug Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Debug modes held by the runtime registry.
    ///
    /// Combine with bitwise OR: `DebugFlags::RENDER | DebugFlags::LIFECYCLE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DebugFlags: u8 {
        /// Trace rendering activity.
        const RENDER = 1 << 1;
        /// Trace lifecycle events (attach, detach, dispose).
        const LIFECYCLE = 1 << 2;
        /// Stamp component names onto root surfaces.
        const NAME = 1 << 3;
        /// Outline root surfaces.
        const OUTLINE = 1 << 4;
    }
}

impl FromStr for DebugFlags {
    type Err = String;

    /// Parses a comma separated list such as `render,lifecycle`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = DebugFlags::empty();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            flags |= match part.to_ascii_lowercase().as_str() {
                "render" => DebugFlags::RENDER,
                "lifecycle" => DebugFlags::LIFECYCLE,
                "name" => DebugFlags::NAME,
                "outline" => DebugFlags::OUTLINE,
                "all" => DebugFlags::all(),
                other => return Err(format!("unknown debug mode `{other}`")),
            };
        }
        Ok(flags)
    }
}

// =============================================================================
// Capabilities (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Optional capabilities a behaviour or event handler advertises.
    ///
    /// Hosts query these instead of probing concrete types.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Capabilities: u8 {
        /// Wants `dispose()` when removed from its owner.
        const DISPOSABLE = 1 << 0;
        /// Wants `select()` with the root surface and selector after each render.
        const SELECTABLE = 1 << 1;
        /// Wants `on_navigate_to()` when it becomes the active content.
        const NAVIGATION_AWARE = 1 << 2;
        /// Wants `on_activated()` when it becomes the active content.
        const ACTIVATE_AWARE = 1 << 3;
    }
}

// =============================================================================
// Box Size
// =============================================================================

/// Client box of a surface in host units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoxSize {
    pub width: i32,
    pub height: i32,
}

impl BoxSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Opaque layout data attached to a component by the region that holds it.
pub type LayoutData = Rc<dyn Any>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_state_ordering() {
        assert!(RenderState::Pending < RenderState::Started);
        assert!(RenderState::Started < RenderState::Drawn);
        assert!(RenderState::Drawn < RenderState::Configured);
        assert!(!RenderState::Started.is_drawn());
        assert!(RenderState::Configured.is_drawn());
    }

    #[test]
    fn test_debug_flags_parse() {
        let flags: DebugFlags = "render, Lifecycle".parse().unwrap();
        assert_eq!(flags, DebugFlags::RENDER | DebugFlags::LIFECYCLE);
        assert_eq!("".parse::<DebugFlags>().unwrap(), DebugFlags::empty());
        assert!("bogus".parse::<DebugFlags>().is_err());
    }
}
