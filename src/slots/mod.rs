//! Composition slots - Where child components live.
//!
//! - [`RegionSlot`] - ordered, laid out container of children
//! - [`AttachmentSlot`] - single child mounted on a target element
//!
//! A child holds a non-owning reference to the [`Parent`] that owns it and
//! has exactly one parent at a time: reparenting always orphans first.

mod attachment;
mod region;

pub use attachment::AttachmentSlot;
pub use region::RegionSlot;

use crate::component::Component;

/// Host contract for anything that owns child components.
pub trait Parent {
    /// Forget `child` (called by the child when it leaves).
    fn orphan_child(&self, child: &Component);

    /// Whether children should be attached.
    fn is_attached(&self) -> bool;

    /// Test identifier children prefix theirs with.
    fn test_id(&self) -> Option<String>;
}
