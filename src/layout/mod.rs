//! Layout - Arrangement of a region's children inside its surface.
//!
//! A region owns exactly one layout. The region tells the layout when its
//! children changed (by marking itself dirty) and asks it to lay out during
//! the owner's reconfigure. Events that land inside the region's surface are
//! offered to the layout instead of the owner's handlers.
//!
//! [`FlowLayout`] is the default: it renders (or relocates) each child's root
//! surface into the region in order, attaches them and reconfigures them.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::isolate_step;
use crate::events::UiEvent;
use crate::slots::RegionSlot;
use crate::state::RunningGuard;

// =============================================================================
// Layout trait
// =============================================================================

pub trait Layout {
    /// Bind (or unbind) the region this layout arranges.
    fn set_layout_target(&self, region: Option<Weak<RegionSlot>>);

    /// Lay out the target's children. `force` lays out even when the target
    /// is not dirty. Returns whether a layout pass ran.
    fn layout(&self, force: bool) -> bool;

    /// An event targeted inside the region's surface.
    fn on_browser_event(&self, _event: &UiEvent<'_>) {}

    fn is_running(&self) -> bool {
        false
    }
}

// =============================================================================
// Flow layout
// =============================================================================

/// Places children one after another in insertion order.
#[derive(Default)]
pub struct FlowLayout {
    target: RefCell<Option<Weak<RegionSlot>>>,
    running: Cell<bool>,
    passes: Cell<u32>,
}

impl FlowLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<dyn Layout> {
        Rc::new(Self::new())
    }

    /// Number of layout passes executed so far.
    pub fn passes(&self) -> u32 {
        self.passes.get()
    }

    fn target(&self) -> Option<Rc<RegionSlot>> {
        self.target.borrow().as_ref().and_then(Weak::upgrade)
    }
}

impl Layout for FlowLayout {
    fn set_layout_target(&self, region: Option<Weak<RegionSlot>>) {
        *self.target.borrow_mut() = region;
    }

    fn layout(&self, force: bool) -> bool {
        if self.running.get() {
            return false;
        }
        let Some(region) = self.target() else { return false };
        if force {
            region.mark_dirty();
        }
        let Some(el) = region.element() else { return false };
        if !region.is_dirty() || !region.is_rendered() {
            return false;
        }

        self.running.set(true);
        let _running = RunningGuard::new(&self.running);
        let items = region.items();
        for (idx, item) in items.iter().enumerate() {
            match item.root() {
                Some(root) if root.parent().as_ref() == Some(&el) => {
                    if el.index_of(&root) != Some(idx) {
                        el.insert_child(&root, idx as isize);
                    }
                }
                _ => isolate_step("layout render", item.as_ref(), || {
                    item.render(&el, idx as isize)
                }),
            }
        }
        region.on_layout_executed();
        for item in &items {
            item.reconfigure();
        }
        region.clear_dirty();
        self.passes.set(self.passes.get() + 1);
        true
    }

    fn is_running(&self) -> bool {
        self.running.get()
    }
}
