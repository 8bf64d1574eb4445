//! Renderer - Produces the content of a component's root surface.
//!
//! A renderer runs once per render pass (and again on every rerender). It
//! fills the root element and may hand back:
//! - an event handler, registered on the component under the `onRender` key
//!   (so a rerender replaces it)
//! - a [`Selector`] of named elements, passed to selectable handlers
//! - components to adopt as managed children
//!
//! # Example
//!
//! ```ignore
//! let renderer = renderer_fn(|root, cpt| {
//!     let body = root.create_child("div");
//!     cpt.region("body").set_element(&body);
//!     Ok(RenderOutput::default().with_selector(Selector::new().with("body", &body)))
//! });
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::component::{Component, ComponentRef};
use crate::error::HookResult;
use crate::events::UiEventHandler;
use crate::surface::Element;

// =============================================================================
// Selector
// =============================================================================

/// Named elements picked out of a rendered surface.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    elements: BTreeMap<String, Element>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, el: &Element) -> Self {
        self.insert(name, el);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, el: &Element) {
        self.elements.insert(name.into(), el.clone());
    }

    pub fn get(&self, name: &str) -> Option<&Element> {
        self.elements.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

// =============================================================================
// Render output
// =============================================================================

/// What a renderer hands back besides the surface content.
#[derive(Default)]
pub struct RenderOutput {
    pub handler: Option<Rc<dyn UiEventHandler>>,
    pub selector: Option<Selector>,
    pub adopt: Vec<ComponentRef>,
}

impl RenderOutput {
    pub fn with_handler(mut self, handler: Rc<dyn UiEventHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Adopt `child` as a managed child of the rendered component.
    pub fn adopt(mut self, child: ComponentRef) -> Self {
        self.adopt.push(child);
        self
    }
}

// =============================================================================
// Renderer
// =============================================================================

pub trait Renderer {
    fn render(&self, root: &Element, component: &Component) -> HookResult<RenderOutput>;
}

impl<F> Renderer for F
where
    F: Fn(&Element, &Component) -> HookResult<RenderOutput>,
{
    fn render(&self, root: &Element, component: &Component) -> HookResult<RenderOutput> {
        self(root, component)
    }
}

/// Wrap a closure as a shareable renderer.
pub fn renderer_fn(
    f: impl Fn(&Element, &Component) -> HookResult<RenderOutput> + 'static,
) -> Rc<dyn Renderer> {
    Rc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_lookup() {
        let root = Element::div();
        let body = root.create_child("div");
        let selector = Selector::new().with("body", &body);
        assert_eq!(selector.get("body"), Some(&body));
        assert!(selector.get("header").is_none());
        assert_eq!(selector.names().collect::<Vec<_>>(), vec!["body"]);
    }

    #[test]
    fn test_render_output_builder() {
        let output = RenderOutput::default().with_selector(Selector::new());
        assert!(output.selector.is_some());
        assert!(output.handler.is_none());
        assert!(output.adopt.is_empty());
    }
}
