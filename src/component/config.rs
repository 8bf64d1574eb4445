//! Component configuration - Props passed at creation.

use std::fmt;
use std::rc::Rc;

use super::behaviour::{Behaviour, DefaultBehaviour};
use crate::renderer::Renderer;
use crate::surface::Element;

/// Hook run against the root surface right after it is created.
pub type AdornFn = Rc<dyn Fn(&Element)>;

// =============================================================================
// Component Config
// =============================================================================

/// Per-component settings. Every field has a sensible default.
///
/// ```ignore
/// let config = ComponentConfig {
///     test_id: Some("login".into()),
///     styles: vec!["panel".into()],
///     ..Default::default()
/// };
/// ```
#[derive(Clone)]
pub struct ComponentConfig {
    /// Own part of the test identifier (defaults to the lowercased name).
    pub test_id: Option<String>,
    /// Classes added to the root surface.
    pub styles: Vec<String>,
    /// Extra decoration of the root surface.
    pub adorn: Option<AdornFn>,
    /// Still route events while disabled.
    pub dispatch_when_disabled: bool,
    /// Reconfigure when region children are added or removed.
    pub layout_on_change: bool,
    pub monitor_window_resize: bool,
    pub monitor_window_scroll: bool,
    /// Tag of the root surface.
    pub root_tag: String,
    /// Id given to the root surface (generated when absent).
    pub element_id: Option<String>,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            test_id: None,
            styles: Vec::new(),
            adorn: None,
            dispatch_when_disabled: false,
            layout_on_change: true,
            monitor_window_resize: false,
            monitor_window_scroll: false,
            root_tag: "div".to_string(),
            element_id: None,
        }
    }
}

impl fmt::Debug for ComponentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentConfig")
            .field("test_id", &self.test_id)
            .field("styles", &self.styles)
            .field("adorn", &self.adorn.is_some())
            .field("dispatch_when_disabled", &self.dispatch_when_disabled)
            .field("layout_on_change", &self.layout_on_change)
            .field("monitor_window_resize", &self.monitor_window_resize)
            .field("monitor_window_scroll", &self.monitor_window_scroll)
            .field("root_tag", &self.root_tag)
            .field("element_id", &self.element_id)
            .finish()
    }
}

// =============================================================================
// Component Props
// =============================================================================

/// Everything needed to create a component.
pub struct ComponentProps {
    /// Display name, also the default test id.
    pub name: String,
    pub config: ComponentConfig,
    /// Without a renderer the root surface stays empty.
    pub renderer: Option<Rc<dyn Renderer>>,
    pub behaviour: Rc<dyn Behaviour>,
}

impl Default for ComponentProps {
    fn default() -> Self {
        Self {
            name: "Component".to_string(),
            config: ComponentConfig::default(),
            renderer: None,
            behaviour: Rc::new(DefaultBehaviour),
        }
    }
}

impl ComponentProps {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_config(mut self, config: ComponentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_renderer(mut self, renderer: Rc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_behaviour(mut self, behaviour: Rc<dyn Behaviour>) -> Self {
        self.behaviour = behaviour;
        self
    }
}
