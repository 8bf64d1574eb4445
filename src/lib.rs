//! # spark-ui-core
//!
//! Component lifecycle and composition kernel for Spark UI.
//!
//! ## Architecture
//!
//! Components are reference counted nodes rendered into a retained element
//! tree. Each component runs a handful of small state machines (render
//! progression, attach/detach, focus/blur, reconfigure) on a single thread,
//! driven by a cooperative scheduler with a virtual clock.
//!
//! ```text
//! terminal input → RawEvent → DispatchRegistry → Component → regions / handlers / focus
//! structural change → RegionSlot → reconfigure → Layout (now) + slot resize (next turn)
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (RenderState, ComponentId, DebugFlags, Capabilities)
//! - [`engine`] - Runtime, scheduler, dispatch registry, window
//! - [`surface`] - In-memory host elements and document
//! - [`events`] - Raw/UI events, handler chain, router, terminal input
//! - [`state`] - Focus/blur controller and reconfigure scheduler
//! - [`component`] - The component node and its behaviour hooks
//! - [`slots`] - Region and attachment composition slots
//! - [`layout`] - Layout trait and the default flow layout
//! - [`renderer`] - Renderer trait and render output
//! - [`pipeline`] - Root binding, event loop, lazy children

pub mod component;
pub mod engine;
pub mod error;
pub mod events;
pub mod layout;
pub mod observable;
pub mod pipeline;
pub mod renderer;
pub mod slots;
pub mod state;
pub mod surface;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use component::{
    Behaviour, Component, ComponentConfig, ComponentEvent, ComponentProps, ComponentRef,
    DefaultBehaviour,
};

pub use engine::{DispatchRegistry, EventListener, Runtime, RuntimeConfig, Scheduler, Window};

pub use error::{ComponentError, HookError, HookResult};

pub use events::{
    EventType, Modifiers, RawEvent, UiEvent, UiEventHandler, handlers::handler_fn,
};

pub use layout::{FlowLayout, Layout};

pub use observable::{ListenerId, Notification, NotificationKind, Observable, WindowEvent};

pub use pipeline::{LazyChild, LazyStatus, Resolution, RootBinding, mount, mount_body};

pub use renderer::{RenderOutput, Renderer, Selector, renderer_fn};

pub use slots::{AttachmentSlot, Parent, RegionSlot};

pub use state::{FocusBlurController, FocusHost, ReconfigureScheduler};

pub use surface::{Document, Element};
