//! Events - Raw UI events and the routing chain.
//!
//! - [`RawEvent`] - an event as delivered by the host, targeted at an element
//! - [`UiEvent`] - the wrapper handed to handlers while a component routes it
//! - [`handlers`] - the prioritized handler chain
//! - [`router`] - the per-component routing steps
//! - [`input`] - conversion of terminal input into raw events

pub mod handlers;
pub mod input;
pub(crate) mod router;

use std::cell::Cell;

use crate::surface::Element;

pub use handlers::{HandlerChain, UiEventHandler};

// =============================================================================
// TYPES
// =============================================================================

/// Kind of a UI event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    DblClick,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseOver,
    MouseOut,
    Wheel,
    KeyDown,
    KeyUp,
    KeyPress,
    Focus,
    Blur,
    Paste,
    DragStart,
    DragOver,
    DragEnd,
    DragEnter,
    DragLeave,
    Drop,
    Scroll,
    Input,
    Change,
    ContextMenu,
}

impl EventType {
    /// Kinds that keep propagating after a registered handler claims them.
    pub const PROPAGATING: &'static [EventType] = &[
        EventType::KeyPress,
        EventType::KeyDown,
        EventType::KeyUp,
        EventType::Paste,
        EventType::DragStart,
        EventType::DragOver,
        EventType::DragEnd,
        EventType::DragEnter,
        EventType::DragLeave,
        EventType::Drop,
    ];

    pub fn is_key(self) -> bool {
        matches!(self, EventType::KeyDown | EventType::KeyUp | EventType::KeyPress)
    }

    pub fn is_mouse(self) -> bool {
        matches!(
            self,
            EventType::Click
                | EventType::DblClick
                | EventType::MouseDown
                | EventType::MouseUp
                | EventType::MouseMove
                | EventType::MouseOver
                | EventType::MouseOut
                | EventType::Wheel
                | EventType::ContextMenu
        )
    }
}

/// Keyboard modifier state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }

    pub fn shift() -> Self {
        Self { shift: true, ..Self::default() }
    }
}

// =============================================================================
// Raw Event
// =============================================================================

/// An event delivered by the host to a target element.
#[derive(Debug, Clone)]
pub struct RawEvent {
    kind: EventType,
    target: Element,
    key: Option<String>,
    text: Option<String>,
    position: Option<(i32, i32)>,
    modifiers: Modifiers,
    stopped: Cell<bool>,
    default_prevented: Cell<bool>,
}

impl RawEvent {
    pub fn new(kind: EventType, target: &Element) -> Self {
        Self {
            kind,
            target: target.clone(),
            key: None,
            text: None,
            position: None,
            modifiers: Modifiers::default(),
            stopped: Cell::new(false),
            default_prevented: Cell::new(false),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.position = Some((x, y));
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn kind(&self) -> EventType {
        self.kind
    }

    pub fn target(&self) -> &Element {
        &self.target
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Pasted or typed text, when the event carries any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        self.position
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Stop further delivery to ancestors and remaining handlers.
    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

// =============================================================================
// UI Event
// =============================================================================

/// A raw event as seen by a component's handlers.
#[derive(Debug, Clone, Copy)]
pub struct UiEvent<'a> {
    raw: &'a RawEvent,
}

impl<'a> UiEvent<'a> {
    pub fn new(raw: &'a RawEvent) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &'a RawEvent {
        self.raw
    }

    pub fn kind(&self) -> EventType {
        self.raw.kind()
    }

    pub fn target(&self) -> &'a Element {
        self.raw.target()
    }

    pub fn key(&self) -> Option<&'a str> {
        self.raw.key()
    }

    /// True if the event is any of `kinds`.
    pub fn is_event(&self, kinds: &[EventType]) -> bool {
        kinds.contains(&self.raw.kind())
    }

    /// True if the event is a key event for `key`.
    pub fn is_key(&self, key: &str) -> bool {
        self.raw.kind().is_key() && self.raw.key() == Some(key)
    }

    /// True if the event targets `el` or one of its descendants.
    pub fn is_within(&self, el: &Element) -> bool {
        el.contains(self.raw.target())
    }

    /// Stop the event: no further handlers or ancestors see it.
    pub fn stop_event(&self) {
        self.raw.stop_propagation();
        self.raw.prevent_default();
    }

    pub fn is_stopped(&self) -> bool {
        self.raw.is_stopped()
    }
}
