//! Input Module - Terminal input bridge
//!
//! Converts crossterm events into raw UI events and routes them through the
//! runtime. Keys, paste, mouse and terminal focus changes target the
//! document's active element (the body when nothing is active); terminal
//! resizes go to the window listeners.
//!
//! # Example
//!
//! ```ignore
//! use spark_ui_core::events::input::{poll_event, route_event};
//! use std::time::Duration;
//!
//! loop {
//!     if let Ok(Some(event)) = poll_event(Duration::from_millis(16)) {
//!         route_event(&runtime, event);
//!     }
//!     runtime.run_until_idle();
//! }
//! ```

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyEvent,
    KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind, poll, read,
};
use crossterm::execute;
use std::io::stdout;
use std::time::Duration;

use super::{EventType, Modifiers, RawEvent};
use crate::engine::Runtime;
use crate::surface::Element;
use crate::types::BoxSize;

// =============================================================================
// INPUT EVENT
// =============================================================================

/// A converted terminal event.
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Event for the dispatch registry.
    Ui(RawEvent),
    /// Terminal resize (new width, height).
    Resize(BoxSize),
}

// =============================================================================
// CONVERSION
// =============================================================================

/// Name of a key as seen by handlers ("a", "Enter", "ArrowUp", ...).
pub fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Insert => "Insert".to_string(),
        _ => String::new(),
    }
}

fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        ctrl: mods.contains(KeyModifiers::CONTROL),
        alt: mods.contains(KeyModifiers::ALT),
        shift: mods.contains(KeyModifiers::SHIFT),
        meta: mods.contains(KeyModifiers::META) || mods.contains(KeyModifiers::SUPER),
    }
}

/// Convert a key event. A press of a character key also yields a key-press.
pub fn convert_key_event(event: KeyEvent, target: &Element) -> Vec<RawEvent> {
    let key = key_name(event.code);
    let modifiers = convert_modifiers(event.modifiers);
    let raw = |kind| {
        RawEvent::new(kind, target)
            .with_key(key.clone())
            .with_modifiers(modifiers)
    };
    match event.kind {
        KeyEventKind::Release => vec![raw(EventType::KeyUp)],
        KeyEventKind::Press | KeyEventKind::Repeat => {
            if let KeyCode::Char(c) = event.code {
                vec![raw(EventType::KeyDown), raw(EventType::KeyPress).with_text(c.to_string())]
            } else {
                vec![raw(EventType::KeyDown)]
            }
        }
    }
}

/// Convert a mouse event. A left button release also yields a click.
pub fn convert_mouse_event(event: MouseEvent, target: &Element) -> Vec<RawEvent> {
    let (x, y) = (i32::from(event.column), i32::from(event.row));
    let modifiers = convert_modifiers(event.modifiers);
    let raw = |kind| {
        RawEvent::new(kind, target)
            .with_position(x, y)
            .with_modifiers(modifiers)
    };
    match event.kind {
        MouseEventKind::Down(_) => vec![raw(EventType::MouseDown)],
        MouseEventKind::Up(crossterm::event::MouseButton::Left) => {
            vec![raw(EventType::MouseUp), raw(EventType::Click)]
        }
        MouseEventKind::Up(_) => vec![raw(EventType::MouseUp)],
        MouseEventKind::Drag(_) | MouseEventKind::Moved => vec![raw(EventType::MouseMove)],
        MouseEventKind::ScrollUp
        | MouseEventKind::ScrollDown
        | MouseEventKind::ScrollLeft
        | MouseEventKind::ScrollRight => vec![raw(EventType::Wheel)],
    }
}

/// Convert any terminal event, targeting `target` where a target is needed.
pub fn convert_event(event: CrosstermEvent, target: &Element) -> Vec<InputEvent> {
    let ui = |events: Vec<RawEvent>| events.into_iter().map(InputEvent::Ui).collect();
    match event {
        CrosstermEvent::Key(key) => ui(convert_key_event(key, target)),
        CrosstermEvent::Mouse(mouse) => ui(convert_mouse_event(mouse, target)),
        CrosstermEvent::Paste(text) => {
            ui(vec![RawEvent::new(EventType::Paste, target).with_text(text)])
        }
        CrosstermEvent::FocusGained => ui(vec![RawEvent::new(EventType::Focus, target)]),
        CrosstermEvent::FocusLost => ui(vec![RawEvent::new(EventType::Blur, target)]),
        CrosstermEvent::Resize(w, h) => {
            vec![InputEvent::Resize(BoxSize::new(i32::from(w), i32::from(h)))]
        }
    }
}

// =============================================================================
// ROUTING
// =============================================================================

/// Convert and deliver a terminal event. Returns the number of deliveries.
pub fn route_event(runtime: &Runtime, event: CrosstermEvent) -> usize {
    let target = runtime
        .document()
        .active_element()
        .unwrap_or_else(|| runtime.document().body());
    let mut delivered = 0;
    for input in convert_event(event, &target) {
        match input {
            InputEvent::Ui(raw) => delivered += runtime.dispatch(&raw),
            InputEvent::Resize(size) => {
                runtime.window().fire_resize(size);
                delivered += runtime.window().listener_count();
            }
        }
    }
    delivered
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll for an event with timeout.
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<CrosstermEvent>> {
    if poll(timeout)? {
        Ok(Some(read()?))
    } else {
        Ok(None)
    }
}

/// Read the next event (blocking).
pub fn read_event() -> std::io::Result<CrosstermEvent> {
    read()
}

pub fn enable_mouse() -> std::io::Result<()> {
    execute!(stdout(), EnableMouseCapture)
}

pub fn disable_mouse() -> std::io::Result<()> {
    execute!(stdout(), DisableMouseCapture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseButton};

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_char_press_yields_keydown_and_keypress() {
        let el = Element::div();
        let events = convert_key_event(key(KeyCode::Char('a'), KeyEventKind::Press), &el);
        let kinds: Vec<_> = events.iter().map(RawEvent::kind).collect();
        assert_eq!(kinds, vec![EventType::KeyDown, EventType::KeyPress]);
        assert_eq!(events[1].text(), Some("a"));
        assert_eq!(events[0].key(), Some("a"));
    }

    #[test]
    fn test_special_keys_and_release() {
        let el = Element::div();
        let events = convert_key_event(key(KeyCode::Up, KeyEventKind::Press), &el);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key(), Some("ArrowUp"));

        let events = convert_key_event(key(KeyCode::Enter, KeyEventKind::Release), &el);
        assert_eq!(events[0].kind(), EventType::KeyUp);
        assert_eq!(events[0].key(), Some("Enter"));
    }

    #[test]
    fn test_modifiers_convert() {
        let el = Element::div();
        let mut event = key(KeyCode::Char('c'), KeyEventKind::Press);
        event.modifiers = KeyModifiers::CONTROL | KeyModifiers::SHIFT;
        let raw = &convert_key_event(event, &el)[0];
        assert!(raw.modifiers().ctrl);
        assert!(raw.modifiers().shift);
        assert!(!raw.modifiers().alt);
    }

    #[test]
    fn test_left_release_clicks() {
        let el = Element::div();
        let event = MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            column: 10,
            row: 5,
            modifiers: KeyModifiers::empty(),
        };
        let events = convert_mouse_event(event, &el);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind(), EventType::Click);
        assert_eq!(events[1].position(), Some((10, 5)));
    }

    #[test]
    fn test_resize_reaches_window() {
        let rt = Runtime::default();
        route_event(&rt, CrosstermEvent::Resize(120, 40));
        assert_eq!(rt.window().size(), BoxSize::new(120, 40));
    }

    #[test]
    fn test_paste_carries_text() {
        let el = Element::div();
        let events = convert_event(CrosstermEvent::Paste("hello".into()), &el);
        match &events[0] {
            InputEvent::Ui(raw) => {
                assert_eq!(raw.kind(), EventType::Paste);
                assert_eq!(raw.text(), Some("hello"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
