//! Event router - Delivery of a raw event to a single component.
//!
//! Order:
//! 1. Regions whose element contains the target claim the event for their
//!    layout (checked before the disabled state).
//! 2. Disabled components drop it unless configured to dispatch anyway.
//! 3. Stopped events are dropped.
//! 4. The handler chain.
//! 5. The behaviour's `handle_event`, the focus controller, the behaviour's
//!    `alternative_handle_event`. A claim stops the event unless it is a
//!    key-press.
//! 6. Unclaimed focus and blur events update the component's focus state.

use super::{EventType, RawEvent, UiEvent};
use crate::component::Component;
use crate::error::isolate;

pub(crate) fn route(cpt: &Component, raw: &RawEvent) {
    for region in cpt.regions() {
        if region.on_browser_event(raw) {
            return;
        }
    }

    if cpt.is_disabled() && !cpt.config().dispatch_when_disabled {
        return;
    }

    let event = UiEvent::new(raw);
    if event.is_stopped() {
        return;
    }

    if cpt.handlers().dispatch(cpt, &event) {
        return;
    }

    let behaviour = cpt.behaviour();
    let claimed = isolate("handle_event", cpt, || Ok(behaviour.handle_event(cpt, &event)))
        == Some(true)
        || cpt.focus_controller().handle_event(&event)
        || isolate("alternative_handle_event", cpt, || {
            Ok(behaviour.alternative_handle_event(cpt, &event))
        }) == Some(true);
    if claimed {
        if event.kind() != EventType::KeyPress {
            event.stop_event();
        }
        return;
    }

    match raw.kind() {
        EventType::Blur => cpt.on_blur_ui(),
        EventType::Focus => cpt.on_focus_ui(),
        _ => {}
    }
}
