//! Lifecycle tests: render progression, display state, focus, reconfigure
//! and disposal, driven through the public API with the virtual clock.
//!
//! Run with: cargo test --test lifecycle -- --nocapture

mod common;

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use common::{Logging, Recorder, count, leaf, panel, panel_props, record_notifications, runtime};
use spark_ui_core::{
    Behaviour, Capabilities, Component, ComponentConfig, ComponentProps, EventType, FlowLayout,
    HookResult, Layout, Notification, NotificationKind, RawEvent, RegionSlot, RenderOutput,
    RenderState, Runtime, RuntimeConfig, UiEvent, UiEventHandler, mount_body, renderer_fn,
};

// =============================================================================
// RENDER
// =============================================================================

#[test]
fn test_render_reaches_configured() {
    let rt = runtime();
    let container = rt.document().body();
    let cpt = panel(&rt, "Panel");
    let seen = record_notifications(&cpt);

    assert_eq!(cpt.state(), RenderState::Pending);
    cpt.render(&container, -1);

    assert_eq!(cpt.state(), RenderState::Configured);
    let root = cpt.root().unwrap();
    assert_eq!(root.parent().as_ref(), Some(&container));
    assert_eq!(root.id(), Some(cpt.element_id()));
    assert_eq!(count(&seen, NotificationKind::Render), 1);
    assert_eq!(count(&seen, NotificationKind::RenderConfigured), 1);
    assert_eq!(count(&seen, NotificationKind::Reconfigure), 1);
}

#[test]
fn test_render_twice_relocates() {
    let rt = runtime();
    let a = rt.document().create_element("div");
    let b = rt.document().create_element("div");
    let cpt = leaf(&rt, "Leaf");
    let seen = record_notifications(&cpt);

    cpt.render(&a, -1);
    let root = cpt.root().unwrap();
    cpt.render(&b, 0);

    assert_eq!(cpt.root().unwrap(), root);
    assert_eq!(root.parent().as_ref(), Some(&b));
    assert_eq!(a.child_count(), 0);
    assert_eq!(count(&seen, NotificationKind::Render), 1);
}

#[test]
fn test_render_negative_index_appends() {
    let rt = runtime();
    let container = rt.document().create_element("div");
    container.create_child("span");
    let cpt = leaf(&rt, "Leaf");
    cpt.render(&container, -1);
    assert_eq!(container.index_of(&cpt.root().unwrap()), Some(1));
}

#[test]
fn test_renderer_failure_is_isolated() {
    let rt = runtime();
    let cpt = Component::create(
        &rt,
        ComponentProps::named("Broken").with_renderer(renderer_fn(|_root, _cpt| {
            Err("renderer exploded".into())
        })),
    );
    cpt.render(&rt.document().body(), -1);
    assert_eq!(cpt.state(), RenderState::Configured);

    let panicking = Component::create(
        &rt,
        ComponentProps::named("Panicky").with_renderer(renderer_fn(|_root, _cpt| {
            panic!("renderer panicked")
        })),
    );
    panicking.render(&rt.document().body(), -1);
    assert_eq!(panicking.state(), RenderState::Configured);
}

#[test]
fn test_styles_and_adorn_applied_to_root() {
    let rt = runtime();
    let config = ComponentConfig {
        styles: vec!["panel".into(), "wide".into()],
        adorn: Some(Rc::new(|el: &spark_ui_core::Element| el.set_attribute("role", "region"))),
        ..Default::default()
    };
    let cpt = Component::create(&rt, ComponentProps::named("Styled").with_config(config));
    cpt.render(&rt.document().body(), -1);

    let root = cpt.root().unwrap();
    assert!(root.has_class("panel"));
    assert!(root.has_class("wide"));
    assert_eq!(root.attribute("role").as_deref(), Some("region"));
}

#[test]
fn test_configure_on_render_runs_now_and_on_rerender() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    let runs = Rc::new(Cell::new(0));

    let r = runs.clone();
    cpt.configure_on_render(move |_| r.set(r.get() + 1));
    assert_eq!(runs.get(), 0);

    cpt.render(&rt.document().body(), -1);
    assert_eq!(runs.get(), 1);

    let r = runs.clone();
    cpt.configure_on_render(move |_| r.set(r.get() + 10));
    assert_eq!(runs.get(), 11);

    cpt.rerender();
    assert_eq!(runs.get(), 22);
}

#[test]
fn test_rerender_disposes_children_except_reused() {
    let rt = runtime();
    let host = mount_body(&rt);
    let parent = panel(&rt, "Parent");
    host.add(parent.clone());

    let kept = leaf(&rt, "Kept");
    let dropped = leaf(&rt, "Dropped");
    parent.region("body").add(kept.clone());
    parent.region("body").add(dropped.clone());
    parent.mark_reused(kept.clone());

    parent.rerender();

    assert!(dropped.is_disposed());
    assert!(!kept.is_disposed());
    assert!(kept.parent().is_none());
    assert!(parent.region("body").is_empty());
    assert_eq!(parent.state(), RenderState::Configured);

    // The reused child can be placed again.
    assert!(parent.region("body").add(kept.clone()));
    assert!(kept.is_attached());
}

#[test]
fn test_rerender_with_replaces_config() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    cpt.render(&rt.document().body(), -1);
    cpt.rerender_with(ComponentConfig {
        test_id: Some("renamed".into()),
        ..Default::default()
    });
    assert_eq!(cpt.test_id(), "renamed");
}

// =============================================================================
// SHOW / HIDE
// =============================================================================

#[test]
fn test_show_on_shown_is_silent() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    cpt.render(&rt.document().body(), -1);
    let seen = record_notifications(&cpt);

    cpt.show();
    assert_eq!(count(&seen, NotificationKind::Show), 0);

    cpt.hide();
    cpt.hide();
    assert_eq!(count(&seen, NotificationKind::Hide), 1);
    assert!(!cpt.root().unwrap().is_displayed());

    cpt.show();
    cpt.show();
    assert_eq!(count(&seen, NotificationKind::Show), 1);
    assert_eq!(count(&seen, NotificationKind::Resize), 2);
    assert!(cpt.root().unwrap().is_displayed());
}

#[test]
fn test_hide_before_render_is_flushed() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    let seen = record_notifications(&cpt);

    cpt.hide();
    assert!(cpt.is_hidden());
    assert_eq!(count(&seen, NotificationKind::Hide), 0);

    cpt.render(&rt.document().body(), -1);
    assert!(!cpt.root().unwrap().is_displayed());
    assert_eq!(count(&seen, NotificationKind::Hide), 1);
}

#[test]
fn test_show_before_render_cancels_hide() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    cpt.hide();
    cpt.show();
    cpt.render(&rt.document().body(), -1);
    assert!(cpt.root().unwrap().is_displayed());
    assert!(!cpt.is_hidden());
}

// =============================================================================
// ENABLE / DISABLE / MASK
// =============================================================================

#[test]
fn test_enable_is_idempotent() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    cpt.render(&rt.document().body(), -1);
    let seen = record_notifications(&cpt);

    cpt.enable();
    assert_eq!(count(&seen, NotificationKind::Enable), 0);

    cpt.disable();
    cpt.disable();
    assert_eq!(count(&seen, NotificationKind::Disable), 1);
    assert!(cpt.root().unwrap().has_class("disabled"));

    cpt.enable();
    cpt.enable();
    assert_eq!(count(&seen, NotificationKind::Enable), 1);
    assert!(!cpt.root().unwrap().has_class("disabled"));
}

#[test]
fn test_disable_before_render_is_presented() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    cpt.disable();
    cpt.render(&rt.document().body(), -1);

    let root = cpt.root().unwrap();
    assert!(root.has_class("disabled"));
    assert!(root.has_attribute("disabled"));
}

#[test]
fn test_enable_state_stack() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");

    cpt.push_enable_state();
    cpt.disable();
    cpt.push_enable_state();
    cpt.enable();

    cpt.pop_enable_state();
    assert!(cpt.is_disabled());
    cpt.pop_enable_state();
    assert!(!cpt.is_disabled());

    // Empty stack.
    cpt.pop_enable_state();
    assert!(!cpt.is_disabled());
}

#[test]
fn test_mask_before_and_after_render() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    cpt.mask();
    cpt.render(&rt.document().body(), -1);
    assert!(cpt.root().unwrap().has_class("masked"));

    cpt.unmask();
    assert!(!cpt.is_masked());
    assert!(!cpt.root().unwrap().has_class("masked"));
}

// =============================================================================
// FOCUS
// =============================================================================

#[test]
fn test_focus_on_focused_is_silent() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    cpt.render(&rt.document().body(), -1);
    cpt.root().unwrap().set_accepts_focus(true);
    let seen = record_notifications(&cpt);

    cpt.focus();
    cpt.focus();
    rt.run_until_idle();
    cpt.focus();

    assert!(cpt.has_focus());
    assert_eq!(count(&seen, NotificationKind::Focus), 1);
    assert!(cpt.root().unwrap().has_class("focused"));
    assert_eq!(rt.document().active_element(), cpt.root());

    cpt.blur();
    cpt.blur();
    assert!(!cpt.has_focus());
    assert_eq!(count(&seen, NotificationKind::Blur), 1);
}

#[test]
fn test_safe_focus_on_unfocusable_target_ends_blurred() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    cpt.render(&rt.document().body(), -1);
    let seen = record_notifications(&cpt);

    cpt.focus();
    rt.run_until_idle();
    assert!(cpt.has_focus());

    rt.advance(Duration::from_millis(100));
    assert!(!cpt.has_focus());
    assert_eq!(count(&seen, NotificationKind::Blur), 1);
    assert!(!cpt.root().unwrap().has_class("focused"));
}

#[test]
fn test_focus_moves_between_managed_elements_without_blur() {
    let rt = runtime();
    let cpt = Component::create(
        &rt,
        ComponentProps::named("Form").with_renderer(renderer_fn(|root, cpt| {
            for _ in 0..2 {
                let input = root.create_child("input");
                input.set_accepts_focus(true);
                cpt.manage_focus(&input);
            }
            Ok(RenderOutput::default())
        })),
    );
    let host = mount_body(&rt);
    host.add(cpt.clone());
    let root = cpt.root().unwrap();
    let (a, b) = (root.child_at(0).unwrap(), root.child_at(1).unwrap());
    let seen = record_notifications(&cpt);

    rt.dispatch(&RawEvent::new(EventType::Focus, &a));
    rt.run_until_idle();
    assert!(cpt.has_focus());
    assert_eq!(count(&seen, NotificationKind::Focus), 1);

    rt.dispatch(&RawEvent::new(EventType::Blur, &a));
    rt.dispatch(&RawEvent::new(EventType::Focus, &b));
    rt.run_until_idle();

    assert!(cpt.has_focus());
    assert_eq!(count(&seen, NotificationKind::Blur), 0);
}

#[test]
fn test_unclaimed_focus_events_update_focus_state() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    let host = mount_body(&rt);
    host.add(cpt.clone());
    let root = cpt.root().unwrap();
    let inner = root.create_child("span");
    let seen = record_notifications(&cpt);

    rt.dispatch(&RawEvent::new(EventType::Focus, &inner));
    rt.dispatch(&RawEvent::new(EventType::Focus, &inner));
    assert!(cpt.has_focus());
    assert_eq!(count(&seen, NotificationKind::Focus), 1);

    rt.dispatch(&RawEvent::new(EventType::Blur, &inner));
    assert!(!cpt.has_focus());
    assert_eq!(count(&seen, NotificationKind::Blur), 1);
}

// =============================================================================
// RECONFIGURE
// =============================================================================

#[test]
fn test_burst_of_reconfigures_runs_one_deferred_pass() {
    let rt = runtime();
    let rec = Recorder::shared();
    let cpt = Component::create(
        &rt,
        panel_props("Panel").with_behaviour(Logging::new("panel", &rec)),
    );
    cpt.render(&rt.document().body(), -1);
    let flow = Rc::new(FlowLayout::new());
    cpt.region("body").set_layout(flow.clone());
    let seen = record_notifications(&cpt);

    for _ in 0..5 {
        cpt.reconfigure();
    }
    assert_eq!(count(&seen, NotificationKind::Reconfigure), 5);
    // Only the first pass finds the region dirty.
    assert_eq!(flow.passes(), 1);
    assert!(cpt.reconfigure_scheduler().has_pending());

    rt.run_until_idle();
    assert_eq!(rec.count("panel:deferred_reconfigure"), 1);
    assert!(!cpt.reconfigure_scheduler().has_pending());
}

/// Panics on its first pass, then lays out normally.
#[derive(Default)]
struct FlakyLayout {
    calls: Cell<u32>,
}

impl Layout for FlakyLayout {
    fn set_layout_target(&self, _region: Option<Weak<RegionSlot>>) {}

    fn layout(&self, _force: bool) -> bool {
        self.calls.set(self.calls.get() + 1);
        if self.calls.get() == 1 {
            panic!("first layout pass failed");
        }
        true
    }
}

#[test]
fn test_panicking_layout_does_not_wedge_reconfigure() {
    let rt = runtime();
    let cpt = panel(&rt, "Panel");
    let layout = Rc::new(FlakyLayout::default());
    cpt.region("body").set_layout(layout.clone());
    let seen = record_notifications(&cpt);

    cpt.render(&rt.document().body(), -1);
    assert_eq!(cpt.state(), RenderState::Configured);
    assert_eq!(layout.calls.get(), 1);
    assert!(!cpt.reconfigure_scheduler().is_running());

    cpt.reconfigure();
    cpt.reconfigure();
    rt.run_until_idle();
    assert_eq!(layout.calls.get(), 3);
    assert_eq!(count(&seen, NotificationKind::Reconfigure), 3);
}

#[test]
fn test_resize_fires_on_box_change() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    cpt.render(&rt.document().body(), -1);
    let seen = record_notifications(&cpt);

    cpt.reconfigure();
    assert_eq!(count(&seen, NotificationKind::Resize), 0);

    cpt.root().unwrap().set_client_size(spark_ui_core::BoxSize::new(40, 10));
    cpt.reconfigure();
    assert_eq!(count(&seen, NotificationKind::Resize), 1);

    rt.run_until_idle();
    assert_eq!(count(&seen, NotificationKind::Resize), 1);
}

#[test]
fn test_reconfigure_before_render_is_ignored() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    let seen = record_notifications(&cpt);
    cpt.reconfigure();
    assert!(seen.borrow().is_empty());
    assert_eq!(rt.scheduler().pending(), 0);
}

// =============================================================================
// DISPOSE
// =============================================================================

#[test]
fn test_dispose_releases_and_notifies_once() {
    let rt = runtime();
    let host = mount_body(&rt);
    let parent = panel(&rt, "Parent");
    host.add(parent.clone());

    let rec = Recorder::shared();
    let child = Component::create(
        &rt,
        ComponentProps::named("Child").with_behaviour(Logging::new("child", &rec)),
    );
    parent.region("body").add(child.clone());
    let seen = record_notifications(&child);
    let child_root = child.root().unwrap();

    child.dispose();
    child.dispose();

    assert!(child.root().is_none());
    assert!(child.is_disposed());
    assert!(!parent.region("body").contains(&child));
    assert!(child_root.parent().is_none());
    assert!(!rt.dispatch_registry().is_registered(&child_root));
    assert_eq!(count(&seen, NotificationKind::Dispose), 1);
    assert_eq!(rec.count("child:dispose"), 1);
}

#[test]
fn test_dispose_unrendered_is_safe() {
    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    cpt.dispose();
    assert!(cpt.is_disposed());
    assert_eq!(cpt.state(), RenderState::Pending);
    cpt.render(&rt.document().body(), -1);
    assert!(cpt.root().is_none());
}

#[test]
fn test_dispose_cascades_depth_first() {
    let rt = runtime();
    let rec = Recorder::shared();
    let host = mount_body(&rt);
    let outer = Component::create(
        &rt,
        panel_props("Outer").with_behaviour(Logging::new("outer", &rec)),
    );
    let middle = Component::create(
        &rt,
        panel_props("Middle").with_behaviour(Logging::new("middle", &rec)),
    );
    let inner = Component::create(
        &rt,
        ComponentProps::named("Inner").with_behaviour(Logging::new("inner", &rec)),
    );
    host.add(outer.clone());
    outer.region("body").add(middle.clone());
    middle.attachment("side").set_component(Some(inner.clone()));
    rec.clear();

    outer.dispose();

    let disposals: Vec<_> = rec
        .entries()
        .into_iter()
        .filter(|e| e.ends_with(":dispose"))
        .collect();
    assert_eq!(disposals, vec!["inner:dispose", "middle:dispose", "outer:dispose"]);
    assert!(middle.is_disposed() && inner.is_disposed());
    assert!(rt.dispatch_registry().is_empty());
    assert!(host.children().is_empty());
}

#[test]
fn test_dispose_disposes_registered_handlers() {
    struct Tracked(Rc<Cell<bool>>);
    impl UiEventHandler for Tracked {
        fn handle_event(&self, _event: &UiEvent<'_>) -> bool {
            false
        }
        fn capabilities(&self) -> Capabilities {
            Capabilities::DISPOSABLE
        }
        fn dispose(&self) {
            self.0.set(true);
        }
    }

    let rt = runtime();
    let cpt = leaf(&rt, "Leaf");
    let disposed = Rc::new(Cell::new(false));
    cpt.register_event_handler(Rc::new(Tracked(disposed.clone())), None, false);
    cpt.dispose();
    assert!(disposed.get());
    assert!(cpt.handlers().is_empty());
}

/// Fails every teardown hook it is given.
struct FaultyTeardown;

impl Behaviour for FaultyTeardown {
    fn on_detach(&self, _cpt: &Component) {
        panic!("detach hook failed");
    }

    fn on_dispose(&self, _cpt: &Component) -> HookResult {
        Err("dispose hook failed".into())
    }
}

struct PanickyHandler;

impl UiEventHandler for PanickyHandler {
    fn handle_event(&self, _event: &UiEvent<'_>) -> bool {
        false
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::DISPOSABLE
    }

    fn dispose(&self) {
        panic!("handler dispose failed");
    }
}

fn panic_on_dispose(cpt: &Component) {
    cpt.on_notification(|n: &Notification| {
        if n.kind == NotificationKind::Dispose {
            panic!("dispose listener failed");
        }
    });
}

#[test]
fn test_panicking_dispose_listener_still_releases_root() {
    let rt = runtime();
    let host = mount_body(&rt);
    let cpt = leaf(&rt, "Leaf");
    host.add(cpt.clone());
    let root = cpt.root().unwrap();
    assert!(rt.dispatch_registry().is_registered(&root));
    panic_on_dispose(&cpt);

    cpt.dispose();

    assert!(cpt.is_disposed());
    assert!(cpt.root().is_none());
    assert!(root.parent().is_none());
    assert!(!rt.dispatch_registry().is_registered(&root));
    assert!(!cpt.is_attached());
    assert!(host.children().is_empty());

    cpt.dispose();
    assert!(cpt.root().is_none());
}

#[test]
fn test_failing_teardown_steps_do_not_block_dispose() {
    let rt = runtime();
    let host = mount_body(&rt);
    let cpt = Component::create(
        &rt,
        panel_props("Faulty").with_behaviour(Rc::new(FaultyTeardown)),
    );
    host.add(cpt.clone());
    let rec = Recorder::shared();
    let child = Component::create(
        &rt,
        ComponentProps::named("Child").with_behaviour(Logging::new("child", &rec)),
    );
    cpt.region("body").add(child.clone());
    cpt.register_event_handler(Rc::new(PanickyHandler), None, false);
    let tracked = Rc::new(Cell::new(0));
    let t = tracked.clone();
    cpt.on_notification(move |n: &Notification| {
        if n.kind == NotificationKind::Dispose {
            t.set(t.get() + 1);
        }
    });
    panic_on_dispose(&cpt);
    let root = cpt.root().unwrap();
    let child_root = child.root().unwrap();

    cpt.dispose();

    assert_eq!(tracked.get(), 1);
    assert!(child.is_disposed());
    assert_eq!(rec.count("child:dispose"), 1);
    assert!(cpt.handlers().is_empty());
    assert!(cpt.root().is_none());
    assert!(root.parent().is_none());
    assert!(!rt.dispatch_registry().is_registered(&root));
    assert!(!rt.dispatch_registry().is_registered(&child_root));
    assert!(!cpt.is_attached());
    assert!(host.children().is_empty());
}

// =============================================================================
// TEST IDS & DEBUG MARKERS
// =============================================================================

#[test]
fn test_test_ids_compose_through_parents() {
    let rt = Runtime::new(RuntimeConfig::default().with_test_mode(true));
    let host = mount_body(&rt);
    let parent = Component::create(
        &rt,
        panel_props("Parent").with_config(ComponentConfig {
            test_id: Some("main".into()),
            ..Default::default()
        }),
    );
    host.add(parent.clone());
    let child = leaf(&rt, "Child");
    parent.region("body").add(child.clone());

    assert_eq!(parent.test_id(), "main");
    assert_eq!(child.test_id(), "main.child");
    assert_eq!(child.build_test_id("label"), "main.child-label");

    let root = child.root().unwrap();
    assert_eq!(root.attribute("test-id").as_deref(), Some("main.child"));
    assert_eq!(root.attribute("test-cpt").as_deref(), Some("Child"));
}

#[test]
fn test_test_id_follows_reparenting() {
    let rt = runtime();
    let a = Component::create(
        &rt,
        panel_props("A").with_config(ComponentConfig {
            test_id: Some("a".into()),
            ..Default::default()
        }),
    );
    let b = Component::create(
        &rt,
        panel_props("B").with_config(ComponentConfig {
            test_id: Some("b".into()),
            ..Default::default()
        }),
    );
    let child = leaf(&rt, "Child");

    a.region("body").add(child.clone());
    assert_eq!(child.test_id(), "a.child");
    b.region("body").add(child.clone());
    assert_eq!(child.test_id(), "b.child");
    assert!(a.region("body").is_empty());
}

#[test]
fn test_debug_name_marker() {
    let rt = Runtime::new(
        RuntimeConfig::default().with_debug(spark_ui_core::DebugFlags::NAME),
    );
    let cpt = leaf(&rt, "Leaf");
    cpt.render(&rt.document().body(), -1);
    assert_eq!(
        cpt.root().unwrap().attribute("component"),
        Some(cpt.to_string())
    );
}
