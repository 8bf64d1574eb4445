//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use spark_ui_core::{
    Behaviour, Component, ComponentProps, ComponentRef, Element, HookResult, Notification,
    NotificationKind, RenderOutput, Runtime, RuntimeConfig, Selector, renderer_fn,
};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness (`RUST_LOG` filters it).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn runtime() -> Runtime {
    init_tracing();
    Runtime::new(RuntimeConfig::default())
}

// =============================================================================
// Recording behaviour
// =============================================================================

/// Records the name of every hook it receives, in order.
#[derive(Default)]
pub struct Recorder {
    pub log: RefCell<Vec<String>>,
}

impl Recorder {
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.log.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.log.borrow().iter().filter(|e| *e == entry).count()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

/// Behaviour logging `"<label>:<hook>"` into a shared recorder.
pub struct Logging {
    pub label: String,
    pub recorder: Rc<Recorder>,
}

impl Logging {
    pub fn new(label: &str, recorder: &Rc<Recorder>) -> Rc<Self> {
        Rc::new(Self {
            label: label.to_string(),
            recorder: recorder.clone(),
        })
    }

    fn log(&self, hook: &str) {
        self.recorder.push(format!("{}:{}", self.label, hook));
    }
}

impl Behaviour for Logging {
    fn on_after_render(&self, _cpt: &Component) -> HookResult {
        self.log("after_render");
        Ok(())
    }

    fn on_attach(&self, _cpt: &Component) {
        self.log("attach");
    }

    fn on_detach(&self, _cpt: &Component) {
        self.log("detach");
    }

    fn on_deferred_reconfigure(&self, _cpt: &Component) {
        self.log("deferred_reconfigure");
    }

    fn on_dispose(&self, _cpt: &Component) -> HookResult {
        self.log("dispose");
        Ok(())
    }
}

// =============================================================================
// Components
// =============================================================================

/// A component whose renderer creates a `body` region element and a `side`
/// attachment element.
pub fn panel(runtime: &Runtime, name: &str) -> ComponentRef {
    Component::create(runtime, panel_props(name))
}

pub fn panel_props(name: &str) -> ComponentProps {
    ComponentProps::named(name).with_renderer(renderer_fn(|root: &Element, cpt: &Component| {
        let body = root.create_child("div");
        let side = root.create_child("div");
        cpt.region("body").set_element(&body);
        cpt.attachment("side").set_element(&side);
        Ok(RenderOutput::default().with_selector(
            Selector::new().with("body", &body).with("side", &side),
        ))
    }))
}

pub fn leaf(runtime: &Runtime, name: &str) -> ComponentRef {
    Component::named(runtime, name)
}

/// Collects every notification kind a component fires.
pub fn record_notifications(cpt: &Component) -> Rc<RefCell<Vec<NotificationKind>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    cpt.on_notification(move |n: &Notification| sink.borrow_mut().push(n.kind));
    seen
}

pub fn count(seen: &Rc<RefCell<Vec<NotificationKind>>>, kind: NotificationKind) -> usize {
    seen.borrow().iter().filter(|k| **k == kind).count()
}
