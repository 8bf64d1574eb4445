//! Engine - The runtime shared by every component.
//!
//! A [`Runtime`] bundles the state that would otherwise be process wide:
//! - Identity counter for components
//! - Debug flags
//! - Dispatch registry (attached root surfaces)
//! - Window listeners
//! - Scheduler (next turn and timed tasks)
//! - Document (active element)
//!
//! Components hold a cloned handle; all clones share the same state. The
//! runtime is single threaded.
//!
//! # Example
//!
//! ```ignore
//! let rt = Runtime::new(RuntimeConfig::from_env());
//! let root = rt.document().body();
//! // ... create and render components ...
//! rt.run_until_idle();
//! ```

mod registry;
mod scheduler;
mod window;

pub use registry::{DispatchRegistry, EventListener, PreviewId};
pub use scheduler::{Scheduler, TimerHandle};
pub use window::Window;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::events::RawEvent;
use crate::surface::Document;
use crate::types::{ComponentId, DebugFlags};

/// Environment variable holding debug modes (`render,lifecycle,name,outline`).
pub const ENV_DEBUG: &str = "SPARK_UI_DEBUG";
/// Environment variable enabling test identifiers on root surfaces.
pub const ENV_TEST_MODE: &str = "SPARK_UI_TEST_MODE";

// =============================================================================
// Configuration
// =============================================================================

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Initial debug modes.
    pub debug: DebugFlags,
    /// Stamp `test-id`/`test-cpt` attributes onto root surfaces.
    pub test_mode: bool,
    /// Delay before the timed safe-focus retry.
    pub focus_retry_delay: Duration,
    /// Retries a lazy child makes after the first failed resolve.
    pub lazy_max_retries: u32,
    /// Delay between lazy child resolve attempts.
    pub lazy_backoff: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            debug: DebugFlags::empty(),
            test_mode: false,
            focus_retry_delay: Duration::from_millis(100),
            lazy_max_retries: 1,
            lazy_backoff: Duration::from_millis(100),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `SPARK_UI_DEBUG` and `SPARK_UI_TEST_MODE`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(ENV_DEBUG) {
            match value.parse::<DebugFlags>() {
                Ok(flags) => config.debug = flags,
                Err(err) => tracing::warn!(var = ENV_DEBUG, %err, "ignoring debug modes"),
            }
        }
        if let Ok(value) = std::env::var(ENV_TEST_MODE) {
            config.test_mode = matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        config
    }

    pub fn with_debug(mut self, debug: DebugFlags) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    pub fn with_focus_retry_delay(mut self, delay: Duration) -> Self {
        self.focus_retry_delay = delay;
        self
    }

    pub fn with_lazy_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.lazy_max_retries = max_retries;
        self.lazy_backoff = backoff;
        self
    }
}

// =============================================================================
// Runtime
// =============================================================================

struct RuntimeInner {
    config: RuntimeConfig,
    debug: Cell<DebugFlags>,
    next_id: Cell<u64>,
    scheduler: Scheduler,
    document: Document,
    dispatch: DispatchRegistry,
    window: Window,
}

/// Shared handle to the runtime state.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                debug: Cell::new(config.debug),
                config,
                next_id: Cell::new(0),
                scheduler: Scheduler::new(),
                document: Document::new(),
                dispatch: DispatchRegistry::new(),
                window: Window::new(),
            }),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn debug(&self) -> DebugFlags {
        self.inner.debug.get()
    }

    pub fn set_debug(&self, flags: DebugFlags) {
        self.inner.debug.set(flags);
    }

    pub fn is_debug(&self, flag: DebugFlags) -> bool {
        self.inner.debug.get().contains(flag)
    }

    pub fn is_test_mode(&self) -> bool {
        self.inner.config.test_mode
    }

    /// Allocate the next component identity.
    pub fn next_component_id(&self) -> ComponentId {
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);
        ComponentId(id)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn dispatch_registry(&self) -> &DispatchRegistry {
        &self.inner.dispatch
    }

    pub fn window(&self) -> &Window {
        &self.inner.window
    }

    // -------------------------------------------------------------------------
    // Conveniences
    // -------------------------------------------------------------------------

    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.inner.scheduler.defer(task);
    }

    pub fn timer(&self, task: impl FnOnce() + 'static, delay: Duration) -> TimerHandle {
        self.inner.scheduler.timer(task, delay)
    }

    /// Deliver a raw event through the dispatch registry.
    pub fn dispatch(&self, event: &RawEvent) -> usize {
        self.inner.dispatch.dispatch(event)
    }

    pub fn run_until_idle(&self) -> usize {
        self.inner.scheduler.run_until_idle()
    }

    pub fn advance(&self, by: Duration) -> usize {
        self.inner.scheduler.advance(by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let rt = Runtime::default();
        let a = rt.next_component_id();
        let b = rt.next_component_id();
        assert!(a < b);
        // Clones share the counter.
        assert!(rt.clone().next_component_id() > b);
    }

    #[test]
    fn test_debug_flags_toggle() {
        let rt = Runtime::new(RuntimeConfig::default().with_debug(DebugFlags::RENDER));
        assert!(rt.is_debug(DebugFlags::RENDER));
        rt.set_debug(DebugFlags::LIFECYCLE | DebugFlags::NAME);
        assert!(!rt.is_debug(DebugFlags::RENDER));
        assert!(rt.is_debug(DebugFlags::NAME));
    }

    #[test]
    fn test_config_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.focus_retry_delay, Duration::from_millis(100));
        assert_eq!(config.lazy_max_retries, 1);
        assert!(!config.test_mode);
    }
}
