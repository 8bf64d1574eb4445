//! Error types and the hook isolation boundary.
//!
//! User hooks (renderers, behaviours, handlers, layouts) return [`HookResult`].
//! The kernel never lets a hook failure escape: [`isolate`] catches both
//! returned errors and panics, reports them through `tracing`, and lets the
//! caller carry on with the next step.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Error raised by user-supplied hooks.
pub type HookError = Box<dyn std::error::Error + 'static>;

/// Result returned by user-supplied hooks.
pub type HookResult<T = ()> = Result<T, HookError>;

/// Errors reported by the kernel.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("attempt to insert a missing component into region `{region}`")]
    MissingComponent { region: String },

    #[error("component {component} is disposed and cannot be {action}")]
    Disposed {
        component: String,
        action: &'static str,
    },

    #[error("component {component} cannot be inserted into its own subtree")]
    SelfInsertion { component: String },

    #[error("hook `{hook}` failed on {component}: {source}")]
    Hook {
        hook: &'static str,
        component: String,
        #[source]
        source: HookError,
    },

    #[error("hook `{hook}` panicked on {component}: {message}")]
    Panicked {
        hook: &'static str,
        component: String,
        message: String,
    },

    #[error("lazy child resolution failed after {attempts} attempt(s)")]
    ResolveExhausted { attempts: u32 },
}

/// Log an error at the boundary where it was caught.
pub fn report(error: &ComponentError) {
    match error {
        ComponentError::MissingComponent { .. }
        | ComponentError::Disposed { .. }
        | ComponentError::SelfInsertion { .. } => {
            tracing::warn!(error = %error, "invalid composition operation ignored");
        }
        _ => {
            tracing::error!(error = %error, "uncaught error");
        }
    }
}

/// Run a hook, catching returned errors and panics.
///
/// Returns `None` when the hook failed; the failure has already been logged.
pub(crate) fn isolate<T>(
    hook: &'static str,
    component: &dyn fmt::Display,
    f: impl FnOnce() -> HookResult<T>,
) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(source)) => {
            report(&ComponentError::Hook {
                hook,
                component: component.to_string(),
                source,
            });
            None
        }
        Err(payload) => {
            report(&ComponentError::Panicked {
                hook,
                component: component.to_string(),
                message: panic_message(payload.as_ref()),
            });
            None
        }
    }
}

/// Run an infallible step, catching panics only.
pub(crate) fn isolate_step(hook: &'static str, component: &dyn fmt::Display, f: impl FnOnce()) {
    isolate(hook, component, || {
        f();
        Ok(())
    });
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolate_passes_value_through() {
        assert_eq!(isolate("ok", &"cpt", || Ok(7)), Some(7));
    }

    #[test]
    fn test_isolate_catches_error() {
        let out: Option<()> = isolate("fails", &"cpt", || Err("boom".into()));
        assert!(out.is_none());
    }

    #[test]
    fn test_isolate_catches_panic() {
        let out: Option<()> = isolate("panics", &"cpt", || panic!("kaboom"));
        assert!(out.is_none());
    }

    #[test]
    fn test_error_display() {
        let err = ComponentError::MissingComponent {
            region: "body".into(),
        };
        assert_eq!(
            err.to_string(),
            "attempt to insert a missing component into region `body`"
        );
    }
}
