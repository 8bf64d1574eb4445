//! State Module - Per-component state machines
//!
//! - **Focus** - Focus/blur controller reconciling component and platform focus
//! - **Reconfigure** - Guarded, cancellable two phase relayout scheduling

mod focus;
mod reconfigure;

pub use focus::*;
pub use reconfigure::*;
