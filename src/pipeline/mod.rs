//! Pipeline - Getting components onto a host and keeping them running.
//!
//! - [`mount`] - root binding on a host element plus the terminal event loop
//! - [`lazy`] - containers whose child is resolved on demand

pub mod lazy;
pub mod mount;

pub use lazy::{CONTENT_SLOT, LazyChild, LazyStatus, Resolution};
pub use mount::{RootBinding, mount, mount_body, run, tick};
