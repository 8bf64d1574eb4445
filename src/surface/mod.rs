//! Host surface - the retained element tree components render into.

mod document;
mod element;

pub use document::Document;
pub use element::Element;
