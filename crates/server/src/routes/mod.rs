//! HTTP route handlers.

pub mod og_preview;
pub mod proxy;
