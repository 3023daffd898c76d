//! Utility modules for DOM access and content rendering.
//!
//! Provides:
//! - [`dom`] - Window, storage, location and history helpers
//! - [`markdown_to_html`] - Markdown rendering with XSS sanitization

pub mod dom;
mod markdown;

pub use markdown::markdown_to_html;
