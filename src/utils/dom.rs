//! DOM and Web API utility functions.
//!
//! Provides safe, consistent access to browser APIs with proper error handling.

use js_sys::Reflect;
use wasm_bindgen::JsValue;
use web_sys::{Storage, Window};

/// Get the browser window object.
#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Get localStorage.
#[inline]
pub fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok()?
}

/// Check whether the global object exposes `name` (capability probing).
pub fn has_global(name: &str) -> bool {
    window().is_some_and(|w| Reflect::has(&w, &JsValue::from_str(name)).unwrap_or(false))
}

// =============================================================================
// Browser Navigation
// =============================================================================

/// Current page origin, e.g. `https://example.com`.
pub fn origin() -> String {
    window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

/// Current path without origin, e.g. `/blog/hello`.
pub fn pathname() -> String {
    window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// Push a same-origin URL onto the history stack.
pub fn push_url(url: &str) {
    if let Some(window) = window()
        && let Ok(history) = window.history()
    {
        let _ = history.push_state_with_url(&JsValue::NULL, "", Some(url));
    }
}

/// Scroll the window back to the top after navigation.
pub fn scroll_to_top() {
    if let Some(window) = window() {
        window.scroll_to_with_x_and_y(0.0, 0.0);
    }
}
