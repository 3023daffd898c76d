//! Application configuration.
//!
//! Centralizes all configuration constants used throughout the application.
//! Deployment-specific values are read at compile time with `option_env!`.

// =============================================================================
// Application Metadata
// =============================================================================

/// Site name displayed in the header.
pub const APP_NAME: &str = "folio";

/// Site tagline displayed on the home page.
pub const APP_TAGLINE: &str = "Notes, projects and the occasional essay";

/// Number of posts listed on the home page.
pub const HOME_POST_LIMIT: usize = 5;

// =============================================================================
// Runtime Identity
// =============================================================================

/// Deployment environment tag (`development` or `production`).
pub const APP_ENV: &str = match option_env!("FOLIO_ENV") {
    Some(env) => env,
    None => "development",
};

/// Backend base URL. Not validated; a malformed value surfaces as failed fetches.
pub const API_BASE_URL: &str = match option_env!("FOLIO_API_BASE_URL") {
    Some(url) => url,
    None => "http://localhost:8080/api",
};

/// API key sent as `X-API-Key`.
pub const API_KEY: &str = match option_env!("FOLIO_API_KEY") {
    Some(key) => key,
    None => "",
};

/// Account name sent as `X-API-Username`.
pub const API_USERNAME: &str = match option_env!("FOLIO_API_USERNAME") {
    Some(name) => name,
    None => "",
};

/// Request signature sent as `X-API-Signature`.
pub const API_SIGNATURE: &str = match option_env!("FOLIO_API_SIGNATURE") {
    Some(sig) => sig,
    None => "",
};

// =============================================================================
// Network Configuration
// =============================================================================

/// Fixed user agent attached to every API request.
pub const USER_AGENT: &str = concat!("folio-web/", env!("CARGO_PKG_VERSION"));

/// Fetch request timeout in milliseconds.
pub const FETCH_TIMEOUT_MS: i32 = 10000;

// =============================================================================
// Cache Configuration
// =============================================================================

/// Persistent response cache configuration.
pub mod cache {
    /// localStorage key prefix for cached GET responses.
    pub const RESPONSE_PREFIX: &str = "folio.api:";
}

// =============================================================================
// Prefetch Configuration
// =============================================================================

/// Lazy link prefetch tuning.
pub mod prefetch {
    /// Margin around the viewport that counts as "about to be visible".
    pub const ROOT_MARGIN: &str = "200px";

    /// Upper bound for `requestIdleCallback` before the task is forced to run.
    pub const IDLE_TIMEOUT_MS: u32 = 2000;

    /// Delay used when idle callbacks are unavailable.
    pub const TIMER_FALLBACK_MS: u32 = 120;

    /// Attribute carrying the per-link prefetch status for diagnostics.
    pub const MARKER_ATTRIBUTE: &str = "data-prefetch";
}
