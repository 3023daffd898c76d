//! Lazy link prefetching.
//!
//! Anchors register with a [`LinkPrefetcher`]; their target route is
//! prefetched once the link is near the viewport or the user hovers,
//! focuses or touches it. The work itself waits for an idle moment.
//!
//! - [`normalise_href`] - Which links are eligible
//! - [`LinkPrefetcher`] - Registry, triggers and the prefetched-routes set
//! - [`Strategies`] - Idle/timer and observer/immediate platform seams
//! - [`RouteResolver`] - Route matching consumed from the router
//! - [`web`] - Browser implementations of the seams

mod href;
mod resolver;
mod service;
mod strategy;
pub mod web;

pub use href::{PageLocation, normalise_href};
pub use resolver::{Loader, Resolved, RouteRecord, RouteResolver};
pub use service::LinkPrefetcher;
pub use strategy::{
    Cleanup, DeferStrategy, ImmediateVisibility, LinkElement, Strategies, VisibilityStrategy,
};

/// Stable identifier for a registered element.
pub type ElementId = u64;

/// Per-link prefetch status, mirrored into the marker attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Unobserved,
    Observed,
    Prefetched,
    /// Ineligible href; terminal.
    Ignored,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unobserved => "unobserved",
            Self::Observed => "observed",
            Self::Prefetched => "prefetched",
            Self::Ignored => "ignored",
        }
    }
}
