//! UI components built with Leptos.
//!
//! - [`router`] - Path-based routing (main entry point)
//! - [`layout`] - Header navigation and footer
//! - [`pages`] - One view per route
//! - [`PrefetchLink`] - Anchor with lazy route prefetching

pub mod layout;
pub mod pages;
mod prefetch_link;
pub mod router;

pub use prefetch_link::PrefetchLink;
pub use router::AppRouter;
