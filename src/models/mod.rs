//! Data models and types for the application.
//!
//! - [`AppRoute`], [`SiteRoutes`] - Path-based navigation and the prefetch route table
//! - [`PostSummary`], [`Post`], [`Page`], [`ContactRequest`] - Backend content

mod content;
mod route;

pub use content::{ContactReceipt, ContactRequest, Page, Post, PostSummary};
pub use route::{AppRoute, SiteRoutes};
