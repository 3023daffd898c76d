//! Core logic for the site.
//!
//! This module provides:
//! - [`api`] - Backend client with ETag-revalidated GET cache
//! - [`prefetch`] - Lazy link prefetching
//! - [`error`] - Error types shared by both

pub mod api;
pub mod error;
pub mod prefetch;
