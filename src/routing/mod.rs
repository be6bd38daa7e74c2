//! Routing module
//!
//! Decides which file on disk an incoming request path maps to, including
//! the single-page-application fallback for client-side routes.

pub mod resolver;

pub use resolver::{resolve, Resolved, ResolveError};
