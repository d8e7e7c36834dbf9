//! # Router Module
//!
//! Path compilation and the route registry.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling path templates such as `/quotes/:id` into anchored matchers
//! - Keeping the ordered list of routes registered for each HTTP verb
//! - Pairing captured path segments with their parameter names
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: At startup, each template is split on `/`. Segments
//!    starting with `:` become `([^/]+)` captures, every other segment is
//!    escaped and matched literally, and the whole pattern is anchored with
//!    `\A ... \z`.
//!
//! 2. **Matching**: The dispatcher walks the routes registered for the request
//!    verb in registration order and stops at the first matcher that accepts
//!    the path. Registration order is the only priority there is.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use switchyard::router::RouteRegistry;
//!
//! let mut registry = RouteRegistry::new();
//! registry.get("/quotes/:id", |ctx| Ok(ctx.param("id").unwrap_or_default().into()));
//!
//! let route = &registry.routes_for(&Method::GET)[0];
//! assert_eq!(route.param_names, vec!["id"]);
//! assert!(route.matcher.is_match("/quotes/42"));
//! assert!(!route.matcher.is_match("/quotes/42/edit"));
//! ```

mod core;

pub use core::{compile_path, CompiledRoute, Handler, PathMatcher, RouteRegistry};
