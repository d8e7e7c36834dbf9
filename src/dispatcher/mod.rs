//! # Dispatcher Module
//!
//! Runs the handler of the first route matching a request and turns whatever
//! the handler produced into a [`CanonicalResponse`](crate::server::CanonicalResponse).
//!
//! ## Overview
//!
//! The dispatcher:
//! - Walks the routes registered for the request method in registration order
//! - Merges path captures into the request parameters (path values win over
//!   same-named query/form values)
//! - Invokes the handler and catches its early exit
//! - Answers `404` through the not-found exit when nothing matches
//! - Coerces the exit value onto the staged response
//!
//! ## Early Exit
//!
//! Handlers return [`HandlerResult`], i.e. `Result<Reply, Halt>`. Helpers such
//! as [`RequestContext::redirect`], [`RequestContext::not_found`] and
//! [`halt`] produce the `Err` side, so `?` or `return` stops the handler from
//! any call depth. The dispatcher is the only place that catches it.
//!
//! ```rust
//! use http::Method;
//! use switchyard::dispatcher::{Dispatcher, RequestContext};
//! use switchyard::router::RouteRegistry;
//!
//! let mut registry = RouteRegistry::new();
//! registry.get("/", |ctx| ctx.redirect("/quotes"));
//! registry.get("/quotes/:id", |ctx| Ok(ctx.param("id").unwrap_or_default().into()));
//! let dispatcher = Dispatcher::new(registry);
//!
//! let mut ctx = RequestContext::new(Method::GET, "/quotes/42");
//! let res = dispatcher.dispatch(&mut ctx).unwrap();
//! assert_eq!((res.status, res.text()), (200, Some("42")));
//!
//! let mut ctx = RequestContext::new(Method::GET, "/");
//! let res = dispatcher.dispatch(&mut ctx).unwrap();
//! assert_eq!(res.status, 302);
//! assert_eq!(res.headers.get("Location"), Some("/quotes"));
//! ```
//!
//! ## Error Handling
//!
//! - No matching route is not an error: it resolves to a `404` response
//! - Handler failures (`Halt::Failed`) come back as [`DispatchError`] and are
//!   never turned into a response here
//! - Panics are not caught; they unwind to the server's own boundary

mod context;
mod core;
mod halt;

pub use context::RequestContext;
pub use core::{DispatchError, Dispatcher};
pub use halt::{halt, halt_empty, Halt, HandlerResult};
