//! # switchyard
//!
//! **switchyard** is a small HTTP routing and request-dispatch engine: register handlers
//! against an HTTP verb and a path template with named segments, then dispatch each
//! request to the first matching handler and get back a normalized
//! `(status, headers, body)` triple.
//!
//! ## Architecture
//!
//! - **[`router`]** - Path template compilation (`/quotes/:id` → anchored regex plus
//!   parameter names) and the verb-keyed, registration-ordered [`RouteRegistry`]
//! - **[`dispatcher`]** - First-match dispatch, parameter merging, the early-exit
//!   ([`Halt`]) channel and the redirect/not-found helpers
//! - **[`server`]** - Boundary types: [`InboundRequest`] in, [`CanonicalResponse`] out,
//!   and the [`Reply`] coercer in between
//! - **[`logging`]** / **[`runtime_config`]** - `tracing` subscriber setup and
//!   environment configuration
//! - **[`quotes`]** - A bundled demo application used by the CLI
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Server as Server component
//!     participant Dispatcher
//!     participant Registry as RouteRegistry
//!     participant Handler
//!     participant Coercer
//!
//!     Server->>Dispatcher: call(InboundRequest)
//!     Dispatcher->>Registry: routes_for(method)
//!     Dispatcher->>Dispatcher: first matcher accepting path
//!     alt Route matched
//!         Dispatcher->>Dispatcher: merge captures into params
//!         Dispatcher->>Handler: handler(&mut ctx)
//!         Handler-->>Dispatcher: Ok(Reply) / Err(Halt)
//!     else No route
//!         Dispatcher->>Dispatcher: not-found exit
//!     end
//!     Dispatcher->>Coercer: coerce(exit value, staged response)
//!     Coercer-->>Server: CanonicalResponse
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use switchyard::{Dispatcher, InboundRequest, Reply, RouteRegistry};
//!
//! let mut registry = RouteRegistry::new();
//! registry.get("/quotes/:id", |ctx| Ok(format!("quote {}", ctx.param("id").unwrap_or("?")).into()));
//! registry.post("/quotes", |ctx| ctx.redirect("/quotes"));
//! registry.get("/teapot", |_ctx| Ok(Reply::Status(418)));
//!
//! let dispatcher = Dispatcher::new(registry);
//!
//! let (res, _ctx) = dispatcher.call(InboundRequest::new(Method::GET, "/quotes/7")).unwrap();
//! assert_eq!(res.status, 200);
//! assert_eq!(res.text(), Some("quote 7"));
//!
//! let (res, _ctx) = dispatcher.call(InboundRequest::new(Method::POST, "/quotes")).unwrap();
//! assert_eq!(res.status, 303);
//!
//! let (res, _ctx) = dispatcher.call(InboundRequest::new(Method::GET, "/missing")).unwrap();
//! assert_eq!(res.status, 404);
//! ```
//!
//! ## Concurrency
//!
//! Routes are registered on a mutable [`RouteRegistry`] during startup. Handing the
//! registry to [`Dispatcher::new`] freezes it: the dispatcher only reads it and can be
//! cloned into as many server threads as needed. Each request gets its own
//! [`RequestContext`]; early exits never leave the dispatch call that produced them.

pub mod cli;
pub mod dispatcher;
pub mod ids;
pub mod logging;
pub mod quotes;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use dispatcher::{halt, halt_empty, DispatchError, Dispatcher, Halt, HandlerResult, RequestContext};
pub use router::{compile_path, CompiledRoute, RouteRegistry};
pub use server::{Body, CanonicalResponse, Headers, InboundRequest, Reply};
