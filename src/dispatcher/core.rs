use crate::dispatcher::context::RequestContext;
use crate::dispatcher::halt::{Halt, HandlerResult};
use crate::router::{CompiledRoute, RouteRegistry};
use crate::runtime_config::{RuntimeConfig, DEFAULT_NOT_FOUND_BODY};
use crate::server::{coerce, CanonicalResponse, Headers, InboundRequest, Reply};
use http::Method;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Raised when a handler fails instead of replying.
///
/// The dispatcher does not translate failures into responses; the caller
/// decides what the client sees.
#[derive(Debug)]
pub enum DispatchError {
    HandlerFailed {
        method: Method,
        path: String,
        /// Template of the route whose handler failed
        route: String,
        source: anyhow::Error,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::HandlerFailed {
                method,
                path,
                route,
                source,
            } => write!(
                f,
                "handler for {} {} (route '{}') failed: {}",
                method, path, route, source
            ),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::HandlerFailed { source, .. } => Some(&**source),
        }
    }
}

/// Finds the first route matching a request and runs its handler.
///
/// Owns the registry behind an `Arc`, so routes can no longer be added once
/// a dispatcher exists. Cloning is cheap and clones share the same routes,
/// which makes a dispatcher safe to hand to any number of server threads.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<RouteRegistry>,
    not_found_body: Arc<str>,
    slow_handler_threshold: Duration,
}

impl Dispatcher {
    /// Freeze `registry` behind a dispatcher using environment configuration.
    #[must_use]
    pub fn new(registry: RouteRegistry) -> Self {
        Self::with_config(registry, &RuntimeConfig::from_env())
    }

    /// Build a dispatcher from explicit configuration.
    ///
    /// An empty not-found body falls back to [`DEFAULT_NOT_FOUND_BODY`].
    #[must_use]
    pub fn with_config(registry: RouteRegistry, config: &RuntimeConfig) -> Self {
        let not_found_body = if config.not_found_body.is_empty() {
            warn!("Empty not-found body configured, using the default");
            DEFAULT_NOT_FOUND_BODY
        } else {
            config.not_found_body.as_str()
        };
        info!(
            routes_count = registry.len(),
            routes_summary = ?registry.route_summaries(),
            "Routing table frozen"
        );
        Self {
            registry: Arc::new(registry),
            not_found_body: Arc::from(not_found_body),
            slow_handler_threshold: config.slow_handler_threshold,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Dispatch a server-provided request.
    ///
    /// Returns the context alongside the response so the caller can persist
    /// the session the handler may have changed.
    pub fn call(
        &self,
        request: InboundRequest,
    ) -> Result<(CanonicalResponse, RequestContext), DispatchError> {
        let mut ctx = RequestContext::from_request(request);
        let response = self.dispatch(&mut ctx)?;
        Ok((response, ctx))
    }

    /// Route `ctx`'s method and path, run the handler and coerce its exit value.
    ///
    /// 1. Walk the routes for the method in registration order.
    /// 2. On the first match merge the captures into the params (path values
    ///    win) and invoke the handler.
    /// 3. Without a match, answer through the not-found exit.
    /// 4. Coerce whatever left the handler onto the staged response.
    ///
    /// Handler failures are returned as [`DispatchError`]; no response is
    /// produced for them.
    pub fn dispatch(&self, ctx: &mut RequestContext) -> Result<CanonicalResponse, DispatchError> {
        debug!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            "Route match attempt"
        );

        let started = Instant::now();
        let matched = self.find_route(ctx.method(), ctx.path());
        let route_template = matched.as_ref().map(|(route, _)| route.template.clone());

        let outcome = match matched {
            Some((route, captured)) => {
                info!(
                    request_id = %ctx.request_id(),
                    method = %ctx.method(),
                    path = %ctx.path(),
                    route_pattern = %route.template,
                    path_params = ?captured,
                    "Route matched"
                );
                ctx.merge_params(captured);
                (route.handler)(ctx)
            }
            None => {
                warn!(
                    request_id = %ctx.request_id(),
                    method = %ctx.method(),
                    path = %ctx.path(),
                    routes_for_method = self.registry.routes_for(ctx.method()).len(),
                    "No route matched"
                );
                ctx.not_found()
            }
        };

        let exit = self.catch_exit(ctx, route_template.as_deref(), outcome)?;
        let response = coerce(exit, ctx.take_response());

        let elapsed = started.elapsed();
        if elapsed > self.slow_handler_threshold {
            warn!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = %ctx.path(),
                status = response.status,
                duration_us = elapsed.as_micros(),
                "Slow request dispatch detected"
            );
        } else {
            debug!(
                request_id = %ctx.request_id(),
                status = response.status,
                duration_us = elapsed.as_micros(),
                "Request dispatched"
            );
        }

        Ok(response)
    }

    /// First route for `method` whose matcher accepts `path`, with its named captures.
    fn find_route(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(Arc<CompiledRoute>, Vec<(String, String)>)> {
        self.registry
            .routes_for(method)
            .iter()
            .find_map(|route| route.match_path(path).map(|params| (Arc::clone(route), params)))
    }

    /// The single catch point for handler exits.
    fn catch_exit(
        &self,
        ctx: &RequestContext,
        route: Option<&str>,
        outcome: HandlerResult,
    ) -> Result<Option<Reply>, DispatchError> {
        match outcome {
            Ok(reply) => Ok(Some(reply)),
            Err(Halt::Exit(reply)) => {
                debug!(
                    request_id = %ctx.request_id(),
                    with_reply = reply.is_some(),
                    "Handler halted"
                );
                Ok(reply)
            }
            Err(Halt::NotFound) => Ok(Some(self.not_found_reply())),
            Err(Halt::Failed(source)) => {
                let route = route.unwrap_or("<none>").to_string();
                error!(
                    request_id = %ctx.request_id(),
                    method = %ctx.method(),
                    path = %ctx.path(),
                    route_pattern = %route,
                    error = %source,
                    "Handler failed"
                );
                Err(DispatchError::HandlerFailed {
                    method: ctx.method().clone(),
                    path: ctx.path().to_string(),
                    route,
                    source,
                })
            }
        }
    }

    fn not_found_reply(&self) -> Reply {
        Reply::full(404, Headers::new(), &*self.not_found_body)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("slow_handler_threshold", &self.slow_handler_threshold)
            .finish_non_exhaustive()
    }
}
