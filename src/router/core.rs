//! Router core: path compilation and the verb-keyed route table.

use crate::dispatcher::{HandlerResult, RequestContext};
use http::Method;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Pattern fragment substituted for each `:name` segment.
const PARAM_CAPTURE: &str = "([^/]+)";

/// A route handler.
///
/// Handlers see the request only through the [`RequestContext`] and leave it
/// either by returning a reply or through an early exit (`Err(Halt)`).
pub type Handler = Arc<dyn Fn(&mut RequestContext) -> HandlerResult + Send + Sync>;

/// Compiled path matcher, anchored at both ends.
///
/// A matcher whose pattern could not be built never matches anything.
#[derive(Clone)]
pub struct PathMatcher {
    regex: Option<Regex>,
}

impl PathMatcher {
    /// Ordered capture values when `path` matches the whole pattern.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<Vec<String>> {
        let caps = self.regex.as_ref()?.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }

    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(path))
    }

    /// The underlying pattern source, if it compiled.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.regex.as_ref().map(Regex::as_str)
    }

    /// Number of capturing groups in the pattern.
    #[must_use]
    pub fn capture_count(&self) -> usize {
        self.regex
            .as_ref()
            .map_or(0, |re| re.captures_len().saturating_sub(1))
    }
}

impl fmt::Debug for PathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathMatcher").field(&self.as_str()).finish()
    }
}

/// Convert a path template to an anchored matcher and its parameter names.
///
/// Splits on `/` keeping empty segments, so `/quotes/` and `/quotes` differ.
/// `:name` segments become a one-or-more non-slash capture; every other
/// segment is matched literally. Never fails: a bare `:` yields an empty
/// parameter name and an unbuildable pattern yields a matcher that never
/// matches.
///
/// ```
/// use switchyard::router::compile_path;
///
/// let (matcher, names) = compile_path("/items/:a/:b");
/// assert_eq!(names, vec!["a", "b"]);
/// assert_eq!(matcher.captures("/items/x/y"), Some(vec!["x".into(), "y".into()]));
/// assert!(!matcher.is_match("/items/x"));
/// ```
#[must_use]
pub fn compile_path(template: &str) -> (PathMatcher, Vec<String>) {
    let mut param_names = Vec::with_capacity(template.matches(':').count());
    let body = template
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => {
                param_names.push(name.to_string());
                PARAM_CAPTURE.to_string()
            }
            None => regex::escape(segment),
        })
        .collect::<Vec<_>>()
        .join("/");

    let pattern = format!(r"\A{body}\z");
    let regex = match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            warn!(
                template = %template,
                error = %err,
                "Path template did not compile, route will never match"
            );
            None
        }
    };

    (PathMatcher { regex }, param_names)
}

/// A registered route: matcher, parameter names and the bound handler.
pub struct CompiledRoute {
    pub method: Method,
    /// Template the route was registered with (e.g. `/quotes/:id`)
    pub template: String,
    pub matcher: PathMatcher,
    /// One name per capture group, in template order
    pub param_names: Vec<String>,
    pub handler: Handler,
}

impl CompiledRoute {
    /// Match `path` and pair each capture with its parameter name.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Vec<(String, String)>> {
        let values = self.matcher.captures(path)?;
        Some(self.param_names.iter().cloned().zip(values).collect())
    }
}

impl fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("method", &self.method)
            .field("template", &self.template)
            .field("matcher", &self.matcher)
            .field("param_names", &self.param_names)
            .finish_non_exhaustive()
    }
}

/// Verb-keyed, registration-ordered route table.
///
/// Built during startup, then moved into a
/// [`Dispatcher`](crate::dispatcher::Dispatcher), which only reads it.
/// Duplicate and overlapping templates are accepted; the earliest registered
/// route wins at dispatch time.
#[derive(Default)]
pub struct RouteRegistry {
    routes: HashMap<Method, Vec<Arc<CompiledRoute>>>,
    count: usize,
}

impl RouteRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `template` and append the route to `method`'s list.
    pub fn register<F>(&mut self, method: Method, template: &str, handler: F) -> &CompiledRoute
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        let (matcher, param_names) = compile_path(template);
        let route = Arc::new(CompiledRoute {
            method: method.clone(),
            template: template.to_string(),
            matcher,
            param_names,
            handler: Arc::new(handler),
        });

        let list = self.routes.entry(method).or_default();
        list.push(route);
        self.count += 1;

        let route = &list[list.len() - 1];
        info!(
            method = %route.method,
            template = %route.template,
            param_names = ?route.param_names,
            position = list.len() - 1,
            total_routes = self.count,
            "Route registered"
        );
        route
    }

    pub fn get<F>(&mut self, template: &str, handler: F) -> &CompiledRoute
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(Method::GET, template, handler)
    }

    pub fn post<F>(&mut self, template: &str, handler: F) -> &CompiledRoute
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(Method::POST, template, handler)
    }

    pub fn put<F>(&mut self, template: &str, handler: F) -> &CompiledRoute
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(Method::PUT, template, handler)
    }

    pub fn patch<F>(&mut self, template: &str, handler: F) -> &CompiledRoute
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(Method::PATCH, template, handler)
    }

    pub fn delete<F>(&mut self, template: &str, handler: F) -> &CompiledRoute
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(Method::DELETE, template, handler)
    }

    /// Routes for `method` in registration order; empty for unknown verbs.
    #[must_use]
    pub fn routes_for(&self, method: &Method) -> &[Arc<CompiledRoute>] {
        self.routes.get(method).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of registered routes across all verbs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `"METHOD template"` lines, grouped by verb (sorted), registration
    /// order within a verb.
    #[must_use]
    pub fn route_summaries(&self) -> Vec<String> {
        let mut methods: Vec<&Method> = self.routes.keys().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
            .into_iter()
            .flat_map(|m| self.routes_for(m).iter())
            .map(|r| format!("{} {}", r.method, r.template))
            .collect()
    }

    /// Print all registered routes to stdout.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.count);
        for line in self.route_summaries() {
            println!("[route] {line}");
        }
    }
}

impl fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("routes", &self.route_summaries())
            .finish()
    }
}
