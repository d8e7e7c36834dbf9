use crate::dispatcher::halt::{halt_empty, Halt, HandlerResult};
use crate::ids::RequestId;
use crate::server::{Headers, InboundRequest, ResponseBuilder};
use http::Method;
use std::collections::HashMap;
use tracing::debug;

/// Per-request state seen by handlers.
///
/// Created fresh for every request and owned by a single dispatch. Holds the
/// parameter map (transport params first, path captures merged on top), the
/// opaque session map and the response being built.
#[derive(Debug)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    path: String,
    params: HashMap<String, String>,
    headers: Headers,
    session: HashMap<String, String>,
    response: ResponseBuilder,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            params: HashMap::new(),
            headers: Headers::new(),
            session: HashMap::new(),
            response: ResponseBuilder::new(),
        }
    }

    /// Build a context from a server-provided request.
    ///
    /// An `x-request-id` header carrying a valid ULID is reused as the
    /// request id.
    #[must_use]
    pub fn from_request(request: InboundRequest) -> Self {
        let request_id = RequestId::from_header_or_new(request.headers.get("x-request-id"));
        Self {
            request_id,
            method: request.method,
            path: request.path,
            params: request.params,
            headers: request.headers,
            session: request.session,
            response: ResponseBuilder::new(),
        }
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Request header by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    #[must_use]
    pub fn session(&self) -> &HashMap<String, String> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.session
    }

    #[must_use]
    pub fn into_session(self) -> HashMap<String, String> {
        self.session
    }

    #[must_use]
    pub fn response(&self) -> &ResponseBuilder {
        &self.response
    }

    /// The response being built; anything staged here survives a
    /// payload-less exit.
    pub fn response_mut(&mut self) -> &mut ResponseBuilder {
        &mut self.response
    }

    pub(crate) fn take_response(&mut self) -> ResponseBuilder {
        std::mem::take(&mut self.response)
    }

    /// Merge path captures over the existing parameters. Path values win.
    pub(crate) fn merge_params(&mut self, captured: Vec<(String, String)>) {
        for (name, value) in captured {
            if let Some(previous) = self.params.insert(name.clone(), value) {
                debug!(
                    request_id = %self.request_id,
                    param = %name,
                    overridden = %previous,
                    "Path parameter overrides transport parameter"
                );
            }
        }
    }

    /// Redirect to `location` and stop the handler.
    ///
    /// GET requests get `302 Found`; every other method gets `303 See Other`
    /// so the client follows up with a GET.
    pub fn redirect(&mut self, location: &str) -> HandlerResult {
        let status = if self.method == Method::GET { 302 } else { 303 };
        debug!(
            request_id = %self.request_id,
            method = %self.method,
            location = %location,
            status,
            "Redirecting"
        );
        self.response
            .set_status(status)
            .set_header("Location", location);
        halt_empty()
    }

    /// Stop the handler and answer 404.
    pub fn not_found(&self) -> HandlerResult {
        Err(Halt::NotFound)
    }
}
