use crate::server::response::Headers;
use http::Method;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Request descriptor handed to the dispatcher by the server component.
///
/// `path` is expected to be percent-decoded already and carries no query
/// string. `params` holds transport-level parameters (query string and form
/// body); path captures are merged on top of them during dispatch.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub path: String,
    pub params: HashMap<String, String>,
    pub headers: Headers,
    /// Opaque session state owned by the session collaborator.
    pub session: HashMap<String, String>,
}

/// Raised when a raw request line cannot be turned into an [`InboundRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestParseError {
    /// The method token is not a valid HTTP method
    InvalidMethod { method: String },
    /// The path segment of the target is not valid percent-encoded UTF-8
    InvalidPath { path: String },
}

impl fmt::Display for RequestParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestParseError::InvalidMethod { method } => {
                write!(f, "invalid HTTP method '{}'", method)
            }
            RequestParseError::InvalidPath { path } => {
                write!(f, "path '{}' is not valid percent-encoded UTF-8", path)
            }
        }
    }
}

impl std::error::Error for RequestParseError {}

impl InboundRequest {
    /// Build a request with no transport parameters.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: HashMap::new(),
            headers: Headers::new(),
            session: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: HashMap<String, String>) -> Self {
        self.session = session;
        self
    }

    /// Parse a method token and a request target such as `/quotes?page=2`.
    ///
    /// The path is percent-decoded, the query string and an optional
    /// `application/x-www-form-urlencoded` body are merged into `params`.
    /// Form values override query values with the same name.
    pub fn parse(
        method: &str,
        target: &str,
        form_body: Option<&str>,
    ) -> Result<Self, RequestParseError> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(|_| {
            RequestParseError::InvalidMethod {
                method: method.to_string(),
            }
        })?;

        let (raw_path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        let path = urlencoding::decode(raw_path)
            .map_err(|_| RequestParseError::InvalidPath {
                path: raw_path.to_string(),
            })?
            .into_owned();

        let mut params = query.map(parse_form).unwrap_or_default();
        if let Some(body) = form_body {
            params.extend(parse_form(body));
        }

        debug!(
            method = %method,
            path = %path,
            params_count = params.len(),
            "Inbound request parsed"
        );

        Ok(Self::new(method, path).with_params(params))
    }
}

/// Decode `application/x-www-form-urlencoded` pairs. Later duplicates win.
#[must_use]
pub fn parse_form(input: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(input.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
