//! Canonical responses and the coercer that produces them.
//!
//! Handlers hand back a [`Reply`]; the dispatcher folds it into the
//! [`ResponseBuilder`] staged on the request context and returns the resulting
//! [`CanonicalResponse`] to the server component.

use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Maximum number of headers kept inline before spilling to the heap.
pub const MAX_INLINE_HEADERS: usize = 8;

/// Default status for responses nobody set a status on.
pub const DEFAULT_STATUS: u16 = 200;

/// Lazily produced body chunks, consumed by the transport layer.
pub type BodyStream = Box<dyn Iterator<Item = Vec<u8>> + Send>;

/// Ordered header mapping with case-insensitive keys.
///
/// Inserting an existing name (in any case) replaces the previous value but
/// keeps the new casing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>);

impl Headers {
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Add or replace a header.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.0.push((Arc::from(name), value.into()));
    }

    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.0.remove(pos).1)
    }

    /// Merge another fragment into this one; `other` wins on collisions.
    pub fn merge(&mut self, other: Headers) {
        for (name, value) in other.0 {
            self.insert(&name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (&**k, v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k.as_ref(), v);
        }
        headers
    }
}

impl<K: AsRef<str>, V: Into<String>, const N: usize> From<[(K, V); N]> for Headers {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Response body: one buffered value or a lazy sequence of chunks.
pub enum Body {
    Full(Vec<u8>),
    Stream(BodyStream),
}

impl Body {
    #[must_use]
    pub fn empty() -> Self {
        Body::Full(Vec::new())
    }

    /// Wrap any iterator of chunks as a lazy body.
    pub fn stream<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Vec<u8>>,
        I::Item: 'static,
        I::IntoIter: Send + 'static,
    {
        Body::Stream(Box::new(chunks.into_iter().map(Into::<Vec<u8>>::into)))
    }

    /// The buffered body as UTF-8, if it is buffered and valid.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Body::Full(bytes) => std::str::from_utf8(bytes).ok(),
            Body::Stream(_) => None,
        }
    }

    #[must_use]
    pub fn is_stream(&self) -> bool {
        matches!(self, Body::Stream(_))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Full(bytes) if bytes.is_empty())
    }

    /// Drain the body into a single buffer. Consumes streams.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Body::Full(bytes) => bytes,
            Body::Stream(chunks) => chunks.flatten().collect(),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Full(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => f.debug_tuple("Full").field(&text).finish(),
                Err(_) => f.debug_tuple("Full").field(&bytes.len()).finish(),
            },
            Body::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Full(s.into_bytes())
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Full(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Full(bytes)
    }
}

/// Everything a handler may return, or pass to an early exit.
pub enum Reply {
    /// Status only; the body is reset to empty.
    Status(u16),
    /// Body only; status stays whatever was staged (200 by default).
    Body(Body),
    /// `[status, headers..., body]`: header fragments merge in order, later wins.
    Full {
        status: u16,
        headers: Vec<Headers>,
        body: Option<Body>,
    },
    /// Lazy chunks handed to the transport as-is.
    Stream(BodyStream),
    /// No explicit content; whatever is staged is kept.
    Empty,
}

impl Reply {
    /// `[status, headers, body]` with a single header fragment.
    pub fn full(status: u16, headers: impl Into<Headers>, body: impl Into<Body>) -> Self {
        Reply::Full {
            status,
            headers: vec![headers.into()],
            body: Some(body.into()),
        }
    }

    pub fn stream<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Vec<u8>>,
        I::Item: 'static,
        I::IntoIter: Send + 'static,
    {
        Reply::Stream(Box::new(chunks.into_iter().map(Into::<Vec<u8>>::into)))
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Status(status) => f.debug_tuple("Status").field(status).finish(),
            Reply::Body(body) => f.debug_tuple("Body").field(body).finish(),
            Reply::Full {
                status,
                headers,
                body,
            } => f
                .debug_struct("Full")
                .field("status", status)
                .field("headers", headers)
                .field("body", body)
                .finish(),
            Reply::Stream(_) => f.write_str("Stream(..)"),
            Reply::Empty => f.write_str("Empty"),
        }
    }
}

impl From<u16> for Reply {
    fn from(status: u16) -> Self {
        Reply::Status(status)
    }
}

impl From<&str> for Reply {
    fn from(s: &str) -> Self {
        Reply::Body(s.into())
    }
}

impl From<String> for Reply {
    fn from(s: String) -> Self {
        Reply::Body(s.into())
    }
}

impl From<Body> for Reply {
    fn from(body: Body) -> Self {
        Reply::Body(body)
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::Empty
    }
}

impl<H: Into<Headers>, B: Into<Body>> From<(u16, H, B)> for Reply {
    fn from((status, headers, body): (u16, H, B)) -> Self {
        Reply::full(status, headers, body)
    }
}

/// The normalized (status, headers, body) triple handed back to the server.
#[derive(Debug)]
pub struct CanonicalResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Body,
}

impl CanonicalResponse {
    /// Body as text, for buffered UTF-8 bodies.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.body.text()
    }
}

impl Default for CanonicalResponse {
    fn default() -> Self {
        ResponseBuilder::new().finish()
    }
}

/// Response being built for the current request.
///
/// Helpers such as `redirect` stage status and headers here before halting;
/// the coercer then applies the handler's reply on top.
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    status: Option<u16>,
    headers: Headers,
    body: Option<Body>,
}

impl ResponseBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: u16) -> &mut Self {
        if valid_status(status) {
            self.status = Some(status);
        } else {
            warn!(status, "Ignoring out-of-range status code");
        }
        self
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    pub fn set_body(&mut self, body: impl Into<Body>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(DEFAULT_STATUS)
    }

    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Apply a handler reply on top of the staged state.
    #[must_use]
    pub fn apply(mut self, reply: Reply) -> CanonicalResponse {
        match reply {
            Reply::Status(status) => {
                self.set_status(status);
                self.body = Some(Body::empty());
            }
            Reply::Body(body) => {
                self.body = Some(body);
            }
            Reply::Full {
                status,
                headers,
                body,
            } => {
                self.set_status(status);
                self.body = Some(body.unwrap_or_default());
                for fragment in headers {
                    self.headers.merge(fragment);
                }
            }
            Reply::Stream(chunks) => {
                self.body = Some(Body::Stream(chunks));
            }
            Reply::Empty => {}
        }
        self.finish()
    }

    #[must_use]
    pub fn finish(self) -> CanonicalResponse {
        CanonicalResponse {
            status: self.status.unwrap_or(DEFAULT_STATUS),
            headers: self.headers,
            body: self.body.unwrap_or_default(),
        }
    }
}

/// Coerce an exit value into a canonical response on top of `staged`.
///
/// `None` is the payload-less early exit and behaves like [`Reply::Empty`].
#[must_use]
pub fn coerce(raw: Option<Reply>, staged: ResponseBuilder) -> CanonicalResponse {
    staged.apply(raw.unwrap_or(Reply::Empty))
}

fn valid_status(status: u16) -> bool {
    http::StatusCode::from_u16(status).is_ok()
}

/// Standard reason phrase for a status, `"Unknown"` when there is none.
#[must_use]
pub fn status_reason(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(303), "See Other");
    }

    #[test]
    fn test_headers_case_insensitive_replace() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/plain");
        headers.insert("content-type", "text/html");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/html"));
    }

    #[test]
    fn test_headers_merge_later_wins() {
        let mut headers = Headers::from([("X", "1"), ("Y", "2")]);
        headers.merge(Headers::from([("x", "3")]));
        assert_eq!(headers.get("X"), Some("3"));
        assert_eq!(headers.get("Y"), Some("2"));
    }

    #[test]
    fn test_headers_remove() {
        let mut headers = Headers::from([("Location", "/a")]);
        assert_eq!(headers.remove("location").as_deref(), Some("/a"));
        assert!(headers.is_empty());
        assert_eq!(headers.remove("location"), None);
    }

    #[test]
    fn test_empty_keeps_staged_state() {
        let mut staged = ResponseBuilder::new();
        staged.set_status(302).set_header("Location", "/quotes");
        let res = coerce(None, staged);
        assert_eq!(res.status, 302);
        assert_eq!(res.headers.get("Location"), Some("/quotes"));
        assert!(res.body.is_empty());
    }

    #[test]
    fn test_status_reply_resets_body() {
        let mut staged = ResponseBuilder::new();
        staged.set_body("stale");
        let res = coerce(Some(Reply::Status(204)), staged);
        assert_eq!(res.status, 204);
        assert!(res.body.is_empty());
    }

    #[test]
    fn test_body_reply_keeps_staged_status() {
        let mut staged = ResponseBuilder::new();
        staged.set_status(201);
        let res = coerce(Some("made".into()), staged);
        assert_eq!(res.status, 201);
        assert_eq!(res.text(), Some("made"));
    }

    #[test]
    fn test_out_of_range_status_is_ignored() {
        let res = coerce(Some(Reply::Status(0)), ResponseBuilder::new());
        assert_eq!(res.status, 200);
        let res = coerce(Some(Reply::Status(1000)), ResponseBuilder::new());
        assert_eq!(res.status, 200);
    }

    #[test]
    fn test_status_only_full_reply() {
        let res = coerce(
            Some(Reply::Full {
                status: 418,
                headers: Vec::new(),
                body: None,
            }),
            ResponseBuilder::new(),
        );
        assert_eq!(res.status, 418);
        assert!(res.headers.is_empty());
        assert!(res.body.is_empty());
    }

    #[test]
    fn test_builder_exposes_staged_state() {
        let mut staged = ResponseBuilder::new();
        assert_eq!(staged.status(), DEFAULT_STATUS);
        staged.set_status(201).set_header("X-Trace", "abc");
        assert_eq!(staged.status(), 201);
        assert_eq!(staged.headers().get("x-trace"), Some("abc"));
        assert_eq!(staged.headers().len(), 1);
    }

    #[test]
    fn test_owned_chunks_stream() {
        let lines: Vec<String> = vec!["a\n".to_string(), "b\n".to_string()];
        let body = Body::stream(lines);
        assert!(body.is_stream());
        assert!(!body.is_empty());
        assert_eq!(body.into_bytes(), b"a\nb\n".to_vec());

        let reply = Reply::stream(vec![vec![1u8, 2], vec![3u8]]);
        let res = coerce(Some(reply), ResponseBuilder::new());
        assert_eq!(res.body.into_bytes(), vec![1u8, 2, 3]);
    }

    #[test]
    fn test_stream_body_is_lazy() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static PULLED: AtomicUsize = AtomicUsize::new(0);

        let chunks = (0..3).map(|i| {
            PULLED.fetch_add(1, Ordering::SeqCst);
            format!("{i}")
        });
        let res = coerce(Some(Reply::stream(chunks)), ResponseBuilder::new());
        assert_eq!(res.status, 200);
        assert!(res.body.is_stream());
        assert_eq!(PULLED.load(Ordering::SeqCst), 0);
        assert_eq!(res.body.into_bytes(), b"012".to_vec());
        assert_eq!(PULLED.load(Ordering::SeqCst), 3);
    }
}
