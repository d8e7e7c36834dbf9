//! # Server Boundary
//!
//! Types exchanged with the surrounding HTTP server component. The listener
//! loop itself lives outside this crate; it hands over an [`InboundRequest`]
//! and writes the returned [`CanonicalResponse`] to the connection.

pub mod request;
pub mod response;

pub use request::{parse_form, InboundRequest, RequestParseError};
pub use response::{
    coerce, status_reason, Body, BodyStream, CanonicalResponse, Headers, Reply, ResponseBuilder,
};
