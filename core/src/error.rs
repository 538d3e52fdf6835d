//! Error types for the courier client.
//!
//! # Design
//! Every stage of the send pipeline has its own variant so callers can tell
//! a malformed request from a network failure from a server that answered
//! with the wrong status. `BadStatus` is special: the round-trip succeeded,
//! so it carries the full `Response` and the caller can still read the body
//! of a "failed" call.

use thiserror::Error;

use crate::response::Response;

/// Opaque error produced by an external collaborator (transport, encoder,
/// decoder). Surfaced verbatim through the matching `Error` variant.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `Client` and `Response` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The request method is not one of the nine standard HTTP verbs.
    #[error("invalid HTTP method: {0:?}")]
    InvalidMethod(String),

    /// The client or request is configured inconsistently, e.g. a body is
    /// present but no encoder is available.
    #[error("configuration error: {0}")]
    Config(String),

    /// The base URL or the request URL could not be parsed.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The encoder failed to turn the request body into bytes.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] BoxError),

    /// The transport failed before any response was received.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The status validator rejected the response status.
    #[error("unexpected status code: {status}")]
    BadStatus {
        status: u16,
        response: Box<Response>,
    },

    /// Reading the response body stream failed.
    #[error("failed to read response body: {0}")]
    Body(#[from] std::io::Error),

    /// The decoder failed to populate a decode target.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] BoxError),

    /// A verb helper received a response but could not decode it. `source`
    /// is the `Decode`, `Body` or `UnsupportedContentType` failure.
    #[error("{source}")]
    ResponseDecode {
        #[source]
        source: Box<Error>,
        response: Box<Response>,
    },

    /// No decoder is known for the response Content-Type.
    #[error("unsupported content type: {0:?}")]
    UnsupportedContentType(String),

    /// The background send panicked before producing a result.
    #[error("send task panicked")]
    TaskPanicked,
}

impl Error {
    /// The response carried by `BadStatus` or `ResponseDecode`.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::BadStatus { response, .. } | Error::ResponseDecode { response, .. } => {
                Some(response)
            }
            _ => None,
        }
    }

    /// Consume the error, returning the response it carries, if any.
    pub fn into_response(self) -> Option<Response> {
        match self {
            Error::BadStatus { response, .. } | Error::ResponseDecode { response, .. } => {
                Some(*response)
            }
            _ => None,
        }
    }

    /// Status code of a `BadStatus` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::BadStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
