//! Convenience layer over a pluggable HTTP transport.
//!
//! # Overview
//! A `Client` turns a `Request` into an `HttpRequest`, hands it to a
//! `Transport`, validates the status and wraps the result in a `Response`.
//! Responses buffer their body on first read so it can be read again, and
//! decode it into any number of typed targets, optionally gated on the
//! status code.
//!
//! ```no_run
//! use courier_core::{on_2xx, on_4xx, Client};
//! use serde::Deserialize;
//!
//! #[derive(Default, Deserialize)]
//! struct User { id: u64, name: String }
//!
//! #[derive(Default, Deserialize)]
//! struct ApiError { message: String }
//!
//! # fn main() -> Result<(), courier_core::Error> {
//! let client = Client::builder()
//!     .base_url("https://api.example.com/v1/")
//!     .accept_all_statuses()
//!     .build()?;
//!
//! let mut user = User::default();
//! let mut problem = ApiError::default();
//! let response = client.get(None, "users/1", &mut [on_2xx(&mut user), on_4xx(&mut problem)])?;
//! println!("{} -> {} / {}", response.status(), user.name, problem.message);
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - The transport is a one-method trait; closures implement it, so test
//!   doubles and middleware need no extra types.
//! - `Client::send` runs the pipeline on its own thread and returns a
//!   `Future` with a blocking, repeatable `response()` read.
//! - Retries, redirects, pooling and TLS belong to the transport.

mod body;
pub mod client;
pub mod codec;
pub mod error;
pub mod future;
pub mod hook;
pub mod http;
pub mod request;
pub mod response;
#[cfg(feature = "ureq")]
pub mod transport;

pub use client::{default_status_validator, Client, ClientBuilder, StatusValidator, DEFAULT_TIMEOUT};
pub use codec::{infer_decoder, Decoder, Encoder, FormDecoder, FormEncoder, JsonDecoder, JsonEncoder};
pub use error::{BoxError, Error};
pub use future::Future;
pub use hook::{
    direct, on_2xx, on_4xx, on_5xx, on_non_2xx, on_status, DecodeSlot, DecodeTarget, StatusMatch,
};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use request::Request;
pub use response::Response;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
