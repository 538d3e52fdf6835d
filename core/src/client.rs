//! The courier client: request preparation, dispatch and status validation.
//!
//! # Design
//! `Client` holds only immutable configuration behind an `Arc`, so it is
//! cheap to clone and a clone can be moved onto the thread that runs an
//! asynchronous send. The pipeline in `execute` is strictly sequential and
//! stops at the first failure:
//!
//! 1. validate the method
//! 2. resolve the URL against the base URL, if any
//! 3. encode the body with the request's encoder or the client default
//! 4. assemble the `HttpRequest` (explicit headers win, Content-Type is only
//!    added when absent)
//! 5. call the transport exactly once
//! 6. run the status validator; a rejection still carries the response

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::codec::{Encoder, JsonEncoder};
use crate::error::Error;
use crate::future::Future;
use crate::hook::DecodeTarget;
use crate::http::{find_header, HttpRequest, Transport};
use crate::request::Request;
use crate::response::Response;

/// Time limit applied to the default transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Predicate deciding whether a status code counts as success.
pub type StatusValidator = Arc<dyn Fn(u16) -> bool + Send + Sync>;

/// Accepts 2xx statuses only. Installed unless configured otherwise.
pub fn default_status_validator(status: u16) -> bool {
    (200..300).contains(&status)
}

struct ClientConfig {
    base_url: Option<Url>,
    encoder: Option<Arc<dyn Encoder>>,
    status_validator: Option<StatusValidator>,
    transport: Arc<dyn Transport>,
}

/// Blocking HTTP client over a pluggable `Transport`.
///
/// Configuration is fixed at construction. Clones share it, so a `Client`
/// can be handed to other threads freely.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientConfig>,
}

impl Client {
    /// Client over the default `ureq` transport with `DEFAULT_TIMEOUT`.
    #[cfg(feature = "ureq")]
    pub fn new() -> Self {
        Self::with_transport(crate::transport::UreqTransport::default())
    }

    /// Client with default settings over a caller-supplied transport.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            inner: Arc::new(ClientConfig {
                base_url: None,
                encoder: Some(Arc::new(JsonEncoder)),
                status_validator: Some(Arc::new(default_status_validator)),
                transport: Arc::new(transport),
            }),
        }
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.inner.base_url.as_ref()
    }

    /// GET `url` and decode the body into `targets`.
    ///
    /// Every verb helper is `send` followed by a blocking wait. `timeout`
    /// bounds this call alone, on top of the transport's own limit. When
    /// decoding fails the response comes back inside `Error::ResponseDecode`.
    pub fn get(
        &self,
        timeout: Option<Duration>,
        url: &str,
        targets: &mut [DecodeTarget<'_>],
    ) -> Result<Response, Error> {
        self.call(Request::get(url), timeout, targets)
    }

    /// POST `body` to `url`. A body serializing to `null` sends no body.
    pub fn post<B: Serialize + ?Sized>(
        &self,
        timeout: Option<Duration>,
        url: &str,
        body: &B,
        targets: &mut [DecodeTarget<'_>],
    ) -> Result<Response, Error> {
        self.call(Request::post(url).body(body)?, timeout, targets)
    }

    pub fn put<B: Serialize + ?Sized>(
        &self,
        timeout: Option<Duration>,
        url: &str,
        body: &B,
        targets: &mut [DecodeTarget<'_>],
    ) -> Result<Response, Error> {
        self.call(Request::put(url).body(body)?, timeout, targets)
    }

    pub fn patch<B: Serialize + ?Sized>(
        &self,
        timeout: Option<Duration>,
        url: &str,
        body: &B,
        targets: &mut [DecodeTarget<'_>],
    ) -> Result<Response, Error> {
        self.call(Request::patch(url).body(body)?, timeout, targets)
    }

    /// DELETE `url`. Pass `&()` for a request without a body.
    pub fn delete<B: Serialize + ?Sized>(
        &self,
        timeout: Option<Duration>,
        url: &str,
        body: &B,
        targets: &mut [DecodeTarget<'_>],
    ) -> Result<Response, Error> {
        self.call(Request::delete(url).body(body)?, timeout, targets)
    }

    /// Start `request` on a new thread and return immediately.
    pub fn send(&self, request: Request) -> Future {
        let client = self.clone();
        Future::spawn(move || client.execute(request))
    }

    /// Run the full send pipeline on the calling thread.
    pub fn execute(&self, request: Request) -> Result<Response, Error> {
        let method = request.validate()?;
        let url = self.resolve_url(&request.url)?;
        let encoded = request.prepare_body(self.inner.encoder.as_deref())?;

        let mut headers = request.headers.unwrap_or_default();
        let body = match encoded {
            Some((bytes, content_type)) => {
                if !content_type.is_empty() && find_header(&headers, "content-type").is_none() {
                    headers.push(("Content-Type".to_string(), content_type));
                }
                Some(bytes)
            }
            None => None,
        };

        self.dispatch(HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: request.timeout,
        })
    }

    /// Send a prepared request through the transport and validate its status.
    pub fn dispatch(&self, request: HttpRequest) -> Result<Response, Error> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let raw = self
            .inner
            .transport
            .execute(request)
            .map_err(Error::Transport)?;
        let status = raw.status;
        tracing::debug!(status, "received response");

        let response = Response::new(raw);
        if let Some(validator) = &self.inner.status_validator {
            if !validator(status) {
                tracing::debug!(status, "status rejected by validator");
                return Err(Error::BadStatus {
                    status,
                    response: Box::new(response),
                });
            }
        }

        Ok(response)
    }

    /// Resolve `url` against the base URL as an RFC 3986 reference. Without
    /// a base URL, `url` must be absolute and is returned unchanged.
    pub fn resolve_url(&self, url: &str) -> Result<String, Error> {
        match &self.inner.base_url {
            Some(base) => Ok(base.join(url)?.into()),
            None => {
                Url::parse(url)?;
                Ok(url.to_string())
            }
        }
    }

    fn call(
        &self,
        mut request: Request,
        timeout: Option<Duration>,
        targets: &mut [DecodeTarget<'_>],
    ) -> Result<Response, Error> {
        request.timeout = timeout;
        let response = self.send(request).into_response()?;
        if targets.is_empty() {
            return Ok(response);
        }
        match response.decode(targets) {
            Ok(()) => Ok(response),
            Err(source) => Err(Error::ResponseDecode {
                source: Box::new(source),
                response: Box::new(response),
            }),
        }
    }
}

#[cfg(feature = "ureq")]
impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_ref().map(Url::as_str))
            .field(
                "encoder",
                &self.inner.encoder.as_ref().map(|e| e.content_type().to_string()),
            )
            .field("status_validator", &self.inner.status_validator.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for `Client`.
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    status_validator: Option<StatusValidator>,
    encoder: Option<Arc<dyn Encoder>>,
    transport: Option<Arc<dyn Transport>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: None,
            status_validator: Some(Arc::new(default_status_validator)),
            encoder: Some(Arc::new(JsonEncoder)),
            transport: None,
        }
    }
}

impl ClientBuilder {
    /// Relative request URLs are resolved against `url`. An empty string
    /// means no base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Timeout for the default transport. Cannot be combined with `transport`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn status_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(u16) -> bool + Send + Sync + 'static,
    {
        self.status_validator = Some(Arc::new(validator));
        self
    }

    /// Treat every status code as success.
    pub fn accept_all_statuses(mut self) -> Self {
        self.status_validator = None;
        self
    }

    pub fn encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    /// Remove the default encoder. Requests with a body then need their own.
    pub fn without_encoder(mut self) -> Self {
        self.encoder = None;
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        let base_url = match self.base_url.as_deref() {
            None | Some("") => None,
            Some(url) => Some(Url::parse(url)?),
        };

        let transport = match (self.transport, self.timeout) {
            (Some(_), Some(_)) => {
                return Err(Error::Config(
                    "cannot set a timeout on a custom transport".to_string(),
                ))
            }
            (Some(transport), None) => transport,
            (None, timeout) => default_transport(timeout.unwrap_or(DEFAULT_TIMEOUT))?,
        };

        Ok(Client {
            inner: Arc::new(ClientConfig {
                base_url,
                encoder: self.encoder,
                status_validator: self.status_validator,
                transport,
            }),
        })
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("status_validator", &self.status_validator.is_some())
            .field("encoder", &self.encoder.is_some())
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

#[cfg(feature = "ureq")]
fn default_transport(timeout: Duration) -> Result<Arc<dyn Transport>, Error> {
    Ok(Arc::new(crate::transport::UreqTransport::new(Some(timeout))))
}

#[cfg(not(feature = "ureq"))]
fn default_transport(_timeout: Duration) -> Result<Arc<dyn Transport>, Error> {
    Err(Error::Config("no transport configured".to_string()))
}
