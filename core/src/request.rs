//! Caller-facing request description.
//!
//! # Design
//! `Request` is what a caller hands to `Client::send`: the method is still a
//! string and the URL may be relative to the client's base. The client turns
//! it into an `HttpRequest` in one pass, see `Client::execute`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::codec::Encoder;
use crate::error::Error;
use crate::http::HttpMethod;

/// An outgoing call, consumed by a single send.
#[derive(Clone, Default)]
pub struct Request {
    pub method: String,
    /// Absolute, or relative to the client's base URL.
    pub url: String,
    /// When set, these become the request's headers as given.
    pub headers: Option<Vec<(String, String)>>,
    pub body: Option<Value>,
    /// Overrides the client's default encoder for this request.
    pub encoder: Option<Arc<dyn Encoder>>,
    /// Abandon the exchange after this long. Enforced by the transport.
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method: method.as_str().to_string(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Append a header. The first call switches the request to explicit headers.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }

    /// Attach a body. Fails if `body` cannot be represented as a JSON value.
    ///
    /// A body that serializes to `null` (`()`, `None`) leaves the request
    /// without a body.
    pub fn body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, Error> {
        let value = serde_json::to_value(body).map_err(|e| Error::Encode(Box::new(e)))?;
        self.body = (!value.is_null()).then_some(value);
        Ok(self)
    }

    pub fn encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn validate(&self) -> Result<HttpMethod, Error> {
        self.method.parse()
    }

    /// Encode the body with the request's encoder, else `default_encoder`.
    ///
    /// Returns the bytes and their Content-Type, or `None` when there is no body.
    pub(crate) fn prepare_body(
        &self,
        default_encoder: Option<&dyn Encoder>,
    ) -> Result<Option<(Vec<u8>, String)>, Error> {
        let Some(body) = &self.body else {
            return Ok(None);
        };

        let encoder = self
            .encoder
            .as_deref()
            .or(default_encoder)
            .ok_or_else(|| {
                Error::Config("request has body but no encoder set on client or request".to_string())
            })?;

        let bytes = encoder.encode(body).map_err(Error::Encode)?;
        Ok(Some((bytes, encoder.content_type().to_string())))
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("encoder", &self.encoder.as_ref().map(|e| e.content_type().to_string()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{FormEncoder, JsonEncoder};
    use crate::error::BoxError;

    struct FailingEncoder;

    impl Encoder for FailingEncoder {
        fn encode(&self, _body: &Value) -> Result<Vec<u8>, BoxError> {
            Err("encoder exploded".into())
        }

        fn content_type(&self) -> &str {
            "application/x-broken"
        }
    }

    #[test]
    fn standard_methods_validate() {
        for method in HttpMethod::ALL {
            let request = Request::new(method, "/");
            assert_eq!(request.validate().unwrap(), method);
        }
    }

    #[test]
    fn unknown_method_fails_validation() {
        let request = Request {
            method: "BREW".to_string(),
            ..Request::get("/coffee")
        };
        assert!(matches!(request.validate(), Err(Error::InvalidMethod(ref m)) if m == "BREW"));
    }

    #[test]
    fn no_body_means_no_encoding() {
        let request = Request::get("/users");
        assert!(request.prepare_body(None).unwrap().is_none());
        assert!(request.prepare_body(Some(&JsonEncoder)).unwrap().is_none());
    }

    #[test]
    fn null_body_is_no_body() {
        let request = Request::delete("/users/1").body(&()).unwrap();
        assert!(request.body.is_none());
        let request = Request::delete("/users/1").body(&None::<u32>).unwrap();
        assert!(request.prepare_body(Some(&JsonEncoder)).unwrap().is_none());
    }

    #[test]
    fn default_encoder_is_used() {
        let request = Request::post("/users").body(&json!({"name": "ada"})).unwrap();
        let (bytes, content_type) = request.prepare_body(Some(&JsonEncoder)).unwrap().unwrap();
        assert_eq!(bytes, br#"{"name":"ada"}"#);
        assert_eq!(content_type, "application/json");
    }

    #[test]
    fn request_encoder_overrides_default() {
        let request = Request::post("/login")
            .body(&json!({"user": "ada"}))
            .unwrap()
            .encoder(FormEncoder);
        let (bytes, content_type) = request.prepare_body(Some(&JsonEncoder)).unwrap().unwrap();
        assert_eq!(bytes, b"user=ada");
        assert_eq!(content_type, "application/x-www-form-urlencoded");
    }

    #[test]
    fn body_without_any_encoder_is_a_config_error() {
        let request = Request::post("/users").body(&json!({})).unwrap();
        assert!(matches!(request.prepare_body(None), Err(Error::Config(_))));
    }

    #[test]
    fn encoder_failure_propagates() {
        let request = Request::put("/users/1")
            .body(&json!({"id": 1}))
            .unwrap()
            .encoder(FailingEncoder);
        let err = request.prepare_body(Some(&JsonEncoder)).unwrap_err();
        assert!(matches!(err, Error::Encode(ref source) if source.to_string() == "encoder exploded"));
    }

    #[test]
    fn header_builder_keeps_order() {
        let request = Request::get("/")
            .header("Accept", "application/json")
            .header("X-Request-Id", "42");
        assert_eq!(
            request.headers,
            Some(vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("X-Request-Id".to_string(), "42".to_string()),
            ])
        );
    }
}
