//! Body encoders and decoders.
//!
//! # Design
//! Request bodies travel through the pipeline as `serde_json::Value`, so an
//! encoder only has to handle one concrete type and stays object safe.
//! Decoders produce a `Value` too; turning it into the caller's typed target
//! happens in `hook::DecodeSlot`.

use serde_json::{Map, Value};

use crate::error::{BoxError, Error};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Turns a request body into bytes plus the Content-Type that describes them.
pub trait Encoder: Send + Sync {
    fn encode(&self, body: &Value) -> Result<Vec<u8>, BoxError>;

    fn content_type(&self) -> &str;
}

/// Parses a response body.
pub trait Decoder: Send + Sync {
    fn decode(&self, body: &[u8]) -> Result<Value, BoxError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn encode(&self, body: &Value) -> Result<Vec<u8>, BoxError> {
        Ok(serde_json::to_vec(body)?)
    }

    fn content_type(&self) -> &str {
        CONTENT_TYPE_JSON
    }
}

/// URL-encodes a flat JSON object. Nested objects and arrays are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormEncoder;

impl Encoder for FormEncoder {
    fn encode(&self, body: &Value) -> Result<Vec<u8>, BoxError> {
        Ok(serde_urlencoded::to_string(body)?.into_bytes())
    }

    fn content_type(&self) -> &str {
        CONTENT_TYPE_FORM
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn decode(&self, body: &[u8]) -> Result<Value, BoxError> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// Decodes `a=1&b=2` into `{"a": "1", "b": "2"}`. Repeated keys keep the
/// last value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormDecoder;

impl Decoder for FormDecoder {
    fn decode(&self, body: &[u8]) -> Result<Value, BoxError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
        let object: Map<String, Value> = pairs
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        Ok(Value::Object(object))
    }
}

/// Pick a decoder for a response Content-Type header value.
///
/// A missing or empty Content-Type falls back to JSON.
pub fn infer_decoder(content_type: &str) -> Result<&'static dyn Decoder, Error> {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match media_type.as_str() {
        "" | CONTENT_TYPE_JSON => Ok(&JsonDecoder),
        CONTENT_TYPE_FORM => Ok(&FormDecoder),
        other if other.ends_with("+json") => Ok(&JsonDecoder),
        _ => Err(Error::UnsupportedContentType(content_type.to_string())),
    }
}
