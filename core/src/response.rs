//! Response wrapper with replayable body access and multi-target decoding.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use bytes::Bytes;

use crate::body::ReplayableBody;
use crate::codec::{infer_decoder, Decoder, JsonDecoder};
use crate::error::Error;
use crate::hook::DecodeTarget;
use crate::http::{find_header, HttpResponse};

/// The response to a completed send.
///
/// The body is pulled from the transport on the first call to `body_bytes`,
/// `body_string` or any `decode*` method, and served from memory afterwards.
/// Body access takes `&self` so a `Response` held by a `Future` can be read
/// through a shared reference.
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Mutex<ReplayableBody>,
}

impl Response {
    pub fn new(raw: HttpResponse) -> Self {
        Self {
            status: raw.status,
            headers: raw.headers,
            body: Mutex::new(ReplayableBody::new(raw.body)),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// The full body. Reads and closes the transport stream on first call.
    pub fn body_bytes(&self) -> Result<Bytes, Error> {
        let mut body = self.body.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(body.bytes()?)
    }

    pub fn body_string(&self) -> Result<String, Error> {
        let bytes = self.body_bytes()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::Body(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    /// Decode using the decoder inferred from the Content-Type header.
    pub fn decode(&self, targets: &mut [DecodeTarget<'_>]) -> Result<(), Error> {
        let decoder = infer_decoder(self.content_type().unwrap_or_default())?;
        self.decode_using(decoder, targets)
    }

    /// Decode as JSON regardless of the Content-Type header.
    pub fn decode_json(&self, targets: &mut [DecodeTarget<'_>]) -> Result<(), Error> {
        self.decode_using(&JsonDecoder, targets)
    }

    /// Decode the body into each target in order.
    ///
    /// Conditional targets whose predicate rejects the status are skipped.
    /// Every other target gets its own full decode of the body. The first
    /// failure is returned and the remaining targets are left untouched.
    pub fn decode_using(
        &self,
        decoder: &dyn Decoder,
        targets: &mut [DecodeTarget<'_>],
    ) -> Result<(), Error> {
        let body = self.body_bytes()?;

        for (index, target) in targets.iter_mut().enumerate() {
            let Some(slot) = target.resolve(self.status) else {
                tracing::trace!(index, status = self.status, "skipping decode target");
                continue;
            };

            let value = decoder.decode(&body).map_err(Error::Decode)?;
            slot.fill(value).map_err(|e| Error::Decode(Box::new(e)))?;
            tracing::trace!(index, "decoded response body");
        }

        Ok(())
    }
}

impl From<HttpResponse> for Response {
    fn from(raw: HttpResponse) -> Self {
        Response::new(raw)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
