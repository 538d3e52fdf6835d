//! Replay buffering for response bodies.
//!
//! A transport stream can be read once. `ReplayableBody` reads it to the end
//! on first use, keeps the bytes, and drops the stream so the transport
//! resource is released exactly once. Every later read is served from
//! memory. The transition is one-way.

use std::fmt;
use std::io::{self, Read};

use bytes::Bytes;

pub(crate) enum ReplayableBody {
    Unbuffered(Box<dyn Read + Send>),
    Buffered(Bytes),
}

impl ReplayableBody {
    pub(crate) fn new(stream: Box<dyn Read + Send>) -> Self {
        ReplayableBody::Unbuffered(stream)
    }

    pub(crate) fn is_buffered(&self) -> bool {
        matches!(self, ReplayableBody::Buffered(_))
    }

    /// Return the full body, reading the stream first if needed.
    ///
    /// A failed read still transitions to `Buffered` with whatever was read
    /// before the failure; the error is returned once.
    pub(crate) fn bytes(&mut self) -> io::Result<Bytes> {
        let stream = match self {
            ReplayableBody::Buffered(bytes) => return Ok(bytes.clone()),
            ReplayableBody::Unbuffered(stream) => stream,
        };

        let mut buf = Vec::new();
        let result = stream.read_to_end(&mut buf);
        let bytes = Bytes::from(buf);

        // Replacing the variant drops the stream, which closes it.
        *self = ReplayableBody::Buffered(bytes.clone());
        tracing::trace!(len = bytes.len(), "buffered response body");

        result.map(|_| bytes)
    }
}

impl fmt::Debug for ReplayableBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayableBody::Unbuffered(_) => f.write_str("Unbuffered"),
            ReplayableBody::Buffered(bytes) => write!(f, "Buffered({} bytes)", bytes.len()),
        }
    }
}
