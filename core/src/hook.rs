//! Decode targets and status-conditioned decode hooks.
//!
//! # Design
//! A decode call takes a list of `DecodeTarget`s. A `Direct` target is always
//! decoded into; a `Conditional` one only when its `StatusMatch` accepts the
//! response status. This lets a single call route a 2xx body into one type
//! and a 4xx body into another:
//!
//! ```no_run
//! # use courier_core::{on_2xx, on_4xx, Response};
//! # fn demo(response: &Response) -> Result<(), courier_core::Error> {
//! let mut user = serde_json::Value::Null;
//! let mut problem = serde_json::Value::Null;
//! response.decode(&mut [on_2xx(&mut user), on_4xx(&mut problem)])?;
//! # Ok(())
//! # }
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A writable destination for decoded data.
///
/// Implemented for every `DeserializeOwned` type.
pub trait DecodeSlot {
    fn fill(&mut self, value: Value) -> Result<(), serde_json::Error>;
}

impl<T: DeserializeOwned> DecodeSlot for T {
    fn fill(&mut self, value: Value) -> Result<(), serde_json::Error> {
        *self = serde_json::from_value(value)?;
        Ok(())
    }
}

/// Status-code predicate used by conditional targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMatch {
    /// 200..=299
    Success,
    /// 400..=499
    ClientError,
    /// 500..=599
    ServerError,
    /// Anything outside 200..=299.
    NonSuccess,
    Exact(u16),
}

impl StatusMatch {
    pub fn matches(&self, status: u16) -> bool {
        match self {
            StatusMatch::Success => (200..300).contains(&status),
            StatusMatch::ClientError => (400..500).contains(&status),
            StatusMatch::ServerError => (500..600).contains(&status),
            StatusMatch::NonSuccess => !(200..300).contains(&status),
            StatusMatch::Exact(expected) => *expected == status,
        }
    }
}

/// One entry in a decode call.
pub enum DecodeTarget<'a> {
    Direct(&'a mut dyn DecodeSlot),
    Conditional(StatusMatch, &'a mut dyn DecodeSlot),
}

impl<'a> DecodeTarget<'a> {
    /// The slot to decode into for `status`, or `None` to skip this target.
    pub fn resolve(&mut self, status: u16) -> Option<&mut dyn DecodeSlot> {
        match self {
            DecodeTarget::Direct(slot) => Some(&mut **slot),
            DecodeTarget::Conditional(predicate, slot) if predicate.matches(status) => {
                Some(&mut **slot)
            }
            DecodeTarget::Conditional(..) => None,
        }
    }
}

impl<'a, T: DeserializeOwned> From<&'a mut T> for DecodeTarget<'a> {
    fn from(target: &'a mut T) -> Self {
        DecodeTarget::Direct(target)
    }
}

/// Always decode into `target`.
pub fn direct<T: DeserializeOwned>(target: &mut T) -> DecodeTarget<'_> {
    DecodeTarget::Direct(target)
}

/// Decode into `target` when the status is 2xx.
pub fn on_2xx<T: DeserializeOwned>(target: &mut T) -> DecodeTarget<'_> {
    DecodeTarget::Conditional(StatusMatch::Success, target)
}

/// Decode into `target` when the status is 4xx.
pub fn on_4xx<T: DeserializeOwned>(target: &mut T) -> DecodeTarget<'_> {
    DecodeTarget::Conditional(StatusMatch::ClientError, target)
}

/// Decode into `target` when the status is 5xx.
pub fn on_5xx<T: DeserializeOwned>(target: &mut T) -> DecodeTarget<'_> {
    DecodeTarget::Conditional(StatusMatch::ServerError, target)
}

/// Decode into `target` unless the status is 2xx.
pub fn on_non_2xx<T: DeserializeOwned>(target: &mut T) -> DecodeTarget<'_> {
    DecodeTarget::Conditional(StatusMatch::NonSuccess, target)
}

/// Decode into `target` when the status is exactly `status`.
pub fn on_status<T: DeserializeOwned>(status: u16, target: &mut T) -> DecodeTarget<'_> {
    DecodeTarget::Conditional(StatusMatch::Exact(status), target)
}
