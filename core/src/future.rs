//! Handle to a send running on its own thread.

use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};

use crate::error::Error;
use crate::response::Response;

type Outcome = Result<Response, Error>;

/// A send in progress.
///
/// The first call to `response` blocks until the send finishes and stores
/// the outcome; every later call, from any thread, sees the same stored
/// outcome. There is no way to cancel from here: use `Request::timeout`.
pub struct Future {
    handle: Mutex<Option<JoinHandle<Outcome>>>,
    outcome: OnceLock<Outcome>,
}

impl Future {
    pub(crate) fn spawn<F>(send: F) -> Self
    where
        F: FnOnce() -> Outcome + Send + 'static,
    {
        Self {
            handle: Mutex::new(Some(thread::spawn(send))),
            outcome: OnceLock::new(),
        }
    }

    /// Wrap an outcome that is already known.
    pub fn ready(outcome: Result<Response, Error>) -> Self {
        Self {
            handle: Mutex::new(None),
            outcome: OnceLock::from(outcome),
        }
    }

    /// True once the result can be read without blocking.
    pub fn is_ready(&self) -> bool {
        if self.outcome.get().is_some() {
            return true;
        }
        let handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        match handle.as_ref() {
            Some(handle) => handle.is_finished(),
            // Another reader took the handle and may still be joining.
            None => self.outcome.get().is_some(),
        }
    }

    /// Block until the send completes and borrow its result.
    pub fn response(&self) -> Result<&Response, &Error> {
        self.outcome.get_or_init(|| self.join()).as_ref()
    }

    /// Block until the send completes and take ownership of its result.
    pub fn into_response(mut self) -> Result<Response, Error> {
        match self.outcome.take() {
            Some(outcome) => outcome,
            None => self.join(),
        }
    }

    fn join(&self) -> Outcome {
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match handle {
            Some(handle) => handle.join().unwrap_or_else(|_| Err(Error::TaskPanicked)),
            None => Err(Error::TaskPanicked),
        }
    }
}

impl fmt::Debug for Future {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("outcome", &self.outcome.get())
            .finish_non_exhaustive()
    }
}
