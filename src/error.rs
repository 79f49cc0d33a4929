//! Unified error type.

use std::fmt;

/// The error type returned by flowid's fallible operations.
///
/// The propagation path itself never fails: a malformed inbound header is
/// treated as absent, and an unbound context is a normal `None`. This type
/// surfaces the one remaining failure — an application constructing a
/// [`FlowId`](crate::FlowId) from a string of its own.
#[derive(Debug)]
pub struct Error {
    token: String,
}

impl Error {
    pub(crate) fn invalid(token: &str) -> Self {
        Self { token: token.to_owned() }
    }

    /// The rejected token, verbatim.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid flow id: {:?}", self.token)
    }
}

impl std::error::Error for Error {}
