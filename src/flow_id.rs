//! The flow-id token: syntax, validation, and generation.
//!
//! A flow id is an opaque string. flowid never inspects its structure beyond
//! the syntax check below — upstream services may send UUIDs, short random
//! tokens, or anything else that fits in a header. The only promises are:
//!
//! - non-empty, at most 128 bytes
//! - restricted to the URL- and header-safe set `[A-Za-z0-9._~+/=-]`
//! - immutable once created
//!
//! Anything outside that syntax is treated as *absent* by the extraction
//! path, never as an error: a garbage inbound header costs the caller
//! nothing but a freshly generated id.

use std::fmt;
use std::str::FromStr;

use http::header::HeaderValue;
use uuid::Uuid;

use crate::error::Error;

/// Longest token accepted from the wire. Anything longer is treated as
/// absent — headers are attacker-controlled input.
const MAX_LEN: usize = 128;

// ── FlowId ────────────────────────────────────────────────────────────────────

/// An opaque correlation token that follows a request chain.
///
/// Obtain one by [`generate`](FlowId::generate), [`parse`](FlowId::parse),
/// or — the usual way — from [`current()`](crate::current) inside a request
/// handled by [`FlowFilter`](crate::FlowFilter).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FlowId(String);

impl FlowId {
    /// Mints a fresh id: a hyphenated UUID v4.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().as_hyphenated().to_string())
    }

    /// Validates `token` and wraps it.
    ///
    /// Returns [`Error`] if the token is empty, longer than 128 bytes, or
    /// contains a character outside `[A-Za-z0-9._~+/=-]`.
    pub fn parse(token: &str) -> Result<Self, Error> {
        if is_valid(token) {
            Ok(Self(token.to_owned()))
        } else {
            Err(Error::invalid(token))
        }
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token as a ready-to-insert header value.
    ///
    /// Cannot fail: the validated syntax is a strict subset of what a header
    /// value may carry.
    pub(crate) fn header_value(&self) -> HeaderValue {
        HeaderValue::from_str(&self.0).expect("flow id syntax is header-safe")
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FlowId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for FlowId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Accepts `[A-Za-z0-9._~+/=-]`, 1 to 128 bytes — URL-safe tokens, UUIDs,
/// and base64 variants all pass.
pub(crate) fn is_valid(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'~' | b'+' | b'/' | b'=' | b'-'))
}

// ── Source ────────────────────────────────────────────────────────────────────

/// Where a flow id came from. Carried alongside the id for log labelling;
/// has no effect on propagation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Source {
    /// Reused from the inbound request header.
    Header,
    /// Freshly minted because the header was absent or malformed.
    Generated,
}

impl Source {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Generated => "generated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_token_shapes() {
        for token in [
            "abc-123",
            "Rcki42fkTYKczZpkzXEzKA",
            "550e8400-e29b-41d4-a716-446655440000",
            "dGhpcyBpcw==",
            "a",
        ] {
            assert!(FlowId::parse(token).is_ok(), "rejected {token:?}");
        }
    }

    #[test]
    fn parse_preserves_token_verbatim() {
        let id = FlowId::parse("abc-123").unwrap();
        assert_eq!(id.as_str(), "abc-123");
        assert_eq!(id.to_string(), "abc-123");
    }

    #[test]
    fn rejects_empty() {
        assert!(FlowId::parse("").is_err());
    }

    #[test]
    fn rejects_oversized() {
        let token = "a".repeat(129);
        assert!(FlowId::parse(&token).is_err());
        assert!(FlowId::parse(&token[..128]).is_ok());
    }

    #[test]
    fn rejects_unsafe_characters() {
        for token in ["has space", "tab\there", "null\0byte", "émoji", "a,b", "{curly}"] {
            assert!(FlowId::parse(token).is_err(), "accepted {token:?}");
        }
    }

    #[test]
    fn from_str_round_trips() {
        let id: FlowId = "abc-123".parse().unwrap();
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn error_carries_rejected_token() {
        let err = FlowId::parse("has space").unwrap_err();
        assert_eq!(err.token(), "has space");
    }

    #[test]
    fn generated_ids_are_valid_and_unique() {
        let a = FlowId::generate();
        let b = FlowId::generate();
        assert!(is_valid(a.as_str()));
        assert_ne!(a, b);
    }

    #[test]
    fn generated_id_survives_header_conversion() {
        let id = FlowId::generate();
        assert_eq!(id.header_value().to_str().unwrap(), id.as_str());
    }
}
