//! Flow extraction and outbound attachment.
//!
//! [`FlowPropagator`] is the piece both hooks share: it knows the header
//! name and nothing else. [`FlowFilter`](crate::FlowFilter) uses it on the
//! way in, [`FlowInterceptor`](crate::FlowInterceptor) on the way out, and
//! code with unusual transports (message queues, hand-rolled clients) can
//! call it directly against a bare [`HeaderMap`].

use http::header::{HeaderMap, HeaderName};

use crate::context;
use crate::flow_id::{FlowId, Source};

/// The default wire header, shared by inbound reads, outbound writes, and
/// the response echo.
pub const FLOW_ID_HEADER: &str = "x-flow-id";

// ── FlowPropagator ────────────────────────────────────────────────────────────

/// Reads, generates, and attaches flow ids for one configured header name.
#[derive(Clone, Debug)]
pub struct FlowPropagator {
    header: HeaderName,
}

impl FlowPropagator {
    /// A propagator on the default `x-flow-id` header.
    pub fn new() -> Self {
        Self::with_header(HeaderName::from_static(FLOW_ID_HEADER))
    }

    /// A propagator on a custom header.
    pub fn with_header(header: HeaderName) -> Self {
        Self { header }
    }

    /// The header this propagator reads and writes.
    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// The inbound id, if the header is present and syntactically valid.
    pub fn extract(&self, headers: &HeaderMap) -> Option<FlowId> {
        let value = headers.get(&self.header)?.to_str().ok()?;
        FlowId::parse(value).ok()
    }

    /// Reuses a valid inbound id, or mints a fresh one.
    ///
    /// Malformed input — empty value, oversized token, characters outside
    /// the id syntax, non-ASCII bytes — is treated as absent. This never
    /// fails.
    pub fn extract_or_generate(&self, headers: &HeaderMap) -> Flow {
        match self.extract(headers) {
            Some(id) => Flow { id, source: Source::Header },
            None => Flow { id: FlowId::generate(), source: Source::Generated },
        }
    }

    /// Writes the bound flow id into an outgoing request.
    ///
    /// No-op outside a bound scope: the request is left untouched rather
    /// than given an id the rest of the unit of work does not share.
    pub fn attach<B>(&self, request: &mut http::Request<B>) {
        self.attach_headers(request.headers_mut());
    }

    /// [`attach`](FlowPropagator::attach) against a bare header map.
    pub fn attach_headers(&self, headers: &mut HeaderMap) {
        if let Some(id) = context::current() {
            headers.insert(self.header.clone(), id.header_value());
        }
    }
}

impl Default for FlowPropagator {
    fn default() -> Self {
        Self::new()
    }
}

// ── Flow ──────────────────────────────────────────────────────────────────────

/// A flow id together with where it came from.
///
/// Produced by [`FlowPropagator::extract_or_generate`]. The source is for
/// log labelling only — propagation treats reused and generated ids
/// identically.
#[derive(Clone, Debug)]
pub struct Flow {
    id: FlowId,
    source: Source,
}

impl Flow {
    pub fn id(&self) -> &FlowId {
        &self.id
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn into_id(self) -> FlowId {
        self.id
    }
}
