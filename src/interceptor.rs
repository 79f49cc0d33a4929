//! Outbound request interceptor.

use http::header::HeaderMap;

use crate::propagator::FlowPropagator;

/// The outbound hook: writes the bound flow id into requests about to be
/// sent.
///
/// Call [`attach`](FlowInterceptor::attach) on each outgoing request before
/// handing it to your HTTP client. Outside a bound scope this is a no-op and
/// the request goes out untouched.
#[derive(Clone, Debug, Default)]
pub struct FlowInterceptor {
    propagator: FlowPropagator,
}

impl FlowInterceptor {
    /// An interceptor on the default `x-flow-id` header.
    pub fn new() -> Self {
        Self::with_propagator(FlowPropagator::new())
    }

    /// An interceptor on a custom-header propagator.
    pub fn with_propagator(propagator: FlowPropagator) -> Self {
        Self { propagator }
    }

    /// Writes the bound flow id into `request`; no-op outside a scope.
    pub fn attach<B>(&self, request: &mut http::Request<B>) {
        self.propagator.attach(request);
    }

    /// [`attach`](FlowInterceptor::attach) against a bare header map, for
    /// clients that assemble headers by hand.
    pub fn attach_headers(&self, headers: &mut HeaderMap) {
        self.propagator.attach_headers(headers);
    }
}
