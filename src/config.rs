//! Explicit startup configuration.
//!
//! Whether flow propagation runs at all is a decision made once, in code,
//! at startup: build a [`FlowConfig`], ask it for the two hooks, wire
//! whichever you get back. A disabled config hands out no hooks — `None`,
//! not inert stand-ins — so nothing is registered and
//! [`current()`](crate::current) simply stays `None` everywhere.
//!
//! ```rust,no_run
//! # use std::convert::Infallible;
//! # use bytes::Bytes;
//! # use http_body_util::Full;
//! # use hyper::service::service_fn;
//! use flowid::FlowConfig;
//!
//! # async fn handle(_req: http::Request<hyper::body::Incoming>)
//! #     -> Result<http::Response<Full<Bytes>>, Infallible> {
//! #     Ok(http::Response::new(Full::new(Bytes::new())))
//! # }
//! let config = FlowConfig::new()
//!     .enabled(std::env::var("FLOW_ID_DISABLED").is_err())
//!     .header("x-flow-id");
//!
//! match config.filter(service_fn(handle)) {
//!     Some(_svc) => { /* serve with the filter installed */ }
//!     None => { /* serve the bare service */ }
//! }
//! ```

use http::header::HeaderName;

use crate::filter::FlowFilter;
use crate::interceptor::FlowInterceptor;
use crate::propagator::{FLOW_ID_HEADER, FlowPropagator};

/// Startup configuration: an enable flag and a header name.
#[derive(Clone, Debug)]
pub struct FlowConfig {
    enabled: bool,
    header: HeaderName,
}

impl FlowConfig {
    /// Propagation enabled, on the default `x-flow-id` header.
    pub fn new() -> Self {
        Self {
            enabled: true,
            header: HeaderName::from_static(FLOW_ID_HEADER),
        }
    }

    /// Propagation off. [`filter`](FlowConfig::filter) and
    /// [`interceptor`](FlowConfig::interceptor) will return `None`.
    pub fn disabled() -> Self {
        Self::new().enabled(false)
    }

    /// Sets the enable flag. Returns `self` for chaining.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the wire header name. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a valid HTTP header name.
    pub fn header(mut self, name: &str) -> Self {
        self.header = name.parse().expect("invalid header name");
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The inbound hook, wrapping `inner`, or `None` when disabled.
    pub fn filter<S>(&self, inner: S) -> Option<FlowFilter<S>> {
        self.enabled
            .then(|| FlowFilter::with_propagator(self.propagator(), inner))
    }

    /// The outbound hook, or `None` when disabled.
    pub fn interceptor(&self) -> Option<FlowInterceptor> {
        self.enabled
            .then(|| FlowInterceptor::with_propagator(self.propagator()))
    }

    fn propagator(&self) -> FlowPropagator {
        FlowPropagator::with_header(self.header.clone())
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self::new()
    }
}
