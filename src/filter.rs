//! Inbound request filter.
//!
//! [`FlowFilter`] wraps any hyper [`Service`] and runs before it on every
//! request:
//!
//! 1. reuse the inbound `X-Flow-ID` when valid, mint a fresh id otherwise
//! 2. run the inner service with that id bound — handlers and anything they
//!    await see it via [`current()`](crate::current)
//! 3. run it inside a `tracing` span carrying the id, so every log line in
//!    the unit of work is correlated
//! 4. echo the id on the response, so callers can correlate too
//!
//! The filter is body-type generic and buffers nothing. Per request it costs
//! an inner-service clone plus one boxed future.
//!
//! # Why the future is boxed
//!
//! `Service::Future` must be a nameable type, but the scoped, instrumented
//! future built in [`call`](Service::call) is an opaque `async` composition.
//! `Pin<Box<dyn Future>>` erases it — one allocation per request, negligible
//! next to network I/O, and the same trade hyper's own `service_fn` callers
//! make.

use std::future::Future;
use std::pin::Pin;

use hyper::service::Service;
use tracing::{Instrument, debug, info_span};

use crate::context;
use crate::propagator::FlowPropagator;

/// A heap-allocated, type-erased future. `Send + 'static` so hyper may poll
/// it from any worker thread.
type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// The inbound hook: a [`Service`] wrapper that binds a flow id around the
/// inner service.
///
/// Construct via [`FlowConfig::filter`](crate::FlowConfig::filter), or
/// directly when propagation is unconditionally on:
///
/// ```rust
/// # use std::convert::Infallible;
/// # use bytes::Bytes;
/// # use http_body_util::Full;
/// use hyper::service::service_fn;
/// use flowid::FlowFilter;
///
/// # async fn handle(_req: http::Request<hyper::body::Incoming>)
/// #     -> Result<http::Response<Full<Bytes>>, Infallible> {
/// #     Ok(http::Response::new(Full::new(Bytes::new())))
/// # }
/// let svc = FlowFilter::new(service_fn(handle));
/// ```
#[derive(Clone)]
pub struct FlowFilter<S> {
    inner: S,
    propagator: FlowPropagator,
}

impl<S> FlowFilter<S> {
    /// Wraps `inner` with the default `x-flow-id` propagator.
    pub fn new(inner: S) -> Self {
        Self::with_propagator(FlowPropagator::new(), inner)
    }

    /// Wraps `inner` with a custom-header propagator.
    pub fn with_propagator(propagator: FlowPropagator, inner: S) -> Self {
        Self { inner, propagator }
    }
}

impl<S, B, RB> Service<http::Request<B>> for FlowFilter<S>
where
    S: Service<http::Request<B>, Response = http::Response<RB>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send,
    B: Send + 'static,
    RB: Send + 'static,
{
    type Response = http::Response<RB>;
    type Error = S::Error;
    type Future = BoxFuture<Result<Self::Response, Self::Error>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let flow = self.propagator.extract_or_generate(req.headers());
        let header = self.propagator.header().clone();
        let span = info_span!("request", flow_id = %flow.id());
        let source = flow.source();
        let id = flow.into_id();
        let echo = id.header_value();

        // Clone the inner service into the future: its `call` may do
        // synchronous work before returning, and that must run scoped too.
        let inner = self.inner.clone();

        Box::pin(
            context::scope(id, async move {
                debug!(source = source.as_str(), "flow id bound");
                let mut response = inner.call(req).await?;
                response.headers_mut().insert(header, echo);
                Ok(response)
            })
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use bytes::Bytes;
    use http::header::HeaderName;
    use http_body_util::Full;
    use hyper::service::service_fn;

    use super::*;
    use crate::propagator::FLOW_ID_HEADER;

    /// Handler that answers with whatever `current()` returns, so tests can
    /// observe the id from the handler's point of view.
    async fn echo_current(
        _req: http::Request<Full<Bytes>>,
    ) -> Result<http::Response<Full<Bytes>>, Infallible> {
        let seen = crate::current().map(|id| id.to_string()).unwrap_or_default();
        Ok(http::Response::new(Full::new(Bytes::from(seen))))
    }

    fn request(flow_header: Option<&str>) -> http::Request<Full<Bytes>> {
        let mut builder = http::Request::builder().uri("/orders");
        if let Some(value) = flow_header {
            builder = builder.header(FLOW_ID_HEADER, value);
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    async fn body_string(response: http::Response<Full<Bytes>>) -> String {
        use http_body_util::BodyExt;
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn inbound_id_is_reused_and_echoed() {
        let filter = FlowFilter::new(service_fn(echo_current));
        let response = filter.call(request(Some("abc-123"))).await.unwrap();
        assert_eq!(response.headers()[FLOW_ID_HEADER], "abc-123");
        assert_eq!(body_string(response).await, "abc-123");
    }

    #[tokio::test]
    async fn missing_id_is_generated_and_echoed() {
        let filter = FlowFilter::new(service_fn(echo_current));
        let response = filter.call(request(None)).await.unwrap();
        let echoed = response.headers()[FLOW_ID_HEADER].to_str().unwrap().to_owned();
        assert!(!echoed.is_empty());
        // The handler observed the same id the caller was told about.
        assert_eq!(body_string(response).await, echoed);
    }

    #[tokio::test]
    async fn malformed_id_is_replaced() {
        let filter = FlowFilter::new(service_fn(echo_current));
        let response = filter.call(request(Some("not a flow id"))).await.unwrap();
        let echoed = response.headers()[FLOW_ID_HEADER].to_str().unwrap();
        assert_ne!(echoed, "not a flow id");
    }

    #[tokio::test]
    async fn each_request_gets_its_own_generated_id() {
        let filter = FlowFilter::new(service_fn(echo_current));
        let a = filter.call(request(None)).await.unwrap();
        let b = filter.call(request(None)).await.unwrap();
        assert_ne!(a.headers()[FLOW_ID_HEADER], b.headers()[FLOW_ID_HEADER]);
    }

    #[tokio::test]
    async fn custom_header_filter_ignores_the_default_header() {
        let propagator = FlowPropagator::with_header(HeaderName::from_static("x-trace-token"));
        let filter = FlowFilter::with_propagator(propagator, service_fn(echo_current));

        let response = filter.call(request(Some("abc-123"))).await.unwrap();
        // Read from and echoed on the configured header, not x-flow-id.
        assert_ne!(body_string(response).await, "abc-123");

        let req = http::Request::builder()
            .uri("/orders")
            .header("x-trace-token", "abc-123")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = filter.call(req).await.unwrap();
        assert_eq!(response.headers()["x-trace-token"], "abc-123");
        assert_eq!(body_string(response).await, "abc-123");
    }

    #[tokio::test]
    async fn binding_does_not_leak_past_the_request() {
        let filter = FlowFilter::new(service_fn(echo_current));
        filter.call(request(Some("abc-123"))).await.unwrap();
        assert!(crate::current().is_none());
    }
}
