//! # flowid
//!
//! Minimal flow-id propagation for Rust services behind a reverse proxy.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! A flow id is one opaque token that follows a request chain across
//! services, so every log line and every downstream call can be tied back
//! to the request that caused it. flowid owns exactly three moves:
//!
//! - **Inbound** — read `X-Flow-ID` from the incoming request; reuse it when
//!   valid, mint a fresh one when absent or malformed ([`FlowFilter`])
//! - **Within** — keep the id bound to the unit of work across every
//!   `.await`, so any code can ask [`current()`] ([`scope()`])
//! - **Outbound** — write the bound id into outgoing requests, and echo it
//!   on the response ([`FlowInterceptor`])
//!
//! Everything around those three moves belongs to collaborators — flowid
//! intentionally ignores it:
//!
//! - **Spans, sampling, exporters** — your tracing stack
//! - **Transport, retries, pooling** — your HTTP client
//! - **Routing and handlers** — your framework
//! - **Whether propagation is on at all** — your startup code, via
//!   [`FlowConfig`]; a disabled config hands out no hooks, and nothing
//!   else in the process changes
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::convert::Infallible;
//!
//! use bytes::Bytes;
//! use http::{Request, Response};
//! use http_body_util::Full;
//! use hyper::service::service_fn;
//!
//! use flowid::FlowConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = FlowConfig::new();
//!
//!     // Wrap your request service in the flow filter, then hand the result
//!     // to hyper's connection builder exactly as you would the bare service.
//!     let svc = config.filter(service_fn(handle)).expect("propagation enabled");
//!     # let _ = svc;
//! }
//!
//! async fn handle(
//!     _req: Request<hyper::body::Incoming>,
//! ) -> Result<Response<Full<Bytes>>, Infallible> {
//!     // The id bound by the filter is visible anywhere in the task.
//!     let id = flowid::current().expect("bound by the filter");
//!     Ok(Response::new(Full::new(Bytes::from(format!("flow {id}\n")))))
//! }
//! ```
//!
//! ## Outbound calls
//!
//! ```rust
//! use flowid::{FlowId, FlowInterceptor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let interceptor = FlowInterceptor::new();
//!     let id = FlowId::parse("abc-123").unwrap();
//!
//!     flowid::scope(id, async {
//!         let mut outbound = http::Request::builder()
//!             .uri("http://orders.internal/orders")
//!             .body(())
//!             .unwrap();
//!         interceptor.attach(&mut outbound);
//!         assert_eq!(outbound.headers()["x-flow-id"], "abc-123");
//!     })
//!     .await;
//! }
//! ```

mod config;
mod context;
mod error;
mod filter;
mod flow_id;
mod interceptor;
mod propagator;

pub use config::FlowConfig;
pub use context::{current, scope};
pub use error::Error;
pub use filter::FlowFilter;
pub use flow_id::{FlowId, Source};
pub use interceptor::FlowInterceptor;
pub use propagator::{FLOW_ID_HEADER, Flow, FlowPropagator};
