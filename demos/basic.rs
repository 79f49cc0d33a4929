//! Minimal flowid example — a hyper server with the flow filter installed
//! and an interceptor attaching the id to a pretend downstream call.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/orders
//!   curl -i -H 'x-flow-id: abc-123' http://localhost:3000/orders
//!
//! Both responses carry an `x-flow-id` header: the first a freshly minted
//! id, the second your own, passed through untouched.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use flowid::{FlowConfig, FlowInterceptor};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Propagation is an explicit startup decision. Set FLOW_ID_DISABLED to
    // see the service run with no hooks registered at all.
    let config = FlowConfig::new().enabled(std::env::var("FLOW_ID_DISABLED").is_err());

    let interceptor = config.interceptor().map(Arc::new);
    let svc = service_fn(move |req| {
        let interceptor = interceptor.clone();
        async move { handle(req, interceptor).await }
    });

    let listener = TcpListener::bind("0.0.0.0:3000").await.expect("bind failed");
    info!(addr = "0.0.0.0:3000", enabled = config.is_enabled(), "listening");

    // JoinSet tracks every spawned connection task so we can wait for them
    // all to finish during graceful shutdown.
    let mut tasks = tokio::task::JoinSet::new();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            // `biased` checks arms top-to-bottom: a SIGTERM immediately
            // stops accepting new connections, even if more are queued.
            biased;

            () = &mut shutdown => {
                info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, remote_addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let io = TokioIo::new(stream);
                // Disabled config: serve the bare service, exactly as if
                // flowid were not linked in.
                let filtered = config.filter(svc.clone());
                let bare = svc.clone();

                tasks.spawn(async move {
                    let served = match filtered {
                        Some(svc) => {
                            ConnBuilder::new(TokioExecutor::new())
                                .serve_connection(io, svc)
                                .await
                        }
                        None => {
                            ConnBuilder::new(TokioExecutor::new())
                                .serve_connection(io, bare)
                                .await
                        }
                    };
                    if let Err(e) = served {
                        error!(peer = %remote_addr, "connection error: {e}");
                    }
                });
            }

            // Reap finished connection tasks so the JoinSet does not grow
            // without bound.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    while tasks.join_next().await.is_some() {}
    info!("stopped");
}

// GET /orders (or anything else — no router here)
//
// Reads the bound flow id, stamps it on a pretend downstream request via the
// interceptor, and reports both in the body.
async fn handle(
    _req: Request<Incoming>,
    interceptor: Option<Arc<FlowInterceptor>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let bound = flowid::current().map(|id| id.to_string());

    let mut downstream = Request::builder()
        .uri("http://orders.internal/orders")
        .body(())
        .expect("static request parts");
    if let Some(interceptor) = &interceptor {
        interceptor.attach(&mut downstream);
    }
    let attached = downstream
        .headers()
        .get("x-flow-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    info!(?bound, ?attached, "handled");

    let body = format!(
        "bound: {}\ndownstream x-flow-id: {}\n",
        bound.as_deref().unwrap_or("<none>"),
        attached.as_deref().unwrap_or("<none>"),
    );
    Ok(Response::new(Full::new(Bytes::from(body))))
}

/// Resolves on the first shutdown signal: SIGTERM (Kubernetes) or SIGINT
/// (Ctrl-C, local dev). Windows only has Ctrl-C.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
