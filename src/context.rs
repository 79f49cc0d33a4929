//! Task-local propagation context.
//!
//! # How the id stays bound across `.await`
//!
//! The binding lives in a [`tokio::task_local!`] slot, and [`scope`] stores
//! it *inside the future it returns*. Whenever the runtime polls that
//! future — on whichever worker thread work-stealing picked — the slot is
//! populated first and cleared after. That is what makes [`current`] correct
//! across suspension points: the binding travels with the future, not with
//! the call stack or the OS thread.
//!
//! Two consequences fall out of that design:
//!
//! - Concurrent units of work can never observe each other's id. Each holds
//!   its own slot value; there is no shared state and therefore no locking.
//! - `tokio::spawn` starts a *new* unit of work, and the binding does not
//!   follow implicitly. Hand it over explicitly:
//!
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! # flowid::scope(flowid::FlowId::generate(), async {
//! let id = flowid::current().expect("inside a bound scope");
//! tokio::spawn(flowid::scope(id, async {
//!     // flowid::current() returns the handed-over id here
//! }));
//! # }).await;
//! # }
//! ```

use std::future::Future;

use crate::flow_id::FlowId;

tokio::task_local! {
    static CONTEXT: FlowId;
}

/// Runs `fut` with `id` bound as the active flow id.
///
/// Inside the future — at any `.await` depth — [`current`] returns `id`.
/// The binding ends when the future completes; it never leaks into
/// surrounding or subsequent work.
pub async fn scope<F: Future>(id: FlowId, fut: F) -> F::Output {
    CONTEXT.scope(id, fut).await
}

/// The flow id bound to the current unit of work.
///
/// Returns `None` outside any [`scope`] — a normal state, not an error.
/// Code that must work both inside and outside a request (startup tasks,
/// background jobs) can branch on it without ceremony.
pub fn current() -> Option<FlowId> {
    CONTEXT.try_with(FlowId::clone).ok()
}
