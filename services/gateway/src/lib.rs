//! Settlement gateway — thin HTTP boundary over the mirror
//!
//! Read endpoints return mirror rows with embedded artwork summaries; the
//! narrow write endpoints (optimistic sold confirmation, initial listing
//! sync) reuse the mirror store's idempotent primitives so they can never
//! diverge from the ingester's authoritative path. Reconciliation triggers
//! are exposed for listing-detail views to invoke opportunistically.

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
