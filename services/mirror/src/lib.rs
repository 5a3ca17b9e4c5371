//! Marketplace State Synchronization Engine
//!
//! Keeps a queryable mirror of ledger listing state consistent with ledger
//! truth despite three independent, concurrently-arriving update paths:
//!
//! ```text
//! Ledger event log          Buyer's client            Detail-view reads
//!        │                        │                          │
//!    ┌───▼─────┐          ┌───────▼────────┐        ┌────────▼────────┐
//!    │Ingester │          │Optimistic write│        │ Reconciliation  │
//!    └───┬─────┘          └───────┬────────┘        └────────┬────────┘
//!        │                        │                          │
//!        └────────────┬───────────┴──────────────────────────┘
//!                 ┌───▼────────┐
//!                 │MirrorStore │  ← conditional updates are the only
//!                 └────────────┘    concurrency control
//! ```
//!
//! The ledger is the sole source of truth; the mirror is a best-effort,
//! eventually-consistent cache. Every writer funnels through the store's
//! idempotent upsert and compare-and-set transition, so duplicate and
//! out-of-order delivery resolve to safe no-ops.

pub mod ingestion;
pub mod ledger;
pub mod reconcile;
pub mod rpc;
pub mod store;

// Service version
pub const SERVICE_VERSION: &str = "0.1.0";

/// Current Unix time in seconds, used to stamp mirror row creation.
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
