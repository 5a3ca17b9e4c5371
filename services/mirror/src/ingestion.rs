//! Event ingestion — the authoritative mirror update path
//!
//! A single long-lived consumer per deployment applies the settlement
//! contract's three events to the mirror store. Delivery is at-least-once
//! and possibly out-of-order across event types (replay after reconnect),
//! so every handler is idempotent: creation goes through `upsert_if_absent`
//! and status changes through the conditional transition. Re-applying any
//! event is a safe no-op.
//!
//! The ingester tracks the highest block it has applied so a restart resumes
//! from the cursor instead of reprocessing the log unboundedly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use contracts::events::{ContractEvent, ItemCanceled, ItemListed, ItemSold};
use types::listing::{Listing, ListingStatus};

use crate::ledger::{ArtworkCatalog, LedgerLog, LogSource};
use crate::store::{MirrorStore, TransitionExtras, TransitionOutcome, UpsertOutcome};
use crate::unix_now;

/// Applies ledger events to the mirror store.
pub struct EventIngester {
    store: Arc<MirrorStore>,
    catalog: Arc<dyn ArtworkCatalog>,
    /// Highest block number applied so far (0 = nothing applied).
    last_block: AtomicU64,
    /// Events that mutated the mirror.
    events_applied: AtomicU64,
    /// Events dropped because their asset reference was unresolvable.
    events_dropped: AtomicU64,
    /// Duplicate or late events resolved to no-ops.
    events_stale: AtomicU64,
}

impl EventIngester {
    pub fn new(store: Arc<MirrorStore>, catalog: Arc<dyn ArtworkCatalog>) -> Self {
        info!("EventIngester initialized");
        Self {
            store,
            catalog,
            last_block: AtomicU64::new(0),
            events_applied: AtomicU64::new(0),
            events_dropped: AtomicU64::new(0),
            events_stale: AtomicU64::new(0),
        }
    }

    /// Apply a single delivered log entry.
    ///
    /// Safe to re-apply: duplicates and late arrivals resolve to no-ops
    /// through the store's guards.
    pub async fn apply(&self, log: LedgerLog) {
        match log.event.clone() {
            ContractEvent::ItemListed(event) => self.on_listed(event, &log).await,
            ContractEvent::ItemSold(event) => self.on_sold(event, &log),
            ContractEvent::ItemCanceled(event) => self.on_canceled(event, &log),
        }
        self.last_block.fetch_max(log.block_number, Ordering::SeqCst);
    }

    async fn on_listed(&self, event: ItemListed, log: &LedgerLog) {
        // Resolve the asset reference through the external catalog. An
        // unresolvable reference is dropped with a log line; there is no
        // dead-letter queue for replay once it becomes resolvable.
        let Some(artwork_id) = self.catalog.artwork_for_token(event.token_id).await else {
            warn!(
                listing_id = %event.listing_id,
                token_id = %event.token_id,
                "no artwork record for listed token, dropping event"
            );
            self.events_dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        let listing = Listing {
            listing_id: event.listing_id,
            artwork_id,
            token_contract: event.token_contract,
            token_id: event.token_id,
            seller: event.seller,
            buyer: None,
            price_start: event.price_start,
            price_end: event.price_end,
            start_time: event.start_time,
            duration: event.duration,
            status: ListingStatus::Active,
            tx_hash: Some(log.tx_hash.clone()),
            created_at: unix_now(),
        };

        match self.store.upsert_if_absent(listing) {
            UpsertOutcome::Inserted => {
                info!(listing_id = %event.listing_id, %artwork_id, "listing mirrored");
                self.events_applied.fetch_add(1, Ordering::Relaxed);
            }
            UpsertOutcome::AlreadyPresent => {
                debug!(listing_id = %event.listing_id, "duplicate Listed delivery ignored");
                self.events_stale.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn on_sold(&self, event: ItemSold, log: &LedgerLog) {
        let outcome = self.store.conditional_transition(
            event.listing_id,
            ListingStatus::Active,
            ListingStatus::Sold,
            TransitionExtras::sold(event.buyer.clone(), Some(log.tx_hash.clone())),
        );
        self.record_transition("Sold", event.listing_id.as_u64(), outcome);
    }

    fn on_canceled(&self, event: ItemCanceled, log: &LedgerLog) {
        let outcome = self.store.conditional_transition(
            event.listing_id,
            ListingStatus::Active,
            ListingStatus::Cancelled,
            TransitionExtras {
                buyer: None,
                tx_hash: Some(log.tx_hash.clone()),
            },
        );
        self.record_transition("Canceled", event.listing_id.as_u64(), outcome);
    }

    fn record_transition(&self, label: &str, listing_id: u64, outcome: TransitionOutcome) {
        match outcome {
            TransitionOutcome::Applied => {
                info!(listing_id, event = label, "listing transition mirrored");
                self.events_applied.fetch_add(1, Ordering::Relaxed);
            }
            TransitionOutcome::NoMatch { current } => {
                debug!(
                    listing_id,
                    event = label,
                    %current,
                    "late or duplicate event, no-op"
                );
                self.events_stale.fetch_add(1, Ordering::Relaxed);
            }
            TransitionOutcome::NotFound => {
                // Sold/Canceled delivered before the corresponding Listed.
                // Reconciliation converges the row once it exists.
                warn!(
                    listing_id,
                    event = label,
                    "event for unknown listing, no-op"
                );
                self.events_stale.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Long-lived subscription loop: poll the log from the cursor and apply.
    ///
    /// A failed poll is retried on the next interval; no log entry is ever
    /// skipped because the cursor only advances when a log is applied.
    pub async fn run<S: LogSource>(&self, source: S, poll_interval: Duration) {
        info!(
            poll_interval_ms = poll_interval.as_millis() as u64,
            "event subscription started"
        );
        loop {
            match source.poll_logs(self.cursor()).await {
                Ok(logs) => {
                    for log in logs {
                        self.apply(log).await;
                    }
                }
                Err(error) => {
                    warn!(%error, "log poll failed, retrying next interval");
                }
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Highest applied block number; 0 when nothing has been applied.
    pub fn cursor(&self) -> u64 {
        self.last_block.load(Ordering::SeqCst)
    }

    pub fn events_applied(&self) -> u64 {
        self.events_applied.load(Ordering::Relaxed)
    }

    pub fn events_dropped(&self) -> u64 {
        self.events_dropped.load(Ordering::Relaxed)
    }

    pub fn events_stale(&self) -> u64 {
        self.events_stale.load(Ordering::Relaxed)
    }
}
