//! Ledger read interfaces and delivery envelope
//!
//! The ledger is consumed through two narrow seams: `LedgerReader` for
//! point reads (price, listing struct, asset owner) and `LogSource` for the
//! contract's event log. `ArtworkCatalog` is the external lookup the ingester
//! uses to resolve an asset reference into a catalog record.
//!
//! A failed or timed-out ledger read means "unknown" — the affected item is
//! skipped in its batch, never escalated to a batch failure.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use contracts::events::ContractEvent;
use types::artwork::ArtworkSummary;
use types::ids::{Address, ArtworkId, ListingId, TokenId, TxHash};
use types::numeric::Amount;

/// Errors from ledger reads. None of these are fatal to the process; they
/// degrade freshness, not availability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Ledger read timed out")]
    Timeout,

    #[error("Not found on ledger: {0}")]
    NotFound(String),

    #[error("Malformed ledger response: {0}")]
    Malformed(String),
}

/// The ledger's current view of one listing.
///
/// Settlement only exposes a boolean active flag; whether an inactive listing
/// was sold or canceled is not recoverable from this read alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainListing {
    pub listing_id: ListingId,
    pub seller: Address,
    pub token_id: TokenId,
    pub active: bool,
}

/// Point reads against ledger truth.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Current Dutch-auction price of a listing at ledger time.
    async fn current_price(&self, listing_id: ListingId) -> Result<Amount, LedgerError>;

    /// The listing struct, including its active flag.
    async fn listing_state(&self, listing_id: ListingId) -> Result<OnChainListing, LedgerError>;

    /// Current owner of an asset, as reported by the asset contract.
    async fn owner_of(&self, token_id: TokenId) -> Result<Address, LedgerError>;
}

/// One delivered entry of the contract's event log.
///
/// Delivery is at-least-once and possibly out-of-order across event types;
/// consumers must be idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLog {
    /// Block the event was recorded in; drives the resume cursor.
    pub block_number: u64,
    /// Transaction that emitted the event.
    pub tx_hash: TxHash,
    pub event: ContractEvent,
}

/// A pollable view over the contract's event log.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Fetch logs recorded after `after_block` (exclusive), oldest first.
    async fn poll_logs(&self, after_block: u64) -> Result<Vec<LedgerLog>, LedgerError>;
}

/// External artwork-catalog lookup used to resolve asset references.
#[async_trait]
pub trait ArtworkCatalog: Send + Sync {
    /// Resolve the catalog record minted for a token, if any.
    async fn artwork_for_token(&self, token_id: TokenId) -> Option<ArtworkId>;

    /// Fetch the summary embedded in listing views.
    async fn artwork(&self, artwork_id: ArtworkId) -> Option<ArtworkSummary>;
}

/// In-memory artwork catalog.
///
/// Backs single-node deployments and tests; larger deployments point the
/// gateway at the catalog service over HTTP instead.
#[derive(Debug, Default)]
pub struct ArtworkIndex {
    by_artwork: DashMap<ArtworkId, ArtworkSummary>,
}

impl ArtworkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, summary: ArtworkSummary) {
        self.by_artwork.insert(summary.artwork_id, summary);
    }
}

#[async_trait]
impl ArtworkCatalog for ArtworkIndex {
    async fn artwork_for_token(&self, token_id: TokenId) -> Option<ArtworkId> {
        self.by_artwork
            .iter()
            .find(|entry| entry.token_id == token_id)
            .map(|entry| entry.artwork_id)
    }

    async fn artwork(&self, artwork_id: ArtworkId) -> Option<ArtworkSummary> {
        self.by_artwork.get(&artwork_id).map(|entry| entry.clone())
    }
}
