//! Listing record and status lifecycle
//!
//! A listing's canonical instance lives on the ledger; the mirror row defined
//! here is the queryable copy. Status follows `ACTIVE -> {SOLD, CANCELLED}`
//! from settlement events, with reconciliation additionally driving
//! `ACTIVE -> EXPIRED`. Terminal states are final: a row never returns to
//! `ACTIVE` and is never physically deleted, preserving provenance history.

use crate::ids::{Address, ArtworkId, ListingId, TokenId, TxHash};
use crate::numeric::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Listing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    /// Open for purchase
    Active,
    /// Settled through the marketplace (terminal)
    Sold,
    /// Withdrawn by the seller (terminal)
    Cancelled,
    /// Unfulfillable — the asset changed hands outside the marketplace (terminal)
    Expired,
}

impl ListingStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ListingStatus::Sold | ListingStatus::Cancelled | ListingStatus::Expired
        )
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ListingStatus::Active => "ACTIVE",
            ListingStatus::Sold => "SOLD",
            ListingStatus::Cancelled => "CANCELLED",
            ListingStatus::Expired => "EXPIRED",
        };
        write!(f, "{label}")
    }
}

/// Mirror row for one ledger listing.
///
/// Keyed by `listing_id`; the mirror holds at most one row per id. Price
/// bounds are integral base units: `price_start == price_end` denotes a fixed
/// price, `price_start > price_end` a Dutch auction decaying linearly over
/// `duration` seconds from `start_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub listing_id: ListingId,
    pub artwork_id: ArtworkId,
    pub token_contract: Address,
    pub token_id: TokenId,
    pub seller: Address,
    /// Set if and only if `status == Sold`
    pub buyer: Option<Address>,
    pub price_start: Amount,
    pub price_end: Amount,
    /// Ledger timestamp (seconds) when price decay begins
    pub start_time: i64,
    /// Seconds over which price decays from `price_start` to `price_end`
    pub duration: u64,
    pub status: ListingStatus,
    /// Transaction responsible for the current status (list, sale, or cancel)
    pub tx_hash: Option<TxHash>,
    /// Mirror insertion time (Unix seconds), used for newest-first ordering
    pub created_at: i64,
}

impl Listing {
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }

    /// Whether this is a fixed-price listing (no decay).
    pub fn is_fixed_price(&self) -> bool {
        self.price_start == self.price_end
    }

    /// Check the buyer/status invariant: buyer set iff sold.
    pub fn check_invariant(&self) -> bool {
        self.buyer.is_some() == (self.status == ListingStatus::Sold)
    }
}
