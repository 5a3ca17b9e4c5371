use serde::{Deserialize, Serialize};
use types::artwork::ArtworkSummary;
use types::ids::ListingId;
use types::listing::Listing;

/// Mirror row with its embedded catalog summary, as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork: Option<ArtworkSummary>,
}

/// Optimistic sold confirmation from a buyer's client.
///
/// Fields are optional at the wire level so a missing field surfaces as a
/// 400 with a message, not a framework rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkSoldRequest {
    pub listing_id: Option<u64>,
    pub buyer_wallet: Option<String>,
    pub tx_hash: Option<String>,
}

/// Ownership-cleanup trigger; the wallet identifies the requester but
/// ownership truth is re-read from the ledger.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupRequest {
    pub owner_wallet: Option<String>,
}

/// Initial-sync write from a seller's client that just observed its own list
/// transaction settle, ahead of ingester convergence.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncListingRequest {
    pub listing_id: Option<u64>,
    pub artwork_id: Option<u64>,
    pub seller: Option<String>,
    pub token_id: Option<u64>,
    pub start_price: Option<types::numeric::Amount>,
    pub end_price: Option<types::numeric::Amount>,
    pub starts_at: Option<i64>,
    pub duration: Option<u64>,
    pub tx_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyResponse {
    pub updated: Vec<ListingId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    pub expired: Vec<ListingId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteStatusResponse {
    pub status: String,
    pub listing_id: ListingId,
}
