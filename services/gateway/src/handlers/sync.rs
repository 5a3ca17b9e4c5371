//! Narrow write endpoints used by clients to hide ingester latency.
//!
//! Both paths reuse the exact store primitives the ingester uses — the
//! conditional transition for sold confirmations and the idempotent upsert
//! for initial sync — so whichever writer arrives first wins and the other
//! becomes a safe no-op. Neither path has a wider effect than the ingester's
//! authoritative one.

use axum::{extract::State, Json};
use tracing::info;

use crate::error::AppError;
use crate::models::{MarkSoldRequest, SyncListingRequest, WriteStatusResponse};
use crate::state::AppState;
use mirror::store::{TransitionExtras, TransitionOutcome, UpsertOutcome};
use mirror::unix_now;
use types::ids::{Address, ArtworkId, ListingId, TxHash};
use types::listing::{Listing, ListingStatus};

fn required<T>(field: Option<T>, name: &str) -> Result<T, AppError> {
    field.ok_or_else(|| AppError::BadRequest(format!("{name} is required")))
}

/// POST /listings/mark-sold — optimistic sold confirmation from a buyer's
/// client that just observed its own purchase settle.
pub async fn mark_sold(
    State(state): State<AppState>,
    Json(payload): Json<MarkSoldRequest>,
) -> Result<Json<WriteStatusResponse>, AppError> {
    let listing_id = ListingId::new(required(payload.listing_id, "listingId")?);
    let buyer = required(payload.buyer_wallet, "buyerWallet")?;
    let tx_hash = required(payload.tx_hash, "txHash")?;
    if buyer.is_empty() || tx_hash.is_empty() {
        return Err(AppError::BadRequest(
            "buyerWallet and txHash must be non-empty".into(),
        ));
    }

    let outcome = state.store.conditional_transition(
        listing_id,
        ListingStatus::Active,
        ListingStatus::Sold,
        TransitionExtras::sold(Address::new(buyer), Some(TxHash::new(tx_hash))),
    );
    let status = match outcome {
        TransitionOutcome::Applied => {
            info!(%listing_id, "optimistic sold confirmation applied");
            "updated"
        }
        // The ingester won the race; harmless no-op.
        TransitionOutcome::NoMatch { current } => {
            info!(%listing_id, %current, "sold confirmation arrived after transition");
            "already updated"
        }
        TransitionOutcome::NotFound => {
            return Err(AppError::NotFound(format!("listing {listing_id}")));
        }
    };

    Ok(Json(WriteStatusResponse {
        status: status.to_string(),
        listing_id,
    }))
}

/// POST /sync/listing — initial-sync write from a seller's client, creating
/// the mirror row ahead of the ingester's Listed observation.
pub async fn sync_listing(
    State(state): State<AppState>,
    Json(payload): Json<SyncListingRequest>,
) -> Result<Json<WriteStatusResponse>, AppError> {
    let listing_id = ListingId::new(required(payload.listing_id, "listingId")?);
    let artwork_id = ArtworkId::new(required(payload.artwork_id, "artworkId")?);
    let seller = required(payload.seller, "seller")?;
    let price_start = required(payload.start_price, "startPrice")?;
    let price_end = required(payload.end_price, "endPrice")?;
    let start_time = required(payload.starts_at, "startsAt")?;
    let duration = required(payload.duration, "duration")?;

    // The client does not carry the token id; resolve it from the catalog so
    // reconciliation can query ownership later.
    let token_id = match payload.token_id {
        Some(token_id) => types::ids::TokenId::new(token_id),
        None => {
            state
                .catalog
                .artwork(artwork_id)
                .await
                .ok_or_else(|| {
                    AppError::BadRequest(format!("unknown artwork {artwork_id}"))
                })?
                .token_id
        }
    };

    let listing = Listing {
        listing_id,
        artwork_id,
        token_contract: state.asset_contract.clone(),
        token_id,
        seller: Address::new(seller),
        buyer: None,
        price_start,
        price_end,
        start_time,
        duration,
        status: ListingStatus::Active,
        tx_hash: payload.tx_hash.map(TxHash::new),
        created_at: unix_now(),
    };

    let status = match state.store.upsert_if_absent(listing) {
        UpsertOutcome::Inserted => {
            info!(%listing_id, %artwork_id, "listing synced ahead of ingester");
            "created"
        }
        UpsertOutcome::AlreadyPresent => "already present",
    };

    Ok(Json(WriteStatusResponse {
        status: status.to_string(),
        listing_id,
    }))
}
