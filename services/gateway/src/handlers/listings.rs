//! Read endpoints over the mirror, plus the on-demand reconciliation
//! triggers invoked from listing-detail views.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::error::AppError;
use crate::models::{CleanupRequest, CleanupResponse, ListingView, VerifyResponse};
use crate::state::AppState;
use types::ids::ArtworkId;
use types::listing::Listing;

async fn with_artwork(state: &AppState, listing: Listing) -> ListingView {
    let artwork = state.catalog.artwork(listing.artwork_id).await;
    ListingView { listing, artwork }
}

/// GET /listings — active listings, newest first, with embedded artwork.
pub async fn list_active(State(state): State<AppState>) -> Result<Json<Vec<ListingView>>, AppError> {
    let mut views = Vec::new();
    for listing in state.store.list_active() {
        views.push(with_artwork(&state, listing).await);
    }
    Ok(Json(views))
}

/// GET /listings/:artwork_id — every listing for one artwork, newest first
/// (provenance view; terminal rows included).
pub async fn by_artwork(
    State(state): State<AppState>,
    Path(artwork_id): Path<u64>,
) -> Result<Json<Vec<ListingView>>, AppError> {
    let artwork_id = ArtworkId::new(artwork_id);
    let mut views = Vec::new();
    for listing in state.store.list_by_artwork(artwork_id) {
        views.push(with_artwork(&state, listing).await);
    }
    Ok(Json(views))
}

/// GET /listings/:artwork_id/verify — re-check mirror-active listings
/// against ledger truth.
///
/// A pass in which every ledger read failed is reported as 503; partial
/// failures still return the listings that did converge.
pub async fn verify(
    State(state): State<AppState>,
    Path(artwork_id): Path<u64>,
) -> Result<Json<VerifyResponse>, AppError> {
    let pass = state
        .reconciler
        .verify_by_artwork(ArtworkId::new(artwork_id))
        .await;
    if pass.ledger_unreachable() {
        return Err(AppError::LedgerUnavailable(
            "every ledger read failed; listing state unknown".into(),
        ));
    }
    Ok(Json(VerifyResponse {
        updated: pass.transitioned,
    }))
}

/// POST /listings/:artwork_id/cleanup — expire listings whose seller no
/// longer owns the asset.
pub async fn cleanup(
    State(state): State<AppState>,
    Path(artwork_id): Path<u64>,
    Json(payload): Json<CleanupRequest>,
) -> Result<Json<CleanupResponse>, AppError> {
    let requester = payload
        .owner_wallet
        .filter(|wallet| !wallet.is_empty())
        .ok_or_else(|| AppError::BadRequest("ownerWallet is required".into()))?;

    info!(artwork_id, %requester, "ownership cleanup requested");
    let pass = state
        .reconciler
        .cleanup_by_ownership(ArtworkId::new(artwork_id))
        .await;
    if pass.ledger_unreachable() {
        return Err(AppError::LedgerUnavailable(
            "every ledger read failed; ownership unknown".into(),
        ));
    }
    Ok(Json(CleanupResponse {
        expired: pass.transitioned,
    }))
}
