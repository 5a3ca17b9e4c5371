//! Reconciliation — on-demand correction of mirror drift
//!
//! Catches what the event path missed: a Sold event lost before this
//! deployment subscribed, or an asset transferred outside the marketplace
//! (no event exists for ledger-external transfers). Both passes re-query
//! ledger truth for listings the mirror believes are open and apply the same
//! conditional transition every other writer uses, so running them
//! repeatedly or concurrently with the ingester has no cumulative effect
//! once the mirror converges.
//!
//! Every ledger read is bounded by a per-call timeout; a failed or timed-out
//! read means "unknown" and skips that item without failing the batch.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use types::ids::{ArtworkId, ListingId};
use types::listing::ListingStatus;

use crate::ledger::{LedgerError, LedgerReader};
use crate::store::{MirrorStore, TransitionExtras, TransitionOutcome};

/// Result of one reconciliation pass over an artwork's active listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePass {
    /// Listings transitioned during the pass.
    pub transitioned: Vec<ListingId>,
    /// Ledger reads that completed.
    pub reads_ok: usize,
    /// Ledger reads that failed or timed out; those listings were skipped.
    pub reads_failed: usize,
}

impl ReconcilePass {
    /// True when every ledger read in the pass failed, i.e. the pass learned
    /// nothing at all about the ledger's state.
    pub fn ledger_unreachable(&self) -> bool {
        self.reads_ok == 0 && self.reads_failed > 0
    }
}

/// On-demand verifier of mirror state against ledger truth.
pub struct Reconciler {
    store: Arc<MirrorStore>,
    ledger: Arc<dyn LedgerReader>,
    /// Bound on each individual ledger read.
    read_timeout: Duration,
}

impl Reconciler {
    pub fn new(store: Arc<MirrorStore>, ledger: Arc<dyn LedgerReader>, read_timeout: Duration) -> Self {
        Self {
            store,
            ledger,
            read_timeout,
        }
    }

    /// Re-query the ledger for every mirror-active listing of an artwork and
    /// close out listings the ledger reports inactive.
    ///
    /// The ledger only exposes a boolean active flag, which cannot
    /// distinguish a sale from a cancellation; an inactive listing is
    /// classified as sold (best effort, buyer unknown from this read).
    pub async fn verify_by_artwork(&self, artwork_id: ArtworkId) -> ReconcilePass {
        let mut pass = ReconcilePass::default();

        for listing in self.store.list_active_for_artwork(artwork_id) {
            let listing_id = listing.listing_id;
            let state = match self.bounded(self.ledger.listing_state(listing_id)).await {
                Ok(state) => state,
                Err(error) => {
                    warn!(%listing_id, %error, "ledger listing read failed, skipping");
                    pass.reads_failed += 1;
                    continue;
                }
            };
            pass.reads_ok += 1;
            if state.active {
                continue;
            }

            let outcome = self.store.conditional_transition(
                listing_id,
                ListingStatus::Active,
                ListingStatus::Sold,
                TransitionExtras::default(),
            );
            if outcome == TransitionOutcome::Applied {
                info!(%listing_id, %artwork_id, "mirror drift corrected: ledger reports inactive");
                pass.transitioned.push(listing_id);
            }
        }
        pass
    }

    /// Expire mirror-active listings whose seller no longer owns the asset.
    ///
    /// A direct transfer bypasses the marketplace's settlement path and
    /// emits no marketplace event; the stale listing is unfulfillable and is
    /// moved to `EXPIRED`. Ownership truth is always the asset contract's
    /// `owner_of`, never a caller-supplied wallet.
    pub async fn cleanup_by_ownership(&self, artwork_id: ArtworkId) -> ReconcilePass {
        let mut pass = ReconcilePass::default();

        for listing in self.store.list_active_for_artwork(artwork_id) {
            let listing_id = listing.listing_id;
            let owner = match self.bounded(self.ledger.owner_of(listing.token_id)).await {
                Ok(owner) => owner,
                Err(error) => {
                    warn!(%listing_id, %error, "ledger owner read failed, skipping");
                    pass.reads_failed += 1;
                    continue;
                }
            };
            pass.reads_ok += 1;
            if owner == listing.seller {
                continue;
            }

            let outcome = self.store.conditional_transition(
                listing_id,
                ListingStatus::Active,
                ListingStatus::Expired,
                TransitionExtras::default(),
            );
            if outcome == TransitionOutcome::Applied {
                info!(
                    %listing_id,
                    seller = %listing.seller,
                    %owner,
                    "stale listing expired: asset changed hands outside the marketplace"
                );
                pass.transitioned.push(listing_id);
            }
        }
        pass
    }

    async fn bounded<T>(
        &self,
        read: impl std::future::Future<Output = Result<T, LedgerError>>,
    ) -> Result<T, LedgerError> {
        tokio::time::timeout(self.read_timeout, read)
            .await
            .map_err(|_| LedgerError::Timeout)?
    }
}
