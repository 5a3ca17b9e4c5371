//! Mirror store — the queryable cache of listing records
//!
//! Keyed by the ledger's listing identifier, at most one row per id. Rows are
//! never physically deleted; they only transition to a terminal status,
//! preserving provenance history for the asset.
//!
//! The two mutation primitives — idempotent insert and conditional status
//! transition — are the system's entire concurrency-control mechanism. Both
//! execute under the map's shard entry guard, so concurrent callers racing on
//! the same listing resolve to exactly one winner and harmless no-ops for the
//! rest. No external locking.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, warn};

use types::ids::{Address, ArtworkId, ListingId, TxHash};
use types::listing::{Listing, ListingStatus};

/// Outcome of an idempotent insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new row was created.
    Inserted,
    /// A row with this listing id already exists; nothing changed.
    AlreadyPresent,
}

/// Outcome of a conditional status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The row matched `from` and was updated.
    Applied,
    /// The row exists but its status did not match `from`; nothing changed.
    NoMatch { current: ListingStatus },
    /// No row with this listing id.
    NotFound,
}

/// Fields applied alongside a status transition.
///
/// `buyer` is only ever written on a transition to `Sold`, keeping the
/// buyer-iff-sold invariant in the store rather than in every caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionExtras {
    pub buyer: Option<Address>,
    pub tx_hash: Option<TxHash>,
}

impl TransitionExtras {
    /// Extras for a settled sale.
    pub fn sold(buyer: Address, tx_hash: Option<TxHash>) -> Self {
        Self {
            buyer: Some(buyer),
            tx_hash,
        }
    }
}

/// Internal row wrapper carrying the insertion sequence used for
/// newest-first ordering.
#[derive(Debug, Clone)]
struct Row {
    seq: u64,
    listing: Listing,
}

/// Concurrent mirror of ledger listing state.
#[derive(Debug, Default)]
pub struct MirrorStore {
    rows: DashMap<ListingId, Row>,
    insert_seq: AtomicU64,
}

impl MirrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Mutations ─────────────────────────

    /// Insert a new row only if no row with this listing id exists yet.
    ///
    /// Guards against duplicate event delivery: re-applying the same Listed
    /// event is a no-op reporting `AlreadyPresent`.
    pub fn upsert_if_absent(&self, listing: Listing) -> UpsertOutcome {
        match self.rows.entry(listing.listing_id) {
            Entry::Occupied(_) => UpsertOutcome::AlreadyPresent,
            Entry::Vacant(vacant) => {
                let seq = self.insert_seq.fetch_add(1, Ordering::SeqCst);
                vacant.insert(Row { seq, listing });
                UpsertOutcome::Inserted
            }
        }
    }

    /// Update status and associated fields only if the row's current status
    /// equals `from`. Compare-and-set under the entry guard: a late or
    /// duplicate event cannot clobber a row already moved to a terminal
    /// state by a faster path, and no two writers can move a listing between
    /// two different terminal states.
    ///
    /// Transitions into `Active` are refused outright — terminal states never
    /// resurrect.
    pub fn conditional_transition(
        &self,
        listing_id: ListingId,
        from: ListingStatus,
        to: ListingStatus,
        extras: TransitionExtras,
    ) -> TransitionOutcome {
        let Some(mut row) = self.rows.get_mut(&listing_id) else {
            return TransitionOutcome::NotFound;
        };

        if !to.is_terminal() || from.is_terminal() {
            warn!(%listing_id, %from, %to, "refusing transition outside ACTIVE -> terminal");
            return TransitionOutcome::NoMatch {
                current: row.listing.status,
            };
        }
        if row.listing.status != from {
            debug!(
                %listing_id,
                current = %row.listing.status,
                expected = %from,
                "conditional transition did not match, no-op"
            );
            return TransitionOutcome::NoMatch {
                current: row.listing.status,
            };
        }

        row.listing.status = to;
        if to == ListingStatus::Sold {
            row.listing.buyer = extras.buyer;
        }
        if let Some(tx_hash) = extras.tx_hash {
            row.listing.tx_hash = Some(tx_hash);
        }
        TransitionOutcome::Applied
    }

    // ───────────────────────── Reads ─────────────────────────

    /// Fetch one row by listing id.
    pub fn get(&self, listing_id: ListingId) -> Option<Listing> {
        self.rows.get(&listing_id).map(|row| row.listing.clone())
    }

    /// All active listings, most recently created first.
    pub fn list_active(&self) -> Vec<Listing> {
        self.collect_sorted(|listing| listing.is_active())
    }

    /// All listings for one artwork, most recently created first
    /// (provenance view).
    pub fn list_by_artwork(&self, artwork_id: ArtworkId) -> Vec<Listing> {
        self.collect_sorted(|listing| listing.artwork_id == artwork_id)
    }

    /// Active listings for one artwork, most recently created first.
    pub fn list_active_for_artwork(&self, artwork_id: ArtworkId) -> Vec<Listing> {
        self.collect_sorted(|listing| listing.is_active() && listing.artwork_id == artwork_id)
    }

    /// Number of rows in the mirror.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn collect_sorted(&self, filter: impl Fn(&Listing) -> bool) -> Vec<Listing> {
        let mut matched: Vec<(u64, Listing)> = self
            .rows
            .iter()
            .filter(|row| filter(&row.listing))
            .map(|row| (row.seq, row.listing.clone()))
            .collect();
        matched.sort_by(|a, b| b.0.cmp(&a.0));
        matched.into_iter().map(|(_, listing)| listing).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use types::ids::TokenId;
    use types::numeric::Amount;

    fn listing(id: u64, artwork: u64) -> Listing {
        Listing {
            listing_id: ListingId::new(id),
            artwork_id: ArtworkId::new(artwork),
            token_contract: Address::new("0xToken"),
            token_id: TokenId::new(artwork),
            seller: Address::new("0xSeller"),
            buyer: None,
            price_start: Amount::from_u64(1_000),
            price_end: Amount::from_u64(500),
            start_time: 1_700_000_000,
            duration: 3600,
            status: ListingStatus::Active,
            tx_hash: Some(TxHash::new("0xlist")),
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = MirrorStore::new();
        assert_eq!(store.upsert_if_absent(listing(1, 10)), UpsertOutcome::Inserted);
        assert_eq!(
            store.upsert_if_absent(listing(1, 10)),
            UpsertOutcome::AlreadyPresent
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_conditional_transition_applies_once() {
        let store = MirrorStore::new();
        store.upsert_if_absent(listing(1, 10));

        let outcome = store.conditional_transition(
            ListingId::new(1),
            ListingStatus::Active,
            ListingStatus::Sold,
            TransitionExtras::sold(Address::new("0xBuyer"), Some(TxHash::new("0xsale"))),
        );
        assert_eq!(outcome, TransitionOutcome::Applied);

        let row = store.get(ListingId::new(1)).unwrap();
        assert_eq!(row.status, ListingStatus::Sold);
        assert_eq!(row.buyer, Some(Address::new("0xBuyer")));
        assert_eq!(row.tx_hash, Some(TxHash::new("0xsale")));
        assert!(row.check_invariant());

        // Second application is a safe no-op
        let outcome = store.conditional_transition(
            ListingId::new(1),
            ListingStatus::Active,
            ListingStatus::Sold,
            TransitionExtras::sold(Address::new("0xOther"), None),
        );
        assert_eq!(
            outcome,
            TransitionOutcome::NoMatch {
                current: ListingStatus::Sold
            }
        );
        // The first writer's buyer stands
        assert_eq!(
            store.get(ListingId::new(1)).unwrap().buyer,
            Some(Address::new("0xBuyer"))
        );
    }

    #[test]
    fn test_no_transition_between_terminal_states() {
        let store = MirrorStore::new();
        store.upsert_if_absent(listing(1, 10));
        store.conditional_transition(
            ListingId::new(1),
            ListingStatus::Active,
            ListingStatus::Cancelled,
            TransitionExtras::default(),
        );

        // A terminal state can never hop to another terminal state, even if
        // a caller names it as the expected source.
        let outcome = store.conditional_transition(
            ListingId::new(1),
            ListingStatus::Cancelled,
            ListingStatus::Sold,
            TransitionExtras::sold(Address::new("0xBuyer"), None),
        );
        assert!(matches!(outcome, TransitionOutcome::NoMatch { .. }));

        let outcome = store.conditional_transition(
            ListingId::new(1),
            ListingStatus::Active,
            ListingStatus::Expired,
            TransitionExtras::default(),
        );
        assert_eq!(
            outcome,
            TransitionOutcome::NoMatch {
                current: ListingStatus::Cancelled
            }
        );
        assert_eq!(
            store.get(ListingId::new(1)).unwrap().status,
            ListingStatus::Cancelled
        );
    }

    #[test]
    fn test_no_resurrection_to_active() {
        let store = MirrorStore::new();
        store.upsert_if_absent(listing(1, 10));
        store.conditional_transition(
            ListingId::new(1),
            ListingStatus::Active,
            ListingStatus::Sold,
            TransitionExtras::sold(Address::new("0xBuyer"), None),
        );

        let outcome = store.conditional_transition(
            ListingId::new(1),
            ListingStatus::Sold,
            ListingStatus::Active,
            TransitionExtras::default(),
        );
        assert!(matches!(outcome, TransitionOutcome::NoMatch { .. }));
        assert_eq!(
            store.get(ListingId::new(1)).unwrap().status,
            ListingStatus::Sold
        );
    }

    #[test]
    fn test_transition_missing_row() {
        let store = MirrorStore::new();
        let outcome = store.conditional_transition(
            ListingId::new(99),
            ListingStatus::Active,
            ListingStatus::Sold,
            TransitionExtras::default(),
        );
        assert_eq!(outcome, TransitionOutcome::NotFound);
    }

    #[test]
    fn test_reads_ordered_newest_first() {
        let store = MirrorStore::new();
        store.upsert_if_absent(listing(1, 10));
        store.upsert_if_absent(listing(2, 10));
        store.upsert_if_absent(listing(3, 11));

        let active = store.list_active();
        let ids: Vec<u64> = active.iter().map(|l| l.listing_id.as_u64()).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        let for_artwork = store.list_by_artwork(ArtworkId::new(10));
        let ids: Vec<u64> = for_artwork.iter().map(|l| l.listing_id.as_u64()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_terminal_rows_excluded_from_active_but_kept_for_provenance() {
        let store = MirrorStore::new();
        store.upsert_if_absent(listing(1, 10));
        store.upsert_if_absent(listing(2, 10));
        store.conditional_transition(
            ListingId::new(1),
            ListingStatus::Active,
            ListingStatus::Sold,
            TransitionExtras::sold(Address::new("0xBuyer"), None),
        );

        assert_eq!(store.list_active().len(), 1);
        assert_eq!(store.list_active_for_artwork(ArtworkId::new(10)).len(), 1);
        // Provenance view still has both
        assert_eq!(store.list_by_artwork(ArtworkId::new(10)).len(), 2);
    }

    #[test]
    fn test_concurrent_writers_race_exactly_one_wins() {
        // A Sold event and an optimistic client write racing on the same
        // listing: the final state is SOLD with buyer set exactly once,
        // regardless of arrival order.
        let store = Arc::new(MirrorStore::new());
        store.upsert_if_absent(listing(1, 10));

        let handles: Vec<_> = ["0xingesterbuyer", "0xclientbuyer"]
            .into_iter()
            .map(|who| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.conditional_transition(
                        ListingId::new(1),
                        ListingStatus::Active,
                        ListingStatus::Sold,
                        TransitionExtras::sold(Address::new(who), Some(TxHash::new("0xsale"))),
                    )
                })
            })
            .collect();

        let outcomes: Vec<TransitionOutcome> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        let applied = outcomes
            .iter()
            .filter(|o| **o == TransitionOutcome::Applied)
            .count();
        assert_eq!(applied, 1);

        let row = store.get(ListingId::new(1)).unwrap();
        assert_eq!(row.status, ListingStatus::Sold);
        assert!(row.buyer.is_some());
        assert!(row.check_invariant());
    }
}
