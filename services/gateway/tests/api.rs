//! Endpoint tests for the settlement gateway, run against an in-memory
//! mirror and a scripted ledger.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use gateway::router::create_router;
use gateway::state::AppState;
use mirror::ledger::{ArtworkCatalog, ArtworkIndex, LedgerError, LedgerReader, OnChainListing};
use mirror::reconcile::Reconciler;
use mirror::store::MirrorStore;
use types::artwork::ArtworkSummary;
use types::ids::{Address, ArtworkId, ListingId, TokenId, TxHash};
use types::listing::{Listing, ListingStatus};
use types::numeric::Amount;

/// Ledger stub scripted with per-listing active flags and per-token owners.
#[derive(Default)]
struct ScriptedLedger {
    active: HashMap<ListingId, bool>,
    owners: HashMap<TokenId, Address>,
}

#[async_trait]
impl LedgerReader for ScriptedLedger {
    async fn current_price(&self, _listing_id: ListingId) -> Result<Amount, LedgerError> {
        Ok(Amount::zero())
    }

    async fn listing_state(&self, listing_id: ListingId) -> Result<OnChainListing, LedgerError> {
        let active = self
            .active
            .get(&listing_id)
            .copied()
            .ok_or_else(|| LedgerError::NotFound(listing_id.to_string()))?;
        Ok(OnChainListing {
            listing_id,
            seller: Address::new("0xSeller"),
            token_id: TokenId::new(1),
            active,
        })
    }

    async fn owner_of(&self, token_id: TokenId) -> Result<Address, LedgerError> {
        self.owners
            .get(&token_id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(token_id.to_string()))
    }
}

fn seeded_catalog() -> Arc<ArtworkIndex> {
    let index = ArtworkIndex::new();
    index.insert(ArtworkSummary {
        artwork_id: ArtworkId::new(10),
        token_id: TokenId::new(1),
        title: "Nocturne".to_string(),
        image_url: "ipfs://QmExample".to_string(),
        creator_wallet: Address::new("0xCreator"),
    });
    Arc::new(index)
}

fn active_listing(id: u64) -> Listing {
    Listing {
        listing_id: ListingId::new(id),
        artwork_id: ArtworkId::new(10),
        token_contract: Address::new("0xToken"),
        token_id: TokenId::new(1),
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

fn app(store: Arc<MirrorStore>, ledger: ScriptedLedger) -> Router {
    let reconciler = Arc::new(Reconciler::new(
        Arc::clone(&store),
        Arc::new(ledger),
        Duration::from_millis(100),
    ));
    let catalog: Arc<dyn ArtworkCatalog> = seeded_catalog();
    create_router(AppState::new(
        store,
        reconciler,
        catalog,
        Address::new("0xAssetContract"),
    ))
}

async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let app = app(Arc::new(MirrorStore::new()), ScriptedLedger::default());
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_list_active_embeds_artwork_newest_first() {
    let store = Arc::new(MirrorStore::new());
    store.upsert_if_absent(active_listing(1));
    store.upsert_if_absent(active_listing(2));
    let app = app(Arc::clone(&store), ScriptedLedger::default());

    let (status, body) = get(&app, "/listings").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["listing_id"], 2);
    assert_eq!(rows[1]["listing_id"], 1);
    assert_eq!(rows[0]["artwork"]["title"], "Nocturne");
    // Amounts cross the boundary as decimal strings
    assert_eq!(rows[0]["price_start"], "1000");
}

#[tokio::test]
async fn test_provenance_view_includes_terminal_rows() {
    let store = Arc::new(MirrorStore::new());
    store.upsert_if_absent(active_listing(1));
    store.upsert_if_absent(active_listing(2));
    let app = app(Arc::clone(&store), ScriptedLedger::default());

    let (_, _) = post(
        &app,
        "/listings/mark-sold",
        json!({"listingId": 1, "buyerWallet": "0xBuyer", "txHash": "0xsale"}),
    )
    .await;

    let (status, body) = get(&app, "/listings/10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    // The active read drops the sold row
    let (_, body) = get(&app, "/listings").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_mark_sold_applies_then_noops() {
    let store = Arc::new(MirrorStore::new());
    store.upsert_if_absent(active_listing(1));
    let app = app(Arc::clone(&store), ScriptedLedger::default());

    let payload = json!({"listingId": 1, "buyerWallet": "0xBuyer", "txHash": "0xsale"});
    let (status, body) = post(&app, "/listings/mark-sold", payload.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "updated");

    let row = store.get(ListingId::new(1)).unwrap();
    assert_eq!(row.status, ListingStatus::Sold);
    assert_eq!(row.buyer, Some(Address::new("0xBuyer")));

    // The ingester (or a retry) arriving second is a harmless no-op
    let (status, body) = post(&app, "/listings/mark-sold", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "already updated");
}

#[tokio::test]
async fn test_mark_sold_unknown_listing_is_404() {
    let app = app(Arc::new(MirrorStore::new()), ScriptedLedger::default());
    let (status, body) = post(
        &app,
        "/listings/mark-sold",
        json!({"listingId": 99, "buyerWallet": "0xBuyer", "txHash": "0xsale"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_mark_sold_missing_field_is_400() {
    let store = Arc::new(MirrorStore::new());
    store.upsert_if_absent(active_listing(1));
    let app = app(Arc::clone(&store), ScriptedLedger::default());

    let (status, body) = post(&app, "/listings/mark-sold", json!({"listingId": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");

    // No mutation was attempted
    assert_eq!(store.get(ListingId::new(1)).unwrap().status, ListingStatus::Active);
}

#[tokio::test]
async fn test_sync_listing_is_idempotent() {
    let store = Arc::new(MirrorStore::new());
    let app = app(Arc::clone(&store), ScriptedLedger::default());

    let payload = json!({
        "listingId": 5,
        "artworkId": 10,
        "seller": "0xSeller",
        "startPrice": "1000",
        "endPrice": "500",
        "startsAt": 1_700_000_000,
        "duration": 3600,
        "txHash": "0xlist"
    });
    let (status, body) = post(&app, "/sync/listing", payload.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "created");

    let row = store.get(ListingId::new(5)).unwrap();
    assert_eq!(row.status, ListingStatus::Active);
    // Token id resolved through the catalog
    assert_eq!(row.token_id, TokenId::new(1));

    let (status, body) = post(&app, "/sync/listing", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "already present");
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_sync_listing_missing_field_is_400() {
    let app = app(Arc::new(MirrorStore::new()), ScriptedLedger::default());
    let (status, _) = post(&app, "/sync/listing", json!({"listingId": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_endpoint_corrects_drift() {
    let store = Arc::new(MirrorStore::new());
    store.upsert_if_absent(active_listing(7));
    let ledger = ScriptedLedger {
        active: HashMap::from([(ListingId::new(7), false)]),
        ..Default::default()
    };
    let app = app(Arc::clone(&store), ledger);

    let (status, body) = get(&app, "/listings/10/verify").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], json!([7]));
    assert_eq!(store.get(ListingId::new(7)).unwrap().status, ListingStatus::Sold);

    // Re-running converges to a no-op
    let (_, body) = get(&app, "/listings/10/verify").await;
    assert_eq!(body["updated"], json!([]));
}

#[tokio::test]
async fn test_verify_unreachable_ledger_is_503() {
    let store = Arc::new(MirrorStore::new());
    store.upsert_if_absent(active_listing(7));
    // No scripted listing state: every ledger read fails
    let app = app(Arc::clone(&store), ScriptedLedger::default());

    let (status, body) = get(&app, "/listings/10/verify").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "LEDGER_UNAVAILABLE");
    // The mirror is untouched
    assert_eq!(store.get(ListingId::new(7)).unwrap().status, ListingStatus::Active);
}

#[tokio::test]
async fn test_cleanup_unreachable_ledger_is_503() {
    let store = Arc::new(MirrorStore::new());
    store.upsert_if_absent(active_listing(9));
    // No scripted owners: every ownership read fails
    let app = app(Arc::clone(&store), ScriptedLedger::default());

    let (status, body) = post(
        &app,
        "/listings/10/cleanup",
        json!({"ownerWallet": "0xWalletB"}),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "LEDGER_UNAVAILABLE");
    assert_eq!(store.get(ListingId::new(9)).unwrap().status, ListingStatus::Active);
}

#[tokio::test]
async fn test_cleanup_requires_owner_wallet() {
    let app = app(Arc::new(MirrorStore::new()), ScriptedLedger::default());
    let (status, body) = post(&app, "/listings/10/cleanup", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_cleanup_expires_stale_listing() {
    let store = Arc::new(MirrorStore::new());
    store.upsert_if_absent(active_listing(9));
    // The asset now belongs to wallet B, not the recorded seller
    let ledger = ScriptedLedger {
        owners: HashMap::from([(TokenId::new(1), Address::new("0xWalletB"))]),
        ..Default::default()
    };
    let app = app(Arc::clone(&store), ledger);

    let (status, body) = post(
        &app,
        "/listings/10/cleanup",
        json!({"ownerWallet": "0xWalletB"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expired"], json!([9]));
    assert_eq!(store.get(ListingId::new(9)).unwrap().status, ListingStatus::Expired);
}
