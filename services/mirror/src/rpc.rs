//! HTTP clients for the ledger RPC facade and the artwork catalog service
//!
//! Point reads and log polling go through a JSON-over-HTTP facade in front
//! of the ledger node; artwork lookups go to the catalog service. Both map
//! transport failures into `LedgerError` so callers treat them uniformly as
//! "unknown, skip".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use types::artwork::ArtworkSummary;
use types::ids::{Address, ArtworkId, ListingId, TokenId};
use types::numeric::Amount;

use crate::ledger::{ArtworkCatalog, LedgerError, LedgerLog, LedgerReader, LogSource, OnChainListing};

/// JSON client for the ledger RPC facade.
///
/// Every request carries the configured timeout; a hung facade surfaces as
/// `LedgerError::Timeout` instead of stalling the ingester's poll loop.
#[derive(Debug, Clone)]
pub struct HttpLedger {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpLedger {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, LedgerError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LedgerError::Timeout
                } else {
                    LedgerError::Unavailable(e.to_string())
                }
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(LedgerError::NotFound(url)),
            status if !status.is_success() => {
                Err(LedgerError::Unavailable(format!("{url}: {status}")))
            }
            _ => response
                .json::<T>()
                .await
                .map_err(|e| LedgerError::Malformed(e.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    price: Amount,
}

#[derive(Debug, Deserialize)]
struct OwnerResponse {
    owner: Address,
}

#[async_trait]
impl LedgerReader for HttpLedger {
    async fn current_price(&self, listing_id: ListingId) -> Result<Amount, LedgerError> {
        let body: PriceResponse = self
            .get_json(&format!("/listings/{listing_id}/price"))
            .await?;
        Ok(body.price)
    }

    async fn listing_state(&self, listing_id: ListingId) -> Result<OnChainListing, LedgerError> {
        self.get_json(&format!("/listings/{listing_id}")).await
    }

    async fn owner_of(&self, token_id: TokenId) -> Result<Address, LedgerError> {
        let body: OwnerResponse = self.get_json(&format!("/tokens/{token_id}/owner")).await?;
        Ok(body.owner)
    }
}

#[async_trait]
impl LogSource for HttpLedger {
    async fn poll_logs(&self, after_block: u64) -> Result<Vec<LedgerLog>, LedgerError> {
        self.get_json(&format!("/logs?after={after_block}")).await
    }
}

/// JSON client for the artwork catalog service.
///
/// Lookup failures deliberately collapse to `None`: an unreachable catalog
/// makes a Listed event unresolvable, which the ingester already handles as
/// drop-and-log.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    async fn fetch_summary(&self, path: &str) -> Option<ArtworkSummary> {
        let url = format!("{}{}", self.base_url, path);
        let response = match self.client.get(&url).timeout(self.timeout).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!(%url, status = %response.status(), "catalog lookup miss");
                return None;
            }
            Err(error) => {
                tracing::warn!(%url, %error, "catalog unreachable");
                return None;
            }
        };
        match response.json::<ArtworkSummary>().await {
            Ok(summary) => Some(summary),
            Err(error) => {
                tracing::warn!(%url, %error, "malformed catalog response");
                None
            }
        }
    }
}

#[async_trait]
impl ArtworkCatalog for HttpCatalog {
    async fn artwork_for_token(&self, token_id: TokenId) -> Option<ArtworkId> {
        self.fetch_summary(&format!("/artworks/by-token/{token_id}"))
            .await
            .map(|summary| summary.artwork_id)
    }

    async fn artwork(&self, artwork_id: ArtworkId) -> Option<ArtworkSummary> {
        self.fetch_summary(&format!("/artworks/{artwork_id}")).await
    }
}
