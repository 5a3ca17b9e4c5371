//! Contract events
//!
//! Events are immutable records emitted by marketplace operations. Every
//! transition out of the active state emits exactly one event carrying the
//! listing identifier; the synchronization engine consumes these and nothing
//! else.

use serde::{Deserialize, Serialize};
use types::ids::{Address, ListingId, TokenId};
use types::numeric::Amount;

/// A listing was created and is open for purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemListed {
    pub listing_id: ListingId,
    pub seller: Address,
    pub token_contract: Address,
    pub token_id: TokenId,
    pub price_start: Amount,
    pub price_end: Amount,
    pub start_time: i64,
    pub duration: u64,
}

/// A listing settled: the asset transferred to the buyer at `price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSold {
    pub listing_id: ListingId,
    pub buyer: Address,
    pub token_contract: Address,
    pub token_id: TokenId,
    pub price: Amount,
}

/// A listing was withdrawn by its seller. No funds moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCanceled {
    pub listing_id: ListingId,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum ContractEvent {
    ItemListed(ItemListed),
    ItemSold(ItemSold),
    ItemCanceled(ItemCanceled),
}

impl ContractEvent {
    /// The listing identifier carried by every event.
    pub fn listing_id(&self) -> ListingId {
        match self {
            ContractEvent::ItemListed(e) => e.listing_id,
            ContractEvent::ItemSold(e) => e.listing_id,
            ContractEvent::ItemCanceled(e) => e.listing_id,
        }
    }

    /// Get the event type as a string label for logging.
    pub fn event_type_label(&self) -> &'static str {
        match self {
            ContractEvent::ItemListed(_) => "ItemListed",
            ContractEvent::ItemSold(_) => "ItemSold",
            ContractEvent::ItemCanceled(_) => "ItemCanceled",
        }
    }
}
