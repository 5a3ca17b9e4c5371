//! Marketplace listing state machine
//!
//! Authoritative lifecycle of a listing as settlement sees it: `list` creates
//! an active slot, `buy` and `cancel` deactivate it. Deactivation is final —
//! a slot never becomes active again. Every transition emits a durable event
//! appended to the contract's event log.

use std::collections::HashMap;

use types::ids::{Address, ListingId, TokenId};
use types::numeric::Amount;

use crate::errors::MarketplaceError;
use crate::events::{ContractEvent, ItemCanceled, ItemListed, ItemSold};
use crate::pricing;
use crate::token::ExhibitToken;

/// On-chain listing slot.
///
/// `active` is the only lifecycle flag settlement keeps; whether an inactive
/// slot was sold or canceled is recoverable from the event log alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSlot {
    pub listing_id: ListingId,
    pub seller: Address,
    pub token_contract: Address,
    pub token_id: TokenId,
    pub price_start: Amount,
    pub price_end: Amount,
    pub start_time: i64,
    pub duration: u64,
    pub active: bool,
    pub buyer: Option<Address>,
}

/// Marketplace settlement contract.
#[derive(Debug)]
pub struct Marketplace {
    /// The contract's own address; sellers approve it before listing
    contract_address: Address,
    /// listing id -> slot
    listings: HashMap<ListingId, ListingSlot>,
    /// Next listing id to assign (sequential from 1)
    next_listing_id: u64,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
}

impl Marketplace {
    pub fn new(contract_address: impl Into<Address>) -> Self {
        Self {
            contract_address: contract_address.into(),
            listings: HashMap::new(),
            next_listing_id: 1,
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.contract_address
    }

    // ───────────────────────── List ─────────────────────────

    /// Create a new active listing for `token_id`.
    ///
    /// The caller must own the token and must have approved the marketplace
    /// to transfer it. `price_end == price_start` is a fixed price;
    /// `price_end > price_start` (an inverted auction) is rejected outright
    /// rather than silently producing a rising price.
    ///
    /// Emits `ItemListed`.
    #[allow(clippy::too_many_arguments)]
    pub fn list(
        &mut self,
        token: &ExhibitToken,
        caller: &Address,
        token_id: TokenId,
        price_start: Amount,
        price_end: Amount,
        duration: u64,
        now: i64,
    ) -> Result<ListingId, MarketplaceError> {
        let owner = token.owner_of(token_id)?;
        if owner != caller {
            return Err(MarketplaceError::Token(
                crate::errors::TokenError::NotOwner {
                    caller: caller.clone(),
                    token_id,
                },
            ));
        }
        if !token.is_authorized(&self.contract_address, token_id) {
            return Err(MarketplaceError::NotApproved { token_id });
        }
        if price_end > price_start {
            return Err(MarketplaceError::InvalidPriceBounds {
                start: price_start,
                end: price_end,
            });
        }

        let listing_id = ListingId::new(self.next_listing_id);
        self.next_listing_id += 1;

        let slot = ListingSlot {
            listing_id,
            seller: caller.clone(),
            token_contract: token.address().clone(),
            token_id,
            price_start,
            price_end,
            start_time: now,
            duration,
            active: true,
            buyer: None,
        };
        self.listings.insert(listing_id, slot);

        self.events.push(ContractEvent::ItemListed(ItemListed {
            listing_id,
            seller: caller.clone(),
            token_contract: token.address().clone(),
            token_id,
            price_start,
            price_end,
            start_time: now,
            duration,
        }));
        Ok(listing_id)
    }

    // ───────────────────────── Buy ─────────────────────────

    /// Buy an active listing at the current Dutch-auction price.
    ///
    /// Payment must cover the price at ledger time `now`; underpayment fails
    /// the whole operation with no state change. On success the token
    /// transfers to the buyer, the slot deactivates, and `ItemSold` is
    /// emitted. Returns the price actually charged.
    pub fn buy(
        &mut self,
        token: &mut ExhibitToken,
        caller: &Address,
        listing_id: ListingId,
        payment: Amount,
        now: i64,
    ) -> Result<Amount, MarketplaceError> {
        let slot = self
            .listings
            .get(&listing_id)
            .ok_or(MarketplaceError::ListingNotFound { listing_id })?;
        if !slot.active {
            return Err(MarketplaceError::ListingNotActive { listing_id });
        }

        let price = pricing::current_price(
            slot.price_start,
            slot.price_end,
            slot.start_time,
            slot.duration,
            now,
        );
        if payment < price {
            return Err(MarketplaceError::InsufficientPayment {
                required: price,
                offered: payment,
            });
        }

        // Transfer first; a failed transfer leaves the listing untouched.
        token.transfer(&self.contract_address, slot.token_id, caller.clone())?;

        let slot = self
            .listings
            .get_mut(&listing_id)
            .ok_or(MarketplaceError::ListingNotFound { listing_id })?;
        slot.active = false;
        slot.buyer = Some(caller.clone());

        self.events.push(ContractEvent::ItemSold(ItemSold {
            listing_id,
            buyer: caller.clone(),
            token_contract: slot.token_contract.clone(),
            token_id: slot.token_id,
            price,
        }));
        Ok(price)
    }

    // ───────────────────────── Cancel ─────────────────────────

    /// Cancel an active listing. Seller-only; no funds move.
    ///
    /// Emits `ItemCanceled`.
    pub fn cancel(
        &mut self,
        caller: &Address,
        listing_id: ListingId,
    ) -> Result<(), MarketplaceError> {
        let slot = self
            .listings
            .get_mut(&listing_id)
            .ok_or(MarketplaceError::ListingNotFound { listing_id })?;
        if !slot.active {
            return Err(MarketplaceError::ListingNotActive { listing_id });
        }
        if &slot.seller != caller {
            return Err(MarketplaceError::NotSeller {
                caller: caller.clone(),
                listing_id,
            });
        }

        slot.active = false;
        self.events
            .push(ContractEvent::ItemCanceled(ItemCanceled { listing_id }));
        Ok(())
    }

    // ───────────────────────── Reads ─────────────────────────

    /// Current price of a listing at ledger time `now`.
    pub fn current_price(
        &self,
        listing_id: ListingId,
        now: i64,
    ) -> Result<Amount, MarketplaceError> {
        let slot = self
            .listings
            .get(&listing_id)
            .ok_or(MarketplaceError::ListingNotFound { listing_id })?;
        Ok(pricing::current_price(
            slot.price_start,
            slot.price_end,
            slot.start_time,
            slot.duration,
            now,
        ))
    }

    /// The listing struct, including its active flag.
    pub fn listing(&self, listing_id: ListingId) -> Option<&ListingSlot> {
        self.listings.get(&listing_id)
    }

    /// Events emitted so far.
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Drain the event log, handing the events to a consumer.
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }
}
