//! Error types for the settlement contracts
//!
//! Comprehensive error taxonomy using thiserror. Every failed operation
//! leaves contract state untouched — there is no partial settlement.

use thiserror::Error;
use types::ids::{Address, ListingId, TokenId};
use types::numeric::Amount;

/// Errors raised by the exhibit token registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token not found: {token_id}")]
    NotFound { token_id: TokenId },

    #[error("Caller {caller} is not the owner of token {token_id}")]
    NotOwner { caller: Address, token_id: TokenId },

    #[error("Caller {caller} is not authorized to transfer token {token_id}")]
    NotAuthorized { caller: Address, token_id: TokenId },
}

/// Errors raised by the marketplace listing state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketplaceError {
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Marketplace is not approved to transfer token {token_id}")]
    NotApproved { token_id: TokenId },

    #[error("Invalid price bounds: end price {end} exceeds start price {start}")]
    InvalidPriceBounds { start: Amount, end: Amount },

    #[error("Listing not found: {listing_id}")]
    ListingNotFound { listing_id: ListingId },

    #[error("Listing {listing_id} is not active")]
    ListingNotActive { listing_id: ListingId },

    #[error("Insufficient payment: required {required}, offered {offered}")]
    InsufficientPayment { required: Amount, offered: Amount },

    #[error("Caller {caller} is not the seller of listing {listing_id}")]
    NotSeller { caller: Address, listing_id: ListingId },
}
