//! Settlement contract logic for the marketplace
//!
//! This crate models the on-chain layer the mirror tracks: the exhibit-token
//! ownership registry, the marketplace listing state machine, and the
//! Dutch-auction pricing rule. The event log emitted here is the sole channel
//! by which the synchronization engine learns about state changes.
//!
//! # Modules
//! - `errors`: Contract-specific error taxonomy
//! - `events`: Durable events emitted by contract operations
//! - `pricing`: Pure current-price computation for a listing
//! - `token`: Exhibit token ownership and approval registry
//! - `marketplace`: Listing lifecycle (list, buy, cancel)

pub mod errors;
pub mod events;
pub mod marketplace;
pub mod pricing;
pub mod token;

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
