//! Types library for the marketplace mirror
//!
//! This library provides all core type definitions shared between the
//! settlement-contract model, the synchronization engine, and the gateway,
//! ensuring type safety and deterministic money handling.
//!
//! # Modules
//! - `ids`: Ledger-native identifiers (ListingId, TokenId, ArtworkId, Address, TxHash)
//! - `numeric`: Decimal-string money amounts (Amount)
//! - `listing`: Listing record and status lifecycle
//! - `artwork`: Artwork catalog summary embedded in read responses

// Public modules
pub mod artwork;
pub mod ids;
pub mod listing;
pub mod numeric;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::artwork::*;
    pub use crate::ids::*;
    pub use crate::listing::*;
    pub use crate::numeric::*;
}
