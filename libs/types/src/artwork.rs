//! Artwork catalog summary
//!
//! The artwork catalog is an external collaborator; the mirror only carries
//! the summary it embeds in listing read responses.

use crate::ids::{Address, ArtworkId, TokenId};
use serde::{Deserialize, Serialize};

/// Summary of a catalog artwork record, embedded in listing views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkSummary {
    pub artwork_id: ArtworkId,
    pub token_id: TokenId,
    pub title: String,
    pub image_url: String,
    pub creator_wallet: Address,
}
