//! Exhibit token ownership and approval registry
//!
//! Minimal asset-side model the marketplace checks and moves: sequential
//! token ids, single-owner records, and per-token transfer approvals. The
//! marketplace must be approved for a token before it can settle a sale.

use std::collections::HashMap;

use types::ids::{Address, TokenId};

use crate::errors::TokenError;

/// Ownership registry for the exhibit token contract.
#[derive(Debug)]
pub struct ExhibitToken {
    /// The token contract's own address, carried into listing records
    contract_address: Address,
    /// token -> current owner
    owners: HashMap<TokenId, Address>,
    /// token -> approved operator (cleared on transfer)
    approvals: HashMap<TokenId, Address>,
    /// Next token id to assign (sequential from 1)
    next_token_id: u64,
}

impl ExhibitToken {
    pub fn new(contract_address: impl Into<Address>) -> Self {
        Self {
            contract_address: contract_address.into(),
            owners: HashMap::new(),
            approvals: HashMap::new(),
            next_token_id: 1,
        }
    }

    pub fn address(&self) -> &Address {
        &self.contract_address
    }

    /// Mint a new token to `to`. Returns the assigned token id.
    pub fn mint(&mut self, to: Address) -> TokenId {
        let token_id = TokenId::new(self.next_token_id);
        self.next_token_id += 1;
        self.owners.insert(token_id, to);
        token_id
    }

    /// Current owner of a token.
    pub fn owner_of(&self, token_id: TokenId) -> Result<&Address, TokenError> {
        self.owners
            .get(&token_id)
            .ok_or(TokenError::NotFound { token_id })
    }

    /// Approve an operator to transfer a token. Owner-only.
    pub fn approve(
        &mut self,
        caller: &Address,
        operator: Address,
        token_id: TokenId,
    ) -> Result<(), TokenError> {
        let owner = self.owner_of(token_id)?;
        if owner != caller {
            return Err(TokenError::NotOwner {
                caller: caller.clone(),
                token_id,
            });
        }
        self.approvals.insert(token_id, operator);
        Ok(())
    }

    /// Whether `operator` may transfer `token_id` (owner or approved).
    pub fn is_authorized(&self, operator: &Address, token_id: TokenId) -> bool {
        match self.owners.get(&token_id) {
            Some(owner) if owner == operator => true,
            Some(_) => self.approvals.get(&token_id) == Some(operator),
            None => false,
        }
    }

    /// Transfer a token to `to`, called by an authorized operator.
    ///
    /// Clears any outstanding approval on success.
    pub fn transfer(
        &mut self,
        caller: &Address,
        token_id: TokenId,
        to: Address,
    ) -> Result<(), TokenError> {
        if !self.owners.contains_key(&token_id) {
            return Err(TokenError::NotFound { token_id });
        }
        if !self.is_authorized(caller, token_id) {
            return Err(TokenError::NotAuthorized {
                caller: caller.clone(),
                token_id,
            });
        }
        self.approvals.remove(&token_id);
        self.owners.insert(token_id, to);
        Ok(())
    }
}
