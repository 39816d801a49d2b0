//! # Payment Ledger Adapter
//!
//! In-memory fungible-token ledger with BEP20 semantics. Used for tests and
//! for embedding the sale in a host that keeps balances itself.

use crate::domain::value_objects::{Address, U256};
use crate::errors::TokenError;
use crate::ports::outbound::PaymentLedger;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Default)]
struct Books {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

impl Books {
    fn balance(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    fn move_funds(&mut self, from: Address, to: Address, amount: U256) -> Result<(), TokenError> {
        if from.is_zero() || to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let available = self.balance(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                owner: from,
                required: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.balances.insert(from, available - amount);
        self.balances.insert(to, credited);
        Ok(())
    }
}

/// In-memory payment token.
#[derive(Debug, Default)]
pub struct InMemoryPaymentLedger {
    books: RwLock<Books>,
}

impl InMemoryPaymentLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` to `to` out of thin air.
    pub fn mint(&self, to: Address, amount: U256) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let mut books = self.books.write();
        let credited = books
            .balance(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        books.balances.insert(to, credited);
        Ok(())
    }

    /// Sets the allowance of `spender` over `owner`'s funds to `amount`.
    pub fn approve(&self, owner: Address, spender: Address, amount: U256) -> Result<(), TokenError> {
        if owner.is_zero() || spender.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.books.write().allowances.insert((owner, spender), amount);
        Ok(())
    }

    /// Synchronous balance lookup.
    #[must_use]
    pub fn balance(&self, owner: Address) -> U256 {
        self.books.read().balance(owner)
    }

    /// Sum of all balances.
    #[must_use]
    pub fn total_supply(&self) -> U256 {
        self.books
            .read()
            .balances
            .values()
            .fold(U256::zero(), |acc, b| acc.saturating_add(*b))
    }
}

#[async_trait]
impl PaymentLedger for InMemoryPaymentLedger {
    async fn balance_of(&self, owner: Address) -> Result<U256, TokenError> {
        Ok(self.balance(owner))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, TokenError> {
        Ok(self
            .books
            .read()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        let mut books = self.books.write();
        let approved = books
            .allowances
            .get(&(from, spender))
            .copied()
            .unwrap_or_default();
        // Balance is checked before allowance, as BEP20 does.
        let available = books.balance(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                owner: from,
                required: amount,
                available,
            });
        }
        if approved < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: from,
                spender,
                required: amount,
            });
        }
        books.move_funds(from, to, amount)?;
        books.allowances.insert((from, spender), approved - amount);
        trace!(%from, %to, %amount, "transfer_from");
        Ok(())
    }

    async fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<(), TokenError> {
        self.books.write().move_funds(from, to, amount)?;
        trace!(%from, %to, %amount, "transfer");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
