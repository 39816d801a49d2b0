//! # Driven Ports (SPI - Outbound)
//!
//! Collaborators the sale depends on:
//! - the payment-token ledger (balances, allowances, transfers)
//! - the vesting collaborator that later distributes purchased tokens
//! - an event sink for observable sale events
//!
//! Failures are returned verbatim; the engine never masks them.

use crate::domain::value_objects::{Address, U256};
use crate::errors::{TokenError, VestingError};
use crate::events::SaleEvent;
use async_trait::async_trait;

// =============================================================================
// PAYMENT LEDGER
// =============================================================================

/// Interface to the payment-token contract.
///
/// Standard fungible-token semantics: `transfer_from` debits the owner's
/// allowance to the spender and fails with the ledger's own error when
/// either the allowance or the owner's balance is short.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Balance of `owner`.
    async fn balance_of(&self, owner: Address) -> Result<U256, TokenError>;

    /// Amount `spender` may move on behalf of `owner`.
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, TokenError>;

    /// Moves `amount` from `from` to `to` on behalf of `spender`.
    async fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError>;

    /// Moves `amount` from `from` to `to`; `from` is the signing account.
    async fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<(), TokenError>;
}

// =============================================================================
// VESTING REGISTRY
// =============================================================================

/// Interface to the vesting collaborator.
///
/// The sale credits a purchase here before pulling payment, and cancels the
/// credit if the payment then fails. The schedule that later releases sale
/// tokens is out of scope.
#[async_trait]
pub trait VestingRegistry: Send + Sync {
    /// Credits `amount` sale-token base units to `beneficiary`.
    async fn register_purchase(&self, beneficiary: Address, amount: U256)
        -> Result<(), VestingError>;

    /// Reverses a prior `register_purchase` of `amount` for `beneficiary`.
    async fn cancel_purchase(&self, beneficiary: Address, amount: U256)
        -> Result<(), VestingError>;
}

// =============================================================================
// EVENT PUBLISHER
// =============================================================================

/// Sink for sale events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes `event`, returning the number of live subscribers reached.
    async fn publish(&self, event: SaleEvent) -> usize;

    /// Total events published.
    fn events_published(&self) -> u64;
}

// =============================================================================
// TESTS
// =============================================================================
