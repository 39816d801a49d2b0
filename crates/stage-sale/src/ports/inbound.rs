//! # Driving Ports (API - Inbound)
//!
//! The public operations of the sale. The caller address is passed
//! explicitly; the host that authenticates callers lives outside this crate.

use crate::domain::entities::{SaleInfo, Stage};
use crate::domain::value_objects::{Address, U256};
use crate::errors::SaleError;
use async_trait::async_trait;

/// Primary API of the crowdsale engine.
///
/// Every mutating call is atomic: it either commits fully or returns an
/// error leaving sale state, balances and vesting credits unchanged.
///
/// ## Usage
///
/// ```ignore
/// sale.set_stage(operator, 1).await?;
/// sale.buy_token(buyer, parse_units(50), 0).await?;
/// sale.withdraw(operator, parse_units(1), 0).await?;
/// ```
#[async_trait]
pub trait CrowdsaleApi: Send + Sync {
    /// Sets the current stage. Operator only; `raw_stage` must be `0..=4`.
    async fn set_stage(&self, caller: Address, raw_stage: u8) -> Result<(), SaleError>;

    /// Current stage.
    async fn current_stage(&self) -> Stage;

    /// Unit price of the current stage; `SaleNotActive` in stages 0 and 4.
    async fn get_price(&self) -> Result<u64, SaleError>;

    /// Buys `amount` sale-token base units for `buyer`, paying in the
    /// payment token. `referral` is recorded but does not affect pricing.
    async fn buy_token(&self, buyer: Address, amount: U256, referral: u64)
        -> Result<(), SaleError>;

    /// Transfers `amount` of held payment token to the operator. Operator
    /// only. `aux` is recorded in the emitted event.
    async fn withdraw(&self, caller: Address, amount: U256, aux: u64) -> Result<(), SaleError>;

    /// Sale-token base units still available.
    async fn remaining_supply(&self) -> U256;

    /// Operator address.
    fn operator(&self) -> Address;

    /// Snapshot of the whole sale.
    async fn sale_info(&self) -> SaleInfo;
}
