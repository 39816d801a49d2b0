//! # Core Domain Entities
//!
//! Stage, purchase record and the read-only sale snapshot.

use crate::domain::value_objects::{Address, U256};
use crate::errors::SaleError;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// STAGE
// =============================================================================

/// Discrete phase of the sale controlling price and sale-activity.
///
/// Only raw values `0..=4` exist. Stages 1-3 are sale-active; `None`
/// (before the sale) and `Stage4` (terminal) are legal targets for
/// [`set_stage`](crate::ports::inbound::CrowdsaleApi::set_stage) but sell nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Stage {
    /// Sale not started.
    #[default]
    None = 0,
    /// Seed round.
    Seed = 1,
    /// Second round.
    Stage2 = 2,
    /// Third round.
    Stage3 = 3,
    /// Terminal stage; the sale is closed.
    Stage4 = 4,
}

impl Stage {
    /// Every legal stage, in index order.
    pub const ALL: [Stage; 5] = [
        Stage::None,
        Stage::Seed,
        Stage::Stage2,
        Stage::Stage3,
        Stage::Stage4,
    ];

    /// The stages in which tokens can be bought.
    pub const SALE_ACTIVE: [Stage; 3] = [Stage::Seed, Stage::Stage2, Stage::Stage3];

    /// Raw stage index.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns true if purchases are accepted in this stage.
    #[must_use]
    pub const fn is_sale_active(self) -> bool {
        matches!(self, Stage::Seed | Stage::Stage2 | Stage::Stage3)
    }
}

impl TryFrom<u8> for Stage {
    type Error = SaleError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Stage::None),
            1 => Ok(Stage::Seed),
            2 => Ok(Stage::Stage2),
            3 => Ok(Stage::Stage3),
            4 => Ok(Stage::Stage4),
            other => Err(SaleError::InvalidStage(other)),
        }
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> Self {
        stage.index()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::None => write!(f, "None Stage"),
            Stage::Seed => write!(f, "Seed Stage"),
            Stage::Stage2 => write!(f, "Stage 2"),
            Stage::Stage3 => write!(f, "Stage 3"),
            Stage::Stage4 => write!(f, "Stage 4"),
        }
    }
}

// =============================================================================
// PURCHASE
// =============================================================================

/// A settled buy request.
///
/// Not stored by the engine; only its effects (supply decrement, fund
/// transfer, vesting credit) are durable. It travels in the
/// `TokensPurchased` event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    /// Buyer address.
    pub buyer: Address,
    /// Sale-token base units bought.
    pub amount: U256,
    /// Payment-token base units paid.
    pub cost: U256,
    /// Stage the purchase settled in.
    pub stage: Stage,
    /// Caller-supplied auxiliary value (referral code). Does not affect pricing.
    pub referral: u64,
}

// =============================================================================
// SALE SNAPSHOT
// =============================================================================

/// Read-only view of the sale, taken under the state lock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleInfo {
    /// Operator address.
    pub operator: Address,
    /// Address holding the treasury on the payment ledger.
    pub sale_address: Address,
    /// Payment token identity.
    pub payment_token: Address,
    /// Sale token identity.
    pub sale_token: Address,
    /// Current stage.
    pub stage: Stage,
    /// Current unit price; `None` when the stage is not for sale.
    pub price: Option<u64>,
    /// Sale-token base units still available.
    pub remaining_supply: U256,
    /// Sale-token base units sold per sale-active stage.
    pub sold: Vec<(Stage, U256)>,
    /// Payment-token base units received through purchases.
    pub collected: U256,
    /// Payment-token base units withdrawn by the operator.
    pub withdrawn: U256,
}

impl SaleInfo {
    /// Funds received through the engine and not yet withdrawn.
    #[must_use]
    pub fn treasury_outstanding(&self) -> U256 {
        self.collected.saturating_sub(self.withdrawn)
    }
}

// =============================================================================
// TESTS
// =============================================================================
