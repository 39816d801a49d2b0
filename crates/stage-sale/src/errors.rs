//! # Error Types
//!
//! All error types for the crowdsale engine. Display strings are stable
//! reason strings reported to callers verbatim.

use crate::domain::entities::Stage;
use crate::domain::value_objects::{Address, U256};
use thiserror::Error;

// =============================================================================
// SALE ERRORS
// =============================================================================

/// Rejections returned by sale operations. Every rejection aborts the whole
/// operation; no partial state survives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SaleError {
    /// Caller is not the operator.
    #[error("Ownable: caller is not the owner")]
    Unauthorized {
        /// The rejected caller.
        caller: Address,
    },

    /// Raw stage value outside `0..=4`, or a stage with no price entry.
    #[error("Stage doesn't exist")]
    InvalidStage(u8),

    /// Price or purchase requested while the stage is not for sale.
    #[error("Sale not active")]
    SaleNotActive,

    /// Purchase of zero tokens.
    #[error("Amount can't be 0")]
    ZeroAmount,

    /// Purchase exceeds the remaining supply or the stage cap.
    #[error("All tokens in the {stage} sold, wait for the next sale")]
    SupplyExhausted {
        /// Stage the purchase was attempted in.
        stage: Stage,
        /// Amount requested.
        requested: U256,
        /// Amount still purchasable.
        available: U256,
    },

    /// Buyer approved less than the purchase cost.
    #[error("Check the token allowance, not enough approved!")]
    InsufficientAllowance {
        /// Payment-token cost of the purchase.
        required: U256,
        /// Allowance granted to the sale.
        approved: U256,
    },

    /// Withdrawal exceeds the payment-token balance held by the sale.
    #[error("Not enough funds on the contract")]
    InsufficientTreasuryFunds {
        /// Amount requested.
        requested: U256,
        /// Balance held.
        available: U256,
    },

    /// Non-zero purchase whose cost truncates to zero payment units.
    #[error("Amount too small to cover the stage price")]
    DustPurchase,

    /// Checked arithmetic overflowed.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// Failure surfaced by the payment-token ledger.
    #[error(transparent)]
    Payment(#[from] TokenError),

    /// Failure surfaced by the vesting collaborator.
    #[error(transparent)]
    Vesting(#[from] VestingError),

    /// The treasury address itself tried to buy.
    #[error("Sale contract can't buy its own tokens")]
    SelfPurchase,

    /// Payment failed after the vesting credit was made, and cancelling
    /// that credit failed too.
    #[error("rollback after failed settlement did not complete: {0}")]
    RollbackFailed(VestingError),
}

impl SaleError {
    /// Returns true for rejections caused by the caller's own input or
    /// funds, as opposed to collaborator failures.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::InvalidStage(_)
                | Self::SaleNotActive
                | Self::ZeroAmount
                | Self::SupplyExhausted { .. }
                | Self::InsufficientAllowance { .. }
                | Self::InsufficientTreasuryFunds { .. }
                | Self::DustPurchase
                | Self::SelfPurchase
                | Self::Payment(TokenError::InsufficientBalance { .. })
                | Self::Payment(TokenError::InsufficientAllowance { .. })
        )
    }
}

// =============================================================================
// PAYMENT TOKEN ERRORS
// =============================================================================

/// Errors from the payment-token ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Sender holds less than the transfer amount.
    #[error("BEP20: transfer amount exceeds balance")]
    InsufficientBalance {
        /// Account debited.
        owner: Address,
        /// Amount requested.
        required: U256,
        /// Balance held.
        available: U256,
    },

    /// Spender was approved for less than the transfer amount.
    #[error("BEP20: transfer amount exceeds allowance")]
    InsufficientAllowance {
        /// Account debited.
        owner: Address,
        /// Approved spender.
        spender: Address,
        /// Amount requested.
        required: U256,
    },

    /// Transfer from or to the zero address.
    #[error("BEP20: transfer involving the zero address")]
    ZeroAddress,

    /// Credit would overflow the recipient balance.
    #[error("BEP20: balance overflow")]
    Overflow,

    /// Ledger could not be reached.
    #[error("payment ledger unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// VESTING ERRORS
// =============================================================================

/// Errors from the vesting collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VestingError {
    /// Registrations would exceed the sale tokens funded into vesting.
    #[error("vesting pool underfunded: requested {requested}, unallocated {unallocated}")]
    Underfunded {
        /// Amount requested.
        requested: U256,
        /// Funded amount not yet allocated.
        unallocated: U256,
    },

    /// Registration for the zero address.
    #[error("vesting beneficiary is the zero address")]
    ZeroBeneficiary,

    /// Cancellation exceeds what the beneficiary was credited.
    #[error("cannot cancel {requested}: beneficiary credited {credited}")]
    NotCredited {
        /// Amount to cancel.
        requested: U256,
        /// Amount currently credited.
        credited: U256,
    },

    /// Vesting collaborator could not be reached.
    #[error("vesting registry unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Errors building a sale from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Price entry for a stage that cannot sell.
    #[error("stage {0} is not sale-active and cannot carry a price")]
    PriceOnInactiveStage(u8),

    /// Two entries for the same stage.
    #[error("duplicate price entry for stage {0}")]
    DuplicateStage(u8),

    /// A sale-active stage has no price entry.
    #[error("missing price entry for stage {0}")]
    MissingStage(u8),

    /// Zero price.
    #[error("price for stage {0} must be non-zero")]
    ZeroPrice(u8),

    /// Prices must strictly decrease as the stage index increases.
    #[error("price for stage {stage} ({price}) must be below the previous stage price ({previous})")]
    PriceNotDecreasing {
        /// Offending stage.
        stage: u8,
        /// Its price.
        price: u64,
        /// Price of the preceding stage.
        previous: u64,
    },

    /// Zero price scale.
    #[error("price scale must be non-zero")]
    ZeroPriceScale,

    /// Zero operator or sale address.
    #[error("{0} address must be non-zero")]
    ZeroAddress(&'static str),

    /// Invalid raw stage value.
    #[error(transparent)]
    Stage(#[from] SaleError),

    /// Configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// TESTS
// =============================================================================
