//! # Event Schema
//!
//! Observable events emitted by the sale for indexers and tests.
//!
//! | Event | Emitted on | Topic |
//! |-------|------------|-------|
//! | `StageChanged` | every successful `set_stage` | `sale.stage_changed` |
//! | `TokensPurchased` | every settled `buy_token` | `sale.tokens_purchased` |
//! | `FundsWithdrawn` | every successful `withdraw` | `sale.funds_withdrawn` |

use crate::domain::entities::{Purchase, Stage};
use crate::domain::value_objects::{Address, U256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Topic names, one per event kind.
pub mod topics {
    /// `StageChanged`.
    pub const STAGE_CHANGED: &str = "sale.stage_changed";
    /// `TokensPurchased`.
    pub const TOKENS_PURCHASED: &str = "sale.tokens_purchased";
    /// `FundsWithdrawn`.
    pub const FUNDS_WITHDRAWN: &str = "sale.funds_withdrawn";
}

/// Event body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SaleEventKind {
    /// The operator changed the stage.
    StageChanged {
        /// New stage.
        stage: Stage,
    },
    /// A purchase settled.
    TokensPurchased {
        /// The settled purchase.
        purchase: Purchase,
    },
    /// The operator withdrew treasury funds.
    FundsWithdrawn {
        /// Recipient (the operator).
        to: Address,
        /// Payment-token base units.
        amount: U256,
        /// Caller-supplied auxiliary value.
        aux: u64,
    },
}

/// Event envelope with a unique id for de-duplication by consumers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleEvent {
    /// Unique event id.
    pub event_id: Uuid,
    /// Event body.
    pub kind: SaleEventKind,
}

impl SaleEvent {
    /// Wraps `kind` with a fresh event id.
    #[must_use]
    pub fn new(kind: SaleEventKind) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            kind,
        }
    }

    /// `StageChanged(stage)`.
    #[must_use]
    pub fn stage_changed(stage: Stage) -> Self {
        Self::new(SaleEventKind::StageChanged { stage })
    }

    /// `TokensPurchased(purchase)`.
    #[must_use]
    pub fn tokens_purchased(purchase: Purchase) -> Self {
        Self::new(SaleEventKind::TokensPurchased { purchase })
    }

    /// `FundsWithdrawn(to, amount, aux)`.
    #[must_use]
    pub fn funds_withdrawn(to: Address, amount: U256, aux: u64) -> Self {
        Self::new(SaleEventKind::FundsWithdrawn { to, amount, aux })
    }

    /// Topic this event is published on.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self.kind {
            SaleEventKind::StageChanged { .. } => topics::STAGE_CHANGED,
            SaleEventKind::TokensPurchased { .. } => topics::TOKENS_PURCHASED,
            SaleEventKind::FundsWithdrawn { .. } => topics::FUNDS_WITHDRAWN,
        }
    }
}
