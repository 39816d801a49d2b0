//! # Pricing Table
//!
//! Pure mapping from stage to unit price and optional stage cap.
//!
//! A price is the number of sale-token units granted per `price_scale`
//! payment-token units, so the payment cost of `amount` sale-token base
//! units is `amount * price_scale / price`, truncated. With the default
//! scale of 10 and prices 500/250/125, fifty sale tokens cost one, two and
//! four payment tokens in stages 1, 2 and 3.

use crate::domain::entities::Stage;
use crate::domain::value_objects::U256;
use crate::errors::{ConfigError, SaleError};
use serde::{Deserialize, Serialize};

/// Seed stage price.
pub const SEED_PRICE: u64 = 500;
/// Stage 2 price.
pub const STAGE2_PRICE: u64 = 250;
/// Stage 3 price.
pub const STAGE3_PRICE: u64 = 125;
/// Default numerator of the cost formula.
pub const DEFAULT_PRICE_SCALE: u64 = 10;

/// Terms of one sale-active stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTerms {
    /// Unit price.
    pub price: u64,
    /// Optional limit on sale-token base units sold in this stage.
    pub cap: Option<U256>,
}

/// Validated stage → terms table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricingTable {
    /// Indexed by raw stage; only sale-active stages are populated.
    terms: [Option<StageTerms>; 5],
    price_scale: U256,
}

impl PricingTable {
    /// Builds a table from `(stage, terms)` entries.
    ///
    /// Every sale-active stage needs exactly one entry, prices must be
    /// non-zero and strictly decrease with the stage index.
    pub fn new(
        entries: impl IntoIterator<Item = (Stage, StageTerms)>,
        price_scale: u64,
    ) -> Result<Self, ConfigError> {
        if price_scale == 0 {
            return Err(ConfigError::ZeroPriceScale);
        }

        let mut terms: [Option<StageTerms>; 5] = [None; 5];
        for (stage, entry) in entries {
            if !stage.is_sale_active() {
                return Err(ConfigError::PriceOnInactiveStage(stage.index()));
            }
            if entry.price == 0 {
                return Err(ConfigError::ZeroPrice(stage.index()));
            }
            let slot = &mut terms[stage.index() as usize];
            if slot.is_some() {
                return Err(ConfigError::DuplicateStage(stage.index()));
            }
            *slot = Some(entry);
        }

        let mut previous: Option<u64> = None;
        for stage in Stage::SALE_ACTIVE {
            let entry = terms[stage.index() as usize]
                .ok_or(ConfigError::MissingStage(stage.index()))?;
            if let Some(previous) = previous {
                if entry.price >= previous {
                    return Err(ConfigError::PriceNotDecreasing {
                        stage: stage.index(),
                        price: entry.price,
                        previous,
                    });
                }
            }
            previous = Some(entry.price);
        }

        Ok(Self {
            terms,
            price_scale: U256::from(price_scale),
        })
    }

    /// Unit price of `stage`; `InvalidStage` for stages that carry no price.
    pub fn price_for(&self, stage: Stage) -> Result<u64, SaleError> {
        self.terms_for(stage).map(|t| t.price)
    }

    /// Stage cap, if any; `InvalidStage` for stages that carry no price.
    pub fn cap_for(&self, stage: Stage) -> Result<Option<U256>, SaleError> {
        self.terms_for(stage).map(|t| t.cap)
    }

    /// Numerator of the cost formula.
    #[must_use]
    pub fn price_scale(&self) -> U256 {
        self.price_scale
    }

    /// Payment cost of `amount` sale-token base units in `stage`, truncated.
    pub fn cost_of(&self, stage: Stage, amount: U256) -> Result<U256, SaleError> {
        let price = self.price_for(stage)?;
        crate::domain::services::compute_cost(amount, price, self.price_scale)
    }

    fn terms_for(&self, stage: Stage) -> Result<StageTerms, SaleError> {
        self.terms[stage.index() as usize].ok_or(SaleError::InvalidStage(stage.index()))
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            terms: [
                None,
                Some(StageTerms {
                    price: SEED_PRICE,
                    cap: None,
                }),
                Some(StageTerms {
                    price: STAGE2_PRICE,
                    cap: None,
                }),
                Some(StageTerms {
                    price: STAGE3_PRICE,
                    cap: None,
                }),
                None,
            ],
            price_scale: U256::from(DEFAULT_PRICE_SCALE),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
