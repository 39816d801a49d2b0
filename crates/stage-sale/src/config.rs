//! # Sale Configuration
//!
//! Deployment parameters of a sale, loadable from JSON.
//!
//! ```json
//! {
//!   "operator": "0x1111111111111111111111111111111111111111",
//!   "sale_address": "0x5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a",
//!   "supply_for_sale_tokens": 16000000,
//!   "price_scale": 10,
//!   "stages": [
//!     { "stage": 1, "price": 500 },
//!     { "stage": 2, "price": 250 },
//!     { "stage": 3, "price": 125, "cap_tokens": 4000000 }
//!   ]
//! }
//! ```

use crate::domain::entities::Stage;
use crate::domain::pricing::{
    PricingTable, StageTerms, DEFAULT_PRICE_SCALE, SEED_PRICE, STAGE2_PRICE, STAGE3_PRICE,
};
use crate::domain::value_objects::{parse_units, Address, U256};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Whole sale tokens offered over the sale lifetime by default.
pub const DEFAULT_SUPPLY_FOR_SALE_TOKENS: u64 = 16_000_000;

/// Price entry for one stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePriceConfig {
    /// Raw stage index (1-3).
    pub stage: u8,
    /// Unit price.
    pub price: u64,
    /// Optional cap on whole sale tokens sold in this stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap_tokens: Option<u64>,
}

/// Sale deployment parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleConfig {
    /// Operator; sole address allowed to change stage and withdraw.
    pub operator: Address,
    /// Address holding the treasury on the payment ledger.
    pub sale_address: Address,
    /// Payment token identity.
    pub payment_token: Address,
    /// Sale token identity.
    pub sale_token: Address,
    /// Whole sale tokens offered over the sale lifetime.
    pub supply_for_sale_tokens: u64,
    /// Numerator of the cost formula `amount * price_scale / price`.
    pub price_scale: u64,
    /// Price table.
    pub stages: Vec<StagePriceConfig>,
}

impl Default for SaleConfig {
    fn default() -> Self {
        Self {
            operator: Address::ZERO,
            sale_address: Address::ZERO,
            payment_token: Address::ZERO,
            sale_token: Address::ZERO,
            supply_for_sale_tokens: DEFAULT_SUPPLY_FOR_SALE_TOKENS,
            price_scale: DEFAULT_PRICE_SCALE,
            stages: vec![
                StagePriceConfig {
                    stage: Stage::Seed.index(),
                    price: SEED_PRICE,
                    cap_tokens: None,
                },
                StagePriceConfig {
                    stage: Stage::Stage2.index(),
                    price: STAGE2_PRICE,
                    cap_tokens: None,
                },
                StagePriceConfig {
                    stage: Stage::Stage3.index(),
                    price: STAGE3_PRICE,
                    cap_tokens: None,
                },
            ],
        }
    }
}

impl SaleConfig {
    /// Default table and supply with the given operator and sale address.
    #[must_use]
    pub fn new(operator: Address, sale_address: Address) -> Self {
        Self {
            operator,
            sale_address,
            ..Self::default()
        }
    }

    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Builds the validated pricing table.
    pub fn pricing_table(&self) -> Result<PricingTable, ConfigError> {
        let entries = self
            .stages
            .iter()
            .map(|entry| -> Result<(Stage, StageTerms), ConfigError> {
                let stage = Stage::try_from(entry.stage)?;
                Ok((
                    stage,
                    StageTerms {
                        price: entry.price,
                        cap: entry.cap_tokens.map(parse_units),
                    },
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        PricingTable::new(entries, self.price_scale)
    }

    /// Sale-token base units offered over the sale lifetime.
    #[must_use]
    pub fn supply_for_sale(&self) -> U256 {
        parse_units(self.supply_for_sale_tokens)
    }

    /// Checks addresses and the pricing table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.operator.is_zero() {
            return Err(ConfigError::ZeroAddress("operator"));
        }
        if self.sale_address.is_zero() {
            return Err(ConfigError::ZeroAddress("sale"));
        }
        self.pricing_table().map(|_| ())
    }
}

// =============================================================================
// TESTS
// =============================================================================
