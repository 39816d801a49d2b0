//! # Stage Controller
//!
//! Owns the current stage, the sale-lifetime remaining supply and the
//! per-stage sold counters. Pure and synchronous; the service serializes
//! access to it.

use crate::domain::entities::Stage;
use crate::domain::pricing::PricingTable;
use crate::domain::services::checked_add;
use crate::domain::value_objects::U256;
use crate::errors::SaleError;

/// Priced, supply-checked purchase ready for settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quote {
    /// Stage the quote was taken in.
    pub stage: Stage,
    /// Unit price at that stage.
    pub price: u64,
    /// Sale-token base units.
    pub amount: U256,
    /// Payment-token base units.
    pub cost: U256,
}

/// Stage state machine and supply counters.
#[derive(Clone, Debug)]
pub struct StageController {
    table: PricingTable,
    current: Stage,
    initial_supply: U256,
    remaining: U256,
    /// Indexed by raw stage.
    sold: [U256; 5],
}

impl StageController {
    /// Starts in `Stage::None` with `supply` sale-token base units for sale.
    #[must_use]
    pub fn new(table: PricingTable, supply: U256) -> Self {
        Self {
            table,
            current: Stage::None,
            initial_supply: supply,
            remaining: supply,
            sold: [U256::zero(); 5],
        }
    }

    /// Current stage.
    #[must_use]
    pub fn current_stage(&self) -> Stage {
        self.current
    }

    /// Overwrites the current stage and returns the previous one.
    ///
    /// Transitions are unordered: any legal stage may follow any other,
    /// including itself.
    pub fn set_stage(&mut self, stage: Stage) -> Stage {
        std::mem::replace(&mut self.current, stage)
    }

    /// Unit price of the current stage; `SaleNotActive` outside stages 1-3.
    pub fn price(&self) -> Result<u64, SaleError> {
        if !self.current.is_sale_active() {
            return Err(SaleError::SaleNotActive);
        }
        self.table.price_for(self.current)
    }

    /// Sale-token base units still purchasable in the current stage: the
    /// remaining supply, further limited by the stage cap if one is set.
    pub fn available(&self) -> Result<U256, SaleError> {
        if !self.current.is_sale_active() {
            return Err(SaleError::SaleNotActive);
        }
        let headroom = match self.table.cap_for(self.current)? {
            Some(cap) => cap.saturating_sub(self.sold_in(self.current)),
            None => return Ok(self.remaining),
        };
        Ok(headroom.min(self.remaining))
    }

    /// Validates a purchase of `amount` against stage and supply and prices
    /// it. Does not mutate anything.
    ///
    /// Checks run in order: sale-active stage, supply, cost.
    pub fn quote(&self, amount: U256) -> Result<Quote, SaleError> {
        let price = self.price()?;
        let available = self.available()?;
        if amount > available {
            return Err(SaleError::SupplyExhausted {
                stage: self.current,
                requested: amount,
                available,
            });
        }
        let cost = self.table.cost_of(self.current, amount)?;
        Ok(Quote {
            stage: self.current,
            price,
            amount,
            cost,
        })
    }

    /// Applies a settled quote to the counters.
    ///
    /// Re-checks supply so a stale quote can never drive the counter
    /// negative; on error nothing changes.
    pub fn commit(&mut self, quote: &Quote) -> Result<(), SaleError> {
        if quote.stage != self.current {
            return Err(SaleError::SaleNotActive);
        }
        let available = self.available()?;
        if quote.amount > available {
            return Err(SaleError::SupplyExhausted {
                stage: quote.stage,
                requested: quote.amount,
                available,
            });
        }
        let slot = quote.stage.index() as usize;
        let sold = checked_add(self.sold[slot], quote.amount)?;
        self.remaining -= quote.amount;
        self.sold[slot] = sold;
        Ok(())
    }

    /// Sale-token base units still available over the sale lifetime.
    #[must_use]
    pub fn remaining_supply(&self) -> U256 {
        self.remaining
    }

    /// Supply at construction.
    #[must_use]
    pub fn initial_supply(&self) -> U256 {
        self.initial_supply
    }

    /// Sale-token base units sold in `stage`.
    #[must_use]
    pub fn sold_in(&self, stage: Stage) -> U256 {
        self.sold[stage.index() as usize]
    }

    /// Sold counters for the sale-active stages.
    #[must_use]
    pub fn sold_by_stage(&self) -> Vec<(Stage, U256)> {
        Stage::SALE_ACTIVE
            .iter()
            .map(|&stage| (stage, self.sold_in(stage)))
            .collect()
    }

    /// Sum of all sold counters.
    #[must_use]
    pub fn total_sold(&self) -> U256 {
        self.sold
            .iter()
            .fold(U256::zero(), |acc, sold| acc.saturating_add(*sold))
    }

    /// Pricing table in force.
    #[must_use]
    pub fn table(&self) -> &PricingTable {
        &self.table
    }
}

// =============================================================================
// TESTS
// =============================================================================
