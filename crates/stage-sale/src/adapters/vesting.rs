//! # Vesting Adapter
//!
//! In-memory vesting collaborator. Holds a pool of sale tokens funded before
//! the sale starts and records how much each buyer is owed.

use crate::domain::value_objects::{Address, U256};
use crate::errors::VestingError;
use crate::ports::outbound::VestingRegistry;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Pool {
    funded: U256,
    allocated: U256,
    credits: HashMap<Address, U256>,
}

/// In-memory vesting registry backed by a pre-funded pool.
#[derive(Debug, Default)]
pub struct InMemoryVestingRegistry {
    pool: RwLock<Pool>,
}

impl InMemoryVestingRegistry {
    /// Registry with `funded` sale-token base units available to allocate.
    #[must_use]
    pub fn with_funding(funded: U256) -> Self {
        Self {
            pool: RwLock::new(Pool {
                funded,
                ..Pool::default()
            }),
        }
    }

    /// Adds `amount` to the funded pool.
    pub fn fund(&self, amount: U256) {
        let mut pool = self.pool.write();
        pool.funded = pool.funded.saturating_add(amount);
    }

    /// Total credited to `beneficiary`.
    #[must_use]
    pub fn purchased(&self, beneficiary: Address) -> U256 {
        self.pool
            .read()
            .credits
            .get(&beneficiary)
            .copied()
            .unwrap_or_default()
    }

    /// Total credited across all beneficiaries.
    #[must_use]
    pub fn total_allocated(&self) -> U256 {
        self.pool.read().allocated
    }

    /// Funded amount not yet credited.
    #[must_use]
    pub fn unallocated(&self) -> U256 {
        let pool = self.pool.read();
        pool.funded.saturating_sub(pool.allocated)
    }
}

#[async_trait]
impl VestingRegistry for InMemoryVestingRegistry {
    async fn register_purchase(
        &self,
        beneficiary: Address,
        amount: U256,
    ) -> Result<(), VestingError> {
        if beneficiary.is_zero() {
            return Err(VestingError::ZeroBeneficiary);
        }
        let mut pool = self.pool.write();
        let unallocated = pool.funded.saturating_sub(pool.allocated);
        if amount > unallocated {
            return Err(VestingError::Underfunded {
                requested: amount,
                unallocated,
            });
        }
        pool.allocated += amount;
        let credit = pool.credits.entry(beneficiary).or_default();
        *credit += amount;
        Ok(())
    }

    async fn cancel_purchase(
        &self,
        beneficiary: Address,
        amount: U256,
    ) -> Result<(), VestingError> {
        let mut pool = self.pool.write();
        let credited = pool.credits.get(&beneficiary).copied().unwrap_or_default();
        if amount > credited {
            return Err(VestingError::NotCredited {
                requested: amount,
                credited,
            });
        }
        if credited == amount {
            pool.credits.remove(&beneficiary);
        } else {
            pool.credits.insert(beneficiary, credited - amount);
        }
        pool.allocated -= amount;
        Ok(())
    }
}
