//! # Access Control
//!
//! Single-operator gate for stage changes and withdrawals. The operator is
//! fixed when the sale is built; there is no ownership transfer.

use crate::domain::value_objects::Address;
use crate::errors::SaleError;

/// The sole address authorized for administrative actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operator {
    address: Address,
}

impl Operator {
    /// Designates `address` as operator.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// Operator address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Fails `Unauthorized` unless `caller` is the operator.
    pub fn authorize(&self, caller: Address) -> Result<(), SaleError> {
        if caller == self.address {
            Ok(())
        } else {
            Err(SaleError::Unauthorized { caller })
        }
    }
}
