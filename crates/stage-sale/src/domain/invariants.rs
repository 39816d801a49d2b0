//! # Domain Invariants
//!
//! Checks that must hold after every committed operation:
//!
//! - Supply conservation: `remaining + Σ sold == initial`
//! - Treasury: funds withdrawn never exceed funds collected
//! - Price is defined exactly for the sale-active stages

use crate::domain::entities::Stage;
use crate::domain::stage_controller::StageController;
use crate::domain::value_objects::U256;

/// Supply conservation. Also implies the remaining supply never went
/// negative, since counters are unsigned and checked.
#[must_use]
pub fn check_supply_conservation(ctl: &StageController) -> bool {
    ctl.remaining_supply()
        .checked_add(ctl.total_sold())
        .is_some_and(|total| total == ctl.initial_supply())
}

/// Withdrawn funds never exceed collected funds.
///
/// Only holds while the treasury is funded solely through purchases; direct
/// deposits to the sale address can legitimately be withdrawn on top.
#[must_use]
pub fn check_treasury_invariant(collected: U256, withdrawn: U256) -> bool {
    withdrawn <= collected
}

/// A stage carries a price iff it is sale-active.
#[must_use]
pub fn check_price_invariant(ctl: &StageController) -> bool {
    Stage::ALL
        .iter()
        .all(|&stage| ctl.table().price_for(stage).is_ok() == stage.is_sale_active())
}

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Remaining supply and sold counters do not add up.
    SupplyNotConserved {
        /// Initial supply.
        initial: U256,
        /// Remaining supply.
        remaining: U256,
        /// Sum of sold counters.
        sold: U256,
    },
    /// More withdrawn than collected.
    TreasuryOverdrawn {
        /// Collected total.
        collected: U256,
        /// Withdrawn total.
        withdrawn: U256,
    },
    /// Pricing table prices a stage that cannot sell, or vice versa.
    PriceTableInconsistent,
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(
    ctl: &StageController,
    collected: U256,
    withdrawn: U256,
    strict_treasury: bool,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_supply_conservation(ctl) {
        violations.push(InvariantViolation::SupplyNotConserved {
            initial: ctl.initial_supply(),
            remaining: ctl.remaining_supply(),
            sold: ctl.total_sold(),
        });
    }

    if strict_treasury && !check_treasury_invariant(collected, withdrawn) {
        violations.push(InvariantViolation::TreasuryOverdrawn {
            collected,
            withdrawn,
        });
    }

    if !check_price_invariant(ctl) {
        violations.push(InvariantViolation::PriceTableInconsistent);
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// TESTS
// =============================================================================
