//! # Stage Sale - Staged Fixed-Price Crowdsale Engine
//!
//! ## Purpose
//!
//! Sells a fixed supply of an 18-decimal sale token for an 18-decimal payment
//! token across operator-controlled stages. Each sale-active stage has a fixed
//! unit price; purchases pull payment from the buyer's pre-approved allowance
//! into the sale treasury and credit the purchased amount to a vesting
//! collaborator. The operator may withdraw accumulated payment at any time.
//!
//! ## Stages
//!
//! | Raw | Stage | Sale active | Default price |
//! |-----|-------|-------------|---------------|
//! | 0 | `None` | no | - |
//! | 1 | `Seed` | yes | 500 |
//! | 2 | `Stage2` | yes | 250 |
//! | 3 | `Stage3` | yes | 125 |
//! | 4 | `Stage4` | no | - |
//!
//! `cost = amount * price_scale / price`, truncated, with `price_scale = 10`
//! by default: 50 tokens cost 1, 2 and 4 payment tokens in stages 1, 2, 3.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | `remaining + sold == initial supply` | `domain/invariants.rs` - `check_supply_conservation()` |
//! | Priced stages are exactly the sale-active ones | `domain/invariants.rs` - `check_price_invariant()` |
//! | `withdrawn <= collected` (strict mode only) | `domain/invariants.rs` - `check_treasury_invariant()` |
//! | Only the operator changes stage or withdraws | `domain/access.rs` - `Operator::authorize()` |
//! | Operations are all-or-nothing | `service.rs` - single state mutex, staged commit |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | Payment token | `PaymentLedger` | Allowance, `transfer_from`, treasury payout |
//! | Vesting | `VestingRegistry` | Credit purchased sale tokens |
//! | Observers | `EventPublisher` | Stage, purchase, withdrawal notifications |
//!
//! ## Usage Example
//!
//! ```ignore
//! use stage_sale::prelude::*;
//!
//! let sale = create_test_service(operator, sale_address)?;
//! sale.ledger().mint(buyer, parse_units(10))?;
//! sale.ledger().approve(buyer, sale_address, parse_units(10))?;
//!
//! sale.set_stage(operator, 1).await?;
//! sale.buy_token(buyer, parse_units(50), 0).await?;
//! sale.withdraw(operator, parse_units(1), 0).await?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::access::Operator;
    pub use crate::domain::entities::{Purchase, SaleInfo, Stage};
    pub use crate::domain::pricing::{PricingTable, StageTerms};
    pub use crate::domain::stage_controller::{Quote, StageController};
    pub use crate::domain::value_objects::{format_units, one_token, parse_units, Address, U256};

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::CrowdsaleApi;
    pub use crate::ports::outbound::{EventPublisher, PaymentLedger, VestingRegistry};

    // Events
    pub use crate::events::{topics, SaleEvent, SaleEventKind};

    // Errors
    pub use crate::errors::{ConfigError, SaleError, TokenError, VestingError};

    // Config
    pub use crate::config::{SaleConfig, StagePriceConfig};

    // Adapters
    pub use crate::adapters::{InMemoryEventBus, InMemoryPaymentLedger, InMemoryVestingRegistry};

    // Service
    pub use crate::service::{
        create_in_memory_service, create_test_service, CrowdsaleService, InMemoryCrowdsale,
        ServiceConfig, ServiceStats,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name used in logs.
pub const SERVICE_NAME: &str = "stage-sale";

// =============================================================================
// TESTS
// =============================================================================
