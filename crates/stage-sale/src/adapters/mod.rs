//! # Adapters Layer (Outer Hexagon)
//!
//! In-memory implementations of the driven ports. A host embedding the
//! sale against a real ledger supplies its own adapters instead.

pub mod event_bus;
pub mod payment_ledger;
pub mod vesting;

pub use event_bus::*;
pub use payment_ledger::*;
pub use vesting::*;
