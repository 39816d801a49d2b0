//! # Ports Layer (Middle Hexagon)
//!
//! Interfaces between the sale domain and the outside world.
//!
//! - **Driving Ports (Inbound)**: `CrowdsaleApi`
//! - **Driven Ports (Outbound)**: `PaymentLedger`, `VestingRegistry`, `EventPublisher`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
