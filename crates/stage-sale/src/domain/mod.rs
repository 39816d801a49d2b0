//! # Domain Layer (Inner Hexagon)
//!
//! Pure sale logic: stages, pricing, supply counters, access control.
//! NO I/O, NO async.
//!
//! Dependencies point inward only: ports and adapters depend on this
//! module, never the reverse.

pub mod access;
pub mod entities;
pub mod invariants;
pub mod pricing;
pub mod services;
pub mod stage_controller;
pub mod value_objects;

pub use access::*;
pub use entities::*;
pub use invariants::*;
pub use pricing::*;
pub use services::*;
pub use stage_controller::*;
pub use value_objects::*;
