//! Cross-component tests: service, adapters, config and telemetry together.

pub mod concurrency;
pub mod flows;
