//! # Sale Telemetry
//!
//! Log output for the stage sale engine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sale_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_telemetry(TelemetryConfig::from_env())?;
//!     // Spans and events from stage-sale are now written out
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SALE_SERVICE_NAME` | `stage-sale` | Service name in the startup record |
//! | `SALE_LOG_LEVEL` / `RUST_LOG` | `info` | `EnvFilter` directive |
//! | `SALE_JSON_LOGS` | `false` (`true` in containers) | JSON records |
//! | `SALE_CONSOLE_OUTPUT` | `true` | Write records to stdout |

#![warn(missing_docs)]

mod config;
mod tracing_setup;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use tracing_setup::build_filter;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Global subscriber could not be installed (usually: already set).
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),

    /// Bad filter directive or other configuration problem.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize log output for the process.
///
/// Call once, early in `main`. A second call returns
/// [`TelemetryError::SubscriberInit`].
pub fn init_telemetry(config: TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_setup::init_tracing(&config)
}

/// Convenience macro for creating a span tagged with a sale identifier.
///
/// # Example
///
/// ```rust,ignore
/// use sale_telemetry::sale_span;
///
/// let _span = sale_span!("settle_round", sale = "presale-eu", round = 3).entered();
/// ```
#[macro_export]
macro_rules! sale_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
