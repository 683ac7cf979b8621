//! Observability for the SparkPost client.
//!
//! Spans are emitted through `tracing` by the transport and the service
//! methods. [`LoggingConfig`] installs a subscriber for applications that
//! don't configure one themselves.
//!
//! ```rust,no_run
//! use sparkpost_client::observability::{LogFormat, LoggingConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! LoggingConfig::new()
//!     .with_level(tracing::Level::DEBUG)
//!     .with_format(LogFormat::Json)
//!     .init()?;
//! # Ok(())
//! # }
//! ```

mod logging;

pub use logging::*;
