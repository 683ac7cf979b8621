//! SparkPost Client Library
//!
//! An async Rust client for the SparkPost transmissions API.
//!
//! # Features
//!
//! - **Transmissions**: send, list and retrieve transmissions
//! - **CC/BCC expansion**: `cc` and `bcc` convenience lists are folded into
//!   the recipient list with the `header_to` and `CC` header SparkPost expects
//! - **Address parsing**: `"Name" <email>` strings are normalized to
//!   structured addresses before sending
//! - **Observability**: `tracing` spans and optional subscriber setup
//! - **Testability**: injectable transport and auth, with mocks included
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sparkpost_client::{Content, SendOptions, SparkPostClient, Transmission};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SparkPostClient::from_env()?;
//!
//!     let transmission = Transmission::builder()
//!         .recipient("\"Bob\" <bob@example.com>")
//!         .cc("\"Carol\" <carol@example.com>")
//!         .bcc("audit@example.com")
//!         .content(
//!             Content::new()
//!                 .with_from("sender@example.com")
//!                 .with_subject("Quarterly report")
//!                 .with_html("<p>See attached.</p>"),
//!         )
//!         .build();
//!
//!     let response = client
//!         .transmissions()
//!         .send(&transmission, &SendOptions::new().num_rcpt_errors(3))
//!         .await?;
//!
//!     println!(
//!         "{} accepted, {} rejected",
//!         response.results.total_accepted_recipients,
//!         response.results.total_rejected_recipients
//!     );
//!     Ok(())
//! }
//! ```
//!
//! # Inspecting the payload
//!
//! ```rust
//! use sparkpost_client::{build_payload, Transmission};
//!
//! let transmission = Transmission::builder()
//!     .recipient("\"Bob\" <bob@example.com>")
//!     .cc("carol@example.com")
//!     .build();
//!
//! let payload = serde_json::to_value(build_payload(&transmission)).unwrap();
//! assert_eq!(payload["content"]["headers"]["CC"], "carol@example.com");
//! assert_eq!(
//!     payload["recipients"][1]["address"]["header_to"],
//!     "\"Bob\" <bob@example.com>"
//! );
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod mocks;
pub mod observability;
pub mod services;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{SparkPostClient, SparkPostClientBuilder};
pub use config::SparkPostConfig;
pub use errors::{SparkPostError, SparkPostResult};
pub use services::{build_payload, TransmissionsService};

// Type re-exports
pub use types::address::{format_address, parse_address, Address, EmailAddress};
pub use types::transmission::{
    ApiResponse, Content, ListTransmissionsParams, Recipient, Recipients, RetrievedTransmission,
    SendOptions, SendResults, Transmission, TransmissionBuilder, TransmissionSummary,
};
