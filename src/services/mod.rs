//! Service implementations for the SparkPost API.

pub mod context;
pub mod transmissions;

pub use context::ApiContext;
pub use transmissions::{build_payload, TransmissionsService};
