//! Type definitions for the SparkPost API.
//!
//! Address parsing lives in [`address`]; transmission requests, their
//! builder and the response envelopes live in [`transmission`].

pub mod address;
pub mod transmission;

pub use address::{format_address, parse_address, Address, EmailAddress};
pub use transmission::{
    ApiResponse, Content, ListTransmissionsParams, Recipient, Recipients, RetrievedTransmission,
    SendOptions, SendResults, Transmission, TransmissionBuilder, TransmissionSummary,
};
