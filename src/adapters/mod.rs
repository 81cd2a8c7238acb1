//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external systems:
//! - `http`: reqwest gateway to the prediction API
//! - `sanitize`: PII filtering for logs

pub mod http;
pub mod sanitize;

pub use http::HttpApiClient;
