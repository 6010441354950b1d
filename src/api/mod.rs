//! Client side of the image backend
//!
//! - [`HttpClient`]: JSON requests against the configured base URL
//! - [`errors`]: [`HttpError`] and the status-to-message mapping
//! - [`ImageApi`] / [`ApiClient`]: `/sources`, `/search` and `/ping`

pub mod client;
pub mod errors;
pub mod images;

pub use client::HttpClient;
pub use errors::{ErrorBody, HttpError, NETWORK_ERROR, UNEXPECTED_ERROR, message_for};
pub use images::{ApiClient, HealthStatus, ImageApi, SourceFilter};
