//! Remote build API client
//!
//! Talks to the Bitrise API: fetches build records and starts builds.

pub mod client;
pub mod models;
pub mod retry;

pub use client::{ApiClient, ApiClientConfig};
pub use models::{Build, BuildStatus, Environment, StartRequest, StartResponse};
pub use retry::{RetryPolicy, RetryProfile};
