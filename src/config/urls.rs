//! Remote build API URLs

/// Bitrise API base URL
pub const API_BASE: &str = "https://api.bitrise.io";

/// API version path segment
pub const API_VERSION: &str = "v0.1";
