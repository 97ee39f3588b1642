//! Configuration constants
//!
//! Default URLs, intervals and well-known environment keys.

pub mod defaults;
pub mod urls;
