//! Infrastructure layer
//!
//! Side effects outside the remote build API: exporting values for later
//! CI steps.

pub mod envman;
