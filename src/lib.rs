//! Build router - fan a CI build out into child builds
//!
//! This library starts one remote build per requested workflow from the
//! parameters of a router build, optionally waits for all of them, and
//! reports whether they all succeeded.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Business logic: input validation and build orchestration
//! - [`api`] - Remote build API client with retries
//! - [`infra`] - Infrastructure layer (environment export)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
