//! Core business logic module
//!
//! This module contains the router logic: input validation and the build
//! orchestrator. Remote calls go through [`crate::api`].
//!
//! # Submodules
//!
//! - [`config`] - Step input validation
//! - [`inputs`] - Workflow and environment-key list parsing
//! - [`orchestrator`] - Starting child builds and waiting for them

pub mod config;
pub mod inputs;
pub mod orchestrator;

pub use orchestrator::{FinishedBuild, Orchestrator, WaitOptions, WaitSummary};
