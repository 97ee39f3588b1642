//! Output formatting
//!
//! This module provides utilities for displaying status lines and
//! formatted messages to the user.

use crate::api::models::{Build, BuildStatus, StartResponse};

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Line announcing a started build
pub fn started_line(response: &StartResponse) -> String {
    format!(
        "- {}({}) started",
        response.build_slug, response.triggered_workflow
    )
}

/// Line describing a build's new status
pub fn status_line(build: &Build, build_status: BuildStatus) -> String {
    let workflow = &build.triggered_workflow;
    match build_status {
        BuildStatus::Running => format!("- {workflow} {}", build.status_text),
        BuildStatus::Succeeded => format!("{} - {workflow} successful", status::SUCCESS),
        BuildStatus::Failed => format!("{} - {workflow} failed", status::ERROR),
        BuildStatus::Aborted => match &build.abort_reason {
            Some(reason) if !reason.is_empty() => {
                format!("{} - {workflow} aborted: {reason}", status::WARNING)
            }
            _ => format!("{} - {workflow} aborted", status::WARNING),
        },
        BuildStatus::Cancelled => format!("{} - {workflow} cancelled", status::INFO),
    }
}

/// Print a build's new status
pub fn report_status(build: &Build, build_status: BuildStatus) {
    println!("{}", status_line(build, build_status));
}

/// Print a successful step
pub fn done(message: &str) {
    println!("{} {message}", status::SUCCESS);
}

/// Lines describing an error and its cause chain
pub fn error_lines(error: &anyhow::Error) -> Vec<String> {
    let mut lines = vec![format!("{} {error}", status::ERROR)];
    lines.extend(error.chain().skip(1).map(|cause| format!("  caused by: {cause}")));
    lines
}

/// Print an error with its cause chain
pub fn display_error(error: &anyhow::Error) {
    for line in error_lines(error) {
        eprintln!("{line}");
    }
}
