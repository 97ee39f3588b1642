//! Environment export
//!
//! Publishes values for later CI steps through the `envman` tool.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::RouterError;

/// Name of the export tool on `PATH`
pub const ENVMAN: &str = "envman";

/// `envman` wrapper
#[derive(Debug, Clone)]
pub struct EnvExporter {
    /// Path to the envman binary
    program: PathBuf,
}

impl EnvExporter {
    /// Create an exporter running the given program
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate `envman` on `PATH`
    pub fn detect() -> Option<Self> {
        which::which(ENVMAN).ok().map(Self::new)
    }

    /// Get the path to the export program
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Export `value` under `key`
    pub async fn export(&self, key: &str, value: &str) -> Result<(), RouterError> {
        tracing::debug!(key, program = %self.program.display(), "Exporting environment value");

        let output = Command::new(&self.program)
            .args(["add", "--key", key, "--value", value])
            .output()
            .await
            .map_err(|e| RouterError::Export {
                key: key.to_string(),
                error: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(RouterError::Export {
                key: key.to_string(),
                error: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(())
    }
}

/// Export `value` under `key` if `envman` is available
///
/// Returns whether the value was exported.
pub async fn export_if_available(key: &str, value: &str) -> Result<bool, RouterError> {
    let Some(exporter) = EnvExporter::detect() else {
        tracing::warn!(key, "{ENVMAN} not found on PATH, skipping export");
        return Ok(false);
    };
    exporter.export(key, value).await?;
    Ok(true)
}
