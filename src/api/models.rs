//! Wire models for the remote build API
//!
//! Request and response bodies plus the decoded build status.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::config::defaults;
use crate::error::ApiError;

/// Status of a remote build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStatus {
    /// Not finished yet
    Running,
    /// Finished successfully
    Succeeded,
    /// Finished with an error
    Failed,
    /// Aborted with failure
    Aborted,
    /// Aborted with success
    Cancelled,
}

impl BuildStatus {
    /// Decode a wire status code
    ///
    /// Returns `None` for codes the API is not known to send.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Running),
            1 => Some(Self::Succeeded),
            2 => Some(Self::Failed),
            3 => Some(Self::Aborted),
            4 => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Wire status code
    pub fn code(self) -> i64 {
        match self {
            Self::Running => 0,
            Self::Succeeded => 1,
            Self::Failed => 2,
            Self::Aborted => 3,
            Self::Cancelled => 4,
        }
    }

    /// Whether no further transition can occur
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Whether this terminal status fails the router build
    ///
    /// Anything other than `Succeeded` counts, `Cancelled` included.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Aborted | Self::Cancelled)
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::Succeeded => "successful",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A remote build record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    /// Build slug
    pub slug: String,
    /// Raw status code, see [`Build::status`]
    #[serde(rename = "status")]
    pub status_code: i64,
    /// Human readable status
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_text: String,
    /// Sequential build number within the app
    #[serde(default, deserialize_with = "null_as_default")]
    pub build_number: i64,
    /// Workflow the build runs
    #[serde(default, deserialize_with = "null_as_default")]
    pub triggered_workflow: String,
    /// Reason given when the build was aborted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_reason: Option<String>,
    /// Parameters the build was started with
    #[serde(default)]
    pub original_build_params: Value,
}

impl Build {
    /// Decoded status
    ///
    /// Unknown codes are reported and treated as still running.
    pub fn status(&self) -> BuildStatus {
        BuildStatus::from_code(self.status_code).unwrap_or_else(|| {
            tracing::warn!(
                slug = %self.slug,
                code = self.status_code,
                "Unexpected build status code, treating build as running"
            );
            BuildStatus::Running
        })
    }
}

/// Read an explicit `null` as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `GET .../builds/{slug}` response envelope
#[derive(Debug, Deserialize)]
pub(crate) struct BuildEnvelope {
    pub data: Build,
}

/// An environment variable handed to a child build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Variable name
    pub mapped_to: String,
    /// Variable value
    pub value: String,
    /// Whether the value is expanded on the remote side
    #[serde(default)]
    pub is_expand: bool,
}

impl Environment {
    /// Create an expanded environment entry
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            mapped_to: key.into(),
            value: value.into(),
            is_expand: true,
        }
    }
}

/// A request to start one child build
#[derive(Debug, Clone, PartialEq)]
pub struct StartRequest {
    workflow: String,
    build_params: Value,
    environments: Vec<Environment>,
}

impl StartRequest {
    /// Create a start request
    ///
    /// The workflow name is trimmed.
    pub fn new(workflow: &str, build_params: Value, environments: Vec<Environment>) -> Self {
        Self {
            workflow: workflow.trim().to_string(),
            build_params,
            environments,
        }
    }

    /// Workflow to start
    pub fn workflow(&self) -> &str {
        &self.workflow
    }

    /// Render the JSON body sent to the API
    ///
    /// The build params must be an object. `workflow_id` and
    /// `skip_git_status_report` are overwritten and the injected environments
    /// are appended after any the params already carry.
    pub fn to_body(&self) -> Result<Value, ApiError> {
        let mut params: Map<String, Value> = match &self.build_params {
            Value::Object(map) => map.clone(),
            other => {
                return Err(ApiError::InvalidBuildParams {
                    reason: format!("expected a JSON object, got {}", json_kind(other)),
                })
            }
        };

        params.insert("workflow_id".to_string(), Value::String(self.workflow.clone()));
        params.insert("skip_git_status_report".to_string(), Value::Bool(true));

        let injected = self
            .environments
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::InvalidBuildParams {
                reason: e.to_string(),
            })?;

        // Edited in place so the key keeps its position in the params
        let environments = params
            .entry("environments")
            .or_insert_with(|| Value::Array(Vec::new()));
        if environments.is_null() {
            *environments = Value::Array(Vec::new());
        }
        match environments {
            Value::Array(existing) => existing.extend(injected),
            other => {
                return Err(ApiError::InvalidBuildParams {
                    reason: format!("'environments' must be an array, got {}", json_kind(other)),
                })
            }
        }

        Ok(serde_json::json!({
            "hook_info": { "type": defaults::HOOK_TYPE },
            "build_params": Value::Object(params),
        }))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `POST .../builds` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartResponse {
    /// Request status, `ok` on success
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Human readable message
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Slug of the new build
    pub build_slug: String,
    /// Number of the new build
    #[serde(default, deserialize_with = "null_as_default")]
    pub build_number: i64,
    /// Web URL of the new build
    #[serde(default, deserialize_with = "null_as_default")]
    pub build_url: String,
    /// Workflow the new build runs
    #[serde(default, deserialize_with = "null_as_default")]
    pub triggered_workflow: String,
}
