//! Step configuration
//!
//! Validates raw step inputs into a [`StepConfig`].

use std::time::Duration;

use crate::api::client::ApiClientConfig;
use crate::api::models::Environment;
use crate::api::retry::{RetryPolicy, RetryProfile};
use crate::config::{defaults, urls};
use crate::core::inputs;
use crate::core::orchestrator::WaitOptions;
use crate::error::ConfigError;

/// Raw step inputs, as read from flags or the environment
#[derive(Debug, Clone)]
pub struct StepInputs {
    pub app_slug: Option<String>,
    pub build_slug: Option<String>,
    pub build_number: Option<String>,
    pub access_token: Option<String>,
    pub workflows: String,
    pub environment_key_list: String,
    pub wait_for_builds: bool,
    pub api_base_url: String,
    pub retry_profile: RetryProfile,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub poll_concurrency: usize,
    pub wait_timeout_secs: Option<u64>,
}

impl Default for StepInputs {
    fn default() -> Self {
        Self {
            app_slug: None,
            build_slug: None,
            build_number: None,
            access_token: None,
            workflows: String::new(),
            environment_key_list: String::new(),
            wait_for_builds: false,
            api_base_url: urls::API_BASE.to_string(),
            retry_profile: RetryProfile::default(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            poll_interval_ms: defaults::POLL_INTERVAL_MS,
            poll_concurrency: defaults::POLL_CONCURRENCY,
            wait_timeout_secs: None,
        }
    }
}

/// Validated step configuration
#[derive(Debug, Clone)]
pub struct StepConfig {
    /// API client settings
    pub api: ApiClientConfig,
    /// Slug of the router build
    pub build_slug: String,
    /// Router build number override
    pub build_number: Option<String>,
    /// Workflows to start, in order
    pub workflows: Vec<String>,
    /// Environment keys forwarded to every child build
    pub environment_keys: Vec<String>,
    /// Whether to wait for the started builds
    pub wait_for_builds: bool,
    /// Polling settings
    pub wait: WaitOptions,
}

impl StepConfig {
    /// Validate raw inputs
    pub fn from_inputs(inputs: StepInputs) -> Result<Self, ConfigError> {
        let app_slug = required("app_slug", inputs.app_slug)?;
        let build_slug = required("build_slug", inputs.build_slug)?;
        let access_token = required("access_token", inputs.access_token)?;

        let api_base_url = inputs.api_base_url.trim().to_string();
        if api_base_url.is_empty() {
            return Err(ConfigError::Missing {
                name: "api_base_url".to_string(),
            });
        }
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                name: "api_base_url".to_string(),
                value: api_base_url,
                reason: "must be an http or https URL".to_string(),
            });
        }

        if inputs.poll_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                name: "poll_concurrency".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if inputs.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "request_timeout".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        let build_number = inputs
            .build_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let api = ApiClientConfig::new(app_slug, access_token)
            .with_base_url(api_base_url)
            .with_retry(RetryPolicy::from_profile(inputs.retry_profile))
            .with_request_timeout(Duration::from_secs(inputs.request_timeout_secs));

        Ok(Self {
            api,
            build_slug,
            build_number,
            workflows: inputs::parse_workflows(&inputs.workflows),
            environment_keys: inputs::parse_environment_keys(&inputs.environment_key_list),
            wait_for_builds: inputs.wait_for_builds,
            wait: WaitOptions {
                poll_interval: Duration::from_millis(inputs.poll_interval_ms),
                poll_concurrency: inputs.poll_concurrency,
                timeout: inputs.wait_timeout_secs.map(Duration::from_secs),
            },
        })
    }

    /// Forwarded environments resolved against the process environment
    pub fn forwarded_environments(&self) -> Vec<Environment> {
        inputs::environments_from_process(&self.environment_keys)
    }
}

fn required(name: &str, value: Option<String>) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::Missing {
            name: name.to_string(),
        })
}
