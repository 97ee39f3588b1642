//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod output;
pub mod step;

use std::ffi::OsStr;

use anyhow::Result;
use clap::builder::{
    BoolishValueParser, EnumValueParser, PossibleValue, RangedU64ValueParser, StringValueParser,
    TypedValueParser,
};
use clap::{ArgAction, Parser};

use crate::api::retry::RetryProfile;
use crate::config::{defaults, urls};
use crate::core::config::{StepConfig, StepInputs};
use crate::error::RouterError;

/// Value parser that reads a blank value as `fallback`
///
/// CI runners export every declared step input, unset ones as empty strings.
pub struct BlankAs<P: TypedValueParser> {
    inner: P,
    fallback: P::Value,
}

impl<P: TypedValueParser> Clone for BlankAs<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

/// Wrap `inner` so blank values parse as `fallback`
pub fn blank_as<P: TypedValueParser>(inner: P, fallback: P::Value) -> BlankAs<P> {
    BlankAs { inner, fallback }
}

impl<P: TypedValueParser> TypedValueParser for BlankAs<P> {
    type Value = P::Value;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        if value.to_str().is_some_and(|v| v.trim().is_empty()) {
            return Ok(self.fallback.clone());
        }
        self.inner.parse_ref(cmd, arg, value)
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        self.inner.possible_values()
    }
}

/// Build router - start child builds on Bitrise and wait for them
///
/// Every input can also be given through the environment, the way CI step
/// inputs are passed. Blank values fall back to the defaults.
#[derive(Parser, Debug)]
#[command(name = "build-router")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Slug of the app the builds belong to
    #[arg(long, env = "BITRISE_APP_SLUG")]
    pub app_slug: Option<String>,

    /// Slug of the router build
    #[arg(long, env = "BITRISE_BUILD_SLUG")]
    pub build_slug: Option<String>,

    /// Number of the router build, defaults to the fetched build's number
    #[arg(long, env = "BITRISE_BUILD_NUMBER")]
    pub build_number: Option<String>,

    /// Personal access token
    #[arg(long, env = "access_token", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Newline separated workflows to start
    #[arg(long, env = "workflows", default_value = "")]
    pub workflows: String,

    /// Newline separated environment keys forwarded to every started build
    #[arg(long, env = "environment_key_list", default_value = "")]
    pub environment_key_list: String,

    /// Wait for the started builds to finish
    #[arg(
        long,
        env = "wait_for_builds",
        default_value = "false",
        value_parser = blank_as(BoolishValueParser::new(), false),
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub wait_for_builds: bool,

    /// Enable debug logging
    #[arg(
        short,
        long,
        env = "verbose",
        default_value = "false",
        value_parser = blank_as(BoolishValueParser::new(), false),
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub verbose: bool,

    /// API base URL
    #[arg(
        long,
        env = "BITRISE_API_BASE_URL",
        default_value = urls::API_BASE,
        value_parser = blank_as(StringValueParser::new(), urls::API_BASE.to_string())
    )]
    pub api_base_url: String,

    /// Retry profile for API requests
    #[arg(
        long,
        env = "retry_profile",
        default_value = "slow",
        value_parser = blank_as(EnumValueParser::<RetryProfile>::new(), RetryProfile::Slow)
    )]
    pub retry_profile: RetryProfile,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "request_timeout",
        default_value_t = defaults::REQUEST_TIMEOUT_SECS,
        value_parser = blank_as(RangedU64ValueParser::<u64>::new(), defaults::REQUEST_TIMEOUT_SECS)
    )]
    pub request_timeout_secs: u64,

    /// Pause between polling rounds in milliseconds
    #[arg(
        long,
        env = "poll_interval",
        default_value_t = defaults::POLL_INTERVAL_MS,
        value_parser = blank_as(RangedU64ValueParser::<u64>::new(), defaults::POLL_INTERVAL_MS)
    )]
    pub poll_interval_ms: u64,

    /// Builds fetched concurrently within one polling round
    #[arg(
        long,
        env = "poll_concurrency",
        default_value_t = defaults::POLL_CONCURRENCY,
        value_parser = blank_as(RangedU64ValueParser::<usize>::new(), defaults::POLL_CONCURRENCY)
    )]
    pub poll_concurrency: usize,

    /// Give up waiting after this many seconds, 0 waits forever
    #[arg(
        long,
        env = "wait_timeout",
        default_value_t = 0,
        value_parser = blank_as(RangedU64ValueParser::<u64>::new(), 0)
    )]
    pub wait_timeout_secs: u64,
}

impl Cli {
    /// Log level directive for the tracing subscriber
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }

    /// Raw step inputs
    pub fn inputs(&self) -> StepInputs {
        StepInputs {
            app_slug: self.app_slug.clone(),
            build_slug: self.build_slug.clone(),
            build_number: self.build_number.clone(),
            access_token: self.access_token.clone(),
            workflows: self.workflows.clone(),
            environment_key_list: self.environment_key_list.clone(),
            wait_for_builds: self.wait_for_builds,
            api_base_url: self.api_base_url.clone(),
            retry_profile: self.retry_profile,
            request_timeout_secs: self.request_timeout_secs,
            poll_interval_ms: self.poll_interval_ms,
            poll_concurrency: self.poll_concurrency,
            wait_timeout_secs: (self.wait_timeout_secs > 0).then_some(self.wait_timeout_secs),
        }
    }

    /// Execute the step
    pub async fn run(self) -> Result<()> {
        let config = StepConfig::from_inputs(self.inputs()).map_err(RouterError::from)?;
        step::execute(&config).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};

    /// Parse `args` with every environment fallback disabled
    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["build-router"];
        argv.extend_from_slice(args);
        let matches = Cli::command()
            .mut_args(|arg| arg.env(None::<&'static str>))
            .try_get_matches_from(argv)
            .unwrap();
        Cli::from_arg_matches(&matches).unwrap()
    }

    #[test]
    fn test_cli_flags() {
        let cli = parse(&[
            "--app-slug",
            "app",
            "--build-slug",
            "router",
            "--access-token",
            "token",
            "--workflows",
            "build-android\nbuild-ios",
            "--wait-for-builds",
            "yes",
            "--retry-profile",
            "fast",
            "--poll-interval-ms",
            "10",
            "--wait-timeout-secs",
            "600",
        ]);

        let inputs = cli.inputs();
        assert_eq!(inputs.app_slug.as_deref(), Some("app"));
        assert_eq!(inputs.build_slug.as_deref(), Some("router"));
        assert_eq!(inputs.workflows, "build-android\nbuild-ios");
        assert!(inputs.wait_for_builds);
        assert_eq!(inputs.retry_profile, RetryProfile::Fast);
        assert_eq!(inputs.poll_interval_ms, 10);
        assert_eq!(inputs.wait_timeout_secs, Some(600));
    }

    #[test]
    fn test_defaults() {
        let inputs = parse(&[]).inputs();
        assert!(!inputs.wait_for_builds);
        assert_eq!(inputs.api_base_url, urls::API_BASE);
        assert_eq!(inputs.retry_profile, RetryProfile::Slow);
        assert_eq!(inputs.request_timeout_secs, defaults::REQUEST_TIMEOUT_SECS);
        assert_eq!(inputs.poll_interval_ms, defaults::POLL_INTERVAL_MS);
        assert_eq!(inputs.poll_concurrency, defaults::POLL_CONCURRENCY);
        assert_eq!(inputs.wait_timeout_secs, None);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let cli = parse(&[
            "--wait-for-builds",
            "",
            "--verbose",
            " ",
            "--api-base-url",
            "",
            "--retry-profile",
            "",
            "--request-timeout-secs",
            "",
            "--poll-interval-ms",
            "",
            "--poll-concurrency",
            "",
            "--wait-timeout-secs",
            "",
        ]);

        assert!(!cli.verbose);
        let inputs = cli.inputs();
        assert!(!inputs.wait_for_builds);
        assert_eq!(inputs.api_base_url, "https://api.bitrise.io");
        assert_eq!(inputs.retry_profile, RetryProfile::Slow);
        assert_eq!(inputs.request_timeout_secs, 30);
        assert_eq!(inputs.poll_interval_ms, 3000);
        assert_eq!(inputs.poll_concurrency, 1);
        assert_eq!(inputs.wait_timeout_secs, None);
    }

    #[test]
    fn test_boolish_values() {
        for (value, expected) in [("yes", true), ("no", false), ("true", true), ("false", false)] {
            let cli = parse(&["--wait-for-builds", value]);
            assert_eq!(cli.wait_for_builds, expected, "value {value}");
        }
        assert!(parse(&["--verbose"]).verbose);
        assert!(!parse(&[]).verbose);
    }

    #[test]
    fn test_log_level() {
        assert_eq!(parse(&["--verbose", "yes"]).log_level(), tracing::Level::DEBUG);
        assert_eq!(parse(&["--verbose", "no"]).log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let parse_err = |args: &[&str]| {
            let mut argv = vec!["build-router"];
            argv.extend_from_slice(args);
            Cli::command()
                .mut_args(|arg| arg.env(None::<&'static str>))
                .try_get_matches_from(argv)
                .is_err()
        };
        assert!(parse_err(&["--retry-profile", "medium"]));
        assert!(parse_err(&["--wait-for-builds", "maybe"]));
        assert!(parse_err(&["--poll-interval-ms", "soon"]));
    }
}
