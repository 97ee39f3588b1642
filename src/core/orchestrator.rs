//! Build fan-out and fan-in
//!
//! Starts one child build per workflow from the router build's parameters,
//! then polls the started builds until every one of them is finished.

use std::collections::HashMap;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;

use crate::api::client::ApiClient;
use crate::api::models::{Build, BuildStatus, Environment, StartRequest, StartResponse};
use crate::config::defaults;
use crate::core::inputs;
use crate::error::RouterError;

/// Polling settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
    /// Sleep between two polling rounds
    pub poll_interval: Duration,
    /// Builds fetched concurrently within a round
    pub poll_concurrency: usize,
    /// Overall deadline, `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(defaults::POLL_INTERVAL_MS),
            poll_concurrency: defaults::POLL_CONCURRENCY,
            timeout: None,
        }
    }
}

/// A child build observed in a terminal status
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedBuild {
    /// Last fetched record
    pub build: Build,
    /// Decoded terminal status
    pub status: BuildStatus,
}

/// Outcome of waiting for a set of builds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaitSummary {
    /// Finished builds, in the order they were observed finishing
    pub finished: Vec<FinishedBuild>,
}

impl WaitSummary {
    /// Builds that finished unsuccessfully
    pub fn failed(&self) -> impl Iterator<Item = &FinishedBuild> {
        self.finished.iter().filter(|b| b.status.is_failure())
    }

    /// Whether every build succeeded
    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    /// Turn an unsuccessful summary into [`RouterError::BuildsFailed`]
    pub fn into_result(self) -> Result<Self, RouterError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(RouterError::BuildsFailed {
            failed: self.failed().map(|b| b.build.slug.clone()).collect(),
        })
    }
}

/// Drives one router run against the remote API
#[derive(Debug)]
pub struct Orchestrator<'a> {
    client: &'a ApiClient,
    options: WaitOptions,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator with default polling settings
    pub fn new(client: &'a ApiClient) -> Self {
        Self::with_options(client, WaitOptions::default())
    }

    /// Create an orchestrator with custom polling settings
    pub fn with_options(client: &'a ApiClient, options: WaitOptions) -> Self {
        Self { client, options }
    }

    /// Fetch the router build whose parameters are forwarded
    pub async fn fetch_origin(&self, build_slug: &str) -> Result<Build, RouterError> {
        self.client
            .get_build(build_slug)
            .await
            .map_err(|source| RouterError::OriginBuild {
                slug: build_slug.to_string(),
                source,
            })
    }

    /// Start one build per workflow, strictly in order
    ///
    /// Every child gets the origin's build params plus the source build
    /// number and `forwarded`. The first failure stops the run; builds
    /// already started are left running.
    pub async fn start_builds<F>(
        &self,
        workflows: &[String],
        origin: &Build,
        source_build_number: &str,
        forwarded: &[Environment],
        mut on_started: F,
    ) -> Result<Vec<String>, RouterError>
    where
        F: FnMut(&StartResponse),
    {
        let environments = inputs::injected_environments(source_build_number, forwarded);
        let mut slugs = Vec::with_capacity(workflows.len());

        for workflow in workflows {
            let request = StartRequest::new(
                workflow,
                origin.original_build_params.clone(),
                environments.clone(),
            );
            tracing::debug!(workflow = request.workflow(), "Starting build");

            let response = self.client.start_build(&request).await.map_err(|source| {
                RouterError::StartBuild {
                    workflow: request.workflow().to_string(),
                    source,
                }
            })?;

            on_started(&response);
            slugs.push(response.build_slug);
        }

        Ok(slugs)
    }

    /// Poll builds until all of them are finished
    ///
    /// `on_status_change` fires on the first observation of each build and
    /// afterwards whenever its status text changes. A finished build is
    /// dropped from the wait set after its callback fired. Any fetch error
    /// aborts the wait.
    pub async fn wait_for_completion<F>(
        &self,
        build_slugs: &[String],
        mut on_status_change: F,
    ) -> Result<WaitSummary, RouterError>
    where
        F: FnMut(&Build, BuildStatus),
    {
        let started_at = Instant::now();
        let concurrency = self.options.poll_concurrency.max(1);
        let mut pending: Vec<String> = build_slugs.to_vec();
        let mut last_status_text: HashMap<String, String> = HashMap::new();
        let mut summary = WaitSummary::default();
        let mut round: u64 = 0;

        while !pending.is_empty() {
            round += 1;
            tracing::debug!(round, pending = pending.len(), "Polling builds");

            let mut still_pending = Vec::with_capacity(pending.len());
            let mut fetches = stream::iter(&pending)
                .map(|slug| async move { (slug, self.client.get_build(slug).await) })
                .buffered(concurrency);

            while let Some((slug, result)) = fetches.next().await {
                let build = result.map_err(|source| RouterError::PollBuild {
                    slug: slug.clone(),
                    source,
                })?;
                let status = build.status();

                if last_status_text.get(slug) != Some(&build.status_text) {
                    on_status_change(&build, status);
                    last_status_text.insert(slug.clone(), build.status_text.clone());
                }

                if status.is_terminal() {
                    summary.finished.push(FinishedBuild { build, status });
                } else {
                    still_pending.push(slug.clone());
                }
            }
            drop(fetches);

            pending = still_pending;
            if pending.is_empty() {
                break;
            }

            if let Some(timeout) = self.options.timeout {
                if started_at.elapsed() >= timeout {
                    return Err(RouterError::WaitTimeout { pending });
                }
            }

            tokio::time::sleep(self.options.poll_interval).await;
        }

        Ok(summary)
    }
}
