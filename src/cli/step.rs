//! Router step implementation
//!
//! Fetches the router build, starts the child builds, exports their slugs
//! and optionally waits for them.

use crate::api::client::ApiClient;
use crate::cli::output;
use crate::config::defaults;
use crate::core::config::StepConfig;
use crate::core::orchestrator::Orchestrator;
use crate::error::RouterError;
use crate::infra::envman;

/// Execute the router step
///
/// Returns the slugs of the started builds.
pub async fn execute(config: &StepConfig) -> Result<Vec<String>, RouterError> {
    let client = ApiClient::new(config.api.clone());
    let orchestrator = Orchestrator::with_options(&client, config.wait.clone());

    let origin = orchestrator.fetch_origin(&config.build_slug).await?;
    let build_number = config
        .build_number
        .clone()
        .unwrap_or_else(|| origin.build_number.to_string());
    let forwarded = config.forwarded_environments();

    tracing::info!(
        workflows = config.workflows.len(),
        forwarded = forwarded.len(),
        build_number = %build_number,
        "Fetched router build"
    );

    println!("Starting builds:");
    let slugs = orchestrator
        .start_builds(
            &config.workflows,
            &origin,
            &build_number,
            &forwarded,
            |response| println!("{}", output::started_line(response)),
        )
        .await?;

    envman::export_if_available(defaults::STARTED_BUILDS_KEY, &slugs.join("\n")).await?;

    if !config.wait_for_builds {
        return Ok(slugs);
    }

    println!("Waiting for builds:");
    let summary = orchestrator
        .wait_for_completion(&slugs, output::report_status)
        .await?;
    output::done("all builds finished");

    summary.into_result()?;
    Ok(slugs)
}
