//! Common test utilities and helpers
//!
//! This module provides shared mock API setup for integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use build_router::api::retry::RetryProfile;
use build_router::core::config::{StepConfig, StepInputs};

/// App slug used by every mock
pub const APP_SLUG: &str = "test-app";

/// Slug of the router build
pub const ROUTER_SLUG: &str = "router-build";

/// Access token expected by every mock
pub const ACCESS_TOKEN: &str = "test-token";

/// Build params of the router build
pub fn origin_params() -> Value {
    json!({
        "branch": "main",
        "commit_hash": "0123abcd",
        "workflow_id": "router",
        "environments": []
    })
}

/// `GET` response body for a build
pub fn build_body(slug: &str, workflow: &str, status: i64, status_text: &str) -> Value {
    json!({
        "data": {
            "slug": slug,
            "status": status,
            "status_text": status_text,
            "build_number": 100,
            "triggered_workflow": workflow,
            "original_build_params": origin_params()
        }
    })
}

/// Path of a single build
pub fn build_path(slug: &str) -> String {
    format!("/v0.1/apps/{APP_SLUG}/builds/{slug}")
}

/// Path builds are started on
pub fn builds_path() -> String {
    format!("/v0.1/apps/{APP_SLUG}/builds")
}

/// Serve the router build
pub async fn mount_origin(server: &MockServer, build_number: i64) {
    let mut body = build_body(ROUTER_SLUG, "router", 0, "in-progress");
    body["data"]["build_number"] = json!(build_number);
    Mock::given(method("GET"))
        .and(path(build_path(ROUTER_SLUG)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Answer the next start request with `slug`
pub async fn mount_start(server: &MockServer, slug: &str, workflow: &str) {
    Mock::given(method("POST"))
        .and(path(builds_path()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "status": "ok",
            "message": "webhook processed",
            "build_slug": slug,
            "build_number": 101,
            "build_url": format!("https://app.bitrise.io/build/{slug}"),
            "triggered_workflow": workflow
        })))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

/// Answer the next poll of `slug` with the given status
pub async fn mount_status(server: &MockServer, slug: &str, workflow: &str, status: i64, text: &str) {
    Mock::given(method("GET"))
        .and(path(build_path(slug)))
        .respond_with(ResponseTemplate::new(200).set_body_json(build_body(slug, workflow, status, text)))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

/// Step inputs pointing at the mock server
pub fn inputs(server: &MockServer, workflows: &str, wait: bool) -> StepInputs {
    StepInputs {
        app_slug: Some(APP_SLUG.to_string()),
        build_slug: Some(ROUTER_SLUG.to_string()),
        access_token: Some(ACCESS_TOKEN.to_string()),
        workflows: workflows.to_string(),
        wait_for_builds: wait,
        api_base_url: server.uri(),
        retry_profile: RetryProfile::Fast,
        poll_interval_ms: 10,
        ..StepInputs::default()
    }
}

/// Validated config pointing at the mock server
pub fn step_config(server: &MockServer, workflows: &str, wait: bool) -> StepConfig {
    StepConfig::from_inputs(inputs(server, workflows, wait)).expect("valid test inputs")
}

/// Request bodies of every start request, in arrival order
pub async fn start_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .map(|r| r.body_json().expect("JSON body"))
        .collect()
}
