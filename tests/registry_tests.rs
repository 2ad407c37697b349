// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resource and tool behavior against a mocked WHOOP API.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use whoop_mcp::error::{AppError, AuthError};
use whoop_mcp::mcp::protocol::ToolContent;
use whoop_mcp::models::Endpoint;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{test_registry, valid_tokens};

fn cycle_payload() -> Value {
    json!({
        "records": [{"id": 93845, "score": {"strain": 5.2}}],
        "next_token": null
    })
}

async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", "Bearer valid_access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn tool_text(content: &[ToolContent]) -> &str {
    match content {
        [ToolContent::Text { text }] => text,
        other => panic!("expected one text item, got {:?}", other),
    }
}

#[tokio::test]
async fn test_listing_matches_endpoint_table() {
    let server = MockServer::start().await;
    let registry = test_registry(&server, None);

    let uris: Vec<String> = registry
        .list_resources()
        .into_iter()
        .map(|r| r.uri)
        .collect();
    assert_eq!(
        uris,
        [
            "whoop://cycle",
            "whoop://recovery",
            "whoop://sleep",
            "whoop://workout",
            "whoop://body_measurement",
            "whoop://profile"
        ]
    );

    let tools: Vec<String> = registry.list_tools().into_iter().map(|t| t.name).collect();
    assert_eq!(
        tools,
        [
            "get_cycle",
            "get_recovery",
            "get_sleep",
            "get_workout",
            "get_personal_info"
        ]
    );

    for endpoint in Endpoint::ALL {
        let tool = format!("get_{}", endpoint.name());
        assert_eq!(tools.contains(&tool), endpoint.requires_date_range());
    }
}

#[tokio::test]
async fn test_tool_schema_requires_both_dates() {
    let server = MockServer::start().await;
    let registry = test_registry(&server, None);

    let tool = registry
        .list_tools()
        .into_iter()
        .find(|t| t.name == "get_sleep")
        .unwrap();
    assert_eq!(tool.input_schema["required"], json!(["startDate", "endDate"]));
    assert_eq!(tool.input_schema["properties"]["startDate"]["type"], "string");
}

#[tokio::test]
async fn test_resource_defaults_to_last_seven_days() {
    let server = MockServer::start().await;
    mount_json(&server, "/v1/cycle", cycle_payload()).await;
    let registry = test_registry(&server, Some(valid_tokens()));

    let result = registry.read_resource("whoop://cycle").await.unwrap();

    assert_eq!(result.contents.len(), 1);
    assert_eq!(result.contents[0].uri, "whoop://cycle");
    assert_eq!(
        result.contents[0].text,
        serde_json::to_string_pretty(&cycle_payload()).unwrap()
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let params: Vec<(String, String)> = requests[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(params[0].0, "start");
    assert_eq!(params[1].0, "end");

    let start: DateTime<Utc> = params[0].1.parse().unwrap();
    let end: DateTime<Utc> = params[1].1.parse().unwrap();
    assert_eq!(end - start, Duration::days(7));
    assert!((Utc::now() - end).num_seconds().abs() < 5);
}

#[tokio::test]
async fn test_resource_without_date_range_sends_no_query() {
    let server = MockServer::start().await;
    let profile = json!({"user_id": 1, "email": "a@b.com", "first_name": "A", "last_name": "B"});
    mount_json(&server, "/v1/user/profile/basic", profile.clone()).await;
    let registry = test_registry(&server, Some(valid_tokens()));

    let result = registry.read_resource("whoop://profile").await.unwrap();

    let text: Value = serde_json::from_str(&result.contents[0].text).unwrap();
    assert_eq!(text, profile);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_tool_passes_dates_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/cycle"))
        .and(query_param("start", "2024-03-14"))
        .and(query_param("end", "2024-03-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cycle_payload()))
        .expect(1)
        .mount(&server)
        .await;
    let registry = test_registry(&server, Some(valid_tokens()));

    let result = registry
        .call_tool(
            "get_cycle",
            json!({"startDate": "2024-03-14", "endDate": "2024-03-15"}),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, None);
    assert_eq!(
        tool_text(&result.content),
        serde_json::to_string_pretty(&cycle_payload()).unwrap()
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("start=2024-03-14&end=2024-03-15"));
}

#[tokio::test]
async fn test_tool_rejects_missing_dates() {
    let server = MockServer::start().await;
    let registry = test_registry(&server, Some(valid_tokens()));

    let err = registry
        .call_tool("get_recovery", json!({"startDate": "2024-03-14"}))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = registry
        .call_tool("get_recovery", json!({"startDate": 1, "endDate": 2}))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_names() {
    let server = MockServer::start().await;
    let registry = test_registry(&server, Some(valid_tokens()));

    let err = registry.call_tool("get_profile", json!({})).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = registry.call_tool("whoop://cycle", json!({})).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = registry.read_resource("whoop://nope").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = registry.read_resource("get_cycle").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_upstream_status_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/activity/sleep"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let registry = test_registry(&server, Some(valid_tokens()));

    let err = registry
        .call_tool(
            "get_sleep",
            json!({"startDate": "2024-03-14", "endDate": "2024-03-15"}),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Upstream(_)));
    assert_eq!(err.to_string(), "failed to fetch /v1/activity/sleep: Not Found");
}

#[tokio::test]
async fn test_invalid_json_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/user/measurement/body"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;
    let registry = test_registry(&server, Some(valid_tokens()));

    let err = registry
        .read_resource("whoop://body_measurement")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "invalid JSON from /v1/user/measurement/body");
}

#[tokio::test]
async fn test_auth_failure_propagates_unchanged() {
    let server = MockServer::start().await;
    let registry = test_registry(&server, None);

    let err = registry.read_resource("whoop://workout").await.unwrap_err();

    assert!(matches!(err, AppError::Auth(AuthError::NotAuthenticated)));
    assert_eq!(err.to_string(), "not authenticated");
    assert!(server.received_requests().await.unwrap().is_empty());
}
