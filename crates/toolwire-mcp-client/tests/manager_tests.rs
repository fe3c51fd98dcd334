// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection manager behavior against fake MCP servers.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde_json::json;
use tokio_util::sync::CancellationToken;
use toolwire_config::McpServerEntry;
use toolwire_core::{CallOptions, ToolwireError};
use toolwire_mcp_client::{ConnectionState, McpCallResult, McpContent, McpManager};
use toolwire_test_utils::{FakeConnector, FakeServer};
use tracing_test::traced_test;

fn block(names: &[&str]) -> BTreeMap<String, McpServerEntry> {
    names
        .iter()
        .map(|name| (name.to_string(), McpServerEntry::stdio(format!("fake-{name}"), vec![])))
        .collect()
}

fn manager(connector: &FakeConnector) -> McpManager {
    McpManager::new(connector.as_connector())
        .with_timeouts(Duration::from_secs(5), Duration::from_secs(5))
}

async fn two_servers() -> FakeConnector {
    let connector = FakeConnector::new();
    connector
        .add_server(
            "alpha",
            FakeServer::new()
                .tool("read_file", "Read a file")
                .tool("search", "Search in alpha"),
        )
        .await;
    connector
        .add_server("beta", FakeServer::new().tool("weather", "Current weather"))
        .await;
    connector
}

#[tokio::test]
async fn initialize_lists_tools_in_server_order() {
    let connector = two_servers().await;
    let manager = manager(&connector);

    let report = manager.initialize(&block(&["beta", "alpha"])).await.unwrap();
    assert!(report.all_connected());
    assert_eq!(report.connected, vec!["alpha", "beta"]);
    assert!(manager.is_initialized().await);

    let names: Vec<String> = manager
        .get_tools_as_declarations()
        .await
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["read_file", "search", "weather"]);
    assert_eq!(manager.tool_owner("weather").await.as_deref(), Some("beta"));
}

#[tokio::test]
async fn one_unreachable_server_does_not_fail_initialize() {
    let connector = two_servers().await;
    connector
        .add_server("gamma", FakeServer::new().unreachable("connection refused"))
        .await;
    let manager = manager(&connector);

    let report = manager
        .initialize(&block(&["alpha", "beta", "gamma"]))
        .await
        .unwrap();
    assert_eq!(report.connected, vec!["alpha", "beta"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "gamma");

    let gamma = manager
        .connections()
        .await
        .into_iter()
        .find(|c| c.server == "gamma")
        .unwrap();
    assert!(matches!(gamma.state, ConnectionState::Failed(ref reason) if reason.contains("refused")));
    assert_eq!(manager.get_tools_as_declarations().await.len(), 3);
}

#[tokio::test]
async fn all_servers_down_still_initializes() {
    let connector = FakeConnector::new();
    connector
        .add_server("down", FakeServer::new().unreachable("no route"))
        .await;
    let manager = manager(&connector);

    let report = manager.initialize(&block(&["down"])).await.unwrap();
    assert!(report.connected.is_empty());
    assert!(manager.is_initialized().await);
    assert!(manager.get_tools_as_declarations().await.is_empty());
}

#[tokio::test]
async fn malformed_block_fails_before_connecting() {
    let connector = two_servers().await;
    let manager = manager(&connector);

    let mut servers = block(&["alpha"]);
    servers.insert(
        "mixed".into(),
        McpServerEntry {
            command: Some("npx".into()),
            url: Some("https://mcp.example.com".into()),
            ..McpServerEntry::default()
        },
    );
    servers.insert("empty".into(), McpServerEntry::default());

    let err = manager.initialize(&servers).await.unwrap_err();
    assert!(matches!(err, ToolwireError::Mcp { .. }));
    let message = err.to_string();
    assert!(message.contains("mixed"), "{message}");
    assert!(message.contains("empty"), "{message}");
    assert!(connector.connects().await.is_empty());
    assert!(!manager.is_initialized().await);
}

#[tokio::test]
async fn initialize_twice_requires_cleanup() {
    let connector = two_servers().await;
    let manager = manager(&connector);
    manager.initialize(&block(&["alpha"])).await.unwrap();

    let err = manager.initialize(&block(&["beta"])).await.unwrap_err();
    assert!(err.to_string().contains("cleanup first"), "{err}");

    manager.cleanup().await;
    assert!(!manager.is_initialized().await);
    assert_eq!(connector.closed().await, vec!["alpha"]);
    let states: Vec<ConnectionState> = manager
        .connections()
        .await
        .into_iter()
        .map(|c| c.state)
        .collect();
    assert_eq!(states, vec![ConnectionState::Disconnected]);

    manager.initialize(&block(&["beta"])).await.unwrap();
    assert!(manager.has_tool("weather").await);
    assert!(!manager.has_tool("read_file").await);
}

#[tokio::test]
async fn execute_before_initialize_is_an_error() {
    let connector = two_servers().await;
    let err = manager(&connector)
        .execute_tool("search", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolwireError::Mcp { .. }));
    assert!(err.to_string().contains("not initialized"));
}

#[tokio::test]
async fn unknown_tool_is_not_found() {
    let connector = two_servers().await;
    let manager = manager(&connector);
    manager.initialize(&block(&["alpha", "beta"])).await.unwrap();

    let err = manager.execute_tool("delete_everything", json!({})).await.unwrap_err();
    assert!(matches!(err, ToolwireError::ToolNotFound { .. }));
}

#[tokio::test]
#[traced_test]
async fn first_server_wins_on_duplicate_names() {
    let connector = two_servers().await;
    connector
        .add_server(
            "beta",
            FakeServer::new()
                .tool("search", "Search in beta")
                .reply("search", McpCallResult::text("from beta")),
        )
        .await;
    let manager = manager(&connector);
    manager.initialize(&block(&["alpha", "beta"])).await.unwrap();

    assert!(logs_contain("duplicate MCP tool name"));
    let out = manager
        .execute_tool("search", json!({"input": "rust"}))
        .await
        .unwrap();
    assert_eq!(out, json!("alpha:search"));

    let calls = connector.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].server, "alpha");
    assert_eq!(calls[0].arguments.as_ref().unwrap()["input"], "rust");
}

#[tokio::test]
async fn remote_error_flag_becomes_mcp_error() {
    let connector = FakeConnector::new();
    connector
        .add_server(
            "alpha",
            FakeServer::new()
                .tool("read_file", "Read a file")
                .reply("read_file", McpCallResult::error("permission denied")),
        )
        .await;
    let manager = manager(&connector);
    manager.initialize(&block(&["alpha"])).await.unwrap();

    let err = manager
        .execute_tool("read_file", json!({"input": "/etc/shadow"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolwireError::Mcp { ref server, .. } if server.as_deref() == Some("alpha")));
    assert!(err.to_string().contains("permission denied"));
}

#[tokio::test]
async fn mixed_content_is_flattened() {
    let connector = FakeConnector::new();
    connector
        .add_server(
            "alpha",
            FakeServer::new().tool("chart", "Draw a chart").reply(
                "chart",
                McpCallResult {
                    is_error: false,
                    content: vec![
                        McpContent::Text("rendered".into()),
                        McpContent::Image {
                            mime_type: "image/png".into(),
                        },
                    ],
                    structured: None,
                },
            ),
        )
        .await;
    let manager = manager(&connector);
    manager.initialize(&block(&["alpha"])).await.unwrap();

    let out = manager.execute_tool("chart", json!({})).await.unwrap();
    assert_eq!(out, json!("rendered\n[image: image/png]"));
}

#[tokio::test]
async fn caller_timeout_bounds_the_call() {
    let connector = FakeConnector::new();
    connector
        .add_server(
            "slow",
            FakeServer::new()
                .tool("crunch", "Takes a while")
                .call_delay(Duration::from_millis(500)),
        )
        .await;
    let manager = manager(&connector);
    manager.initialize(&block(&["slow"])).await.unwrap();

    let started = Instant::now();
    let err = manager
        .execute_tool_with(
            "crunch",
            json!({}),
            &CallOptions::with_timeout(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "{err}");
    assert!(started.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn cancellation_abandons_the_call() {
    let connector = FakeConnector::new();
    connector
        .add_server(
            "slow",
            FakeServer::new()
                .tool("crunch", "Takes a while")
                .call_delay(Duration::from_secs(5)),
        )
        .await;
    let manager = manager(&connector);
    manager.initialize(&block(&["slow"])).await.unwrap();

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = manager
        .execute_tool_with("crunch", json!({}), &CallOptions::default().cancel_on(token))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cancelled"), "{err}");
}

#[tokio::test]
async fn slow_connect_is_bounded_by_connect_timeout() {
    let connector = two_servers().await;
    connector
        .add_server(
            "sluggish",
            FakeServer::new()
                .tool("nap", "Never listed")
                .connect_delay(Duration::from_millis(500)),
        )
        .await;
    let manager = McpManager::new(connector.as_connector())
        .with_timeouts(Duration::from_millis(50), Duration::from_secs(5));

    let report = manager
        .initialize(&block(&["alpha", "sluggish"]))
        .await
        .unwrap();
    assert_eq!(report.connected, vec!["alpha"]);
    assert!(report.failed[0].1.contains("timed out"), "{:?}", report.failed);
    assert!(!manager.has_tool("nap").await);
}

#[tokio::test]
async fn non_object_arguments_are_rejected() {
    let connector = two_servers().await;
    let manager = manager(&connector);
    manager.initialize(&block(&["alpha"])).await.unwrap();

    let err = manager.execute_tool("search", json!("rust")).await.unwrap_err();
    assert!(matches!(err, ToolwireError::SchemaValidation { .. }));
    assert!(connector.calls().await.is_empty());
}
