// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Toolwire configuration system.

use std::time::Duration;

use toolwire_config::diagnostic::{suggest_key, ConfigError};
use toolwire_config::model::{McpTransportConfig, ToolwireConfig, TransportKind};
use toolwire_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_str, render_effective,
};

/// Every section deserializes from one realistic file.
#[test]
fn full_config_deserializes() {
    let toml = r#"
[logging]
level = "debug"

[tools]
call_timeout_ms = 10000

[builtin.code_execution]
timeout_ms = 5000
python = "/usr/bin/python3"
max_output_bytes = 4096

[builtin.web_search]
endpoint = "http://127.0.0.1:9999/"
max_results = 3

[mcp]
connect_timeout_secs = 5

[mcp.servers.fs]
command = "npx"
args = ["-y", "@modelcontextprotocol/server-filesystem", "/tmp"]
env = { NODE_ENV = "production" }

[mcp.servers.remote]
url = "https://mcp.example.com/mcp"
headers = { Authorization = "Bearer abc" }
transport = "streamable-http"
"#;

    let config = load_and_validate_str(toml).expect("valid config");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.tools.call_timeout(), Duration::from_secs(10));
    assert_eq!(config.builtin.code_execution.timeout(), Duration::from_secs(5));
    assert_eq!(config.builtin.code_execution.python, "/usr/bin/python3");
    assert_eq!(config.builtin.code_execution.node, "node");
    assert_eq!(config.builtin.web_search.max_results, 3);
    assert_eq!(config.mcp.connect_timeout(), Duration::from_secs(5));
    assert_eq!(config.mcp.call_timeout(), Duration::from_secs(60));

    let fs = config.mcp.servers["fs"].transport_config("fs").unwrap();
    match fs {
        McpTransportConfig::Stdio { command, args, env } => {
            assert_eq!(command, "npx");
            assert_eq!(args.len(), 3);
            assert_eq!(env["NODE_ENV"], "production");
        }
        other => panic!("expected stdio, got {other:?}"),
    }

    let remote = config.mcp.servers["remote"]
        .transport_config("remote")
        .unwrap();
    assert!(matches!(
        remote,
        McpTransportConfig::Http { kind: TransportKind::StreamableHttp, ref headers, .. }
            if headers["Authorization"] == "Bearer abc"
    ));
}

#[test]
fn empty_input_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults are valid");
    let defaults = ToolwireConfig::default();
    assert_eq!(config.logging.level, defaults.logging.level);
    assert_eq!(config.tools.call_timeout_ms, 60_000);
    assert_eq!(config.builtin.code_execution.timeout_ms, 30_000);
    assert_eq!(config.builtin.web_search.endpoint, "https://api.duckduckgo.com/");
    assert!(config.mcp.servers.is_empty());
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let err = load_config_from_str("[plugins]\nenabled = true\n").expect_err("unknown section");
    let err_str = err.to_string();
    assert!(
        err_str.contains("unknown field") || err_str.contains("plugins"),
        "got: {err_str}"
    );
}

#[test]
fn typo_in_code_execution_suggests_fix() {
    let toml = r#"
[builtin.code_execution]
timout_ms = 100
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "timout_ms"
                && suggestion.as_deref() == Some("timeout_ms")
                && valid_keys.contains("max_output_bytes")
        })
    });
    assert!(found, "expected UnknownKey for timout_ms, got: {errors:?}");
}

#[test]
fn typo_in_mcp_server_entry_suggests_command() {
    let toml = r#"
[mcp.servers.fs]
comand = "npx"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    assert!(
        errors.iter().any(|e| matches!(
            e,
            ConfigError::UnknownKey { key, suggestion, .. }
                if key == "comand" && suggestion.as_deref() == Some("command")
        )),
        "got: {errors:?}"
    );
}

#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[tools]
call_timeout_ms = "soon"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = err.to_string();
    assert!(
        err_str.contains("invalid type") || err_str.contains("call_timeout_ms"),
        "got: {err_str}"
    );
}

#[test]
fn mixed_mcp_entry_fails_validation() {
    let toml = r#"
[mcp.servers.both]
command = "node"
url = "https://mcp.example.com"
"#;

    let errors = load_and_validate_str(toml).expect_err("mixed entry");
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        ConfigError::Validation { message } if message.contains("`both`") && message.contains("mixes")
    ));
}

#[test]
fn sse_transport_is_accepted_by_config() {
    let toml = r#"
[mcp.servers.legacy]
url = "http://localhost:8080/sse"
type = "sse"
"#;

    let config = load_and_validate_str(toml).expect("sse is a valid config value");
    let transport = config.mcp.servers["legacy"]
        .transport_config("legacy")
        .unwrap();
    assert_eq!(transport.label(), "sse");
}

#[test]
fn explicit_path_loads_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("toolwire.toml");
    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

    let config = load_and_validate_path(&path).expect("valid file");
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn explicit_path_errors_carry_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("toolwire.toml");
    std::fs::write(&path, "[logging]\nlevle = \"warn\"\n").unwrap();

    let errors = load_and_validate_path(&path).expect_err("typo");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { key, suggestion, .. }
            if key == "levle" && suggestion.as_deref() == Some("level")
    )));
}

#[test]
fn suggestion_threshold() {
    assert_eq!(
        suggest_key("endpont", &["endpoint", "timeout_secs", "max_results"]),
        Some("endpoint".to_string())
    );
    assert!(suggest_key("qqqq", &["endpoint", "timeout_secs"]).is_none());
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "levle".to_string(),
        suggestion: Some("level".to_string()),
        valid_keys: "level".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some());
    let help = error.help().expect("help text").to_string();
    assert!(help.contains("did you mean `level`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("levle"));
}

/// The rendered effective config loads back to the same values.
#[test]
fn effective_config_renders_as_loadable_toml() {
    let config = load_and_validate_str(
        r#"
[tools]
call_timeout_ms = 1500

[mcp.servers.search]
url = "https://mcp.example.com/mcp"
headers = { Authorization = "Bearer t0ken" }
"#,
    )
    .expect("valid config");

    let rendered = render_effective(&config).expect("renders");
    assert!(rendered.contains("call_timeout_ms = 1500"));

    let reloaded = load_and_validate_str(&rendered).expect("reloads");
    assert_eq!(reloaded.tools.call_timeout_ms, 1500);
    assert_eq!(
        reloaded.mcp.servers["search"].headers["Authorization"],
        "Bearer t0ken"
    );
}
