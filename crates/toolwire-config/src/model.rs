// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Toolwire.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::diagnostic::ConfigError;

/// Top-level Toolwire configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToolwireConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Invocation defaults shared by every backend.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Built-in tool settings.
    #[serde(default)]
    pub builtin: BuiltinConfig,

    /// MCP client settings and server table.
    #[serde(default)]
    pub mcp: McpConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Invocation defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Upper bound on any single routed call when the caller supplies none.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

impl ToolsConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

fn default_call_timeout_ms() -> u64 {
    60_000
}

/// Built-in tool configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BuiltinConfig {
    /// Sandboxed code execution tool.
    #[serde(default)]
    pub code_execution: CodeExecutionConfig,

    /// Web search tool.
    #[serde(default)]
    pub web_search: WebSearchConfig,
}

/// Code execution tool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CodeExecutionConfig {
    /// Wall-clock limit for one execution, in milliseconds.
    #[serde(default = "default_code_timeout_ms")]
    pub timeout_ms: u64,

    /// Interpreter used for `python`.
    #[serde(default = "default_python")]
    pub python: String,

    /// Interpreter used for `javascript`.
    #[serde(default = "default_node")]
    pub node: String,

    /// Interpreter used for `bash`.
    #[serde(default = "default_bash")]
    pub bash: String,

    /// Captured stdout/stderr beyond this many bytes is truncated.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
}

impl Default for CodeExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_code_timeout_ms(),
            python: default_python(),
            node: default_node(),
            bash: default_bash(),
            max_output_bytes: default_max_output_bytes(),
        }
    }
}

impl CodeExecutionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_code_timeout_ms() -> u64 {
    30_000
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_node() -> String {
    "node".to_string()
}

fn default_bash() -> String {
    "bash".to_string()
}

fn default_max_output_bytes() -> usize {
    50 * 1024
}

/// Web search tool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebSearchConfig {
    /// JSON search endpoint (DuckDuckGo Instant Answer API compatible).
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,

    /// Results returned when the caller does not ask for a count.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            timeout_secs: default_search_timeout_secs(),
            max_results: default_max_results(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://api.duckduckgo.com/".to_string()
}

fn default_search_timeout_secs() -> u64 {
    15
}

fn default_max_results() -> usize {
    5
}

/// MCP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct McpConfig {
    /// Bound on connecting to one server and listing its tools.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Default bound on one remote tool call.
    #[serde(default = "default_mcp_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Servers connected by the operator CLI, keyed by server name.
    #[serde(default)]
    pub servers: BTreeMap<String, McpServerEntry>,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            call_timeout_secs: default_mcp_call_timeout_secs(),
            servers: BTreeMap::new(),
        }
    }
}

impl McpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_mcp_call_timeout_secs() -> u64 {
    60
}

/// Network transport flavor for an HTTP MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum TransportKind {
    #[serde(rename = "streamable-http", alias = "http", alias = "streamableHttp")]
    StreamableHttp,
    #[serde(rename = "sse")]
    Sse,
}

/// One entry of an MCP server table, exactly as the caller wrote it.
///
/// Carries both transport shapes so that mixed or empty entries can be
/// reported by [`McpServerEntry::transport_config`] instead of failing
/// deserialization with an opaque message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct McpServerEntry {
    /// Executable for a local-process server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Endpoint for a network server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "transportKind",
        alias = "type"
    )]
    pub transport: Option<TransportKind>,
}

/// A validated transport for one MCP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpTransportConfig {
    Stdio {
        command: String,
        args: Vec<String>,
        env: BTreeMap<String, String>,
    },
    Http {
        url: String,
        headers: BTreeMap<String, String>,
        kind: TransportKind,
    },
}

impl McpTransportConfig {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stdio { .. } => "stdio",
            Self::Http {
                kind: TransportKind::StreamableHttp,
                ..
            } => "streamable-http",
            Self::Http {
                kind: TransportKind::Sse,
                ..
            } => "sse",
        }
    }
}

impl McpServerEntry {
    /// Builds a local-process entry.
    pub fn stdio(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: Some(command.into()),
            args,
            ..Self::default()
        }
    }

    /// Builds a streamable HTTP entry.
    pub fn http(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            transport: Some(TransportKind::StreamableHttp),
            ..Self::default()
        }
    }

    fn has_stdio_fields(&self) -> bool {
        self.command.is_some() || !self.args.is_empty() || !self.env.is_empty()
    }

    fn has_http_fields(&self) -> bool {
        self.url.is_some() || !self.headers.is_empty() || self.transport.is_some()
    }

    /// Resolves the entry to exactly one transport.
    ///
    /// Fails when the entry mixes stdio and HTTP fields, carries neither, or
    /// omits the field its transport needs (`command` or `url`).
    pub fn transport_config(&self, server: &str) -> Result<McpTransportConfig, ConfigError> {
        match (self.has_stdio_fields(), self.has_http_fields()) {
            (true, true) => Err(ConfigError::Validation {
                message: format!(
                    "mcp server `{server}` mixes stdio fields (command/args/env) with HTTP fields (url/headers/transport)"
                ),
            }),
            (false, false) => Err(ConfigError::Validation {
                message: format!(
                    "mcp server `{server}` needs either `command` (stdio) or `url` (HTTP)"
                ),
            }),
            (true, false) => {
                let command = self
                    .command
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| ConfigError::Validation {
                        message: format!("mcp server `{server}` has args/env but no `command`"),
                    })?;
                Ok(McpTransportConfig::Stdio {
                    command: command.to_string(),
                    args: self.args.clone(),
                    env: self.env.clone(),
                })
            }
            (false, true) => {
                let url = self
                    .url
                    .as_deref()
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .ok_or_else(|| ConfigError::Validation {
                        message: format!("mcp server `{server}` has HTTP fields but no `url`"),
                    })?;
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::Validation {
                        message: format!("mcp server `{server}` url `{url}` must be http or https"),
                    });
                }
                Ok(McpTransportConfig::Http {
                    url: url.to_string(),
                    headers: self.headers.clone(),
                    kind: self.transport.unwrap_or(TransportKind::StreamableHttp),
                })
            }
        }
    }
}
