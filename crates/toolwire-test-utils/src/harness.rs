// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for resolver-level integration testing.
//!
//! `TestHarness` assembles a registry, a resolver and a [`FakeConnector`]
//! so tests can drive declaration resolution and call routing end to end.

use std::time::Duration;

use toolwire_config::{BuiltinConfig, McpServerEntry};
use toolwire_core::ToolwireError;
use toolwire_resolver::{McpBlock, ToolEntry, ToolResolver};
use toolwire_tools::{BuiltinCatalog, SharedRegistry, Tool};

use crate::mock_mcp::{FakeConnector, FakeServer};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    tools: Vec<Box<dyn Tool>>,
    servers: Vec<(String, FakeServer)>,
    builtin: BuiltinConfig,
    call_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    mcp_call_timeout: Option<Duration>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            tools: Vec::new(),
            servers: Vec::new(),
            builtin: BuiltinConfig::default(),
            call_timeout: None,
            connect_timeout: None,
            mcp_call_timeout: None,
        }
    }

    /// Register a tool before the resolver is built.
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    /// Make a fake MCP server reachable under `name`.
    pub fn with_mcp_server(mut self, name: &str, server: FakeServer) -> Self {
        self.servers.push((name.to_string(), server));
        self
    }

    pub fn with_builtin_config(mut self, config: BuiltinConfig) -> Self {
        self.builtin = config;
        self
    }

    /// Default bound for calls that pass no timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Default bound for MCP calls that pass no timeout (whole seconds).
    pub fn with_mcp_call_timeout(mut self, timeout: Duration) -> Self {
        self.mcp_call_timeout = Some(timeout);
        self
    }

    /// Build the harness, registering every tool.
    pub async fn build(self) -> Result<TestHarness, ToolwireError> {
        let registry = SharedRegistry::new();
        for tool in self.tools {
            registry.register_arc(tool.into())?;
        }

        let connector = FakeConnector::new();
        let mut server_names = Vec::new();
        for (name, server) in self.servers {
            connector.add_server(&name, server).await;
            server_names.push(name);
        }

        let mut mcp = toolwire_config::McpConfig::default();
        if let Some(timeout) = self.connect_timeout {
            mcp.connect_timeout_secs = timeout.as_secs().max(1);
        }
        if let Some(timeout) = self.mcp_call_timeout {
            mcp.call_timeout_secs = timeout.as_secs().max(1);
        }

        let mut resolver = ToolResolver::new(registry.clone())
            .with_builtins(BuiltinCatalog::new(self.builtin))
            .with_connector(connector.as_connector())
            .with_mcp_config(mcp);
        if let Some(timeout) = self.call_timeout {
            resolver = resolver.with_call_timeout(timeout);
        }

        Ok(TestHarness {
            resolver,
            registry,
            connector,
            server_names,
        })
    }
}

/// A resolver wired to fake MCP servers.
pub struct TestHarness {
    pub resolver: ToolResolver,
    pub registry: SharedRegistry,
    pub connector: FakeConnector,
    server_names: Vec<String>,
}

impl TestHarness {
    /// Create a builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// An MCP block naming every fake server added to the builder.
    pub fn mcp_block(&self) -> McpBlock {
        self.server_names
            .iter()
            .fold(McpBlock::new(), |block, name| {
                block.server(name, McpServerEntry::stdio(format!("fake-{name}"), vec![]))
            })
    }

    /// The [`mcp_block`](Self::mcp_block) as a tool list entry.
    pub fn mcp_entry(&self) -> ToolEntry {
        ToolEntry::Mcp(self.mcp_block())
    }
}
