// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory MCP servers for deterministic testing.
//!
//! `FakeConnector` implements `McpConnector` over a table of [`FakeServer`]s.
//! Replies are popped from a FIFO queue per tool; when the queue is empty a
//! default `"<server>:<tool>"` text reply is returned.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use toolwire_config::McpTransportConfig;
use toolwire_core::{ToolDeclaration, ToolwireError};
use toolwire_mcp_client::{McpCallResult, McpConnector, McpTransport};

/// Scripted behavior of one fake server.
#[derive(Debug, Clone, Default)]
pub struct FakeServer {
    tools: Vec<ToolDeclaration>,
    replies: HashMap<String, VecDeque<McpCallResult>>,
    connect_error: Option<String>,
    connect_delay: Duration,
    call_delay: Duration,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a tool taking a single optional string `input`.
    pub fn tool(self, name: &str, description: &str) -> Self {
        self.declaration(ToolDeclaration::new(
            name,
            description,
            json!({
                "type": "object",
                "properties": { "input": { "type": "string" } }
            }),
        ))
    }

    pub fn declaration(mut self, declaration: ToolDeclaration) -> Self {
        self.tools.push(declaration);
        self
    }

    /// Queues a reply for the next call to `tool`.
    pub fn reply(mut self, tool: &str, result: McpCallResult) -> Self {
        self.replies
            .entry(tool.to_string())
            .or_default()
            .push_back(result);
        self
    }

    /// Makes every connection attempt fail with `message`.
    pub fn unreachable(mut self, message: &str) -> Self {
        self.connect_error = Some(message.to_string());
        self
    }

    pub fn connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    pub fn call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }
}

/// One call observed by a fake transport.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeCall {
    pub server: String,
    pub tool: String,
    pub arguments: Option<Map<String, Value>>,
}

#[derive(Default)]
struct Shared {
    servers: Mutex<HashMap<String, FakeServer>>,
    connects: Mutex<Vec<String>>,
    calls: Mutex<Vec<FakeCall>>,
    closed: Mutex<Vec<String>>,
}

/// Connector over fake servers. Clones share their state.
#[derive(Clone, Default)]
pub struct FakeConnector {
    shared: Arc<Shared>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the server answering to `name`.
    pub async fn add_server(&self, name: &str, server: FakeServer) {
        self.shared
            .servers
            .lock()
            .await
            .insert(name.to_string(), server);
    }

    /// Server names in the order connections were attempted.
    pub async fn connects(&self) -> Vec<String> {
        self.shared.connects.lock().await.clone()
    }

    pub async fn calls(&self) -> Vec<FakeCall> {
        self.shared.calls.lock().await.clone()
    }

    /// Server names whose transport was closed.
    pub async fn closed(&self) -> Vec<String> {
        self.shared.closed.lock().await.clone()
    }

    pub fn as_connector(&self) -> Arc<dyn McpConnector> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl McpConnector for FakeConnector {
    async fn connect(
        &self,
        server: &str,
        _config: &McpTransportConfig,
    ) -> Result<Arc<dyn McpTransport>, ToolwireError> {
        self.shared.connects.lock().await.push(server.to_string());
        let spec = self
            .shared
            .servers
            .lock()
            .await
            .get(server)
            .cloned()
            .ok_or_else(|| ToolwireError::mcp(server, "no such fake server"))?;

        if !spec.connect_delay.is_zero() {
            tokio::time::sleep(spec.connect_delay).await;
        }
        if let Some(message) = &spec.connect_error {
            return Err(ToolwireError::mcp(server, message.clone()));
        }

        Ok(Arc::new(FakeTransport {
            server: server.to_string(),
            tools: spec.tools,
            replies: Mutex::new(spec.replies),
            call_delay: spec.call_delay,
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct FakeTransport {
    server: String,
    tools: Vec<ToolDeclaration>,
    replies: Mutex<HashMap<String, VecDeque<McpCallResult>>>,
    call_delay: Duration,
    shared: Arc<Shared>,
}

#[async_trait]
impl McpTransport for FakeTransport {
    async fn list_tools(&self) -> Result<Vec<ToolDeclaration>, ToolwireError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<McpCallResult, ToolwireError> {
        self.shared.calls.lock().await.push(FakeCall {
            server: self.server.clone(),
            tool: name.to_string(),
            arguments,
        });
        if !self.call_delay.is_zero() {
            tokio::time::sleep(self.call_delay).await;
        }
        let queued = self
            .replies
            .lock()
            .await
            .get_mut(name)
            .and_then(VecDeque::pop_front);
        Ok(queued.unwrap_or_else(|| McpCallResult::text(format!("{}:{name}", self.server))))
    }

    async fn close(&self) -> Result<(), ToolwireError> {
        self.shared.closed.lock().await.push(self.server.clone());
        Ok(())
    }
}
