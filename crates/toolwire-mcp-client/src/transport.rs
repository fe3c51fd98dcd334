// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport seam between the connection manager and an MCP client library.
//!
//! The manager only sees [`McpConnector`] and [`McpTransport`]; the rmcp
//! implementation lives in [`crate::rmcp_client`] and tests plug in fakes.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use toolwire_config::McpTransportConfig;
use toolwire_core::{ToolDeclaration, ToolwireError};

/// One part of a remote tool result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpContent {
    Text(String),
    Image { mime_type: String },
    Audio { mime_type: String },
    Resource { uri: String },
}

impl McpContent {
    /// Text parts verbatim; everything else as an opaque bracketed reference.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Image { mime_type } => format!("[image: {mime_type}]"),
            Self::Audio { mime_type } => format!("[audio: {mime_type}]"),
            Self::Resource { uri } => format!("[resource: {uri}]"),
        }
    }
}

/// Result of one remote tool call, independent of the client library.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct McpCallResult {
    /// The server flagged the call as failed.
    pub is_error: bool,
    pub content: Vec<McpContent>,
    /// Optional machine-readable payload alongside `content`.
    pub structured: Option<Value>,
}

impl McpCallResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            is_error: false,
            content: vec![McpContent::Text(text.into())],
            structured: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            content: vec![McpContent::Text(text.into())],
            structured: None,
        }
    }

    /// Concatenates the parts into the single string handed back to the model.
    ///
    /// A result carrying only structured content is rendered as JSON.
    pub fn flatten(&self) -> String {
        if self.content.is_empty()
            && let Some(structured) = &self.structured
        {
            return structured.to_string();
        }
        self.content
            .iter()
            .map(McpContent::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A live connection to one MCP server.
#[async_trait]
pub trait McpTransport: Send + Sync {
    /// Lists the server's tools as declarations.
    async fn list_tools(&self) -> Result<Vec<ToolDeclaration>, ToolwireError>;

    /// Calls one tool.
    async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<McpCallResult, ToolwireError>;

    /// Closes the connection. Calling it twice is harmless.
    async fn close(&self) -> Result<(), ToolwireError>;
}

/// Opens transports for validated server configurations.
#[async_trait]
pub trait McpConnector: Send + Sync {
    async fn connect(
        &self,
        server: &str,
        config: &McpTransportConfig,
    ) -> Result<Arc<dyn McpTransport>, ToolwireError>;
}
