// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Production transports backed by the `rmcp` client.
//!
//! Stdio servers are spawned as child processes; network servers use the
//! streamable HTTP transport. The legacy SSE transport is rejected when a
//! connection is attempted.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{CallToolRequestParams, CallToolResult, RawContent, ResourceContents};
use rmcp::service::{RoleClient, RunningService, ServiceExt};
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use rmcp::transport::{ConfigureCommandExt, StreamableHttpClientTransport, TokioChildProcess};
use rmcp::ClientHandler;
use serde_json::{Map, Value};
use tokio::process::Command;
use tokio::sync::RwLock;
use toolwire_config::{McpTransportConfig, TransportKind};
use toolwire_core::{empty_object_schema, ToolDeclaration, ToolwireError};
use tracing::{debug, warn};

use crate::transport::{McpCallResult, McpConnector, McpContent, McpTransport};

/// Client handler with no capabilities beyond the protocol defaults.
#[derive(Debug, Clone, Default)]
pub struct MinimalClientHandler;

impl ClientHandler for MinimalClientHandler {}

type Service = RunningService<RoleClient, MinimalClientHandler>;

/// Opens rmcp-backed connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct RmcpConnector;

#[async_trait]
impl McpConnector for RmcpConnector {
    async fn connect(
        &self,
        server: &str,
        config: &McpTransportConfig,
    ) -> Result<Arc<dyn McpTransport>, ToolwireError> {
        let service = match config {
            McpTransportConfig::Stdio { command, args, env } => {
                connect_stdio(server, command, args, env).await?
            }
            McpTransportConfig::Http {
                url,
                headers,
                kind: TransportKind::StreamableHttp,
            } => connect_http(server, url, headers).await?,
            McpTransportConfig::Http {
                kind: TransportKind::Sse,
                ..
            } => {
                return Err(ToolwireError::mcp(
                    server,
                    "the SSE transport is not supported; use streamable-http",
                ));
            }
        };
        debug!(server, transport = config.label(), "MCP session established");
        Ok(Arc::new(RmcpTransport::new(server, service)))
    }
}

async fn connect_stdio(
    server: &str,
    command: &str,
    args: &[String],
    env: &BTreeMap<String, String>,
) -> Result<Service, ToolwireError> {
    let args = args.to_vec();
    let env = env.clone();
    let transport = TokioChildProcess::new(Command::new(command).configure(move |cmd| {
        cmd.args(&args);
        for (key, value) in &env {
            cmd.env(key, value);
        }
    }))
    .map_err(|e| ToolwireError::Mcp {
        server: Some(server.to_string()),
        message: format!("failed to spawn `{command}`: {e}"),
        source: Some(Box::new(e)),
    })?;

    MinimalClientHandler
        .serve(transport)
        .await
        .map_err(|e| ToolwireError::Mcp {
            server: Some(server.to_string()),
            message: format!("failed to initialize MCP session: {e}"),
            source: Some(Box::new(e)),
        })
}

async fn connect_http(
    server: &str,
    url: &str,
    headers: &BTreeMap<String, String>,
) -> Result<Service, ToolwireError> {
    let mut config = StreamableHttpClientTransportConfig::with_uri(url.to_string());
    if let Some(token) = bearer_token(headers) {
        config = config.auth_header(token);
    }
    for name in headers.keys() {
        if !name.eq_ignore_ascii_case("authorization") {
            warn!(server, header = %name, "ignoring unsupported MCP header");
        }
    }

    let transport = StreamableHttpClientTransport::from_config(config);
    MinimalClientHandler
        .serve(transport)
        .await
        .map_err(|e| ToolwireError::Mcp {
            server: Some(server.to_string()),
            message: format!("failed to initialize MCP session: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Token from an `Authorization` header, with any `Bearer ` prefix removed.
fn bearer_token(headers: &BTreeMap<String, String>) -> Option<String> {
    let value = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
        .map(|(_, value)| value.trim())?;
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };
    (!token.is_empty()).then(|| token.to_string())
}

/// One live rmcp session.
pub struct RmcpTransport {
    server: String,
    service: RwLock<Option<Arc<Service>>>,
}

impl RmcpTransport {
    fn new(server: &str, service: Service) -> Self {
        Self {
            server: server.to_string(),
            service: RwLock::new(Some(Arc::new(service))),
        }
    }

    async fn service(&self) -> Result<Arc<Service>, ToolwireError> {
        self.service
            .read()
            .await
            .as_ref()
            .cloned()
            .ok_or_else(|| ToolwireError::mcp(&self.server, "connection is closed"))
    }
}

#[async_trait]
impl McpTransport for RmcpTransport {
    async fn list_tools(&self) -> Result<Vec<ToolDeclaration>, ToolwireError> {
        let service = self.service().await?;
        let tools = service
            .list_all_tools()
            .await
            .map_err(|e| ToolwireError::Mcp {
                server: Some(self.server.clone()),
                message: format!("failed to list tools: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(tools
            .into_iter()
            .map(|tool| {
                let parameters = if tool.input_schema.is_empty() {
                    empty_object_schema()
                } else {
                    Value::Object(tool.input_schema.as_ref().clone())
                };
                ToolDeclaration::new(
                    tool.name.to_string(),
                    tool.description.map(|d| d.to_string()).unwrap_or_default(),
                    parameters,
                )
            })
            .collect())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<McpCallResult, ToolwireError> {
        let service = self.service().await?;
        let result = service
            .call_tool(CallToolRequestParams {
                name: name.to_string().into(),
                arguments,
                task: None,
                meta: None,
            })
            .await
            .map_err(|e| ToolwireError::Mcp {
                server: Some(self.server.clone()),
                message: format!("call to `{name}` failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(convert_result(result))
    }

    async fn close(&self) -> Result<(), ToolwireError> {
        let Some(service) = self.service.write().await.take() else {
            return Ok(());
        };
        // In-flight calls hold their own clone and finish against the session.
        match Arc::try_unwrap(service) {
            Ok(service) => {
                service.cancel().await.map_err(|e| ToolwireError::Mcp {
                    server: Some(self.server.clone()),
                    message: format!("failed to close session: {e}"),
                    source: Some(Box::new(e)),
                })?;
            }
            Err(_) => debug!(server = %self.server, "session still in use, dropping handle"),
        }
        Ok(())
    }
}

fn convert_result(result: CallToolResult) -> McpCallResult {
    let content = result
        .content
        .into_iter()
        .map(|content| match content.raw {
            RawContent::Text(text) => McpContent::Text(text.text),
            RawContent::Image(image) => McpContent::Image {
                mime_type: image.mime_type,
            },
            RawContent::Audio(audio) => McpContent::Audio {
                mime_type: audio.mime_type,
            },
            RawContent::Resource(embedded) => match embedded.resource {
                ResourceContents::TextResourceContents { uri, .. }
                | ResourceContents::BlobResourceContents { uri, .. } => {
                    McpContent::Resource { uri }
                }
            },
            RawContent::ResourceLink(link) => McpContent::Resource { uri: link.uri },
        })
        .collect();

    McpCallResult {
        is_error: result.is_error.unwrap_or(false),
        content,
        structured: result.structured_content,
    }
}
