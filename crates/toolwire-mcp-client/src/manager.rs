// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection manager for one block of MCP servers.
//!
//! Each server moves through Disconnected, Connecting and then Connected or
//! Failed. `initialize` connects to every server concurrently and never
//! fails because one server is down; it only fails on a malformed block or
//! when the manager is already initialized.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use toolwire_config::{validate_mcp_servers, McpConfig, McpServerEntry, McpTransportConfig};
use toolwire_core::{CallOptions, ToolDeclaration, ToolwireError};
use tracing::{debug, info, warn};

use crate::rmcp_client::RmcpConnector;
use crate::transport::{McpConnector, McpTransport};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Lifecycle of one server connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Connecting or listing tools failed; carries the reason.
    Failed(String),
}

/// Point-in-time view of one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpConnection {
    pub server: String,
    pub transport: &'static str,
    pub state: ConnectionState,
    pub tools: Vec<String>,
}

/// What `initialize` achieved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitializeReport {
    pub connected: Vec<String>,
    /// Server name and failure reason.
    pub failed: Vec<(String, String)>,
}

impl InitializeReport {
    pub fn all_connected(&self) -> bool {
        self.failed.is_empty()
    }
}

struct Connection {
    server: String,
    config: McpTransportConfig,
    state: ConnectionState,
    transport: Option<Arc<dyn McpTransport>>,
    tools: Vec<ToolDeclaration>,
}

impl Connection {
    fn declares(&self, tool: &str) -> bool {
        self.state == ConnectionState::Connected && self.tools.iter().any(|t| t.name == tool)
    }

    fn snapshot(&self) -> McpConnection {
        McpConnection {
            server: self.server.clone(),
            transport: self.config.label(),
            state: self.state.clone(),
            tools: self.tools.iter().map(|t| t.name.clone()).collect(),
        }
    }
}

#[derive(Default)]
struct ManagerState {
    initialized: bool,
    connections: Vec<Connection>,
}

/// Checks a server block without connecting to anything.
///
/// Every malformed entry is reported in one error.
pub fn validate_configuration(
    servers: &BTreeMap<String, McpServerEntry>,
) -> Result<Vec<(String, McpTransportConfig)>, ToolwireError> {
    let errors = validate_mcp_servers(servers.iter().map(|(name, entry)| (name.as_str(), entry)));
    if !errors.is_empty() {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ToolwireError::Mcp {
            server: None,
            message: format!("invalid server configuration: {message}"),
            source: None,
        });
    }

    servers
        .iter()
        .map(|(name, entry)| {
            entry
                .transport_config(name)
                .map(|config| (name.clone(), config))
                .map_err(|e| ToolwireError::mcp(name, e.to_string()))
        })
        .collect()
}

/// Owns the connections to one block of MCP servers.
pub struct McpManager {
    connector: Arc<dyn McpConnector>,
    connect_timeout: Duration,
    call_timeout: Duration,
    state: RwLock<ManagerState>,
    init_lock: Mutex<()>,
}

impl Default for McpManager {
    fn default() -> Self {
        Self::new(Arc::new(RmcpConnector))
    }
}

impl McpManager {
    pub fn new(connector: Arc<dyn McpConnector>) -> Self {
        Self {
            connector,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            state: RwLock::new(ManagerState::default()),
            init_lock: Mutex::new(()),
        }
    }

    /// Uses the timeouts from the `[mcp]` section.
    pub fn from_config(connector: Arc<dyn McpConnector>, config: &McpConfig) -> Self {
        Self::new(connector).with_timeouts(config.connect_timeout(), config.call_timeout())
    }

    pub fn with_timeouts(mut self, connect: Duration, call: Duration) -> Self {
        self.connect_timeout = connect;
        self.call_timeout = call;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Connects to every server in `servers`.
    ///
    /// Per-server failures are logged and reported, not returned. The
    /// manager counts as initialized afterwards even if nothing connected.
    pub async fn initialize(
        &self,
        servers: &BTreeMap<String, McpServerEntry>,
    ) -> Result<InitializeReport, ToolwireError> {
        let _init = self.init_lock.lock().await;
        if self.state.read().await.initialized {
            return Err(ToolwireError::Mcp {
                server: None,
                message: "manager is already initialized; call cleanup first".to_string(),
                source: None,
            });
        }

        let configs = validate_configuration(servers)?;

        {
            let mut state = self.state.write().await;
            state.connections = configs
                .iter()
                .map(|(server, config)| Connection {
                    server: server.clone(),
                    config: config.clone(),
                    state: ConnectionState::Connecting,
                    transport: None,
                    tools: Vec::new(),
                })
                .collect();
        }

        let attempts = configs
            .iter()
            .map(|(server, config)| self.connect_one(server, config));
        let outcomes = join_all(attempts).await;

        let mut report = InitializeReport::default();
        let mut state = self.state.write().await;
        for (connection, outcome) in state.connections.iter_mut().zip(outcomes) {
            match outcome {
                Ok((transport, tools)) => {
                    info!(
                        server = %connection.server,
                        tools = tools.len(),
                        "connected to MCP server"
                    );
                    connection.state = ConnectionState::Connected;
                    connection.transport = Some(transport);
                    connection.tools = tools;
                    report.connected.push(connection.server.clone());
                }
                Err(e) => {
                    warn!(server = %connection.server, error = %e, "MCP server unavailable");
                    connection.state = ConnectionState::Failed(e.to_string());
                    report.failed.push((connection.server.clone(), e.to_string()));
                }
            }
        }
        warn_on_duplicate_tools(&state.connections);
        state.initialized = true;
        Ok(report)
    }

    async fn connect_one(
        &self,
        server: &str,
        config: &McpTransportConfig,
    ) -> Result<(Arc<dyn McpTransport>, Vec<ToolDeclaration>), ToolwireError> {
        let attempt = async {
            debug!(server, transport = config.label(), "connecting to MCP server");
            let transport = self.connector.connect(server, config).await?;
            match transport.list_tools().await {
                Ok(tools) => Ok((transport, tools)),
                Err(e) => {
                    if let Err(close_err) = transport.close().await {
                        debug!(server, error = %close_err, "failed to close after listing error");
                    }
                    Err(e)
                }
            }
        };
        tokio::time::timeout(self.connect_timeout, attempt)
            .await
            .map_err(|_| {
                ToolwireError::mcp(
                    server,
                    format!("connection timed out after {:?}", self.connect_timeout),
                )
            })?
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.initialized
    }

    /// Tools of every connected server, in server order.
    pub async fn get_tools_as_declarations(&self) -> Vec<ToolDeclaration> {
        self.state
            .read()
            .await
            .connections
            .iter()
            .filter(|c| c.state == ConnectionState::Connected)
            .flat_map(|c| c.tools.iter().cloned())
            .collect()
    }

    pub async fn has_tool(&self, name: &str) -> bool {
        self.tool_owner(name).await.is_some()
    }

    /// The server that a call to `name` would be routed to.
    pub async fn tool_owner(&self, name: &str) -> Option<String> {
        self.state
            .read()
            .await
            .connections
            .iter()
            .find(|c| c.declares(name))
            .map(|c| c.server.clone())
    }

    pub async fn connections(&self) -> Vec<McpConnection> {
        self.state
            .read()
            .await
            .connections
            .iter()
            .map(Connection::snapshot)
            .collect()
    }

    /// Calls a remote tool with the default call timeout.
    pub async fn execute_tool(&self, name: &str, args: Value) -> Result<Value, ToolwireError> {
        self.execute_tool_with(name, args, &CallOptions::default())
            .await
    }

    /// Calls a remote tool and returns its flattened text.
    ///
    /// The first connected server declaring `name` serves the call. A result
    /// the server flags as an error becomes [`ToolwireError::Mcp`].
    pub async fn execute_tool_with(
        &self,
        name: &str,
        args: Value,
        options: &CallOptions,
    ) -> Result<Value, ToolwireError> {
        let (server, transport) = {
            let state = self.state.read().await;
            if !state.initialized {
                return Err(ToolwireError::Mcp {
                    server: None,
                    message: "manager is not initialized".to_string(),
                    source: None,
                });
            }
            state
                .connections
                .iter()
                .find(|c| c.declares(name))
                .and_then(|c| Some((c.server.clone(), Arc::clone(c.transport.as_ref()?))))
                .ok_or_else(|| ToolwireError::ToolNotFound {
                    name: name.to_string(),
                })?
        };

        let arguments = match args {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                return Err(ToolwireError::SchemaValidation {
                    tool: name.to_string(),
                    message: format!("arguments must be an object, got {other}"),
                });
            }
        };

        let limit = options.timeout.unwrap_or(self.call_timeout);
        debug!(server = %server, tool = name, timeout = ?limit, "calling MCP tool");
        let call = tokio::time::timeout(limit, transport.call_tool(name, arguments));
        let outcome = match &options.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => {
                    return Err(ToolwireError::mcp(&server, format!("call to `{name}` was cancelled")));
                }
                outcome = call => outcome,
            },
            None => call.await,
        };
        let result = outcome.map_err(|_| ToolwireError::Timeout {
            tool: name.to_string(),
            duration: limit,
        })??;

        let text = result.flatten();
        if result.is_error {
            return Err(ToolwireError::mcp(
                &server,
                format!("tool `{name}` reported an error: {text}"),
            ));
        }
        Ok(Value::String(text))
    }

    /// Closes every connection and returns to the uninitialized state.
    ///
    /// Servers stay listed as Disconnected until the next `initialize`.
    pub async fn cleanup(&self) {
        let _init = self.init_lock.lock().await;
        let transports: Vec<(String, Arc<dyn McpTransport>)> = {
            let mut state = self.state.write().await;
            state.initialized = false;
            state
                .connections
                .iter_mut()
                .filter_map(|c| {
                    c.state = ConnectionState::Disconnected;
                    c.tools.clear();
                    Some((c.server.clone(), c.transport.take()?))
                })
                .collect()
        };

        let closing = transports.into_iter().map(|(server, transport)| async move {
            if let Err(e) = transport.close().await {
                warn!(server = %server, error = %e, "failed to close MCP connection");
            }
        });
        join_all(closing).await;
        debug!("MCP manager cleaned up");
    }
}

fn warn_on_duplicate_tools(connections: &[Connection]) {
    let mut owners: HashMap<&str, &str> = HashMap::new();
    for connection in connections {
        if connection.state != ConnectionState::Connected {
            continue;
        }
        for tool in &connection.tools {
            if let Some(first) = owners.get(tool.name.as_str()) {
                warn!(
                    tool = %tool.name,
                    served_by = %first,
                    shadowed = %connection.server,
                    "duplicate MCP tool name; the first server wins"
                );
            } else {
                owners.insert(&tool.name, &connection.server);
            }
        }
    }
}

