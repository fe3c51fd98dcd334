// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declaration resolution and call routing across every tool backend.
//!
//! Calls route to the first backend that knows the name: an MCP server of an
//! active manager, then the registry, then the built-in catalog. Failures
//! that happen while a tool runs come back as a failed [`CallResult`];
//! everything detected before that is returned as an error.
//!
//! A resolved list never mixes a local tool and an MCP tool of the same
//! name, so the declaration the model sees always belongs to the backend
//! the call is routed to.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::OnceCell;
use toolwire_config::{McpConfig, ToolwireConfig};
use toolwire_core::{
    validate_arguments, CallOptions, CallRequest, CallResult, ToolDeclaration, ToolSource,
    ToolwireError,
};
use toolwire_mcp_client::{McpConnector, McpManager, RmcpConnector};
use toolwire_tools::{BuiltinCatalog, RegistryEntry, SharedRegistry, ToolRegistry};
use tracing::{debug, info, warn};

use crate::entry::{McpBlock, ToolEntry};

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

enum Route {
    Mcp {
        server: String,
        manager: Arc<McpManager>,
    },
    Registry(RegistryEntry),
    Builtin,
}

/// Where a resolved declaration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Origin {
    Local,
    Mcp(String),
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => f.write_str("a local tool"),
            Self::Mcp(server) => write!(f, "MCP server `{server}`"),
        }
    }
}

/// Manager of one MCP block, set once its servers have been contacted.
type ManagerCell = Arc<OnceCell<Arc<McpManager>>>;

/// Turns tool lists into declarations and executes model-issued calls.
pub struct ToolResolver {
    registry: SharedRegistry,
    builtins: Arc<BuiltinCatalog>,
    connector: Arc<dyn McpConnector>,
    mcp_config: McpConfig,
    call_timeout: Duration,
    managers: Mutex<Vec<(McpBlock, ManagerCell)>>,
}

impl ToolResolver {
    /// Resolver over `registry` with default built-ins and the rmcp connector.
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            builtins: Arc::new(BuiltinCatalog::default()),
            connector: Arc::new(RmcpConnector),
            mcp_config: McpConfig::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            managers: Mutex::new(Vec::new()),
        }
    }

    /// Resolver configured from a loaded [`ToolwireConfig`].
    pub fn from_config(config: &ToolwireConfig, registry: SharedRegistry) -> Self {
        Self::new(registry)
            .with_builtins(BuiltinCatalog::new(config.builtin.clone()))
            .with_mcp_config(config.mcp.clone())
            .with_call_timeout(config.tools.call_timeout())
    }

    pub fn with_builtins(mut self, builtins: BuiltinCatalog) -> Self {
        self.builtins = Arc::new(builtins);
        self
    }

    pub fn with_connector(mut self, connector: Arc<dyn McpConnector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn with_mcp_config(mut self, config: McpConfig) -> Self {
        self.mcp_config = config;
        self
    }

    /// Bound applied to local calls whose options carry no timeout.
    ///
    /// MCP calls without a caller timeout use `[mcp] call_timeout_secs`.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn builtins(&self) -> &BuiltinCatalog {
        &self.builtins
    }

    fn lock_managers(&self) -> MutexGuard<'_, Vec<(McpBlock, ManagerCell)>> {
        match self.managers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Initialized managers, in creation order.
    pub fn managers(&self) -> Vec<Arc<McpManager>> {
        self.lock_managers()
            .iter()
            .filter_map(|(_, cell)| cell.get().cloned())
            .collect()
    }

    /// Expands `entries` into the declarations handed to the model.
    ///
    /// Names resolve against the registry, then the built-ins. MCP blocks
    /// connect once per distinct block. A later declaration reusing a name
    /// from the same kind of source is dropped with a warning; a local tool
    /// and an MCP tool sharing a name is a configuration error.
    pub async fn resolve_declarations(
        &self,
        entries: &[ToolEntry],
    ) -> Result<Vec<ToolDeclaration>, ToolwireError> {
        let registry = self.registry.snapshot();
        let mut seen: HashMap<String, Origin> = HashMap::new();
        let mut resolved = Vec::new();

        for entry in entries {
            let declarations = match entry {
                ToolEntry::Name(name) => {
                    let declaration = self.resolve_name(&registry, name)?;
                    if let Some(server) = self.mcp_owner(name).await {
                        return Err(collision(name, &Origin::Mcp(server), &Origin::Local));
                    }
                    vec![(declaration, Origin::Local)]
                }
                ToolEntry::Mcp(block) => {
                    let manager = self.manager_for(block).await?;
                    let mut declarations = Vec::new();
                    for declaration in manager.get_tools_as_declarations().await {
                        let server = manager
                            .tool_owner(&declaration.name)
                            .await
                            .unwrap_or_default();
                        declarations.push((declaration, Origin::Mcp(server)));
                    }
                    declarations
                }
                ToolEntry::Declaration(declaration) => vec![(declaration.clone(), Origin::Local)],
            };
            for (declaration, origin) in declarations {
                if let Some(first) = seen.get(&declaration.name) {
                    if is_local(first) != is_local(&origin) {
                        return Err(collision(&declaration.name, first, &origin));
                    }
                    warn!(tool = %declaration.name, "duplicate tool declaration dropped");
                    continue;
                }
                seen.insert(declaration.name.clone(), origin);
                resolved.push(declaration);
            }
        }

        debug!(count = resolved.len(), "resolved tool declarations");
        Ok(resolved)
    }

    fn resolve_name(
        &self,
        registry: &ToolRegistry,
        name: &str,
    ) -> Result<ToolDeclaration, ToolwireError> {
        if let Some(entry) = registry.get(name) {
            return Ok(entry.declaration.clone());
        }
        self.builtins
            .get_declaration(name)
            .ok_or_else(|| ToolwireError::ToolNotFound {
                name: name.to_string(),
            })
    }

    async fn mcp_owner(&self, name: &str) -> Option<String> {
        for manager in self.managers() {
            if let Some(server) = manager.tool_owner(name).await {
                return Some(server);
            }
        }
        None
    }

    async fn manager_for(&self, block: &McpBlock) -> Result<Arc<McpManager>, ToolwireError> {
        let cell = {
            let mut managers = self.lock_managers();
            match managers.iter().find(|(b, _)| b == block) {
                Some((_, cell)) => Arc::clone(cell),
                None => {
                    let cell = ManagerCell::default();
                    managers.push((block.clone(), Arc::clone(&cell)));
                    cell
                }
            }
        };

        let manager = cell
            .get_or_try_init(|| async {
                let manager = Arc::new(McpManager::from_config(
                    Arc::clone(&self.connector),
                    &self.mcp_config,
                ));
                let report = manager.initialize(&block.servers).await?;
                info!(
                    connected = report.connected.len(),
                    failed = report.failed.len(),
                    "initialized MCP server block"
                );
                Ok::<_, ToolwireError>(manager)
            })
            .await?;
        Ok(Arc::clone(manager))
    }

    /// Runs a tool with the default call timeout.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<CallResult, ToolwireError> {
        self.invoke_with(name, args, &CallOptions::default()).await
    }

    /// Runs a model-issued call request.
    pub async fn invoke_request(&self, request: &CallRequest) -> Result<CallResult, ToolwireError> {
        self.invoke(&request.name, Value::Object(request.arguments.clone()))
            .await
    }

    /// The backend a call to `name` would reach right now.
    pub async fn source_of(&self, name: &str) -> Option<ToolSource> {
        self.route(name).await.map(|route| match route {
            Route::Mcp { server, .. } => ToolSource::Mcp(server),
            Route::Registry(_) => ToolSource::Registry,
            Route::Builtin => ToolSource::Builtin,
        })
    }

    async fn route(&self, name: &str) -> Option<Route> {
        for manager in self.managers() {
            if let Some(server) = manager.tool_owner(name).await {
                return Some(Route::Mcp { server, manager });
            }
        }
        if let Some(entry) = self.registry.get(name) {
            return Some(Route::Registry(entry));
        }
        self.builtins.is_builtin(name).then_some(Route::Builtin)
    }

    /// Routes one call and normalizes its outcome.
    ///
    /// Without a caller timeout, local tools get the resolver's call
    /// timeout and MCP tools their manager's.
    pub async fn invoke_with(
        &self,
        name: &str,
        args: Value,
        options: &CallOptions,
    ) -> Result<CallResult, ToolwireError> {
        let route = self.route(name).await.ok_or_else(|| ToolwireError::ToolNotFound {
            name: name.to_string(),
        })?;

        match route {
            Route::Mcp { server, manager } => {
                debug!(tool = name, server = %server, "routing call to MCP server");
                let outcome = manager.execute_tool_with(name, args, options).await;
                fold(name, ToolSource::Mcp(server), outcome)
            }
            Route::Registry(entry) => {
                validate_arguments(name, &entry.declaration.parameters, &args)?;
                debug!(tool = name, "routing call to registry");
                let options = self.local_options(options);
                let outcome = bounded(name, &options, entry.tool.invoke(args)).await;
                fold(name, ToolSource::Registry, outcome)
            }
            Route::Builtin => {
                debug!(tool = name, "routing call to built-in");
                let options = self.local_options(options);
                let outcome = bounded(name, &options, self.builtins.execute(name, args)).await;
                fold(name, ToolSource::Builtin, outcome)
            }
        }
    }

    fn local_options(&self, options: &CallOptions) -> CallOptions {
        CallOptions {
            timeout: Some(options.timeout.unwrap_or(self.call_timeout)),
            cancel: options.cancel.clone(),
        }
    }

    /// Closes every MCP manager; later blocks reconnect from scratch.
    pub async fn cleanup(&self) {
        let managers = std::mem::take(&mut *self.lock_managers());
        for (_, cell) in managers {
            if let Some(manager) = cell.get() {
                manager.cleanup().await;
            }
        }
        debug!("tool resolver cleaned up");
    }
}

/// Applies the call's timeout and cancellation token to a local tool.
async fn bounded<F>(name: &str, options: &CallOptions, call: F) -> Result<Value, ToolwireError>
where
    F: Future<Output = Result<Value, ToolwireError>>,
{
    let limit = options.timeout.unwrap_or(DEFAULT_CALL_TIMEOUT);
    let call = tokio::time::timeout(limit, call);
    let outcome = match &options.cancel {
        Some(token) => tokio::select! {
            _ = token.cancelled() => {
                return Err(ToolwireError::execution(name, "call was cancelled"));
            }
            outcome = call => outcome,
        },
        None => call.await,
    };
    outcome.map_err(|_| ToolwireError::Timeout {
        tool: name.to_string(),
        duration: limit,
    })?
}

fn is_local(origin: &Origin) -> bool {
    *origin == Origin::Local
}

fn collision(name: &str, first: &Origin, second: &Origin) -> ToolwireError {
    ToolwireError::Config(format!(
        "tool name `{name}` is provided by both {first} and {second}"
    ))
}

fn fold(
    name: &str,
    source: ToolSource,
    outcome: Result<Value, ToolwireError>,
) -> Result<CallResult, ToolwireError> {
    match outcome {
        Ok(content) => Ok(CallResult::success(name, source, content)),
        Err(e) if e.is_execution_time() => {
            warn!(tool = name, error = %e, "tool call failed");
            Ok(CallResult::failure(name, source, &e))
        }
        Err(e) => Err(e),
    }
}
