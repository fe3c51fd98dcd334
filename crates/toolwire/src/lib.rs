// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Toolwire: register tools, advertise them to a model, and run the calls it
//! makes.
//!
//! This crate re-exports the pieces an application needs and hosts the
//! operator commands behind the `toolwire` binary.
//!
//! ```no_run
//! # async fn demo() -> Result<(), toolwire::ToolwireError> {
//! use serde_json::json;
//! use toolwire::{ParamSpec, SharedRegistry, ToolBuilder, ToolEntry, ToolResolver};
//!
//! let registry = SharedRegistry::new();
//! registry.register(
//!     ToolBuilder::new("add")
//!         .doc("Adds two numbers.")
//!         .param(ParamSpec::new("a").typed("f64"))
//!         .param(ParamSpec::new("b").typed("f64"))
//!         .handler(|args| async move {
//!             let a = args.get("a").and_then(|v| v.as_f64()).unwrap_or_default();
//!             let b = args.get("b").and_then(|v| v.as_f64()).unwrap_or_default();
//!             Ok(json!(a + b))
//!         })
//!         .build()?,
//! )?;
//!
//! let resolver = ToolResolver::new(registry);
//! let declarations = resolver
//!     .resolve_declarations(&[ToolEntry::name("add"), ToolEntry::name("web_search")])
//!     .await?;
//! let result = resolver.invoke("add", json!({"a": 1, "b": 2})).await?;
//! assert_eq!(result.text(), "3.0");
//! # let _ = declarations;
//! # Ok(())
//! # }
//! ```

pub mod commands;

pub use toolwire_config as config;
pub use toolwire_core::{
    CallOptions, CallOutcome, CallRequest, CallResult, ErrorKind, ToolDeclaration, ToolSource,
    ToolwireError,
};
pub use toolwire_mcp_client::{
    ConnectionState, InitializeReport, McpConnector, McpManager, McpTransport, RmcpConnector,
};
pub use toolwire_resolver::{McpBlock, ToolEntry, ToolResolver};
pub use toolwire_tools::{
    BuiltinCatalog, DocBlock, FunctionTool, ParamSpec, SharedRegistry, Tool, ToolBuilder,
};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `level`, which applies to the toolwire crates only.
pub fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("toolwire={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
