// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Toolwire tool subsystem.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// The primary error type used across registration, resolution, and invocation.
#[derive(Debug, Error)]
pub enum ToolwireError {
    /// Configuration errors (malformed TOML, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A tool could not be registered (duplicate name, missing name, bad signature).
    #[error("registration error: {message}")]
    Registration { message: String },

    /// Arguments failed the tool's parameter schema before execution.
    #[error("invalid arguments for tool `{tool}`: {message}")]
    SchemaValidation { tool: String, message: String },

    /// The tool name resolves to no backend.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// The backend ran the tool and it failed.
    #[error("execution of `{tool}` failed: {message}")]
    Execution {
        tool: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend exceeded its time budget and was stopped.
    #[error("tool `{tool}` timed out after {duration:?}")]
    Timeout {
        tool: String,
        duration: std::time::Duration,
    },

    /// MCP-specific failures: connection, remote-reported errors, malformed server config.
    #[error("{}", format_mcp_message(server.as_deref(), message))]
    Mcp {
        server: Option<String>,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

fn format_mcp_message(server: Option<&str>, message: &str) -> String {
    match server {
        Some(server) => format!("MCP error ({server}): {message}"),
        None => format!("MCP error: {message}"),
    }
}

/// Coarse classification of a [`ToolwireError`], stable across variants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Registration,
    SchemaValidation,
    ToolNotFound,
    Execution,
    RemoteTool,
    Internal,
}

impl ToolwireError {
    /// Shorthand for an [`ToolwireError::Execution`] without a source.
    pub fn execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            tool: tool.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`ToolwireError::Mcp`] scoped to a server.
    pub fn mcp(server: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Mcp {
            server: Some(server.into()),
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`ToolwireError::Registration`].
    pub fn registration(message: impl Into<String>) -> Self {
        Self::Registration {
            message: message.into(),
        }
    }

    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::Registration { .. } => ErrorKind::Registration,
            Self::SchemaValidation { .. } => ErrorKind::SchemaValidation,
            Self::ToolNotFound { .. } => ErrorKind::ToolNotFound,
            Self::Execution { .. } | Self::Timeout { .. } => ErrorKind::Execution,
            Self::Mcp { .. } => ErrorKind::RemoteTool,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// True when the error came from a tool that ran (or was started) and failed.
    ///
    /// These are the errors the resolver folds into a failed `CallResult`
    /// instead of returning them.
    pub fn is_execution_time(&self) -> bool {
        matches!(
            self,
            Self::Execution { .. } | Self::Timeout { .. } | Self::Mcp { .. }
        )
    }

    /// True when the error reports an exceeded time budget.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
