// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Toolwire tool subsystem.
//!
//! This crate provides the error taxonomy, the declaration and call types,
//! and schema-based argument validation shared by the registry, the built-in
//! catalog, the MCP manager, and the resolver.

pub mod error;
pub mod types;
pub mod validation;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ErrorKind, ToolwireError};
pub use types::{
    empty_object_schema, CallOptions, CallOutcome, CallRequest, CallResult, ParamType,
    ParameterProperty, ParameterSchema, ToolDeclaration, ToolSource,
};
pub use validation::{schema_violations, validate_arguments};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn toolwire_error_maps_to_taxonomy_kinds() {
        let cases: Vec<(ToolwireError, ErrorKind)> = vec![
            (ToolwireError::Config("x".into()), ErrorKind::Configuration),
            (ToolwireError::registration("dup"), ErrorKind::Registration),
            (
                ToolwireError::SchemaValidation {
                    tool: "t".into(),
                    message: "m".into(),
                },
                ErrorKind::SchemaValidation,
            ),
            (
                ToolwireError::ToolNotFound { name: "n".into() },
                ErrorKind::ToolNotFound,
            ),
            (ToolwireError::execution("t", "boom"), ErrorKind::Execution),
            (
                ToolwireError::Timeout {
                    tool: "t".into(),
                    duration: std::time::Duration::from_secs(1),
                },
                ErrorKind::Execution,
            ),
            (ToolwireError::mcp("fs", "down"), ErrorKind::RemoteTool),
            (ToolwireError::Internal("x".into()), ErrorKind::Internal),
        ];

        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn only_execution_time_errors_are_folded() {
        assert!(ToolwireError::execution("t", "m").is_execution_time());
        assert!(ToolwireError::mcp("s", "m").is_execution_time());
        assert!(!ToolwireError::registration("m").is_execution_time());
        assert!(!ToolwireError::ToolNotFound { name: "n".into() }.is_execution_time());
    }

    #[test]
    fn mcp_error_message_names_server() {
        assert_eq!(
            ToolwireError::mcp("fs", "not initialized").to_string(),
            "MCP error (fs): not initialized"
        );
        let unscoped = ToolwireError::Mcp {
            server: None,
            message: "not initialized".into(),
            source: None,
        };
        assert_eq!(unscoped.to_string(), "MCP error: not initialized");
    }

    #[test]
    fn error_kind_display_round_trips() {
        for kind in [
            ErrorKind::Registration,
            ErrorKind::SchemaValidation,
            ErrorKind::ToolNotFound,
            ErrorKind::Execution,
            ErrorKind::RemoteTool,
        ] {
            assert_eq!(ErrorKind::from_str(&kind.to_string()).unwrap(), kind);
        }
        assert_eq!(ErrorKind::ToolNotFound.to_string(), "tool_not_found");
    }
}
