// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express: known log
//! levels, non-zero timeouts, well-formed search endpoints, and MCP server
//! entries that resolve to exactly one transport.

use crate::diagnostic::ConfigError;
use crate::model::{McpServerEntry, ToolwireConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &ToolwireConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let timeouts = [
        ("tools.call_timeout_ms", config.tools.call_timeout_ms),
        (
            "builtin.code_execution.timeout_ms",
            config.builtin.code_execution.timeout_ms,
        ),
        (
            "builtin.web_search.timeout_secs",
            config.builtin.web_search.timeout_secs,
        ),
        ("mcp.connect_timeout_secs", config.mcp.connect_timeout_secs),
        ("mcp.call_timeout_secs", config.mcp.call_timeout_secs),
    ];
    for (key, value) in timeouts {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be greater than zero"),
            });
        }
    }

    let code = &config.builtin.code_execution;
    for (key, interpreter) in [
        ("python", &code.python),
        ("node", &code.node),
        ("bash", &code.bash),
    ] {
        if interpreter.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("builtin.code_execution.{key} must not be empty"),
            });
        }
    }
    if code.max_output_bytes == 0 {
        errors.push(ConfigError::Validation {
            message: "builtin.code_execution.max_output_bytes must be greater than zero"
                .to_string(),
        });
    }

    let search = &config.builtin.web_search;
    if !(search.endpoint.starts_with("http://") || search.endpoint.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!(
                "builtin.web_search.endpoint `{}` must be an http or https URL",
                search.endpoint
            ),
        });
    }
    if search.max_results == 0 {
        errors.push(ConfigError::Validation {
            message: "builtin.web_search.max_results must be greater than zero".to_string(),
        });
    }

    errors.extend(validate_mcp_servers(
        config.mcp.servers.iter().map(|(name, entry)| (name.as_str(), entry)),
    ));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that every server has a name and resolves to exactly one transport.
///
/// Shared by config validation and by the MCP manager, which receives server
/// tables at runtime that never passed through a TOML file.
pub fn validate_mcp_servers<'a>(
    servers: impl IntoIterator<Item = (&'a str, &'a McpServerEntry)>,
) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    for (name, entry) in servers {
        if name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "mcp server names must not be empty".to_string(),
            });
            continue;
        }
        if let Err(e) = entry.transport_config(name) {
            errors.push(e);
        }
    }
    errors
}
