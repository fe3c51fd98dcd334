// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator commands behind the `toolwire` binary.
//!
//! `list` shows every tool the configuration makes available and where it
//! would be routed; `call` runs one tool and prints the normalized result.

use std::time::Duration;

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use toolwire_config::ToolwireConfig;
use toolwire_core::{CallOptions, CallResult, ToolSource, ToolwireError};
use toolwire_resolver::{McpBlock, ToolEntry, ToolResolver};
use toolwire_tools::builtin;

/// One row of `toolwire list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedTool {
    pub name: String,
    pub description: String,
    pub source: String,
}

/// The tool list implied by the registry, the built-ins and `[mcp.servers]`.
pub fn configured_entries(config: &ToolwireConfig, resolver: &ToolResolver) -> Vec<ToolEntry> {
    let mut entries: Vec<ToolEntry> = resolver
        .registry()
        .list_registered()
        .into_iter()
        .map(ToolEntry::Name)
        .collect();
    entries.extend(builtin::names().into_iter().map(ToolEntry::from));
    if !config.mcp.servers.is_empty() {
        entries.push(ToolEntry::Mcp(McpBlock {
            servers: config.mcp.servers.clone(),
        }));
    }
    entries
}

fn source_label(source: Option<ToolSource>) -> String {
    match source {
        Some(ToolSource::Mcp(server)) => format!("mcp:{server}"),
        Some(ToolSource::Registry) => "registry".to_string(),
        Some(ToolSource::Builtin) => "builtin".to_string(),
        None => "declared".to_string(),
    }
}

/// Resolves the configured tool list and reports each tool's backend.
pub async fn list_tools(
    config: &ToolwireConfig,
    resolver: &ToolResolver,
) -> Result<Vec<ListedTool>, ToolwireError> {
    let entries = configured_entries(config, resolver);
    let declarations = resolver.resolve_declarations(&entries).await?;

    let mut listed = Vec::with_capacity(declarations.len());
    for declaration in declarations {
        let source = resolver.source_of(&declaration.name).await;
        listed.push(ListedTool {
            source: source_label(source),
            name: declaration.name,
            description: declaration.description,
        });
    }
    Ok(listed)
}

/// Parses `--args`: a JSON object, or an empty string for no arguments.
pub fn parse_arguments(tool: &str, raw: &str) -> Result<Value, ToolwireError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ToolwireError::SchemaValidation {
            tool: tool.to_string(),
            message: format!("arguments are not valid JSON: {e}"),
        })?;
    if !value.is_object() {
        return Err(ToolwireError::SchemaValidation {
            tool: tool.to_string(),
            message: "arguments must be a JSON object".to_string(),
        });
    }
    Ok(value)
}

/// Connects the configured MCP servers, then runs one call.
pub async fn call_tool(
    config: &ToolwireConfig,
    resolver: &ToolResolver,
    name: &str,
    raw_args: &str,
    timeout: Option<Duration>,
) -> Result<CallResult, ToolwireError> {
    let args = parse_arguments(name, raw_args)?;
    if !config.mcp.servers.is_empty() {
        let block = ToolEntry::Mcp(McpBlock {
            servers: config.mcp.servers.clone(),
        });
        resolver.resolve_declarations(&[block]).await?;
    }
    let options = CallOptions {
        timeout,
        cancel: None,
    };
    resolver.invoke_with(name, args, &options).await
}

/// Renders the `list` output as a table or pretty JSON.
pub fn render_list(tools: &[ListedTool], json: bool, color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(tools).unwrap_or_else(|_| "[]".to_string());
    }
    if tools.is_empty() {
        return "no tools available\n".to_string();
    }

    let width = tools.iter().map(|t| t.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for tool in tools {
        let name = format!("{:width$}", tool.name);
        let source = format!("[{}]", tool.source);
        if color {
            out.push_str(&format!(
                "{}  {}  {}\n",
                name.bold(),
                source.cyan(),
                tool.description
            ));
        } else {
            out.push_str(&format!("{name}  {source}  {}\n", tool.description));
        }
    }
    out
}

/// Renders a call result: the model-facing text, or the full JSON envelope.
pub fn render_call(result: &CallResult, json: bool) -> String {
    if json {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    } else {
        result.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_arguments_are_an_empty_object() {
        assert_eq!(parse_arguments("t", "  ").unwrap(), serde_json::json!({}));
    }

    #[test]
    fn malformed_arguments_are_schema_errors() {
        let err = parse_arguments("t", "{oops").unwrap_err();
        assert!(matches!(err, ToolwireError::SchemaValidation { .. }));
        let err = parse_arguments("t", "[1, 2]").unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[test]
    fn plain_list_aligns_names() {
        let tools = vec![
            ListedTool {
                name: "add".into(),
                description: "Adds".into(),
                source: "registry".into(),
            },
            ListedTool {
                name: "web_search".into(),
                description: "Searches".into(),
                source: "builtin".into(),
            },
        ];
        let out = render_list(&tools, false, false);
        assert_eq!(
            out,
            "add         [registry]  Adds\nweb_search  [builtin]  Searches\n"
        );
    }

    #[test]
    fn json_list_is_an_array() {
        let out = render_list(&[], true, false);
        assert_eq!(out.trim(), "[]");
    }
}
