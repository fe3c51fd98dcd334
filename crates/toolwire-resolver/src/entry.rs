// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The heterogeneous tool list a caller hands to the resolver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use toolwire_config::McpServerEntry;
use toolwire_core::ToolDeclaration;

/// A block of MCP servers, written as `{"mcpServers": {name: entry}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct McpBlock {
    #[serde(rename = "mcpServers")]
    pub servers: BTreeMap<String, McpServerEntry>,
}

impl McpBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(mut self, name: impl Into<String>, entry: McpServerEntry) -> Self {
        self.servers.insert(name.into(), entry);
        self
    }
}

/// One element of a tool list.
///
/// Deserializes from a bare name, an MCP block, or a full declaration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ToolEntry {
    Name(String),
    Mcp(McpBlock),
    Declaration(ToolDeclaration),
}

impl ToolEntry {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn mcp(block: McpBlock) -> Self {
        Self::Mcp(block)
    }

    pub fn declaration(declaration: ToolDeclaration) -> Self {
        Self::Declaration(declaration)
    }
}

impl From<&str> for ToolEntry {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<McpBlock> for ToolEntry {
    fn from(block: McpBlock) -> Self {
        Self::Mcp(block)
    }
}

impl From<ToolDeclaration> for ToolEntry {
    fn from(declaration: ToolDeclaration) -> Self {
        Self::Declaration(declaration)
    }
}
