// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool resolution and invocation.
//!
//! [`ToolResolver`] combines the registry, the built-in catalog and any MCP
//! server blocks into one declaration list and one call surface.

pub mod entry;
pub mod resolver;

pub use entry::{McpBlock, ToolEntry};
pub use resolver::ToolResolver;
