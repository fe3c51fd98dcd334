// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local tool sources for Toolwire.
//!
//! This crate provides the unified [`Tool`] trait, schema inference for
//! function tools ([`ToolBuilder`], [`infer_declaration`],
//! [`infer_from_json_schema`]), the name-unique [`ToolRegistry`] with its
//! shared handle [`SharedRegistry`], and the closed [`BuiltinCatalog`].
//!
//! Built-in tools:
//! - [`builtin::CodeExecutionTool`] -- Run python, javascript or bash snippets
//! - [`builtin::WebSearchTool`] -- Query a web search endpoint

pub mod builtin;
pub mod registry;
pub mod schema;
pub mod tool;

pub use builtin::BuiltinCatalog;
pub use registry::{RegistryEntry, SharedRegistry, ToolRegistry};
pub use schema::{infer_declaration, infer_from_json_schema, infer_schema, DocBlock, ParamSpec};
pub use tool::{FunctionTool, Tool, ToolBuilder, ToolHandler};
