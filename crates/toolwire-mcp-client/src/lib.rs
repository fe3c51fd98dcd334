// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MCP client side of Toolwire.
//!
//! [`McpManager`] connects to a block of MCP servers, exposes their tools as
//! declarations and forwards calls. Transports sit behind [`McpConnector`]
//! so the manager can be driven by fakes in tests.

pub mod manager;
pub mod rmcp_client;
pub mod transport;

pub use manager::{
    validate_configuration, ConnectionState, InitializeReport, McpConnection, McpManager,
};
pub use rmcp_client::{MinimalClientHandler, RmcpConnector, RmcpTransport};
pub use transport::{McpCallResult, McpConnector, McpContent, McpTransport};
