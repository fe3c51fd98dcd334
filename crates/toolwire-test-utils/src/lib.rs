// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Toolwire integration tests.
//!
//! Provides a scriptable MCP connector and a harness that wires a resolver
//! to it, so routing and failure handling can be tested without spawning
//! real MCP servers.
//!
//! # Components
//!
//! - [`FakeConnector`] - In-memory MCP servers with scripted replies and delays
//! - [`TestHarness`] - Resolver, registry and fake connector assembled together
//! - [`sample_tools`] - Small registry tools used across suites

pub mod harness;
pub mod mock_mcp;
pub mod sample_tools;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_mcp::{FakeCall, FakeConnector, FakeServer};
