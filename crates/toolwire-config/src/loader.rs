// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./toolwire.toml` > `~/.config/toolwire/toolwire.toml` > `/etc/toolwire/toolwire.toml`
//! with environment variable overrides via `TOOLWIRE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ToolwireConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/toolwire/toolwire.toml` (system-wide)
/// 3. `~/.config/toolwire/toolwire.toml` (user XDG config)
/// 4. `./toolwire.toml` (local directory)
/// 5. `TOOLWIRE_*` environment variables
pub fn load_config() -> Result<ToolwireConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ToolwireConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ToolwireConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ToolwireConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ToolwireConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ToolwireConfig::default()))
        .merge(Toml::file("/etc/toolwire/toolwire.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("toolwire/toolwire.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("toolwire.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `TOOLWIRE_BUILTIN_CODE_EXECUTION_TIMEOUT_MS` must map to
/// `builtin.code_execution.timeout_ms`.
fn env_provider() -> Env {
    Env::prefixed("TOOLWIRE_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: &[(&str, &str)] = &[
        ("builtin_code_execution_", "builtin.code_execution."),
        ("builtin_web_search_", "builtin.web_search."),
        ("logging_", "logging."),
        ("tools_", "tools."),
        ("mcp_", "mcp."),
    ];

    for (prefix, dotted) in SECTIONS {
        if let Some(rest) = key.strip_prefix(prefix) {
            return format!("{dotted}{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_nested_sections() {
        assert_eq!(
            map_env_key("builtin_code_execution_timeout_ms"),
            "builtin.code_execution.timeout_ms"
        );
        assert_eq!(
            map_env_key("builtin_web_search_endpoint"),
            "builtin.web_search.endpoint"
        );
        assert_eq!(map_env_key("mcp_call_timeout_secs"), "mcp.call_timeout_secs");
        assert_eq!(map_env_key("logging_level"), "logging.level");
        assert_eq!(map_env_key("unknown"), "unknown");
    }

    #[test]
    fn env_override_applies_through_figment() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TOOLWIRE_BUILTIN_CODE_EXECUTION_TIMEOUT_MS", "1234");
            jail.set_env("TOOLWIRE_LOGGING_LEVEL", "debug");
            let config = load_config()?;
            assert_eq!(config.builtin.code_execution.timeout_ms, 1234);
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn local_file_is_merged() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "toolwire.toml",
                r#"
[mcp.servers.fs]
command = "npx"
args = ["-y", "@modelcontextprotocol/server-filesystem"]
"#,
            )?;
            let config = load_config()?;
            assert_eq!(config.mcp.servers.len(), 1);
            assert_eq!(config.mcp.servers["fs"].command.as_deref(), Some("npx"));
            Ok(())
        });
    }
}
