// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Toolwire operator CLI.
//!
//! Lists the tools a configuration exposes and runs single calls against
//! them, which is enough to check MCP server entries and built-in settings
//! without wiring up a model.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use toolwire::commands;
use toolwire::config::{self, ToolwireConfig};
use toolwire::{SharedRegistry, ToolResolver, ToolwireError};

/// Toolwire - tool registration, resolution and invocation.
#[derive(Parser, Debug)]
#[command(name = "toolwire", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the usual locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List built-in and configured MCP tools.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Run one tool and print its result.
    Call {
        /// Tool name.
        name: String,
        /// Arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,
        /// Call timeout in milliseconds (defaults to `[tools] call_timeout_ms`).
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Print the full result envelope as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Load and validate the configuration, then exit.
    CheckConfig {
        /// Print the effective configuration as TOML.
        #[arg(long)]
        print: bool,
    },
}

fn load(path: Option<&PathBuf>) -> ToolwireConfig {
    let loaded = match path {
        Some(path) => config::load_and_validate_path(path),
        None => config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

async fn run(
    command: Commands,
    config: &ToolwireConfig,
    resolver: &ToolResolver,
) -> Result<bool, ToolwireError> {
    match command {
        Commands::List { json, plain } => {
            let tools = commands::list_tools(config, resolver).await?;
            let color = !plain && std::io::stdout().is_terminal();
            print!("{}", commands::render_list(&tools, json, color));
            Ok(true)
        }
        Commands::Call {
            name,
            args,
            timeout_ms,
            json,
        } => {
            let timeout = timeout_ms.map(Duration::from_millis);
            let result = commands::call_tool(config, resolver, &name, &args, timeout).await?;
            println!("{}", commands::render_call(&result, json));
            Ok(result.is_success())
        }
        Commands::CheckConfig { .. } => Ok(true),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load(cli.config.as_ref());

    if let Commands::CheckConfig { print } = cli.command {
        if print {
            match config::render_effective(&config) {
                Ok(rendered) => print!("{rendered}"),
                Err(e) => {
                    config::render_errors(&[e]);
                    std::process::exit(1);
                }
            }
        }
        eprintln!("toolwire: configuration OK");
        return;
    }

    toolwire::init_tracing(&config.logging.level);
    tracing::debug!(
        mcp_servers = config.mcp.servers.len(),
        "configuration loaded"
    );

    let resolver = ToolResolver::from_config(&config, SharedRegistry::new());
    let outcome = run(cli.command, &config, &resolver).await;
    resolver.cleanup().await;

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("toolwire: {e}");
            std::process::exit(1);
        }
    }
}
