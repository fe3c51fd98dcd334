// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in tool catalog.
//!
//! The set is closed: each built-in is a row in a static table pairing its
//! declaration with a constructor. Instances are created on first use and
//! kept for the catalog's lifetime, so `code_execution` reuses one scratch
//! directory until the catalog drops.

pub mod code;
pub mod web_search;

pub use code::CodeExecutionTool;
pub use web_search::{SearchResult, WebSearchTool};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use toolwire_config::BuiltinConfig;
use toolwire_core::{schema_violations, ToolDeclaration, ToolwireError};
use tracing::debug;

use crate::tool::Tool;

struct BuiltinSpec {
    name: &'static str,
    declaration: fn(&BuiltinConfig) -> ToolDeclaration,
    construct: fn(&BuiltinConfig) -> Result<Arc<dyn Tool>, ToolwireError>,
}

const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec {
        name: code::NAME,
        declaration: code_declaration,
        construct: construct_code,
    },
    BuiltinSpec {
        name: web_search::NAME,
        declaration: web_search_declaration,
        construct: construct_web_search,
    },
];

fn code_declaration(_: &BuiltinConfig) -> ToolDeclaration {
    ToolDeclaration::from_schema(code::NAME, code::DESCRIPTION, &code::schema())
}

fn web_search_declaration(config: &BuiltinConfig) -> ToolDeclaration {
    ToolDeclaration::from_schema(
        web_search::NAME,
        web_search::DESCRIPTION,
        &web_search::schema(&config.web_search),
    )
}

fn construct_code(config: &BuiltinConfig) -> Result<Arc<dyn Tool>, ToolwireError> {
    Ok(Arc::new(CodeExecutionTool::new(config.code_execution.clone())?))
}

fn construct_web_search(config: &BuiltinConfig) -> Result<Arc<dyn Tool>, ToolwireError> {
    Ok(Arc::new(WebSearchTool::new(config.web_search.clone())?))
}

fn spec(name: &str) -> Option<&'static BuiltinSpec> {
    BUILTINS.iter().find(|s| s.name == name)
}

/// Whether `name` is one of the built-in tools.
pub fn is_builtin(name: &str) -> bool {
    spec(name).is_some()
}

/// Names of every built-in, in catalog order.
pub fn names() -> Vec<&'static str> {
    BUILTINS.iter().map(|s| s.name).collect()
}

/// The fixed set of built-in tools, configured once.
pub struct BuiltinCatalog {
    config: BuiltinConfig,
    instances: Mutex<HashMap<&'static str, Arc<dyn Tool>>>,
}

impl Default for BuiltinCatalog {
    fn default() -> Self {
        Self::new(BuiltinConfig::default())
    }
}

impl BuiltinCatalog {
    pub fn new(config: BuiltinConfig) -> Self {
        Self {
            config,
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Overrides the code execution time limit.
    pub fn with_code_timeout(mut self, timeout: Duration) -> Self {
        self.config.code_execution.timeout_ms = timeout.as_millis().max(1) as u64;
        self
    }

    pub fn config(&self) -> &BuiltinConfig {
        &self.config
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        is_builtin(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        names()
    }

    /// Declaration for a built-in, or `None` for any other name.
    pub fn get_declaration(&self, name: &str) -> Option<ToolDeclaration> {
        spec(name).map(|s| (s.declaration)(&self.config))
    }

    /// Declarations of every built-in.
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        BUILTINS
            .iter()
            .map(|s| (s.declaration)(&self.config))
            .collect()
    }

    fn lock_instances(&self) -> MutexGuard<'_, HashMap<&'static str, Arc<dyn Tool>>> {
        match self.instances.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn instance(&self, spec: &'static BuiltinSpec) -> Result<Arc<dyn Tool>, ToolwireError> {
        let mut instances = self.lock_instances();
        if let Some(tool) = instances.get(spec.name) {
            return Ok(Arc::clone(tool));
        }
        let tool = (spec.construct)(&self.config)?;
        debug!(tool = spec.name, "constructed built-in tool");
        instances.insert(spec.name, Arc::clone(&tool));
        Ok(tool)
    }

    /// Validates `args` against the built-in's schema and runs it.
    ///
    /// Unknown names yield [`ToolwireError::ToolNotFound`] without constructing
    /// anything. Argument problems are reported as execution errors.
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, ToolwireError> {
        let spec = spec(name).ok_or_else(|| ToolwireError::ToolNotFound {
            name: name.to_string(),
        })?;

        let declaration = (spec.declaration)(&self.config);
        let violations = schema_violations(&declaration.parameters, &args)?;
        if !violations.is_empty() {
            return Err(ToolwireError::execution(
                name,
                format!("invalid arguments: {}", violations.join("; ")),
            ));
        }

        let tool = self.instance(spec)?;
        tool.invoke(args).await
    }
}
