// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of caller-supplied tools.
//!
//! [`ToolRegistry`] is the plain table: insertion-ordered, duplicate names
//! rejected. [`SharedRegistry`] is the cloneable handle applications build
//! once and pass to the resolver; every mutation and snapshot goes through
//! one `RwLock`, so readers never see a half-applied change.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use toolwire_core::{ToolDeclaration, ToolwireError};
use tracing::{debug, info};

use crate::tool::Tool;

/// One registered tool.
#[derive(Clone)]
pub struct RegistryEntry {
    pub name: String,
    pub declaration: ToolDeclaration,
    pub tool: Arc<dyn Tool>,
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("name", &self.name)
            .field("declaration", &self.declaration)
            .finish_non_exhaustive()
    }
}

/// Name-unique, insertion-ordered table of tools.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    entries: Vec<RegistryEntry>,
}

impl ToolRegistry {
    /// Creates an empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tool under `name`.
    ///
    /// Fails with [`ToolwireError::Registration`] when the name is blank or
    /// already taken; an existing entry is never replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        declaration: ToolDeclaration,
        tool: Arc<dyn Tool>,
    ) -> Result<(), ToolwireError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ToolwireError::registration("tool name must not be empty"));
        }
        if self.has(&name) {
            return Err(ToolwireError::registration(format!(
                "tool `{name}` is already registered"
            )));
        }
        self.entries.push(RegistryEntry {
            name,
            declaration,
            tool,
        });
        Ok(())
    }

    /// Registers a tool under its own name and declaration.
    pub fn register_tool(&mut self, tool: Arc<dyn Tool>) -> Result<ToolDeclaration, ToolwireError> {
        let declaration = tool.declaration();
        self.register(declaration.name.clone(), declaration.clone(), tool)?;
        Ok(declaration)
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes one entry; returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        self.entries.len() != before
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All entries in insertion order.
    pub fn list(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn list_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Declarations for `names` (unknown names skipped), or all of them.
    pub fn declarations_for(&self, names: Option<&[&str]>) -> Vec<ToolDeclaration> {
        match names {
            Some(names) => names
                .iter()
                .filter_map(|name| self.get(name))
                .map(|e| e.declaration.clone())
                .collect(),
            None => self.entries.iter().map(|e| e.declaration.clone()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cloneable handle to one [`ToolRegistry`].
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<ToolRegistry>>,
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool and returns the declaration the model will see.
    pub fn register(&self, tool: impl Tool + 'static) -> Result<ToolDeclaration, ToolwireError> {
        self.register_arc(Arc::new(tool))
    }

    /// Registers an already shared tool.
    pub fn register_arc(&self, tool: Arc<dyn Tool>) -> Result<ToolDeclaration, ToolwireError> {
        let declaration = write_lock(&self.inner).register_tool(tool)?;
        info!(tool = %declaration.name, "registered tool");
        Ok(declaration)
    }

    /// Registers a tool with a description that replaces the inferred one.
    pub fn register_with_description(
        &self,
        tool: impl Tool + 'static,
        description: impl Into<String>,
    ) -> Result<ToolDeclaration, ToolwireError> {
        let tool: Arc<dyn Tool> = Arc::new(tool);
        let mut declaration = tool.declaration();
        declaration.description = description.into();
        write_lock(&self.inner).register(declaration.name.clone(), declaration.clone(), tool)?;
        info!(tool = %declaration.name, "registered tool");
        Ok(declaration)
    }

    /// Removes one tool; returns whether it was registered.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = write_lock(&self.inner).remove(name);
        if removed {
            debug!(tool = %name, "unregistered tool");
        }
        removed
    }

    pub fn unregister_all(&self) {
        write_lock(&self.inner).clear();
        debug!("cleared tool registry");
    }

    pub fn list_registered(&self) -> Vec<String> {
        read_lock(&self.inner).list_names()
    }

    pub fn get(&self, name: &str) -> Option<RegistryEntry> {
        read_lock(&self.inner).get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        read_lock(&self.inner).has(name)
    }

    pub fn declarations_for(&self, names: Option<&[&str]>) -> Vec<ToolDeclaration> {
        read_lock(&self.inner).declarations_for(names)
    }

    /// Point-in-time copy of the table. Entries share their tools.
    pub fn snapshot(&self) -> ToolRegistry {
        read_lock(&self.inner).clone()
    }

    pub fn len(&self) -> usize {
        read_lock(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        read_lock(&self.inner).is_empty()
    }
}
