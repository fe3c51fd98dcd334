// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait and function-backed tools.
//!
//! The [`Tool`] trait is the invocation surface shared by registry entries
//! and built-in tools. [`FunctionTool`] wraps an async closure together with
//! a declaration inferred by [`crate::schema`], and [`ToolBuilder`] is the
//! way callers describe one.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use toolwire_core::{ToolDeclaration, ToolwireError};

use crate::schema::{infer_declaration, infer_from_json_schema, ParamSpec};

/// Unified trait for everything that can run as a tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's unique name (used for lookup and routing).
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Returns the JSON Schema describing the tool's input parameters.
    fn parameters_schema(&self) -> Value;

    /// The declaration handed to the model.
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration::new(self.name(), self.description(), self.parameters_schema())
    }

    /// Invokes the tool with the given JSON arguments.
    async fn invoke(&self, input: Value) -> Result<Value, ToolwireError>;
}

/// Async callable behind a [`FunctionTool`].
pub type ToolHandler =
    Arc<dyn Fn(Map<String, Value>) -> BoxFuture<'static, Result<Value, ToolwireError>> + Send + Sync>;

/// A tool backed by an async closure.
#[derive(Clone)]
pub struct FunctionTool {
    declaration: ToolDeclaration,
    handler: ToolHandler,
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("declaration", &self.declaration)
            .finish_non_exhaustive()
    }
}

impl FunctionTool {
    /// Wraps a handler with an already-built declaration.
    pub fn new(declaration: ToolDeclaration, handler: ToolHandler) -> Self {
        Self {
            declaration,
            handler,
        }
    }

    /// Builds a tool whose arguments deserialize into `A`.
    ///
    /// The declaration comes from `A`'s `JsonSchema`; arguments that fail to
    /// deserialize are a [`ToolwireError::SchemaValidation`].
    pub fn typed<A, R, F, Fut>(
        name: &str,
        description: &str,
        handler: F,
    ) -> Result<Self, ToolwireError>
    where
        A: DeserializeOwned + JsonSchema + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ToolwireError>> + Send + 'static,
    {
        let declaration = infer_from_json_schema::<A>(name, description)?;
        let tool_name = declaration.name.clone();
        let handler = Arc::new(handler);
        let wrapped: ToolHandler = Arc::new(move |args: Map<String, Value>| {
            let handler = Arc::clone(&handler);
            let tool_name = tool_name.clone();
            async move {
                let typed: A = serde_json::from_value(Value::Object(args)).map_err(|e| {
                    ToolwireError::SchemaValidation {
                        tool: tool_name.clone(),
                        message: e.to_string(),
                    }
                })?;
                let output = handler(typed).await?;
                serde_json::to_value(output).map_err(|e| ToolwireError::Execution {
                    tool: tool_name,
                    message: format!("result is not JSON: {e}"),
                    source: Some(Box::new(e)),
                })
            }
            .boxed()
        });
        Ok(Self::new(declaration, wrapped))
    }

    /// Returns a copy with a replaced description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.declaration.description = description.into();
        self
    }

    /// Fills in declared defaults for parameters the caller left out.
    fn apply_defaults(&self, args: &mut Map<String, Value>) {
        let Some(properties) = self
            .declaration
            .parameters
            .get("properties")
            .and_then(Value::as_object)
        else {
            return;
        };
        for (name, property) in properties {
            if let Some(default) = property.get("default")
                && !args.contains_key(name)
            {
                args.insert(name.clone(), default.clone());
            }
        }
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.declaration.name
    }

    fn description(&self) -> &str {
        &self.declaration.description
    }

    fn parameters_schema(&self) -> Value {
        self.declaration.parameters.clone()
    }

    fn declaration(&self) -> ToolDeclaration {
        self.declaration.clone()
    }

    async fn invoke(&self, input: Value) -> Result<Value, ToolwireError> {
        let mut args = match input {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ToolwireError::SchemaValidation {
                    tool: self.declaration.name.clone(),
                    message: format!("arguments must be an object, got {other}"),
                });
            }
        };
        self.apply_defaults(&mut args);
        (self.handler)(args).await
    }
}

/// Describes a function tool by its signature and documentation.
///
/// ```no_run
/// # use serde_json::json;
/// # use toolwire_tools::{ParamSpec, ToolBuilder};
/// let add = ToolBuilder::new("add")
///     .doc("Adds two numbers.\n@param {number} a first\n@param {number} b second")
///     .param(ParamSpec::new("a").typed("f64"))
///     .param(ParamSpec::new("b").typed("f64").default_value(json!(0)))
///     .handler(|args| async move {
///         let a = args.get("a").and_then(|v| v.as_f64()).unwrap_or_default();
///         let b = args.get("b").and_then(|v| v.as_f64()).unwrap_or_default();
///         Ok(json!(a + b))
///     })
///     .build()
///     .unwrap();
/// ```
pub struct ToolBuilder {
    name: String,
    params: Vec<ParamSpec>,
    doc: Option<String>,
    description: Option<String>,
    handler: Option<ToolHandler>,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            doc: None,
            description: None,
            handler: None,
        }
    }

    /// Appends a parameter; order is preserved in the schema.
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// Attaches a documentation block (`@param` lines and free text).
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Overrides whatever description the doc block provides.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolwireError>> + Send + 'static,
    {
        let handler: ToolHandler =
            Arc::new(move |args: Map<String, Value>| handler(args).boxed());
        self.handler = Some(handler);
        self
    }

    /// Infers the declaration and produces the tool.
    pub fn build(self) -> Result<FunctionTool, ToolwireError> {
        let declaration = infer_declaration(
            &self.name,
            &self.params,
            self.doc.as_deref(),
            self.description.as_deref(),
        )?;
        let handler = self.handler.ok_or_else(|| {
            ToolwireError::registration(format!("tool `{}` has no handler", declaration.name))
        })?;
        Ok(FunctionTool::new(declaration, handler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn add_tool() -> FunctionTool {
        ToolBuilder::new("add")
            .doc("Adds two numbers\n@param {number} a first\n@param {number} b second")
            .param(ParamSpec::new("a"))
            .param(ParamSpec::new("b").default_value(json!(10)))
            .handler(|args| async move {
                let a = args.get("a").and_then(Value::as_f64).unwrap_or_default();
                let b = args.get("b").and_then(Value::as_f64).unwrap_or_default();
                Ok(json!(a + b))
            })
            .build()
            .unwrap()
    }

    #[test]
    fn builder_infers_declaration() {
        let tool = add_tool();
        assert_eq!(tool.name(), "add");
        assert_eq!(tool.description(), "Adds two numbers");
        let schema = tool.parameters_schema();
        assert_eq!(schema["properties"]["a"]["type"], "number");
        assert_eq!(schema["required"], json!(["a"]));
    }

    #[tokio::test]
    async fn defaults_are_filled_before_the_call() {
        let tool = add_tool();
        let out = tool.invoke(json!({"a": 1})).await.unwrap();
        assert_eq!(out, json!(11.0));
        let out = tool.invoke(json!({"a": 1, "b": 2})).await.unwrap();
        assert_eq!(out, json!(3.0));
    }

    #[tokio::test]
    async fn non_object_arguments_are_rejected() {
        let err = add_tool().invoke(json!([1, 2])).await.unwrap_err();
        assert!(matches!(err, ToolwireError::SchemaValidation { .. }));
    }

    #[test]
    fn builder_without_handler_fails() {
        let err = ToolBuilder::new("noop").build().unwrap_err();
        assert!(matches!(err, ToolwireError::Registration { .. }));
    }

    #[derive(Deserialize, JsonSchema)]
    struct EchoArgs {
        message: String,
        #[serde(default)]
        times: usize,
    }

    #[tokio::test]
    async fn typed_tool_deserializes_arguments() {
        let tool = FunctionTool::typed("echo", "Echoes", |args: EchoArgs| async move {
            Ok::<_, ToolwireError>(args.message.repeat(args.times.max(1)))
        })
        .unwrap();

        assert_eq!(tool.declaration().required_parameters(), vec!["message"]);
        let out = tool.invoke(json!({"message": "hi", "times": 2})).await.unwrap();
        assert_eq!(out, json!("hihi"));

        let err = tool.invoke(json!({"times": 2})).await.unwrap_err();
        assert!(matches!(err, ToolwireError::SchemaValidation { ref tool, .. } if tool == "echo"));
    }
}
