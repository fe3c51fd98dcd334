// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the registry, the built-in catalog, the MCP manager,
//! and the resolver.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use tokio_util::sync::CancellationToken;

use crate::error::{ErrorKind, ToolwireError};

/// Logical type of a tool parameter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    /// Maps a static type annotation to a logical type.
    ///
    /// Accepts Rust spellings (`i64`, `Vec<String>`, `Option<bool>`,
    /// `HashMap<String, Value>`) as well as JSON-Schema and TypeScript/JSDoc
    /// spellings (`integer`, `string[]`, `Array<number>`, `Record<..>`).
    /// Unrecognized annotations map to [`ParamType::String`].
    pub fn from_annotation(annotation: &str) -> Self {
        let mut ty = annotation.trim().trim_start_matches('&').trim();
        if let Some(inner) = strip_generic(ty, "Option") {
            ty = inner.trim().trim_start_matches('&').trim();
        }
        let lower = ty.to_ascii_lowercase();
        let lower = lower.trim_start_matches("mut ").trim();

        if lower.ends_with("[]")
            || lower.starts_with('[')
            || lower == "array"
            || ["vec<", "array<", "vecdeque<", "hashset<", "btreeset<"]
                .iter()
                .any(|p| lower.starts_with(p))
        {
            return Self::Array;
        }

        if lower.starts_with('{')
            || ["hashmap<", "btreemap<", "map<", "record<"]
                .iter()
                .any(|p| lower.starts_with(p))
        {
            return Self::Object;
        }

        match lower {
            "string" | "str" | "char" | "pathbuf" | "path" | "cow<str>" => Self::String,
            "number" | "integer" | "int" | "float" | "double" | "bigint" | "i8" | "i16"
            | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64" | "u128"
            | "usize" | "f32" | "f64" => Self::Number,
            "bool" | "boolean" => Self::Boolean,
            "object" | "map" | "value" | "serde_json::value" | "json" => Self::Object,
            _ => Self::String,
        }
    }
}

fn strip_generic<'a>(ty: &'a str, wrapper: &str) -> Option<&'a str> {
    ty.strip_prefix(wrapper)?
        .trim_start()
        .strip_prefix('<')?
        .strip_suffix('>')
}

/// One parameter of a tool's input contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub required: bool,
}

/// Typed description of a tool's inputs.
///
/// Serializes to a JSON Schema object via [`ParameterSchema::to_json_schema`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub properties: Vec<ParameterProperty>,
    /// When false, the emitted schema rejects undeclared parameters.
    #[serde(default = "default_true")]
    pub allow_additional: bool,
}

fn default_true() -> bool {
    true
}

impl ParameterSchema {
    /// Creates an empty schema that accepts additional properties.
    pub fn new() -> Self {
        Self {
            properties: Vec::new(),
            allow_additional: true,
        }
    }

    /// Adds a property, builder style.
    pub fn with_property(mut self, property: ParameterProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Rejects parameters that are not declared.
    pub fn closed(mut self) -> Self {
        self.allow_additional = false;
        self
    }

    /// Names of all required parameters, in declaration order.
    pub fn required(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&ParameterProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Renders the schema in the JSON Schema shape models expect.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for prop in &self.properties {
            let mut entry = Map::new();
            entry.insert("type".into(), Value::String(prop.param_type.to_string()));
            entry.insert(
                "description".into(),
                Value::String(prop.description.clone()),
            );
            if let Some(values) = &prop.enum_values {
                entry.insert("enum".into(), Value::Array(values.clone()));
            }
            if let Some(default) = &prop.default {
                entry.insert("default".into(), default.clone());
            }
            properties.insert(prop.name.clone(), Value::Object(entry));
        }

        let required: Vec<Value> = self
            .required()
            .into_iter()
            .map(|name| Value::String(name.to_string()))
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), Value::String("object".into()));
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), Value::Array(required));
        if !self.allow_additional {
            schema.insert("additionalProperties".into(), Value::Bool(false));
        }
        Value::Object(schema)
    }
}

/// The unit exchanged with the model: a tool's name, description, and input schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolDeclaration {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON Schema object describing the tool's arguments.
    #[serde(default = "empty_object_schema")]
    pub parameters: Value,
}

/// `{"type": "object", "properties": {}}`, used when a backend declares no schema.
pub fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

impl ToolDeclaration {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Builds a declaration from a typed schema.
    pub fn from_schema(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: &ParameterSchema,
    ) -> Self {
        Self::new(name, description, schema.to_json_schema())
    }

    /// Names listed in the schema's `required` array.
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// A model-issued request to run a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl CallRequest {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Caller-supplied bounds for one invocation.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Upper bound on the call; falls back to the component's default.
    pub timeout: Option<Duration>,
    /// Cancelling this token abandons the in-flight call.
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            cancel: None,
        }
    }

    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Which backend served a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "server", rename_all = "snake_case")]
pub enum ToolSource {
    Mcp(String),
    Registry,
    Builtin,
}

/// Normalized outcome of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallOutcome {
    Success {
        content: Value,
    },
    Failure {
        kind: ErrorKind,
        message: String,
        timed_out: bool,
    },
}

/// The envelope returned for every routed call, whatever the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    pub tool: String,
    pub source: ToolSource,
    #[serde(flatten)]
    pub outcome: CallOutcome,
}

impl CallResult {
    pub fn success(tool: impl Into<String>, source: ToolSource, content: Value) -> Self {
        Self {
            tool: tool.into(),
            source,
            outcome: CallOutcome::Success { content },
        }
    }

    /// Folds an execution-time error into a failed result.
    pub fn failure(tool: impl Into<String>, source: ToolSource, error: &ToolwireError) -> Self {
        Self {
            tool: tool.into(),
            source,
            outcome: CallOutcome::Failure {
                kind: error.kind(),
                message: error.to_string(),
                timed_out: error.is_timeout(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CallOutcome::Success { .. })
    }

    /// The success payload, if any.
    pub fn content(&self) -> Option<&Value> {
        match &self.outcome {
            CallOutcome::Success { content } => Some(content),
            CallOutcome::Failure { .. } => None,
        }
    }

    /// The failure classification, if the call failed.
    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match &self.outcome {
            CallOutcome::Success { .. } => None,
            CallOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self.outcome, CallOutcome::Failure { timed_out: true, .. })
    }

    /// Text to hand back to the model: string payloads verbatim, structured
    /// payloads as compact JSON, failures as their message.
    pub fn text(&self) -> String {
        match &self.outcome {
            CallOutcome::Success {
                content: Value::String(s),
            } => s.clone(),
            CallOutcome::Success { content } => content.to_string(),
            CallOutcome::Failure { message, .. } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn annotation_mapping_covers_common_spellings() {
        assert_eq!(ParamType::from_annotation("String"), ParamType::String);
        assert_eq!(ParamType::from_annotation("&str"), ParamType::String);
        assert_eq!(ParamType::from_annotation("i64"), ParamType::Number);
        assert_eq!(ParamType::from_annotation("integer"), ParamType::Number);
        assert_eq!(ParamType::from_annotation("f32"), ParamType::Number);
        assert_eq!(ParamType::from_annotation("boolean"), ParamType::Boolean);
        assert_eq!(ParamType::from_annotation("Option<bool>"), ParamType::Boolean);
        assert_eq!(ParamType::from_annotation("Vec<String>"), ParamType::Array);
        assert_eq!(ParamType::from_annotation("string[]"), ParamType::Array);
        assert_eq!(ParamType::from_annotation("Array<number>"), ParamType::Array);
        assert_eq!(
            ParamType::from_annotation("HashMap<String, Value>"),
            ParamType::Object
        );
        assert_eq!(ParamType::from_annotation("object"), ParamType::Object);
    }

    #[test]
    fn unrecognized_annotation_defaults_to_string() {
        assert_eq!(ParamType::from_annotation("Widget"), ParamType::String);
        assert_eq!(ParamType::from_annotation(""), ParamType::String);
    }

    #[test]
    fn schema_renders_required_and_enum() {
        let schema = ParameterSchema::new()
            .with_property(ParameterProperty {
                name: "city".into(),
                param_type: ParamType::String,
                description: "City name".into(),
                enum_values: None,
                default: None,
                required: true,
            })
            .with_property(ParameterProperty {
                name: "units".into(),
                param_type: ParamType::String,
                description: "Units".into(),
                enum_values: Some(vec![json!("metric"), json!("imperial")]),
                default: Some(json!("metric")),
                required: false,
            });

        let json = schema.to_json_schema();
        assert_eq!(json["type"], "object");
        assert_eq!(json["required"], json!(["city"]));
        assert_eq!(json["properties"]["units"]["enum"], json!(["metric", "imperial"]));
        assert_eq!(json["properties"]["units"]["default"], "metric");
        assert!(json.get("additionalProperties").is_none());
        assert_eq!(schema.closed().to_json_schema()["additionalProperties"], false);
    }

    #[test]
    fn declaration_reads_required_parameters() {
        let decl = ToolDeclaration::new(
            "t",
            "d",
            json!({"type": "object", "properties": {}, "required": ["a", "b"]}),
        );
        assert_eq!(decl.required_parameters(), vec!["a", "b"]);
    }

    #[test]
    fn call_result_failure_carries_kind_and_timeout_flag() {
        let err = ToolwireError::Timeout {
            tool: "code_execution".into(),
            duration: Duration::from_millis(50),
        };
        let result = CallResult::failure("code_execution", ToolSource::Builtin, &err);
        assert!(!result.is_success());
        assert_eq!(result.failure_kind(), Some(ErrorKind::Execution));
        assert!(result.timed_out());
        assert!(result.text().contains("timed out"));
    }

    #[test]
    fn call_result_serializes_with_status_tag() {
        let ok = CallResult::success("echo", ToolSource::Mcp("fs".into()), json!("hi"));
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["content"], "hi");
        assert_eq!(value["source"]["kind"], "mcp");
        assert_eq!(value["source"]["server"], "fs");
    }
}
