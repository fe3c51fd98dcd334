// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argument validation against a tool's JSON Schema.

use serde_json::Value;

use crate::error::ToolwireError;

/// Checks `args` against `schema` and returns every violation found.
///
/// An empty vector means the arguments conform. A schema that cannot be
/// compiled is reported as [`ToolwireError::Internal`], since it is a defect
/// in the declaration rather than in the caller's arguments.
pub fn schema_violations(schema: &Value, args: &Value) -> Result<Vec<String>, ToolwireError> {
    let validator = jsonschema::Validator::new(schema)
        .map_err(|e| ToolwireError::Internal(format!("invalid tool schema: {e}")))?;
    if validator.is_valid(args) {
        return Ok(Vec::new());
    }
    Ok(validator.iter_errors(args).map(|e| e.to_string()).collect())
}

/// Validates arguments for a registered tool.
///
/// Violations become [`ToolwireError::SchemaValidation`].
pub fn validate_arguments(tool: &str, schema: &Value, args: &Value) -> Result<(), ToolwireError> {
    let violations = schema_violations(schema, args)?;
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ToolwireError::SchemaValidation {
            tool: tool.to_string(),
            message: violations.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "number", "default": 5 }
            },
            "required": ["a"]
        })
    }

    #[test]
    fn accepts_conforming_arguments() {
        assert!(validate_arguments("t", &schema(), &json!({"a": "x"})).is_ok());
        assert!(validate_arguments("t", &schema(), &json!({"a": "x", "b": 2})).is_ok());
    }

    #[test]
    fn missing_required_is_schema_validation_error() {
        let err = validate_arguments("t", &schema(), &json!({"b": 1})).unwrap_err();
        assert!(matches!(err, ToolwireError::SchemaValidation { ref tool, .. } if tool == "t"));
        assert!(err.to_string().contains("\"a\""));
    }

    #[test]
    fn wrong_type_is_reported() {
        let violations = schema_violations(&schema(), &json!({"a": 3})).unwrap();
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn closed_schema_rejects_unknown_properties() {
        let closed = json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "required": [],
            "additionalProperties": false
        });
        let violations = schema_violations(&closed, &json!({"zzz": 1})).unwrap();
        assert!(!violations.is_empty());
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        assert!(validate_arguments("t", &schema(), &json!([1, 2])).is_err());
    }
}
