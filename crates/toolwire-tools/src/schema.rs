// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema inference for function tools.
//!
//! A tool's contract is derived from an explicit signature (an ordered list
//! of [`ParamSpec`]s) plus an optional documentation block in the familiar
//! `@param {type} name - description` style. Types come from the parameter's
//! own annotation, then the doc line's `{type}`, then default to `string`.
//! A parameter is required exactly when it has no default.
//!
//! Argument structs deriving `schemars::JsonSchema` can skip the signature
//! entirely via [`infer_from_json_schema`].

use std::collections::HashSet;

use schemars::JsonSchema;
use serde_json::Value;
use toolwire_core::{ParamType, ParameterProperty, ParameterSchema, ToolDeclaration, ToolwireError};

/// One parameter of a function tool's signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    /// Static type annotation, e.g. `i64`, `Vec<String>`, `number`.
    pub annotation: Option<String>,
    pub default: Option<Value>,
    pub enum_values: Option<Vec<Value>>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: None,
            enum_values: None,
        }
    }

    /// Sets the static type annotation.
    pub fn typed(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    /// Gives the parameter a default, which makes it optional.
    pub fn default_value(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Restricts the parameter to a fixed set of values.
    pub fn one_of(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.enum_values = Some(values.into_iter().collect());
        self
    }
}

/// A `@param` line from a documentation block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocParam {
    pub name: String,
    pub type_hint: Option<String>,
    pub description: String,
}

/// Parsed documentation block: free text plus `@param` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    pub description: String,
    pub params: Vec<DocParam>,
}

enum Section {
    Description,
    Param(usize),
    Ignored,
}

impl DocBlock {
    /// Parses a doc comment.
    ///
    /// Comment decorations (`/**`, `*/`, leading `*`, `///`, `//!`) are
    /// stripped. Continuation lines extend the preceding `@param`. Tags other
    /// than `@param` are skipped along with their continuation lines.
    pub fn parse(raw: &str) -> Self {
        let mut block = DocBlock::default();
        let mut description: Vec<&str> = Vec::new();
        let mut section = Section::Description;

        for line in raw.lines() {
            let line = strip_decoration(line);

            if let Some(tag_line) = line.strip_prefix('@') {
                let (tag, rest) = tag_line
                    .split_once(char::is_whitespace)
                    .unwrap_or((tag_line, ""));
                section = match (tag, parse_param_line(rest)) {
                    ("param" | "arg" | "argument", Some(param)) => {
                        block.params.push(param);
                        Section::Param(block.params.len() - 1)
                    }
                    _ => Section::Ignored,
                };
                continue;
            }

            if line.is_empty() {
                continue;
            }
            match section {
                Section::Description => description.push(line),
                Section::Param(idx) => {
                    let param = &mut block.params[idx];
                    if !param.description.is_empty() {
                        param.description.push(' ');
                    }
                    param.description.push_str(line);
                }
                Section::Ignored => {}
            }
        }

        block.description = description.join(" ");
        block
    }

    pub fn param(&self, name: &str) -> Option<&DocParam> {
        self.params.iter().find(|p| p.name == name)
    }
}

fn strip_decoration(line: &str) -> &str {
    let mut line = line.trim();
    for prefix in ["/**", "//!", "///", "/*"] {
        if let Some(rest) = line.strip_prefix(prefix) {
            line = rest.trim_start();
            break;
        }
    }
    if let Some(rest) = line.strip_suffix("*/") {
        line = rest.trim_end();
    }
    if let Some(rest) = line.strip_prefix('*') {
        line = rest.trim_start();
    }
    line
}

/// Parses `[{type}] name [-] description` (JSDoc `[name=default]` accepted).
fn parse_param_line(rest: &str) -> Option<DocParam> {
    let mut rest = rest.trim();
    let mut type_hint = None;

    if let Some(after_brace) = rest.strip_prefix('{') {
        let (ty, after) = after_brace.split_once('}')?;
        type_hint = Some(ty.trim().to_string()).filter(|t| !t.is_empty());
        rest = after.trim_start();
    }

    let (raw_name, description) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));
    let name = raw_name
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split('=')
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() {
        return None;
    }

    let description = description.trim();
    let description = description
        .strip_prefix('-')
        .map(str::trim_start)
        .unwrap_or(description);

    Some(DocParam {
        name: name.to_string(),
        type_hint,
        description: description.to_string(),
    })
}

/// Derives the typed parameter schema for a signature.
///
/// Fails with [`ToolwireError::Registration`] when the name is blank or a
/// parameter name repeats.
pub fn infer_schema(
    tool_name: &str,
    params: &[ParamSpec],
    doc: Option<&DocBlock>,
) -> Result<ParameterSchema, ToolwireError> {
    if tool_name.trim().is_empty() {
        return Err(ToolwireError::registration(
            "callable has no resolvable name",
        ));
    }

    let mut seen = HashSet::new();
    let mut schema = ParameterSchema::new();
    for spec in params {
        if spec.name.trim().is_empty() {
            return Err(ToolwireError::registration(format!(
                "tool `{tool_name}` has a parameter with an empty name"
            )));
        }
        if !seen.insert(spec.name.as_str()) {
            return Err(ToolwireError::registration(format!(
                "tool `{tool_name}` declares parameter `{}` more than once",
                spec.name
            )));
        }

        let documented = doc.and_then(|d| d.param(&spec.name));
        let param_type = spec
            .annotation
            .as_deref()
            .or_else(|| documented.and_then(|d| d.type_hint.as_deref()))
            .map(ParamType::from_annotation)
            .unwrap_or(ParamType::String);
        let description = documented
            .map(|d| d.description.clone())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format!("Parameter {}", spec.name));

        schema = schema.with_property(ParameterProperty {
            name: spec.name.clone(),
            param_type,
            description,
            enum_values: spec.enum_values.clone(),
            default: spec.default.clone(),
            required: spec.default.is_none(),
        });
    }
    Ok(schema)
}

/// Derives a full declaration for a signature.
///
/// Description precedence: `explicit_description`, then the doc block's free
/// text, then `"Function <name>"`.
pub fn infer_declaration(
    tool_name: &str,
    params: &[ParamSpec],
    doc: Option<&str>,
    explicit_description: Option<&str>,
) -> Result<ToolDeclaration, ToolwireError> {
    let doc = doc.map(DocBlock::parse);
    let schema = infer_schema(tool_name, params, doc.as_ref())?;
    let description = explicit_description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .or_else(|| doc.map(|d| d.description).filter(|d| !d.is_empty()))
        .unwrap_or_else(|| format!("Function {}", tool_name.trim()));
    Ok(ToolDeclaration::from_schema(
        tool_name.trim(),
        description,
        &schema,
    ))
}

/// Derives a declaration from an argument struct's `JsonSchema`.
///
/// Fields that are `Option` or carry `#[serde(default)]` come out optional,
/// everything else required. An empty `description` falls back to the
/// struct's doc comment, then to `"Function <name>"`.
pub fn infer_from_json_schema<T: JsonSchema>(
    tool_name: &str,
    description: &str,
) -> Result<ToolDeclaration, ToolwireError> {
    if tool_name.trim().is_empty() {
        return Err(ToolwireError::registration(
            "callable has no resolvable name",
        ));
    }

    let mut schema = serde_json::to_value(schemars::schema_for!(T)).map_err(|e| {
        ToolwireError::registration(format!("schema for `{tool_name}` is not JSON: {e}"))
    })?;
    let Some(obj) = schema.as_object_mut() else {
        return Err(ToolwireError::registration(format!(
            "schema for `{tool_name}` is not an object"
        )));
    };
    obj.remove("$schema");
    obj.remove("title");
    let doc_description = obj
        .remove("description")
        .and_then(|d| d.as_str().map(str::to_string));
    if obj.get("type").and_then(Value::as_str) != Some("object") {
        return Err(ToolwireError::registration(format!(
            "arguments of `{tool_name}` must be a struct"
        )));
    }
    obj.entry("properties")
        .or_insert_with(|| Value::Object(Default::default()));
    obj.entry("required")
        .or_insert_with(|| Value::Array(Vec::new()));

    let description = Some(description.trim())
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .or(doc_description)
        .unwrap_or_else(|| format!("Function {}", tool_name.trim()));

    Ok(ToolDeclaration::new(tool_name.trim(), description, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::json;

    const ADD_DOC: &str = r#"
        /**
         * Adds two numbers together.
         * Returns the sum.
         * @param {number} a - The first operand
         * @param {number} b The second operand,
         *   which defaults to zero
         * @param {string} ghost - Not in the signature
         * @returns {number} the sum
         *   spanning two lines
         */
    "#;

    #[test]
    fn doc_block_parses_description_and_params() {
        let doc = DocBlock::parse(ADD_DOC);
        assert_eq!(doc.description, "Adds two numbers together. Returns the sum.");
        assert_eq!(doc.params.len(), 3);
        assert_eq!(doc.params[0].name, "a");
        assert_eq!(doc.params[0].type_hint.as_deref(), Some("number"));
        assert_eq!(doc.params[0].description, "The first operand");
        assert_eq!(
            doc.params[1].description,
            "The second operand, which defaults to zero"
        );
    }

    #[test]
    fn rust_doc_comments_are_understood() {
        let doc = DocBlock::parse(
            "/// Greets someone.\n///\n/// @param name - who to greet\n/// @param [loud=false] shout it",
        );
        assert_eq!(doc.description, "Greets someone.");
        assert_eq!(doc.param("name").unwrap().description, "who to greet");
        assert_eq!(doc.param("loud").unwrap().description, "shout it");
        assert!(doc.param("name").unwrap().type_hint.is_none());
    }

    #[test]
    fn infers_types_required_and_descriptions() {
        let params = [
            ParamSpec::new("a").typed("f64"),
            ParamSpec::new("b").default_value(json!(0)),
        ];
        let decl = infer_declaration("add", &params, Some(ADD_DOC), None).unwrap();

        assert_eq!(decl.name, "add");
        assert_eq!(decl.description, "Adds two numbers together. Returns the sum.");
        assert_eq!(decl.parameters["properties"]["a"]["type"], "number");
        // Type for `b` comes from the doc line.
        assert_eq!(decl.parameters["properties"]["b"]["type"], "number");
        assert_eq!(decl.parameters["properties"]["b"]["default"], 0);
        assert_eq!(decl.required_parameters(), vec!["a"]);
        // Documented but absent from the signature.
        assert!(decl.parameters["properties"].get("ghost").is_none());
    }

    #[test]
    fn annotation_beats_doc_type() {
        let params = [ParamSpec::new("a").typed("bool")];
        let decl = infer_declaration("f", &params, Some("@param {number} a x"), None).unwrap();
        assert_eq!(decl.parameters["properties"]["a"]["type"], "boolean");
    }

    #[test]
    fn missing_doc_uses_placeholders() {
        let params = [ParamSpec::new("city"), ParamSpec::new("units").typed("Whatever")];
        let decl = infer_declaration("weather", &params, None, None).unwrap();
        assert_eq!(decl.description, "Function weather");
        assert_eq!(
            decl.parameters["properties"]["city"]["description"],
            "Parameter city"
        );
        // Unrecognized annotation falls back to string.
        assert_eq!(decl.parameters["properties"]["units"]["type"], "string");
        assert_eq!(decl.required_parameters(), vec!["city", "units"]);
    }

    #[test]
    fn explicit_description_wins() {
        let decl = infer_declaration("add", &[], Some(ADD_DOC), Some("Sum things")).unwrap();
        assert_eq!(decl.description, "Sum things");
    }

    #[test]
    fn enum_values_are_emitted() {
        let params = [ParamSpec::new("unit").one_of([json!("c"), json!("f")])];
        let decl = infer_declaration("convert", &params, None, None).unwrap();
        assert_eq!(
            decl.parameters["properties"]["unit"]["enum"],
            json!(["c", "f"])
        );
    }

    #[test]
    fn blank_name_is_registration_error() {
        let err = infer_declaration("  ", &[], None, None).unwrap_err();
        assert!(matches!(err, ToolwireError::Registration { .. }));
    }

    #[test]
    fn duplicate_parameter_is_registration_error() {
        let params = [ParamSpec::new("x"), ParamSpec::new("x")];
        let err = infer_declaration("dup", &params, None, None).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    /// Looks up the weather.
    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct WeatherArgs {
        /// City name
        city: String,
        #[serde(default)]
        days: u32,
        units: Option<String>,
    }

    #[test]
    fn json_schema_path_preserves_required() {
        let decl = infer_from_json_schema::<WeatherArgs>("weather", "").unwrap();
        assert_eq!(decl.description, "Looks up the weather.");
        assert_eq!(decl.required_parameters(), vec!["city"]);
        assert_eq!(decl.parameters["type"], "object");
        assert!(decl.parameters.get("$schema").is_none());
        assert_eq!(
            decl.parameters["properties"]["city"]["description"],
            "City name"
        );
    }

    proptest! {
        #[test]
        fn required_iff_no_default(defaults in proptest::collection::vec(any::<bool>(), 0..8)) {
            let params: Vec<ParamSpec> = defaults
                .iter()
                .enumerate()
                .map(|(i, has_default)| {
                    let spec = ParamSpec::new(format!("p{i}"));
                    if *has_default { spec.default_value(json!(i)) } else { spec }
                })
                .collect();

            let decl = infer_declaration("prop", &params, None, None).unwrap();
            let required = decl.required_parameters();
            let properties = decl.parameters["properties"].as_object().unwrap();
            prop_assert_eq!(properties.len(), params.len());
            for (i, has_default) in defaults.iter().enumerate() {
                let name = format!("p{i}");
                prop_assert_eq!(required.contains(&name.as_str()), !has_default);
            }
        }
    }
}
