// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in web search tool.
//!
//! Queries a DuckDuckGo Instant Answer compatible endpoint and normalizes the
//! response into `{query, results: [{title, url, snippet}]}`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use toolwire_config::WebSearchConfig;
use toolwire_core::{ParamType, ParameterProperty, ParameterSchema, ToolwireError};
use tracing::debug;

use crate::tool::Tool;

pub const NAME: &str = "web_search";

pub const DESCRIPTION: &str = "Search the web and return the top results with title, URL and snippet.";

/// Typed parameter schema for `web_search`; the result count defaults to the
/// configured `max_results`.
pub fn schema(config: &WebSearchConfig) -> ParameterSchema {
    ParameterSchema::new()
        .with_property(ParameterProperty {
            name: "query".into(),
            param_type: ParamType::String,
            description: "Search query".into(),
            enum_values: None,
            default: None,
            required: true,
        })
        .with_property(ParameterProperty {
            name: "max_results".into(),
            param_type: ParamType::Number,
            description: "Maximum number of results to return".into(),
            enum_values: None,
            default: Some(json!(config.max_results)),
            required: false,
        })
        .closed()
}

/// One normalized search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default, rename = "AbstractText")]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    results: Vec<Topic>,
    #[serde(default)]
    related_topics: Vec<Topic>,
}

/// Either a leaf result or a named group of nested topics.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Topic {
    #[serde(default)]
    text: String,
    #[serde(default, rename = "FirstURL")]
    first_url: String,
    #[serde(default)]
    topics: Vec<Topic>,
}

impl InstantAnswer {
    fn into_results(self, limit: usize) -> Vec<SearchResult> {
        let mut out = Vec::new();
        if !self.abstract_url.is_empty() {
            out.push(SearchResult {
                title: self.heading,
                url: self.abstract_url,
                snippet: self.abstract_text,
            });
        }
        let mut stack: Vec<Topic> = self
            .results
            .into_iter()
            .chain(self.related_topics)
            .rev()
            .collect();
        while let Some(topic) = stack.pop() {
            if out.len() >= limit {
                break;
            }
            if !topic.topics.is_empty() {
                stack.extend(topic.topics.into_iter().rev());
                continue;
            }
            if topic.first_url.is_empty() {
                continue;
            }
            let title = topic
                .text
                .split(" - ")
                .next()
                .unwrap_or_default()
                .to_string();
            out.push(SearchResult {
                title,
                url: topic.first_url,
                snippet: topic.text,
            });
        }
        out.truncate(limit);
        out
    }
}

/// Runs searches against the configured endpoint.
pub struct WebSearchTool {
    client: reqwest::Client,
    config: WebSearchConfig,
}

impl WebSearchTool {
    pub fn new(config: WebSearchConfig) -> Result<Self, ToolwireError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("toolwire/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ToolwireError::Execution {
                tool: NAME.to_string(),
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client, config })
    }

    fn request_error(&self, e: reqwest::Error) -> ToolwireError {
        if e.is_timeout() {
            ToolwireError::Timeout {
                tool: NAME.to_string(),
                duration: Duration::from_secs(self.config.timeout_secs),
            }
        } else {
            ToolwireError::Execution {
                tool: NAME.to_string(),
                message: format!("search request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        schema(&self.config).to_json_schema()
    }

    async fn invoke(&self, input: Value) -> Result<Value, ToolwireError> {
        let query = input["query"]
            .as_str()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ToolwireError::execution(NAME, "missing required 'query' parameter"))?;
        let limit = input["max_results"]
            .as_u64()
            .map(|n| n as usize)
            .unwrap_or(self.config.max_results)
            .max(1);

        let url = reqwest::Url::parse_with_params(
            &self.config.endpoint,
            &[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ],
        )
        .map_err(|e| ToolwireError::Execution {
            tool: NAME.to_string(),
            message: format!("invalid search endpoint: {e}"),
            source: Some(Box::new(e)),
        })?;

        debug!(query, limit, "running web search");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolwireError::execution(
                NAME,
                format!("search endpoint returned HTTP {status}"),
            ));
        }

        let answer: InstantAnswer = response.json().await.map_err(|e| self.request_error(e))?;
        let results = answer.into_results(limit);
        Ok(json!({ "query": query, "results": results }))
    }
}
