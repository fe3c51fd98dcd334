// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Small function tools shared by the integration suites.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{json, Value};
use toolwire_core::ToolwireError;
use toolwire_tools::{FunctionTool, ParamSpec, ToolBuilder};

/// `add(a: number, b: number = 0)`.
pub fn add() -> Result<FunctionTool, ToolwireError> {
    ToolBuilder::new("add")
        .doc("Adds two numbers.\n@param {number} a first operand\n@param {number} b second operand")
        .param(ParamSpec::new("a").typed("f64"))
        .param(ParamSpec::new("b").typed("f64").default_value(json!(0)))
        .handler(|args| async move {
            let a = args.get("a").and_then(Value::as_f64).unwrap_or_default();
            let b = args.get("b").and_then(Value::as_f64).unwrap_or_default();
            Ok(json!(a + b))
        })
        .build()
}

/// `echo(message: string)`.
pub fn echo() -> Result<FunctionTool, ToolwireError> {
    ToolBuilder::new("echo")
        .doc("Echoes the message back.\n@param {string} message text to echo")
        .param(ParamSpec::new("message").typed("str"))
        .handler(|args| async move { Ok(args.get("message").cloned().unwrap_or(Value::Null)) })
        .build()
}

/// A tool named `name` whose handler always fails.
pub fn failing(name: &str) -> Result<FunctionTool, ToolwireError> {
    let tool_name = name.to_string();
    ToolBuilder::new(name)
        .description("Always fails")
        .handler(move |_| {
            let tool_name = tool_name.clone();
            async move { Err(ToolwireError::execution(tool_name, "boom")) }
        })
        .build()
}

/// A tool named `name` that sleeps for `delay` before answering `"done"`.
pub fn slow(name: &str, delay: Duration) -> Result<FunctionTool, ToolwireError> {
    ToolBuilder::new(name)
        .description("Sleeps before answering")
        .handler(move |_| async move {
            tokio::time::sleep(delay).await;
            Ok(json!("done"))
        })
        .build()
}

/// A tool named `name` that counts its invocations in `counter`.
pub fn counting(name: &str, counter: Arc<AtomicUsize>) -> Result<FunctionTool, ToolwireError> {
    ToolBuilder::new(name)
        .description("Counts invocations")
        .param(ParamSpec::new("value").typed("i64"))
        .handler(move |_| {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(json!(n))
            }
        })
        .build()
}
