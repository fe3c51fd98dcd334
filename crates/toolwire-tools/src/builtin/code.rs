// SPDX-FileCopyrightText: 2026 Toolwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in sandboxed code execution tool.
//!
//! Writes the snippet into a scratch directory owned by the tool instance and
//! runs it with the configured interpreter in its own process group. When
//! the time limit expires the whole group is killed and reaped, so a snippet
//! that forks cannot outlive the call.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::AbortHandle;
use toolwire_config::CodeExecutionConfig;
use toolwire_core::{ParamType, ParameterProperty, ParameterSchema, ToolwireError};
use tracing::{debug, warn};

use crate::tool::Tool;

pub const NAME: &str = "code_execution";

pub const DESCRIPTION: &str = "Execute a code snippet in a sandboxed scratch directory and return \
     its stdout, stderr and exit code. Supports python, javascript and bash.";

const LANGUAGES: &[&str] = &["python", "javascript", "bash"];

/// Typed parameter schema for `code_execution`.
pub fn schema() -> ParameterSchema {
    ParameterSchema::new()
        .with_property(ParameterProperty {
            name: "code".into(),
            param_type: ParamType::String,
            description: "Source code to execute".into(),
            enum_values: None,
            default: None,
            required: true,
        })
        .with_property(ParameterProperty {
            name: "language".into(),
            param_type: ParamType::String,
            description: "Interpreter to run the code with".into(),
            enum_values: Some(LANGUAGES.iter().map(|l| json!(l)).collect()),
            default: Some(json!("python")),
            required: false,
        })
        .closed()
}

/// Runs code snippets under a wall-clock limit.
pub struct CodeExecutionTool {
    config: CodeExecutionConfig,
    workdir: TempDir,
    counter: AtomicU64,
}

impl CodeExecutionTool {
    /// Allocates the scratch directory; it is removed when the tool drops.
    pub fn new(config: CodeExecutionConfig) -> Result<Self, ToolwireError> {
        let workdir = tempfile::Builder::new()
            .prefix("toolwire-code-")
            .tempdir()
            .map_err(|e| ToolwireError::Execution {
                tool: NAME.to_string(),
                message: format!("failed to create scratch directory: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            config,
            workdir,
            counter: AtomicU64::new(0),
        })
    }

    pub fn workdir(&self) -> &std::path::Path {
        self.workdir.path()
    }

    fn interpreter(&self, language: &str) -> Option<(&str, &'static str)> {
        match language {
            "python" => Some((self.config.python.as_str(), "py")),
            "javascript" => Some((self.config.node.as_str(), "js")),
            "bash" => Some((self.config.bash.as_str(), "sh")),
            _ => None,
        }
    }

    async fn write_source(&self, code: &str, extension: &str) -> Result<PathBuf, ToolwireError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let path = self.workdir.path().join(format!("snippet_{n}.{extension}"));
        tokio::fs::write(&path, code)
            .await
            .map_err(|e| ToolwireError::Execution {
                tool: NAME.to_string(),
                message: format!("failed to write source file: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(path)
    }

    fn truncate(&self, bytes: Vec<u8>) -> String {
        let limit = self.config.max_output_bytes;
        let text = String::from_utf8_lossy(&bytes);
        if text.len() <= limit {
            return text.into_owned();
        }
        let mut cut = limit;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}...\n[output truncated from {} to {} bytes]",
            &text[..cut],
            text.len(),
            limit
        )
    }
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader
        && let Err(e) = reader.read_to_end(&mut buf).await
    {
        warn!(error = %e, "failed to read child output");
    }
    buf
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        debug!(pid, error = %e, "process group already gone");
    }
}

/// The snippet's process group and output readers.
///
/// Dropping it kills the group and stops the readers, so a caller that
/// abandons the call early leaves nothing running.
struct ProcessGroup {
    pid: Option<u32>,
    readers: Vec<AbortHandle>,
}

impl ProcessGroup {
    fn kill(&mut self) {
        #[cfg(unix)]
        {
            if let Some(pid) = self.pid.take() {
                kill_process_group(pid);
            }
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
        for reader in &self.readers {
            reader.abort();
        }
    }
}

#[async_trait]
impl Tool for CodeExecutionTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        schema().to_json_schema()
    }

    async fn invoke(&self, input: Value) -> Result<Value, ToolwireError> {
        let code = input["code"]
            .as_str()
            .ok_or_else(|| ToolwireError::execution(NAME, "missing required 'code' parameter"))?;
        let language = input["language"].as_str().unwrap_or("python");
        let (interpreter, extension) = self.interpreter(language).ok_or_else(|| {
            ToolwireError::execution(NAME, format!("unsupported language '{language}'"))
        })?;

        let source = self.write_source(code, extension).await?;

        let mut command = Command::new(interpreter);
        command
            .arg(&source)
            .current_dir(self.workdir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| ToolwireError::Execution {
            tool: NAME.to_string(),
            message: format!("failed to start {interpreter}: {e}"),
            source: Some(Box::new(e)),
        })?;
        let pid = child.id();
        debug!(language, ?pid, "started code execution");

        let stdout = tokio::spawn(read_all(child.stdout.take()));
        let stderr = tokio::spawn(read_all(child.stderr.take()));
        let mut group = ProcessGroup {
            pid,
            readers: vec![stdout.abort_handle(), stderr.abort_handle()],
        };

        let limit = self.config.timeout();
        let status = match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => status.map_err(|e| ToolwireError::Execution {
                tool: NAME.to_string(),
                message: format!("failed to wait for interpreter: {e}"),
                source: Some(Box::new(e)),
            })?,
            Err(_) => {
                group.kill();
                if let Err(e) = child.kill().await {
                    debug!(error = %e, "child already exited");
                }
                warn!(language, timeout = ?limit, "code execution timed out");
                return Err(ToolwireError::Timeout {
                    tool: NAME.to_string(),
                    duration: limit,
                });
            }
        };

        // Background jobs left behind by the snippet would hold the pipes open.
        group.kill();

        let stdout = self.truncate(stdout.await.unwrap_or_default());
        let stderr = self.truncate(stderr.await.unwrap_or_default());
        let exit_code = status.code().unwrap_or(-1);

        if !status.success() {
            return Err(ToolwireError::execution(
                NAME,
                format!("exit code {exit_code}: {}", stderr.trim_end()),
            ));
        }

        Ok(json!({
            "stdout": stdout,
            "stderr": stderr,
            "exit_code": exit_code,
        }))
    }
}
