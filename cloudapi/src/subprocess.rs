//! `SubprocessCommand`
//! -------------------
//! A configured external command invoked for its stdout, mirroring
//! original_source `command/command.go`'s `Command{Path,Args}` plus
//! `GetFloat`/`GetString`. Reused for both CPU-util metric reads
//! (`MetricSource`) and AMI resolution (`AmiResolver`), since both are
//! "run this command, trim its stdout, parse it" in the original.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command as TokioCommand;

use crate::error::CloudError;
use crate::traits::{AmiResolver, HookRunner, MetricSource};
use crate::types::HookEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubprocessCommand {
    pub path: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl SubprocessCommand {
    pub fn new(path: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            path: path.into(),
            args,
        }
    }

    async fn run_capturing_stdout(&self, stdin: Option<&str>) -> Result<String, CloudError> {
        use tokio::io::AsyncWriteExt;
        use std::process::Stdio;

        let mut child = TokioCommand::new(&self.path)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CloudError::SubprocessSpawn(format!("{}: {e}", self.path)))?;

        if let Some(input) = stdin {
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(input.as_bytes())
                    .await
                    .map_err(|e| CloudError::SubprocessSpawn(format!("{}: {e}", self.path)))?;
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| CloudError::SubprocessSpawn(format!("{}: {e}", self.path)))?;

        if !output.status.success() {
            return Err(CloudError::HookFailed {
                command: self.path.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_end_matches('\n')
            .to_string())
    }

    pub async fn get_float(&self) -> Result<f64, CloudError> {
        let raw = self.run_capturing_stdout(None).await?;
        raw.parse::<f64>().map_err(|source| CloudError::SubprocessOutput {
            path: self.path.clone(),
            raw,
            source,
        })
    }

    pub async fn get_string(&self) -> Result<String, CloudError> {
        self.run_capturing_stdout(None).await
    }
}

#[async_trait]
impl MetricSource for SubprocessCommand {
    async fn read(&self) -> Result<f64, CloudError> {
        self.get_float().await
    }
}

#[async_trait]
impl AmiResolver for SubprocessCommand {
    async fn resolve(&self) -> Result<String, CloudError> {
        self.get_string().await
    }
}

#[async_trait]
impl HookRunner for SubprocessCommand {
    async fn run(&self, event: &HookEvent) -> Result<(), CloudError> {
        let stdin = serde_json::to_string(event)
            .map_err(|e| CloudError::Api(format!("encoding hook event: {e}")))?;
        self.run_capturing_stdout(Some(&stdin)).await?;
        Ok(())
    }
}

/// Runs an ordered list of hook commands, each fed the same event. Any
/// failing command aborts the remaining commands (§4.7: failures
/// propagate).
pub struct OrderedHookRunner {
    pub commands: Vec<SubprocessCommand>,
}

#[async_trait]
impl HookRunner for OrderedHookRunner {
    async fn run(&self, event: &HookEvent) -> Result<(), CloudError> {
        for command in &self.commands {
            command.run(event).await?;
        }
        Ok(())
    }
}
