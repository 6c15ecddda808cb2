//! Text generation service boundary.
//!
//! The workflow treats generation as an opaque prompt-to-text call. The
//! production implementation shells out to a non-interactive CLI (claude by
//! default) and parses its JSON result envelope.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates text for a prompt. No retry or timeout policy is imposed
    /// here; callers absorb failures into the workflow record.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// JSON result envelope emitted by `claude -p --output-format json`.
#[derive(Debug, Deserialize)]
struct GeneratorResult {
    result: String,
    is_error: bool,
    total_cost_usd: Option<f64>,
}

/// Generator backed by a non-interactive CLI invocation.
pub struct CliGenerator {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CliGenerator {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Default invocation: `claude -p <prompt> --output-format json`.
    pub fn claude() -> Self {
        Self::new(
            "claude",
            vec![
                "-p".to_string(),
                "--output-format".to_string(),
                "json".to_string(),
            ],
        )
    }
}

#[async_trait]
impl TextGenerator for CliGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        which::which(&self.command)
            .with_context(|| format!("Generator command not found: {}", self.command))?;

        let mut cmd = Command::new(&self.command);
        // The prompt is inserted after the prompt flag; remaining args follow.
        let mut args = self.args.iter();
        if let Some(first) = args.next() {
            cmd.arg(first).arg(prompt);
        } else {
            cmd.arg(prompt);
        }
        for arg in args {
            cmd.arg(arg);
        }
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(command = %self.command, "invoking generator");

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn {} process", self.command))?;
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "{} produced no output within {}s",
                    self.command,
                    self.timeout.as_secs()
                )
            })?
            .with_context(|| format!("Failed to wait for {} process", self.command))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            anyhow::bail!(
                "{} exited with status {}: {}",
                self.command,
                output.status,
                stderr
            );
        }

        let result: GeneratorResult = serde_json::from_str(&stdout)
            .with_context(|| format!("Failed to parse generator output as JSON: {}", stdout))?;

        if result.is_error {
            anyhow::bail!("Generator returned an error: {}", result.result);
        }

        if let Some(cost) = result.total_cost_usd {
            tracing::debug!(cost_usd = cost, "generator call complete");
        }

        Ok(result.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_envelope_parses() {
        let raw = r#"{"result": "Hi John,", "is_error": false, "total_cost_usd": 0.01}"#;
        let parsed: GeneratorResult = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.result, "Hi John,");
        assert!(!parsed.is_error);
        assert_eq!(parsed.total_cost_usd, Some(0.01));
    }

    #[test]
    fn test_result_envelope_without_cost() {
        let raw = r#"{"result": "text", "is_error": true}"#;
        let parsed: GeneratorResult = serde_json::from_str(raw).unwrap();
        assert!(parsed.is_error);
        assert!(parsed.total_cost_usd.is_none());
    }

    #[test]
    fn test_claude_default_invocation() {
        let generator = CliGenerator::claude();
        assert_eq!(generator.command, "claude");
        assert_eq!(generator.args[0], "-p");
        assert_eq!(generator.timeout, DEFAULT_TIMEOUT);
    }
}
