use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Workflow configuration, loaded from `reply.yaml`.
///
/// Every field is defaulted so the built-in configuration works with no
/// file present.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// When true, each supervisor decision is glossed by an extra
    /// generative status line. Advisory only; routing never consults it.
    #[serde(default)]
    pub narration: NarrationConfig,

    /// Optional cap on feedback-driven revisions. `None` (the default)
    /// permits unbounded revision loops, matching the original behavior.
    #[serde(default)]
    pub max_revisions: Option<u32>,

    /// Use the built-in fixture providers instead of real mail/calendar
    /// backends. Defaults to true until real providers are wired in.
    #[serde(default = "default_true")]
    pub use_fixtures: bool,
}

fn default_true() -> bool {
    true
}

// Must agree with the serde field defaults above, so a missing config file
// and an empty config file behave the same.
impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            narration: NarrationConfig::default(),
            max_revisions: None,
            use_fixtures: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorConfig {
    /// CLI command invoked for text generation.
    #[serde(default = "default_generator_command")]
    pub command: String,
    /// Arguments; the prompt is inserted after the first one.
    #[serde(default = "default_generator_args")]
    pub args: Vec<String>,
    /// Seconds to wait for generator output before giving up.
    #[serde(default = "default_generator_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_generator_command() -> String {
    "claude".to_string()
}

fn default_generator_args() -> Vec<String> {
    vec![
        "-p".to_string(),
        "--output-format".to_string(),
        "json".to_string(),
    ]
}

fn default_generator_timeout_secs() -> u64 {
    300
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: default_generator_command(),
            args: default_generator_args(),
            timeout_secs: default_generator_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NarrationConfig {
    #[serde(default)]
    pub enabled: bool,
}

impl WorkflowConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}
