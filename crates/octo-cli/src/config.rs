//! CLI configuration: command-line flags plus the environment variables
//! they fall back to. Config loading itself is out of core scope (§1); this
//! is the thin layer an external driver is expected to own.

use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use octo_protocol::Mode;
use octo_providers::ReasoningEffort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    Openai,
    Anthropic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliMode {
    Collaboration,
    Unchained,
    Plan,
}

impl From<CliMode> for Mode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Collaboration => Mode::Collaboration,
            CliMode::Unchained => Mode::Unchained,
            CliMode::Plan => Mode::Plan,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliReasoningEffort {
    Low,
    Medium,
    High,
}

impl From<CliReasoningEffort> for ReasoningEffort {
    fn from(effort: CliReasoningEffort) -> Self {
        match effort {
            CliReasoningEffort::Low => ReasoningEffort::Low,
            CliReasoningEffort::Medium => ReasoningEffort::Medium,
            CliReasoningEffort::High => ReasoningEffort::High,
        }
    }
}

/// Octo: an interactive terminal coding agent.
#[derive(Debug, Parser)]
#[command(name = "octo", about = "An interactive terminal coding agent")]
pub struct Args {
    /// Workspace root; defaults to the current directory.
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Which wire format to speak to the model over.
    #[arg(long, value_enum, default_value = "anthropic")]
    pub provider: Provider,

    /// Model name sent on the wire.
    #[arg(long, default_value = "claude-sonnet-4-5")]
    pub model: String,

    /// Smaller/cheaper model used for the JSON/diff autofixers and history
    /// compaction's summarization call (§4.H, §4.I). Defaults to a small
    /// model for the active provider if unset.
    #[arg(long)]
    pub small_model: Option<String>,

    /// Base URL of the provider's API.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Confirmation/mutation policy for this session.
    #[arg(long, value_enum, default_value = "collaboration")]
    pub mode: CliMode,

    /// Only meaningful in `--mode plan`: where the plan is written.
    #[arg(long)]
    pub plan_file: Option<PathBuf>,

    /// Requested reasoning effort, mapped to a thinking-token budget.
    #[arg(long, value_enum)]
    pub reasoning_effort: Option<CliReasoningEffort>,

    /// Model context window, used for windowing and response capping.
    #[arg(long, default_value_t = 128_000)]
    pub context_window_tokens: u32,

    /// Compact history once the rough token estimate passes this count.
    #[arg(long, default_value_t = 100_000)]
    pub compaction_threshold_tokens: usize,

    /// Your display name, included in the system prompt.
    #[arg(long, default_value = "user")]
    pub user_name: String,

    /// Read one prompt from stdin (or this flag) non-interactively, run
    /// until the model emits a turn with no tool call, then exit.
    #[arg(long)]
    pub prompt: Option<String>,
}

impl Args {
    pub fn api_key(&self) -> anyhow::Result<String> {
        let var = match self.provider {
            Provider::Openai => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        };
        std::env::var(var).map_err(|_| anyhow::anyhow!("{var} is not set"))
    }

    pub fn small_model(&self) -> String {
        self.small_model.clone().unwrap_or_else(|| {
            match self.provider {
                Provider::Openai => "gpt-4o-mini",
                Provider::Anthropic => "claude-3-5-haiku-20241022",
            }
            .to_string()
        })
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            match self.provider {
                Provider::Openai => "https://api.openai.com/v1/chat/completions",
                Provider::Anthropic => "https://api.anthropic.com/v1/messages",
            }
            .to_string()
        })
    }
}
