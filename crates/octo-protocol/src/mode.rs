use serde::Deserialize;
use serde::Serialize;

/// Controls confirmation policy and which tools are enabled for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Prompt the user before running a mutating tool.
    Collaboration,
    /// Auto-confirm mutating tools; no prompts.
    Unchained,
    /// Collaboration plus: mutating tools disabled, `write-plan` bound to a file.
    Plan,
}

impl Mode {
    /// Whether mutating tools must be confirmed interactively in this mode.
    pub fn requires_confirmation(self) -> bool {
        matches!(self, Mode::Collaboration | Mode::Plan)
    }

    /// Whether mutating tools are disabled outright (plan mode).
    pub fn mutations_disabled(self) -> bool {
        matches!(self, Mode::Plan)
    }
}
