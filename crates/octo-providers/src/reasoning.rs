use serde::Deserialize;
use serde::Serialize;

/// Reasoning effort requested from the model. The budget-token mapping is
/// empirical and kept in this one place (§9 design note).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    /// Anthropic `thinking.budget_tokens` for this effort level.
    pub const fn thinking_budget_tokens(self) -> u32 {
        match self {
            ReasoningEffort::Low => 2048,
            ReasoningEffort::Medium => 4096,
            ReasoningEffort::High => 8192,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_mapping_matches_spec() {
        assert_eq!(ReasoningEffort::Low.thinking_budget_tokens(), 2048);
        assert_eq!(ReasoningEffort::Medium.thinking_budget_tokens(), 4096);
        assert_eq!(ReasoningEffort::High.thinking_budget_tokens(), 8192);
    }
}
