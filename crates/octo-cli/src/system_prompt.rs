//! Assembles the system prompt (§4.D): user name, each enabled tool's
//! schema rendered as TypeScript-like text, the plan-mode directive when
//! active, discovered instruction files, and the cwd listing.

use std::path::Path;
use std::path::PathBuf;

use octo_protocol::Mode;
use octo_tools::ToolRegistry;

const INSTRUCTION_FILE_NAMES: &[&str] = &["OCTO.md", "CLAUDE.md", "AGENTS.md"];

pub struct SystemPromptInputs<'a> {
    pub user_name: &'a str,
    pub mode: Mode,
    pub plan_file_path: Option<&'a str>,
    pub workspace: &'a Path,
    pub cwd_entries: &'a [String],
    /// Set when the previous turn's windowing dropped oldest history pairs
    /// to fit the context budget (§4.F), so the model knows older turns are
    /// no longer in view.
    pub windowing_notice: bool,
}

pub fn build(registry: &ToolRegistry, inputs: &SystemPromptInputs<'_>) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!("You are Octo, an interactive terminal coding agent helping {}.\n\n", inputs.user_name));

    prompt.push_str("## Tools\n\n");
    let mut names: Vec<_> = registry.names().collect();
    names.sort();
    for name in names {
        let tool = registry.get(name).expect("name came from registry");
        prompt.push_str(&format!("### {name}\n```ts\n{}\n```\n\n", render_schema_as_ts(&tool.schema())));
    }

    if inputs.windowing_notice {
        prompt.push_str(
            "## Context window\n\nOlder turns were dropped from history to fit the context \
             window; do not assume the full conversation is still visible.\n\n",
        );
    }

    if inputs.mode.mutations_disabled() {
        prompt.push_str("## Plan mode\n\n");
        prompt.push_str("Mutating tools are disabled. Use `write-plan` to record the proposed steps");
        if let Some(path) = inputs.plan_file_path {
            prompt.push_str(&format!(" at {path}"));
        }
        prompt.push_str(".\n\n");
    }

    let instructions = discover_instruction_files(inputs.workspace);
    if !instructions.is_empty() {
        prompt.push_str("## Project instructions found\n\n");
        for path in &instructions {
            prompt.push_str(&format!("- {}\n", path.display()));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("## Working directory: {}\n\n", inputs.workspace.display()));
    for entry in inputs.cwd_entries {
        prompt.push_str(&format!("- {entry}\n"));
    }

    prompt
}

/// Walks from `start` upward to the home directory, collecting any
/// instruction file that exists at each level (§4.D).
fn discover_instruction_files(start: &Path) -> Vec<PathBuf> {
    let home = dirs::home_dir();
    let mut found = Vec::new();
    let mut dir = Some(start.to_path_buf());
    while let Some(current) = dir {
        for name in INSTRUCTION_FILE_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                found.push(candidate);
            }
        }
        if home.as_deref() == Some(current.as_path()) {
            break;
        }
        dir = current.parent().map(Path::to_path_buf);
    }
    found
}

/// Minimal JSON-schema-to-TypeScript-ish renderer; good enough for the
/// system prompt's illustrative purpose, not a full type checker.
fn render_schema_as_ts(schema: &serde_json::Value) -> String {
    let Some(properties) = schema.get("properties").and_then(|v| v.as_object()) else {
        return "{}".to_string();
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(|v| v.as_array())
        .map(|a| a.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    let mut out = String::from("{\n");
    for (key, value) in properties {
        let optional = if required.contains(&key.as_str()) { "" } else { "?" };
        let ty = value.get("type").and_then(|v| v.as_str()).unwrap_or("any");
        out.push_str(&format!("  {key}{optional}: {ty};\n"));
    }
    out.push('}');
    out
}
