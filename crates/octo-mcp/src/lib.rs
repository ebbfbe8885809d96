//! MCP client interface, treated by the core as a plain RPC boundary.
//!
//! The dispatch layer never speaks the MCP wire protocol directly; it talks
//! to whatever implements [`McpClient`] (stdio subprocess, in-process test
//! double, ...) and formats typed content blocks to text itself.

mod error;

pub use error::McpError;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

type Result<T> = std::result::Result<T, McpError>;

/// One tool exposed by an MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Arguments for a `callTool` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolRequest {
    pub name: String,
    pub arguments: Value,
}

/// One block of a tool result. MCP allows mixed content types in one reply;
/// the dispatch layer stringifies whichever of these it receives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Image { data: String, mime_type: String },
    Audio { data: String, mime_type: String },
    Resource { uri: String, text: Option<String> },
    ResourceLink { uri: String },
}

impl ContentBlock {
    /// Render this block down to text for inclusion in a tool-output history item.
    pub fn to_text(&self) -> String {
        match self {
            ContentBlock::Text { text } => text.clone(),
            ContentBlock::Image { mime_type, .. } => format!("[image: {mime_type}]"),
            ContentBlock::Audio { mime_type, .. } => format!("[audio: {mime_type}]"),
            ContentBlock::Resource { uri, text } => {
                text.clone().unwrap_or_else(|| format!("[resource: {uri}]"))
            }
            ContentBlock::ResourceLink { uri } => format!("[resource link: {uri}]"),
        }
    }
}

/// Result of a `callTool` RPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub is_error: bool,
}

impl CallToolResult {
    /// Stringify every content block and join them, capped to `max_len` bytes.
    /// MCP responses are capped at the active model's context window.
    pub fn to_capped_text(&self, max_len: usize) -> String {
        let joined = self
            .content
            .iter()
            .map(ContentBlock::to_text)
            .collect::<Vec<_>>()
            .join("\n");
        if joined.len() > max_len {
            let mut truncated = joined.chars().take(max_len).collect::<String>();
            truncated.push_str("\n...[truncated]");
            truncated
        } else {
            joined
        }
    }
}

/// RPC boundary the dispatch layer consumes; implemented externally for a
/// stdio subprocess, SSE transport, or (in tests) an in-memory double.
#[async_trait]
pub trait McpClient: Send + Sync {
    /// The server name this client is bound to, used to namespace tool calls.
    fn server_name(&self) -> &str;

    async fn list_tools(&self) -> Result<Vec<McpToolInfo>>;

    async fn call_tool(&self, request: CallToolRequest) -> Result<CallToolResult>;
}

/// Sanitizes a server/tool name pair for inclusion in a composed tool name
/// such as the dispatch layer's `mcp` tool argument.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_name_replaces_unsafe_chars() {
        assert_eq!(sanitize_name("my server/tool"), "my_server_tool");
    }

    #[test]
    fn capped_text_truncates_long_joins() {
        let result = CallToolResult {
            content: vec![ContentBlock::Text {
                text: "x".repeat(100),
            }],
            is_error: false,
        };
        let capped = result.to_capped_text(10);
        assert!(capped.starts_with("xxxxxxxxxx"));
        assert!(capped.contains("[truncated]"));
    }

    #[test]
    fn mixed_content_blocks_stringify() {
        let result = CallToolResult {
            content: vec![
                ContentBlock::Text {
                    text: "hi".into(),
                },
                ContentBlock::Image {
                    data: "base64".into(),
                    mime_type: "image/png".into(),
                },
            ],
            is_error: false,
        };
        let text = result.to_capped_text(1000);
        assert!(text.contains("hi"));
        assert!(text.contains("[image: image/png]"));
    }
}
