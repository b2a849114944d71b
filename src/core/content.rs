//! Uniform result envelope returned by every tool.

use rmcp::model::{CallToolResult, Content};

/// `{content: [{type: "text", text}], isError}`.
///
/// Failures keep the same shape as successes; the text carries the message and
/// `is_error` lets clients tell them apart without string matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub content: Vec<String>,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self { content: vec![text.into()], is_error: false }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self { content: vec![text.into()], is_error: true }
    }

    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(String::as_str)
    }
}

impl From<ToolOutput> for CallToolResult {
    fn from(out: ToolOutput) -> Self {
        let content = out.content.into_iter().map(Content::text).collect();
        if out.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}
