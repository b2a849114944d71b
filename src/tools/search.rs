use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde::Deserialize;
use serde_json::json;

use crate::clients::search::SearchRemote;
use crate::core::content::ToolOutput;
use crate::core::tool::{parse_args, Tool, ToolSpec};
use crate::domain::{SearchHit, ToolError};

pub const NOT_CONFIGURED: &str = "Error: The EMAIL_SEARCH_API_URL is not configured.";
pub const NO_RESULTS: &str = "No emails found matching that query.";

#[derive(Debug, Deserialize)]
struct SearchEmailsParams {
    query: String,
}

#[derive(Clone)]
pub struct SearchEmailsTool {
    client: Option<SearchRemote>,
}

impl SearchEmailsTool {
    pub fn new(client: Option<SearchRemote>) -> Self {
        Self { client }
    }
}

impl ToolSpec for SearchEmailsTool {
    fn name(&self) -> &'static str {
        "search_emails"
    }
    fn title(&self) -> &'static str {
        "Search Email Archive"
    }
    fn description(&self) -> &'static str {
        "Searches the static email archive for a query."
    }
    fn input_schema(&self) -> serde_json::Value {
        json!({
          "type": "object",
          "properties": {
            "query": {
              "type": "string",
              "minLength": 1,
              "description": "The text to search for in the email archive."
            }
          },
          "required": ["query"]
        })
    }
}

#[async_trait]
impl Tool for SearchEmailsTool {
    async fn call(&self, arguments: &JsonObject) -> Result<ToolOutput, ToolError> {
        let params: SearchEmailsParams = parse_args(arguments)?;
        if params.query.is_empty() {
            return Err(ToolError::InvalidParams("query must not be empty".into()));
        }
        tracing::info!(query = %params.query, "search_emails called");

        let Some(client) = &self.client else {
            return Ok(ToolOutput::failure(NOT_CONFIGURED));
        };

        match client.search(&params.query).await {
            Ok(hits) => Ok(ToolOutput::text(format_hits(&hits))),
            Err(e) => {
                tracing::error!(error = %e, "search_emails failed");
                Ok(ToolOutput::failure(format!("Error searching emails: {e}")))
            }
        }
    }
}

fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_RESULTS.to_string();
    }
    let lines: Vec<String> = hits
        .iter()
        .map(|h| format!("- {} (from: {})", h.subject, h.from))
        .collect();
    format!("Search found {} results:\n{}", hits.len(), lines.join("\n"))
}
