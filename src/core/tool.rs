use async_trait::async_trait;
use rmcp::model::JsonObject;

use crate::core::content::ToolOutput;
use crate::domain::ToolError;

/// Minimal metadata every tool must expose.
pub trait ToolSpec {
    fn name(&self) -> &'static str;
    fn title(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> serde_json::Value;
}

/// Tool = metadata + one upstream call.
///
/// Upstream and configuration failures are reported inside the returned
/// [`ToolOutput`]; `Err` is reserved for arguments that fail validation.
#[async_trait]
pub trait Tool: ToolSpec + Send + Sync {
    async fn call(&self, arguments: &JsonObject) -> Result<ToolOutput, ToolError>;
}

/// Deserialize tool arguments into a typed parameter struct.
pub fn parse_args<T: serde::de::DeserializeOwned>(arguments: &JsonObject) -> Result<T, ToolError> {
    serde_json::from_value(serde_json::Value::Object(arguments.clone()))
        .map_err(|e| ToolError::InvalidParams(format!("invalid arguments: {e}")))
}
