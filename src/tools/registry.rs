use std::collections::BTreeMap;
use std::sync::Arc;

use rmcp::model::JsonObject;
use thiserror::Error;

use crate::clients::appointment::AppointmentRemote;
use crate::clients::resend::{MailSender, ResendRemote};
use crate::clients::search::SearchRemote;
use crate::core::content::ToolOutput;
use crate::core::tool::Tool;
use crate::domain::ToolError;
use crate::infra::config::Config;

use super::appointment::CreateAppointmentTool;
use super::email::SendEmailTool;
use super::search::SearchEmailsTool;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error(transparent)]
    Tool(#[from] ToolError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolMeta {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: serde_json::Value,
}

/// Name -> tool. Built once at startup, then shared read-only behind an `Arc`.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    by_name: BTreeMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the name is taken. The first registration wins.
    pub fn register_once(&mut self, tool: Arc<dyn Tool>) -> bool {
        let name = tool.name();
        if self.by_name.contains_key(name) {
            tracing::debug!(tool = name, "tool already registered; skipping");
            return false;
        }
        self.by_name.insert(name, tool);
        true
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Metadata for every tool, sorted by name.
    pub fn list(&self) -> Vec<ToolMeta> {
        self.by_name
            .values()
            .map(|t| ToolMeta {
                name: t.name(),
                title: t.title(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    pub async fn call(&self, name: &str, args: &JsonObject) -> Result<ToolOutput, DispatchError> {
        let tool = self
            .by_name
            .get(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;
        crate::infra::logging::log_metric(tool.name(), "calls_total", 1.0);
        Ok(tool.call(args).await?)
    }
}

/// Register the three gateway tools from configuration.
pub fn build_registry(cfg: &Config) -> ToolRegistry {
    let timeout = cfg.upstream_timeout;
    let sender = cfg.email.api_key.as_ref().map(|key| {
        Arc::new(ResendRemote::with_timeout(cfg.email.base_url.clone(), key.clone(), timeout))
            as Arc<dyn MailSender>
    });

    let mut reg = ToolRegistry::new();
    reg.register_once(Arc::new(SendEmailTool::new(sender, cfg.email.from.clone(), cfg.email.body_format)));
    reg.register_once(Arc::new(SearchEmailsTool::new(SearchRemote::from_config(&cfg.search, timeout))));
    reg.register_once(Arc::new(CreateAppointmentTool::new(
        AppointmentRemote::from_config(&cfg.appointment, timeout),
        cfg.appointment.doctor_id.clone(),
    )));
    tracing::info!(
        tools = reg.len(),
        email = cfg.email.api_key.is_some(),
        search = cfg.search.base_url.is_some(),
        appointment = cfg.appointment.base_url.is_some(),
        "tool registry built"
    );
    reg
}
