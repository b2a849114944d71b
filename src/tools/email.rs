use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde::Deserialize;
use serde_json::json;

use crate::clients::resend::MailSender;
use crate::core::content::ToolOutput;
use crate::core::tool::{parse_args, Tool, ToolSpec};
use crate::domain::{is_email_shaped, BodyFormat, OutgoingEmail, ToolError};

pub const NOT_CONFIGURED: &str = "Error: The RESEND_API_KEY is not configured.";

#[derive(Debug, Deserialize)]
struct SendEmailParams {
    to: String,
    subject: String,
    body: String,
}

impl SendEmailParams {
    fn validate(&self) -> Result<(), ToolError> {
        if !is_email_shaped(&self.to) {
            return Err(ToolError::InvalidParams("to must be an email address".into()));
        }
        if self.subject.is_empty() {
            return Err(ToolError::InvalidParams("subject must not be empty".into()));
        }
        if self.body.is_empty() {
            return Err(ToolError::InvalidParams("body must not be empty".into()));
        }
        Ok(())
    }
}

/// `sender` is `None` when no API key is configured; the tool then never
/// touches the provider.
#[derive(Clone)]
pub struct SendEmailTool {
    sender: Option<Arc<dyn MailSender>>,
    from: String,
    format: BodyFormat,
}

impl SendEmailTool {
    pub fn new(sender: Option<Arc<dyn MailSender>>, from: impl Into<String>, format: BodyFormat) -> Self {
        Self { sender, from: from.into(), format }
    }
}

impl ToolSpec for SendEmailTool {
    fn name(&self) -> &'static str {
        "send_email"
    }
    fn title(&self) -> &'static str {
        "Send Email"
    }
    fn description(&self) -> &'static str {
        "Sends an email to a recipient."
    }
    fn input_schema(&self) -> serde_json::Value {
        json!({
          "type": "object",
          "properties": {
            "to": { "type": "string", "format": "email", "description": "The recipient's email address." },
            "subject": { "type": "string", "minLength": 1, "description": "The subject line of the email." },
            "body": { "type": "string", "minLength": 1, "description": "The content of the email." }
          },
          "required": ["to", "subject", "body"]
        })
    }
}

#[async_trait]
impl Tool for SendEmailTool {
    async fn call(&self, arguments: &JsonObject) -> Result<ToolOutput, ToolError> {
        let params: SendEmailParams = parse_args(arguments)?;
        params.validate()?;
        tracing::info!(to = %params.to, "send_email called");

        let Some(sender) = &self.sender else {
            return Ok(ToolOutput::failure(NOT_CONFIGURED));
        };

        let email = OutgoingEmail::new(self.from.clone(), params.to, params.subject, params.body, self.format);
        match sender.send(&email).await {
            Ok(sent) => Ok(ToolOutput::text(format!("Email sent successfully. ID: {}", sent.id))),
            Err(e) => {
                tracing::error!(error = %e, "send_email failed");
                Ok(ToolOutput::failure(format!("Error sending email: {e}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::resend::ResendRemote;
    use crate::clients::UpstreamError;
    use crate::domain::SentEmail;
    use httpmock::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: AtomicUsize,
        last: Mutex<Option<OutgoingEmail>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl MailSender for Recorder {
        async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(email.clone());
            match &self.fail_with {
                Some(msg) => Err(UpstreamError::Provider(msg.clone())),
                None => Ok(SentEmail { id: "em_1".into() }),
            }
        }
    }

    fn args() -> JsonObject {
        json!({"to":"pat@example.com","subject":"Hello","body":"<p>Hi</p>"})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn missing_key_never_calls_provider() {
        use crate::infra::config::{Config, FileConfig};
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.any_request();
            then.status(200).json_body(json!({"id":"em_x"}));
        });
        let base = server.base_url();
        let cfg = Config::from_sources(FileConfig::default(), move |k| {
            (k == "RESEND_BASE_URL").then(|| base.clone())
        });
        assert_eq!(cfg.email.base_url, server.base_url());
        let reg = crate::tools::registry::build_registry(&cfg);
        let out = reg.call("send_email", &args()).await.unwrap();
        assert!(out.is_error);
        assert_eq!(out.first_text(), Some(NOT_CONFIGURED));
        m.assert_hits(0);
    }

    #[tokio::test]
    async fn success_reports_message_id() {
        let rec = Arc::new(Recorder::default());
        let tool = SendEmailTool::new(Some(rec.clone()), "onboarding@resend.dev", BodyFormat::Html);
        let out = tool.call(&args()).await.unwrap();
        assert_eq!(out.first_text(), Some("Email sent successfully. ID: em_1"));
        assert_eq!(rec.calls.load(Ordering::SeqCst), 1);
        let sent = rec.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.from, "onboarding@resend.dev");
        assert_eq!(sent.html.as_deref(), Some("<p>Hi</p>"));
    }

    #[tokio::test]
    async fn plain_text_format_uses_text_field() {
        let rec = Arc::new(Recorder::default());
        let tool = SendEmailTool::new(Some(rec.clone()), "desk@clinic.example", BodyFormat::Text);
        tool.call(&args()).await.unwrap();
        let sent = rec.last.lock().unwrap().clone().unwrap();
        assert!(sent.html.is_none());
        assert_eq!(sent.text.as_deref(), Some("<p>Hi</p>"));
    }

    #[tokio::test]
    async fn provider_error_becomes_failure_text() {
        let rec = Arc::new(Recorder { fail_with: Some("Invalid API key".into()), ..Default::default() });
        let tool = SendEmailTool::new(Some(rec), "onboarding@resend.dev", BodyFormat::Html);
        let out = tool.call(&args()).await.unwrap();
        assert!(out.is_error);
        assert_eq!(out.first_text(), Some("Error sending email: Invalid API key"));
    }

    #[tokio::test]
    async fn sends_through_resend_over_http() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/emails").header("authorization", "Bearer re_live");
            then.status(200).json_body(json!({"id":"em_http"}));
        });
        let sender: Arc<dyn MailSender> = Arc::new(ResendRemote::new(server.base_url(), "re_live"));
        let tool = SendEmailTool::new(Some(sender), "onboarding@resend.dev", BodyFormat::Html);
        let out = tool.call(&args()).await.unwrap();
        m.assert();
        assert_eq!(out.first_text(), Some("Email sent successfully. ID: em_http"));
    }

    #[tokio::test]
    async fn rejects_bad_recipient_and_empty_fields() {
        let tool = SendEmailTool::new(None, "onboarding@resend.dev", BodyFormat::Html);
        for bad in [
            json!({"to":"nobody","subject":"s","body":"b"}),
            json!({"to":"pat@example.com","subject":"","body":"b"}),
            json!({"to":"pat@example.com","subject":"s","body":""}),
            json!({"to":"pat@example.com","subject":"s"}),
        ] {
            let err = tool.call(bad.as_object().unwrap()).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidParams(_)), "accepted {bad}");
        }
    }
}
