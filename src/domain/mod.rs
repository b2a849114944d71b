use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("{0}")]
    InvalidParams(String),
}

/// One row of the search service's `GET /search` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub from: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /book` on the appointment service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingRequest {
    pub doctor_id: String,
    pub date: String,
    pub time: String,
}

/// Appointment service reply. Ids come back as strings or numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub appointment_id: serde_json::Value,
    pub status: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyFormat {
    #[default]
    Html,
    Text,
}

impl std::str::FromStr for BodyFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(BodyFormat::Html),
            "text" | "plain" => Ok(BodyFormat::Text),
            other => Err(format!("unknown body format: {other}")),
        }
    }
}

/// Outgoing message as the email provider expects it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl OutgoingEmail {
    pub fn new(from: String, to: String, subject: String, body: String, format: BodyFormat) -> Self {
        let (html, text) = match format {
            BodyFormat::Html => (Some(body), None),
            BodyFormat::Text => (None, Some(body)),
        };
        Self { from, to, subject, html, text }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SentEmail {
    pub id: String,
}

/// Error object the email provider returns instead of `{id}`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProviderError {
    pub message: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "statusCode")]
    pub status_code: Option<u16>,
}

/// Loose `local@domain.tld` shape check; the provider does the real validation.
pub fn is_email_shaped(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || s.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !host.starts_with('.'),
        None => false,
    }
}
