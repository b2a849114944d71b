use std::time::Duration;

use serde::Deserialize;

use crate::core::error::GatewayError;
use crate::domain::BodyFormat;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";
pub const DEFAULT_EMAIL_FROM: &str = "onboarding@resend.dev";
pub const DEFAULT_DOCTOR_ID: &str = "default-doc";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct Config {
    pub mode: String, // "server" or "stdio"
    pub port: u16,
    pub stateful: bool,
    pub upstream_timeout: Duration,
    pub search: SearchConfig,
    pub appointment: AppointmentConfig,
    pub email: EmailConfig,
}

#[derive(Clone, Debug, Default)]
pub struct SearchConfig {
    pub base_url: Option<String>,
    pub retries: u32,
}

#[derive(Clone, Debug)]
pub struct AppointmentConfig {
    pub base_url: Option<String>,
    pub doctor_id: String,
}

#[derive(Clone)]
pub struct EmailConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub from: String,
    pub body_format: BodyFormat,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("from", &self.from)
            .field("body_format", &self.body_format)
            .finish()
    }
}

/// Optional TOML file named by `GATEWAY_CONFIG`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: FileServer,
    pub search: FileSearch,
    pub appointment: FileAppointment,
    pub email: FileEmail,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileServer {
    pub mode: Option<String>,
    pub port: Option<u16>,
    pub stateful: Option<bool>,
    pub upstream_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSearch {
    pub base_url: Option<String>,
    pub retries: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileAppointment {
    pub base_url: Option<String>,
    pub doctor_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileEmail {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub from: Option<String>,
    pub body_format: Option<BodyFormat>,
}

impl FileConfig {
    pub fn parse(path: &str, raw: &str) -> Result<Self, GatewayError> {
        toml::from_str(raw).map_err(|source| GatewayError::ConfigParse { path: path.to_string(), source })
    }

    pub fn read(path: &str) -> Result<Self, GatewayError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| GatewayError::ConfigRead { path: path.to_string(), source })?;
        Self::parse(path, &raw)
    }
}

impl Config {
    /// Environment only, over built-in defaults.
    pub fn from_env() -> Self {
        Self::from_sources(FileConfig::default(), env_lookup)
    }

    /// The optional `GATEWAY_CONFIG` TOML file, then environment overrides.
    /// `.env` is loaded once by the binary before this runs.
    pub fn load() -> Result<Self, GatewayError> {
        let file = match env_lookup("GATEWAY_CONFIG") {
            Some(path) => FileConfig::read(&path)?,
            None => FileConfig::default(),
        };
        Ok(Self::from_sources(file, env_lookup))
    }

    /// Merge a file config with a variable lookup; lookups win. Blank values count as unset.
    pub fn from_sources(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let mode = env("MODE").or(file.server.mode).unwrap_or_else(|| "server".into());
        let port = env("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .or(file.server.port)
            .unwrap_or(DEFAULT_PORT);
        let stateful = env("MCP_STATEFUL")
            .map(|v| parse_flag(&v))
            .or(file.server.stateful)
            .unwrap_or(false);
        let timeout_secs = env("UPSTREAM_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .or(file.server.upstream_timeout_secs)
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);

        let search = SearchConfig {
            base_url: env("EMAIL_SEARCH_API_URL")
                .or_else(|| env("STATIC_SEARCH_API_URL"))
                .or(non_blank(file.search.base_url)),
            retries: env("SEARCH_RETRIES")
                .and_then(|s| s.parse::<u32>().ok())
                .or(file.search.retries)
                .unwrap_or(0),
        };

        let appointment = AppointmentConfig {
            base_url: env("APPOINTMENT_SERVICE_URL").or(non_blank(file.appointment.base_url)),
            doctor_id: env("APPOINTMENT_DOCTOR_ID")
                .or(file.appointment.doctor_id)
                .unwrap_or_else(|| DEFAULT_DOCTOR_ID.into()),
        };

        let body_format = env("EMAIL_BODY_FORMAT")
            .and_then(|s| match s.parse::<BodyFormat>() {
                Ok(f) => Some(f),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring EMAIL_BODY_FORMAT");
                    None
                }
            })
            .or(file.email.body_format)
            .unwrap_or_default();
        let email = EmailConfig {
            api_key: env("RESEND_API_KEY").or(non_blank(file.email.api_key)),
            base_url: env("RESEND_BASE_URL")
                .or(file.email.base_url)
                .unwrap_or_else(|| DEFAULT_RESEND_BASE_URL.into()),
            from: env("EMAIL_FROM")
                .or(file.email.from)
                .unwrap_or_else(|| DEFAULT_EMAIL_FROM.into()),
            body_format,
        };

        Self {
            mode,
            port,
            stateful,
            upstream_timeout: Duration::from_secs(timeout_secs),
            search,
            appointment,
            email,
        }
    }
}

fn env_lookup(key: &str) -> Option<String> {
    non_blank(std::env::var(key).ok())
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn parse_flag(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
