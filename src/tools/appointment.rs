use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use rmcp::model::JsonObject;
use serde::Deserialize;
use serde_json::json;

use crate::clients::appointment::AppointmentRemote;
use crate::core::content::ToolOutput;
use crate::core::tool::{parse_args, Tool, ToolSpec};
use crate::domain::{is_email_shaped, BookingRequest, ToolError};

pub const NOT_CONFIGURED: &str = "Error: The APPOINTMENT_SERVICE_URL is not configured.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAppointmentParams {
    date_time: String,
    attendee_email: String,
    duration_in_minutes: i64,
}

impl CreateAppointmentParams {
    fn validate(&self) -> Result<(), ToolError> {
        if !is_iso_datetime(&self.date_time) {
            return Err(ToolError::InvalidParams(format!(
                "dateTime must be an ISO-8601 datetime, got {:?}",
                self.date_time
            )));
        }
        if !is_email_shaped(&self.attendee_email) {
            return Err(ToolError::InvalidParams("attendeeEmail must be an email address".into()));
        }
        if self.duration_in_minutes <= 0 {
            return Err(ToolError::InvalidParams("durationInMinutes must be a positive integer".into()));
        }
        Ok(())
    }
}

/// The date and time must be joined by a literal `T`, which is where the booking request splits them.
fn is_iso_datetime(s: &str) -> bool {
    s.get(10..11) == Some("T")
        && (DateTime::parse_from_rfc3339(s).is_ok()
            || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
            || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").is_ok())
}

/// `"2024-01-01T10:00"` -> `("2024-01-01", "10:00")`; the time part keeps any offset.
fn split_date_time(s: &str) -> (String, String) {
    match s.split_once('T') {
        Some((date, time)) => (date.to_string(), time.to_string()),
        None => (s.to_string(), String::new()),
    }
}

fn display_json(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Clone)]
pub struct CreateAppointmentTool {
    client: Option<AppointmentRemote>,
    doctor_id: String,
}

impl CreateAppointmentTool {
    pub fn new(client: Option<AppointmentRemote>, doctor_id: impl Into<String>) -> Self {
        Self { client, doctor_id: doctor_id.into() }
    }
}

impl ToolSpec for CreateAppointmentTool {
    fn name(&self) -> &'static str {
        "create_appointment"
    }
    fn title(&self) -> &'static str {
        "Create Appointment"
    }
    fn description(&self) -> &'static str {
        "Books a new appointment with the doctor."
    }
    fn input_schema(&self) -> serde_json::Value {
        json!({
          "type": "object",
          "properties": {
            "dateTime": {
              "type": "string",
              "format": "date-time",
              "description": "The appointment start time."
            },
            "attendeeEmail": {
              "type": "string",
              "format": "email",
              "description": "The email of the person to invite."
            },
            "durationInMinutes": {
              "type": "integer",
              "exclusiveMinimum": 0,
              "description": "The duration in minutes."
            }
          },
          "required": ["dateTime", "attendeeEmail", "durationInMinutes"]
        })
    }
}

#[async_trait]
impl Tool for CreateAppointmentTool {
    async fn call(&self, arguments: &JsonObject) -> Result<ToolOutput, ToolError> {
        let params: CreateAppointmentParams = parse_args(arguments)?;
        params.validate()?;
        tracing::info!(
            date_time = %params.date_time,
            attendee = %params.attendee_email,
            duration_min = params.duration_in_minutes,
            "create_appointment called"
        );

        let Some(client) = &self.client else {
            return Ok(ToolOutput::failure(NOT_CONFIGURED));
        };

        let (date, time) = split_date_time(&params.date_time);
        let req = BookingRequest { doctor_id: self.doctor_id.clone(), date, time };
        match client.book(&req).await {
            Ok(booking) => Ok(ToolOutput::text(format!(
                "Success! Appointment {} is {}.",
                display_json(&booking.appointment_id),
                display_json(&booking.status)
            ))),
            Err(e) => {
                tracing::error!(error = %e, "create_appointment failed");
                Ok(ToolOutput::failure(format!("An unexpected error occurred: {e}")))
            }
        }
    }
}
