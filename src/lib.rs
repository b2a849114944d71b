//! MCP gateway exposing `send_email`, `search_emails` and `create_appointment`,
//! each proxied to one upstream HTTP service.

pub mod cli;
pub mod clients;
pub mod core;
pub mod domain;
pub mod infra;
pub mod tools;
