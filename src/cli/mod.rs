use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::infra::config::Config;

#[derive(Parser)]
#[command(name = "office-mcp-gateway")]
#[command(about = "Office MCP Gateway - email, search and appointment tools over MCP")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the gateway (default)
    Serve,
    /// Health check the service
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Validate configuration
    Config {
        /// Validate config without starting service
        #[arg(long)]
        validate: bool,
    },
    /// Show service status and configuration
    Status {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Call a tool in-process with the current configuration
    Call {
        /// Tool name, eg. search_emails
        tool: String,
        /// JSON object with the tool arguments
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    run_commands(cli.command.unwrap_or(Commands::Serve)).await
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Serve => {
            let cfg = match Config::load() {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("❌ Configuration error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            match crate::infra::boot::run_server(cfg).await {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!(error = %e, "server exited with error");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate: _ } => match validate_config() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Status { url } => match show_status(&url).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("❌ Status check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Call { tool, args } => match call_tool(&tool, &args).await {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                eprintln!("❌ Tool call failed: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn health_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/healthz", url))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status()).into())
    }
}

fn validate_config() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;

    if !matches!(cfg.mode.as_str(), "server" | "stdio") {
        return Err(format!("Invalid MODE: {}. Must be 'server' or 'stdio'", cfg.mode).into());
    }

    if cfg.mode == "server" && cfg.port == 0 {
        return Err("PORT cannot be 0".into());
    }

    for (name, url) in [
        ("EMAIL_SEARCH_API_URL", cfg.search.base_url.as_deref()),
        ("APPOINTMENT_SERVICE_URL", cfg.appointment.base_url.as_deref()),
        ("RESEND_BASE_URL", Some(cfg.email.base_url.as_str())),
    ] {
        if let Some(url) = url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("{} must be an http(s) URL, got {}", name, url).into());
            }
        }
    }

    Ok(())
}

async fn show_status(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();

    let health_response = client
        .get(format!("{}/healthz", url))
        .timeout(std::time::Duration::from_secs(5))
        .send()
        .await?;

    println!(
        "🏥 Health Status: {}",
        if health_response.status().is_success() {
            "✅ Healthy"
        } else {
            "❌ Unhealthy"
        }
    );

    let cfg = Config::from_env();
    println!("\n📋 Configuration:");
    println!("  Mode: {}", cfg.mode);
    println!("  Port: {}", cfg.port);
    println!("  Stateful MCP: {}", cfg.stateful);
    println!(
        "  Log Level: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())
    );
    println!(
        "  Search Service: {}",
        cfg.search.base_url.as_deref().unwrap_or("Not configured")
    );
    println!(
        "  Appointment Service: {}",
        cfg.appointment.base_url.as_deref().unwrap_or("Not configured")
    );
    println!(
        "  Email Provider: {}",
        if cfg.email.api_key.is_some() { "Configured" } else { "Not configured" }
    );

    Ok(())
}

/// Returns whether the tool reported success.
async fn call_tool(tool: &str, args: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let args: serde_json::Value = serde_json::from_str(args)?;
    let serde_json::Value::Object(args) = args else {
        return Err("--args must be a JSON object".into());
    };
    let cfg = Config::load()?;
    let registry = crate::tools::registry::build_registry(&cfg);
    let out = registry.call(tool, &args).await?;
    for text in &out.content {
        println!("{}", text);
    }
    Ok(!out.is_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[tokio::test]
    async fn health_check_fails_without_service() {
        let result = health_check("http://localhost:9").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn health_check_ok_and_error_paths() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        server.mock(|when, then| { when.method(GET).path("/healthz"); then.status(200).body("ok"); });
        assert!(health_check(&server.base_url()).await.is_ok());

        let bad = MockServer::start();
        bad.mock(|when, then| { when.method(GET).path("/healthz"); then.status(500); });
        assert!(health_check(&bad.base_url()).await.is_err());
    }

    #[test]
    #[serial]
    fn validate_config_valid() {
        env::set_var("MODE", "server");
        env::set_var("PORT", "8080");
        let result = validate_config();
        assert!(result.is_ok());
        env::remove_var("MODE");
        env::remove_var("PORT");
    }

    #[test]
    #[serial]
    fn validate_config_invalid_mode() {
        env::set_var("MODE", "invalid");
        let result = validate_config();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid MODE"));
        env::remove_var("MODE");
    }

    #[test]
    #[serial]
    fn validate_config_invalid_port() {
        env::set_var("MODE", "server");
        env::set_var("PORT", "0");
        let result = validate_config();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PORT cannot be 0"));
        env::remove_var("MODE");
        env::remove_var("PORT");
    }

    #[test]
    #[serial]
    fn validate_config_rejects_non_http_upstream() {
        env::set_var("APPOINTMENT_SERVICE_URL", "ftp://appointments");
        let result = validate_config();
        assert!(result.unwrap_err().to_string().contains("APPOINTMENT_SERVICE_URL"));
        env::remove_var("APPOINTMENT_SERVICE_URL");
    }

    #[tokio::test]
    async fn status_handles_unhealthy_service() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        server.mock(|when, then| { when.method(GET).path("/healthz"); then.status(500).body("boom"); });
        assert!(show_status(&server.base_url()).await.is_ok());
    }

    #[tokio::test]
    async fn status_fails_when_unreachable() {
        assert!(show_status("http://localhost:9").await.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn call_runs_search_against_configured_upstream() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search").query_param("q", "rent");
            then.status(200).json_body(serde_json::json!([{"subject":"Rent","from":"landlord@x.io"}]));
        });
        env::set_var("EMAIL_SEARCH_API_URL", server.base_url());
        let ok = call_tool("search_emails", r#"{"query":"rent"}"#).await.unwrap();
        env::remove_var("EMAIL_SEARCH_API_URL");
        assert!(ok);
    }

    #[tokio::test]
    #[serial]
    async fn call_reports_unconfigured_tool_as_failure() {
        env::remove_var("RESEND_API_KEY");
        let code = run_commands(Commands::Call {
            tool: "send_email".into(),
            args: r#"{"to":"pat@example.com","subject":"s","body":"b"}"#.into(),
        })
        .await;
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn call_rejects_non_object_args() {
        let err = call_tool("search_emails", "[1,2]").await.unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[tokio::test]
    #[serial]
    async fn call_unknown_tool_errors() {
        let err = call_tool("nope", "{}").await.unwrap_err();
        assert!(err.to_string().contains("unknown tool: nope"));
    }
}
