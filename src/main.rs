use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // .env may carry RUST_LOG, so load it before the subscriber.
    let _ = dotenvy::dotenv();
    office_mcp_gateway::infra::logging::init();
    office_mcp_gateway::cli::run().await
}
