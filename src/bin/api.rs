use finance_dashboard_core::{
    advisor::FinancialAdvisor,
    api::{start_server, ApiState},
    config::AppConfig,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    info!("Finance Dashboard Core - API Server");
    info!("Port: {}", config.api_port);

    if !config.advisor.has_credentials() {
        info!("GEMINI_API_KEY not set, advisor will answer from templates");
    }

    let advisor = Arc::new(FinancialAdvisor::new(config.advisor));
    let state = ApiState::new(advisor);

    info!("Session initialized, starting API server");

    start_server(state, config.api_port).await?;

    Ok(())
}
