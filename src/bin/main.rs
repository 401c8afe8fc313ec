use finance_dashboard_core::{
    advisor::FinancialAdvisor, config::AdvisorConfig, models::FinancialSnapshot,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let question = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if question.trim().is_empty() {
        eprintln!("Usage: advisor <question>");
        eprintln!("Example: advisor \"How am I doing financially?\"");
        std::process::exit(2);
    }

    let config = AdvisorConfig::from_env()?;
    info!(connected = config.has_credentials(), model = %config.model, "Advisor starting");

    let advisor = FinancialAdvisor::new(config);
    let snapshot = FinancialSnapshot::default();

    let advice = advisor.get_advice(&question, &snapshot).await;

    println!("{}", advice.content);
    println!();
    println!(
        "[{} | confidence {:.2} | {}]",
        advice.category, advice.confidence, advice.source
    );

    Ok(())
}
