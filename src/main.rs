use anyhow::Result;

use glance_core::{AppError, Config};
use glance_widget::{render, Orchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    glance_core::init()?;

    if let Err(e) = refresh().await {
        tracing::error!("Refresh failed: {}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

async fn refresh() -> Result<(), AppError> {
    let (config, _) = Config::load_validated()?;
    tracing::info!("Glance refresh started");

    let orchestrator = Orchestrator::from_config(&config)?;
    let data = orchestrator.run().await?;

    println!("{}", render(&data, &config.variant, &config.panel));
    Ok(())
}
