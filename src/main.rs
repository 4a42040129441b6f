//! # Games News Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database, then
//! runs the news pipeline on a schedule next to the health check server.

use anyhow::Result;
use std::sync::Arc;
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use games_news_bot::bot::delivery::TelegramDelivery;
use games_news_bot::config::Config;
use games_news_bot::database::connection::DatabaseManager;
use games_news_bot::database::dedup::SqliteDedupStore;
use games_news_bot::scrapers::fetcher::HttpFetcher;
use games_news_bot::services::health::HealthService;
use games_news_bot::services::pipeline::{Pipeline, PipelineConfig};
use games_news_bot::services::scheduler::{NewsScheduler, RunState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "games_news_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Games News Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, Channel: {}, Debug: {}",
        config.database_url, config.http_port, config.channel_id, config.debug
    );
    for source in &config.sources {
        info!("Source enabled: {} ({})", source.kind, source.url);
    }

    // Initialize database
    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);
    info!("Database initialized successfully");

    let bot = Bot::new(&config.telegram_bot_token);
    let fetcher = HttpFetcher::new(&config.user_agent, config.request_timeout)
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
    let pipeline = Arc::new(Pipeline::new(
        PipelineConfig::from_config(&config),
        Arc::new(fetcher),
        Arc::new(SqliteDedupStore::new(db_arc.as_ref().clone())),
        Arc::new(TelegramDelivery::new(bot)),
    ));

    // Initialize and start the news scheduler
    let run_state = RunState::default();
    let mut scheduler =
        match NewsScheduler::new(pipeline, run_state.clone(), config.check_interval).await {
            Ok(scheduler) => scheduler,
            Err(e) => {
                tracing::error!("Failed to create news scheduler: {}", e);
                return Err(anyhow::anyhow!("Failed to create news scheduler: {}", e));
            }
        };
    if let Err(e) = scheduler.start().await {
        tracing::error!("Failed to start news scheduler: {}", e);
        return Err(anyhow::anyhow!("Failed to start news scheduler: {}", e));
    }

    // Initialize health service
    let health_service = HealthService::new(db_arc.clone(), run_state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
            }
        }
        result = health_task => {
            if let Err(e) = result {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    if let Err(e) = scheduler.stop().await {
        tracing::warn!("Error stopping news scheduler: {}", e);
    }

    info!("Application stopped");
    Ok(())
}
