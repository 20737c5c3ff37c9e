use std::sync::Arc;

use aqi_backend::{AppState, config::AppConfig, create_router, planner::RoutePlanner};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let planner = RoutePlanner::from_config(&config)?;
    let state = AppState {
        planner: Arc::new(planner),
    };
    let app = create_router(state);

    tracing::info!("starting backend on http://{}", config.bind_addr);
    tracing::info!("  GET  /get_route?origin=..&destination=.. - least polluted driving route");
    tracing::info!("  POST /api/route - same, JSON body {{origin, destination}}");
    if config.debug {
        tracing::info!("debug mode enabled");
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
