use std::process::ExitCode;

use aqi_backend::{config::AppConfig, models::ApiError, planner::RoutePlanner};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Find the driving route with the lowest cumulative AQI between two addresses"
)]
struct Args {
    /// Free-text origin address
    #[arg(long)]
    origin: String,

    /// Free-text destination address
    #[arg(long)]
    destination: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = AppConfig::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let planner = RoutePlanner::from_config(&config)?;
    let (json, code) = match planner.plan_route(&args.origin, &args.destination).await {
        Ok(plan) => (to_json(&plan, args.pretty)?, ExitCode::SUCCESS),
        Err(err) => {
            tracing::error!("planning failed: {err}");
            let payload = ApiError {
                error: err.to_string(),
            };
            (to_json(&payload, args.pretty)?, ExitCode::FAILURE)
        }
    };

    println!("{json}");
    Ok(code)
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
