use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use url_shortener::config::{load_config, ServiceConfig};
use url_shortener::observability::metrics::init_metrics;
use url_shortener::HttpServer;

#[derive(Parser, Debug)]
#[command(author, version, about = "URL shortener service core", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "url_shortener=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration");
            load_config(path)?
        }
        None => {
            tracing::info!("No config file given; using defaults");
            ServiceConfig::default()
        }
    };

    tracing::info!(
        bind = %config.listener.bind_address,
        workers = config.pool.workers,
        queue_capacity = config.pool.queue_capacity,
        max_in_flight = config.admission.max_in_flight,
        data_service = %config.data_service.address,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
