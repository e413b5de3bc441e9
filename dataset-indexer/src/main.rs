//! Dataset Indexer Main Entry Point
//!
//! Loads the configured dataset into the search service, replacing the
//! previous contents of the target collection.

use dataset_indexer::dispatcher::dispatch;
use dataset_indexer::{IndexingError, Settings};
use dotenv::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("dataset_indexer=info,dataset_indexer_repository=info")
    });

    let json = env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();

        info!(
            service_name = "dataset-indexer",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();

        info!(
            service_name = "dataset-indexer",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }
}

fn print_configuration(settings: &Settings) {
    println!("CONFIGURATION:");
    print!("{}", settings.describe());
    println!("{}", "*".repeat(80));
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return Err(e);
        }
    };

    print_configuration(&settings);

    info!(dataset = %settings.dataset, "Starting dataset indexer");

    match dispatch(&settings).await {
        Ok(summary) => {
            print!("{}", summary);
            info!("Dataset indexer completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Dataset indexer failed");
            Err(e)
        }
    }
}
