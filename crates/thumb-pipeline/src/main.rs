//! Preview generation service binary.
//!
//! Reads one request (`{"container": "...", "key": "..."}`) from the
//! first argument or stdin, runs the pipeline, and writes the response
//! JSON to stdout. Skip outcomes produce no output and exit 0.

use std::io::Read;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use thumb_convert::ConvertClient;
use thumb_models::{SourceReference, ThumbnailOutcome, ThumbnailRequest};
use thumb_pipeline::{Pipeline, PipelineConfig, S3ObjectStore, SystemMediaTools};
use thumb_storage::ObjectStoreClient;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let request = match read_request() {
        Ok(r) => r,
        Err(e) => {
            error!("Invalid request: {}", e);
            std::process::exit(2);
        }
    };

    let config = PipelineConfig::from_env();

    let store = match ObjectStoreClient::from_env() {
        Ok(client) => S3ObjectStore::new(client),
        Err(e) => {
            error!("Failed to create storage client: {}", e);
            std::process::exit(1);
        }
    };

    let converter = match ConvertClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create conversion client: {}", e);
            std::process::exit(1);
        }
    };

    let pipeline = Pipeline::new(
        config,
        Arc::new(store),
        Arc::new(converter),
        Arc::new(SystemMediaTools),
    );

    let source = SourceReference::from_request(&request);
    info!("Processing {}/{}", source.container, source.key);

    match pipeline.run(&source).await {
        Ok(outcome) => {
            if let ThumbnailOutcome::Skipped(reason) = &outcome {
                info!("No preview produced: {}", reason);
            }
            if let Some(body) = outcome.response_body() {
                println!("{}", body);
            }
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Read the request from the first argument or stdin.
fn read_request() -> Result<ThumbnailRequest, serde_json::Error> {
    let raw = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).ok();
            buf
        }
    };
    serde_json::from_str(&raw)
}
