// digits-serve - inference facade for the pre-trained digits classifier.

mod config;
mod docs;
mod error;
mod http;
mod metrics;
mod ml;
mod samples;
mod service;

use std::sync::Arc;

use crate::config::CoreConfig;
use crate::http::ApiState;
use crate::metrics::MetricsRegistry;
use crate::ml::artifact::ArtifactStore;
use crate::ml::inference::InferenceEngine;
use crate::service::PredictService;

fn main() {
    let _ = env_logger::try_init();

    if let Err(error) = run() {
        eprintln!("[SERVE] {}", error);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let config = CoreConfig::from_env();

        let store = Arc::new(ArtifactStore::new(
            config.model_path.clone(),
            config.metadata_path.clone(),
        ));
        let metrics = Arc::new(MetricsRegistry::new());
        let service = Arc::new(PredictService::new(
            InferenceEngine::new(Arc::clone(&store)),
            Arc::clone(&metrics),
        ));
        let examples = Arc::new(docs::load_examples(&config.examples_path));

        let state = ApiState {
            service,
            metrics,
            examples,
        };

        println!("[SERVE] Model artifact: {}", config.model_path.display());
        println!("[SERVE] Listening on http://{}", config.api_addr);

        let api_handle = {
            let addr = config.api_addr.clone();
            let cors_origin = config.cors_origin.clone();
            tokio::spawn(async move {
                if let Err(error) = http::serve(addr, state, cors_origin).await {
                    eprintln!("[API] Server error: {}", error);
                }
            })
        };

        if let Err(error) = tokio::signal::ctrl_c().await {
            eprintln!("[SERVE] Failed to listen for shutdown: {}", error);
        }

        println!("[SERVE] Shutting down gracefully...");
        api_handle.abort();
    });

    Ok(())
}
