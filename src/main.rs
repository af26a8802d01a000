// LoanSphere AI - loan risk scoring service

mod config;
mod forest;
mod http;
mod scoring;
mod telemetry;

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::oneshot;

use crate::config::ServiceConfig;
use crate::http::ApiState;
use crate::scoring::RiskModel;
use crate::telemetry::TelemetryStore;

fn main() {
    let _ = env_logger::try_init();

    if let Err(error) = run() {
        eprintln!("[LOANSPHERE] {}", error);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env();

    // Fit before the runtime comes up; a service without a model has
    // nothing to serve.
    let started = Instant::now();
    let model = RiskModel::fit(&config);
    println!(
        "[MODEL] Fitted {} tree(s) in {} ms",
        model.tree_count(),
        started.elapsed().as_millis()
    );

    if config.persist_model {
        model.persist(&config.model_path)?;
        println!("[MODEL] Wrote {}", config.model_path.display());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        tokio::spawn(async move {
            if let Err(error) = tokio::signal::ctrl_c().await {
                eprintln!("[LOANSPHERE] Failed to listen for shutdown: {}", error);
            }
            let _ = shutdown_tx.send(());
        });

        let state = ApiState {
            model: Arc::new(model),
            telemetry: Arc::new(TelemetryStore::new()),
        };

        let api_addr = config.api_addr.clone();
        println!("[API] Listening on {}", api_addr);
        let api_handle = tokio::spawn(async move {
            if let Err(error) = crate::http::serve(api_addr, state).await {
                eprintln!("[API] Server error: {}", error);
            }
        });

        let _ = shutdown_rx.await;
        println!("\n[LOANSPHERE] Shutting down gracefully...");
        api_handle.abort();
    });

    Ok(())
}
