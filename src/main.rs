use anyhow::Result;
use gridfeed::actions::{self, Action};
use gridfeed::context::dashboard_channels;
use gridfeed::store::{AppState, StateStore};
use gridfeed::{Config, FetchOrchestrator};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    gridfeed::logging::init_logging(&config.logging)?;
    info!(
        "Gridfeed {} starting, polling every {} ms",
        env!("APP_VERSION"),
        config.fetch.data_fetch_interval_ms
    );
    info!("Initial view: {}", config.dashboard.describe(config.tz()?));

    let store = Arc::new(StateStore::new(AppState {
        selected_time_aggregate: config.dashboard.time_aggregate,
        ..AppState::default()
    }));

    // Everything the orchestrator dispatches lands in the store
    let (dispatcher, mut action_rx) = actions::channel();
    let (store_tx, store_rx) = mpsc::unbounded_channel::<Action>();
    let forward_task = tokio::spawn(async move {
        while let Some(action) = action_rx.recv().await {
            match serde_json::to_string(&action) {
                Ok(json) => info!("dispatch {}", json),
                Err(e) => error!("Failed to serialize {}: {}", action.action_type(), e),
            }
            if store_tx.send(action).is_err() {
                break;
            }
        }
    });
    let store_task = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.run(store_rx).await })
    };

    let (_controls, inputs) = dashboard_channels(&config.dashboard, &store);
    let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel::<()>();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(());
            }
            Err(e) => error!("Failed to listen for ctrl-c: {}", e),
        }
    });

    let mut orchestrator = FetchOrchestrator::from_config(&config.fetch, dispatcher);
    orchestrator.run(inputs, shutdown_rx).await;
    drop(orchestrator);

    // Dropping the orchestrator released the last dispatcher, so both tasks drain and end
    let _ = forward_task.await;
    let _ = store_task.await;
    info!("Gridfeed shutdown complete");
    Ok(())
}
