use std::sync::Arc;

use anyhow::Context;
use pestscan_http::{router, AppState, Config};
use pestscan_store::{InMemoryRecordStore, RecordStore, Seed};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_json);

    let seed = match &config.seed_file {
        Some(path) => Seed::from_path(path)
            .with_context(|| format!("loading seed catalog from {}", path.display()))?,
        None => Seed::default(),
    };
    info!(
        pests = seed.pests.len(),
        agrovets = seed.agrovets.len(),
        "seed catalog loaded"
    );

    // One store for the life of the process; contents are lost on exit.
    let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new(seed));
    let app = router(AppState { store });

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "pestscan API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
