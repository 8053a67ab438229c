use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timetable::api::router;
use timetable::config::{AppConfig, StoreBackend};
use timetable::registry::InMemoryRegistry;
use timetable::services::TimetableService;
use timetable::state::AppState;
use timetable::store::{MemoryStore, SqliteStore, TimetableStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "timetable=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let store: Arc<dyn TimetableStore> = match &config.store {
        StoreBackend::Memory => {
            info!("using in-memory period store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Sqlite(url) => {
            info!("using sqlite period store at {}", url);
            Arc::new(SqliteStore::connect(url).await?)
        }
    };

    let registry = InMemoryRegistry::load(&config.registry_path)?;

    let state = AppState {
        timetable: TimetableService::new(store, Arc::new(registry), config.timetable.clone()),
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
