#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket_cors::CorsOptions;
use tracing_subscriber::EnvFilter;

use crate::{
    config::StoreBackend,
    service::ProgressService,
    store::{MemoryProgressStore, PgProgressStore, Store},
};

mod config;
mod database;
mod graphql;
mod models;
mod progression;
mod service;
mod store;
mod utils;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orbitaserver=info")),
        )
        .init();

    let config = config::load_config()?;
    let ledger = config.progression.ledger()?;
    tracing::info!(
        "[main] Loaded {} missions, {} levels",
        ledger.len(),
        config.progression.thresholds.max_level()
    );

    let store = match config.store.backend {
        StoreBackend::Postgres => {
            let pool = database::connection::connect(&config.store).await?;
            Store::Postgres(PgProgressStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("[main] Using the in-memory store, progress is lost on restart");
            Store::Memory(MemoryProgressStore::new())
        }
    };
    let service = Arc::new(ProgressService::new(
        store,
        ledger,
        config.progression.thresholds.clone(),
        config.store.max_retries,
    ));

    let cors = CorsOptions::default().to_cors()?;

    rocket::build()
        .mount("/graphql", graphql::routes())
        .manage(service)
        .attach(cors)
        .launch()
        .await?;
    Ok(())
}
