//! Film Concierge - question routing for a film rental catalog
//!
//! Questions are routed either to a catalog-backed film handler or to a
//! general handler backed by a language model. The routing core lives in
//! `agents`; a tokio actor owns it and the `api` module exposes it.

pub mod actors;
pub mod agents;
pub mod api;
pub mod catalog;
pub mod cli;
mod config;
pub mod core;
pub mod error;
pub mod utils;

#[cfg(test)]
mod testing;

pub use agents::{AgentAnswer, AgentName, FilmSummary, RoutingDecision};
pub use api::*;
pub use config::Settings;
pub use error::{ConciergeError, ConciergeResult};

use crate::actors::ConciergeHandle;
use crate::catalog::sqlite::SqliteCatalog;
use crate::catalog::{FilmCatalog, RentalStore};
use crate::core::llm::LLMClient;
use crate::core::TextGenerator;
use once_cell::sync::OnceCell;
use std::sync::Arc;

static SYSTEM: OnceCell<System> = OnceCell::new();

pub struct System {
    concierge: ConciergeHandle,
}

impl System {
    fn new(
        settings: Settings,
        catalog: Arc<dyn FilmCatalog>,
        rentals: Arc<dyn RentalStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            concierge: ConciergeHandle::new(settings, catalog, rentals, generator),
        }
    }

    fn global() -> anyhow::Result<&'static System> {
        SYSTEM
            .get()
            .ok_or_else(|| anyhow::anyhow!("System not initialized. Call init() first"))
    }
}

/// Initialize the system from configuration
/// Must be called before using any API functions
pub async fn init() -> anyhow::Result<()> {
    let mut settings = Settings::new()?;

    let api_key = match Settings::api_key() {
        Ok(key) => Some(key),
        Err(e) => {
            tracing::warn!("{}; classifier disabled, general answers will apologize", e);
            settings.routing.use_classifier = false;
            None
        }
    };

    let catalog = SqliteCatalog::open(&settings.catalog.database_path)?;
    let generator = LLMClient::new(api_key, settings.clone());

    init_with(
        settings,
        Arc::new(catalog.clone()),
        Arc::new(catalog),
        Arc::new(generator),
    )
}

/// Initialize the system with explicit collaborators
///
/// Fails without spawning anything if the system is already running.
pub fn init_with(
    settings: Settings,
    catalog: Arc<dyn FilmCatalog>,
    rentals: Arc<dyn RentalStore>,
    generator: Arc<dyn TextGenerator>,
) -> anyhow::Result<()> {
    if SYSTEM.get().is_some() {
        anyhow::bail!("System already initialized");
    }

    let system = System::new(settings, catalog, rentals, generator);
    SYSTEM
        .set(system)
        .map_err(|_| anyhow::anyhow!("System already initialized"))?;

    tracing::info!("Film concierge initialized");
    Ok(())
}

/// Shutdown the system gracefully
pub async fn shutdown() -> anyhow::Result<()> {
    if let Some(system) = SYSTEM.get() {
        system.concierge.shutdown().await?;
    }
    tracing::info!("Film concierge shutdown complete");
    Ok(())
}
