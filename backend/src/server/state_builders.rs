//! Builders wiring driven adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use foodgram::domain::ports::MediaStore;
use foodgram::inbound::http::state::{HttpState, HttpStatePorts, Repositories};
use foodgram::outbound::media::FilesystemMediaStore;
use foodgram::outbound::memory::InMemoryStore;
use foodgram::outbound::persistence::{
    DbPool, DieselRecipeRelationRepository, DieselRecipeRepository, DieselReferenceDataRepository,
    DieselSubscriptionRepository, DieselUserRepository,
};

use super::ServerConfig;

fn diesel_ports<M: MediaStore + 'static>(pool: &DbPool, media: Arc<M>) -> HttpStatePorts {
    Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        subscriptions: Arc::new(DieselSubscriptionRepository::new(pool.clone())),
        recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
        relations: Arc::new(DieselRecipeRelationRepository::new(pool.clone())),
        reference_data: Arc::new(DieselReferenceDataRepository::new(pool.clone())),
        media,
    }
    .into_ports()
}

fn memory_ports<M: MediaStore + 'static>(media: Arc<M>) -> HttpStatePorts {
    let store = Arc::new(InMemoryStore::new());
    Repositories {
        users: store.clone(),
        subscriptions: store.clone(),
        recipes: store.clone(),
        relations: store.clone(),
        reference_data: store,
        media,
    }
    .into_ports()
}

/// Build HTTP state over PostgreSQL when a pool is configured, otherwise
/// over a fresh in-memory store.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the media root cannot be opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let media = FilesystemMediaStore::open(&config.media_root).map_err(|err| {
        std::io::Error::other(format!(
            "failed to open media root {}: {err}",
            config.media_root.display()
        ))
    })?;
    let media = Arc::new(media);
    let ports = match &config.db_pool {
        Some(pool) => diesel_ports(pool, media),
        None => {
            warn!("no database configured; using the in-memory store, data is lost on restart");
            memory_ports(media)
        }
    };
    Ok(web::Data::new(HttpState::new(ports, config.links.clone())))
}
