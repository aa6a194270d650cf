//! Wiring of port implementations into HTTP state.

use std::sync::Arc;

use mockable::DefaultClock;

use backend::domain::ports::{EventStore, UserRepository};
use backend::domain::{EventsQueryService, EventsService, RsvpService};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{
    DieselEventStore, DieselUserRepository, InMemoryEventStore, InMemoryUserRepository,
};

use super::ServerConfig;

fn state_from_store<S, U>(store: Arc<S>, users: Arc<U>) -> HttpState
where
    S: EventStore + 'static,
    U: UserRepository + 'static,
{
    let clock = Arc::new(DefaultClock);
    HttpState::new(
        users,
        Arc::new(EventsService::new(store.clone(), clock.clone())),
        Arc::new(EventsQueryService::new(store.clone(), clock.clone())),
        Arc::new(RsvpService::new(store, clock)),
    )
}

/// Build the shared HTTP state from configured adapters.
///
/// PostgreSQL-backed adapters are used when a pool is configured; the
/// in-memory arena otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> HttpState {
    match &config.db_pool {
        Some(pool) => {
            tracing::info!("using PostgreSQL-backed persistence");
            state_from_store(
                Arc::new(DieselEventStore::new(pool.clone())),
                Arc::new(DieselUserRepository::new(pool.clone())),
            )
        }
        None => {
            tracing::warn!("no database configured; using in-memory persistence");
            state_from_store(
                Arc::new(InMemoryEventStore::new()),
                Arc::new(InMemoryUserRepository::new()),
            )
        }
    }
}
