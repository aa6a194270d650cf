//! Shared fixtures for HTTP adapter tests.

use std::sync::Arc;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::web;
use mockable::DefaultClock;

use crate::domain::{EventsQueryService, EventsService, RsvpService};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{InMemoryEventStore, InMemoryUserRepository};

/// Cookie-session middleware suitable for in-process tests.
pub(crate) fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build()
}

/// HTTP state backed by fresh in-memory adapters.
pub(crate) fn test_state() -> web::Data<HttpState> {
    let store = Arc::new(InMemoryEventStore::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let clock = Arc::new(DefaultClock);
    web::Data::new(HttpState::new(
        users,
        Arc::new(EventsService::new(store.clone(), clock.clone())),
        Arc::new(EventsQueryService::new(store.clone(), clock.clone())),
        Arc::new(RsvpService::new(store, clock)),
    ))
}
