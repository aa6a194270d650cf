//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{EventsCommand, EventsQuery, RsvpCommand, UserRepository};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// User identity storage.
    pub users: Arc<dyn UserRepository>,
    /// Owner-side event CRUD.
    pub events: Arc<dyn EventsCommand>,
    /// Event read paths.
    pub events_query: Arc<dyn EventsQuery>,
    /// The RSVP facade.
    pub rsvp: Arc<dyn RsvpCommand>,
}

impl HttpState {
    /// Bundle the given port implementations.
    pub fn new(
        users: Arc<dyn UserRepository>,
        events: Arc<dyn EventsCommand>,
        events_query: Arc<dyn EventsQuery>,
        rsvp: Arc<dyn RsvpCommand>,
    ) -> Self {
        Self {
            users,
            events,
            events_query,
            rsvp,
        }
    }
}
