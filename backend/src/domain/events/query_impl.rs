//! Read-path service for event queries.
//!
//! Deactivated events read as absent on every public path; owners reach them
//! through [`EventsQuery::created_by`]. Figures returned here are display
//! data — admission decisions never consult them.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::events::Event;
use crate::domain::ports::{
    Attendance, EventListFilter, EventStore, EventsPage, EventsQuery, ListEventsRequest,
    LIST_LIMIT_DEFAULT, LIST_LIMIT_MAX,
};
use crate::domain::{Error, UserId};

use super::admission::map_store_error;

/// Query service implementing the driving port.
#[derive(Clone)]
pub struct EventsQueryService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> EventsQueryService<S> {
    /// Create a new service over the authoritative store.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

fn clamp_limit(limit: u32) -> u32 {
    if limit == 0 {
        LIST_LIMIT_DEFAULT
    } else {
        limit.min(LIST_LIMIT_MAX)
    }
}

#[async_trait]
impl<S> EventsQuery for EventsQueryService<S>
where
    S: EventStore,
{
    async fn get(&self, event_id: &Uuid) -> Result<Option<Event>, Error> {
        let event = self
            .store
            .get(event_id)
            .await
            .map_err(map_store_error)?
            .filter(|event| event.active);
        Ok(event)
    }

    async fn list(&self, request: ListEventsRequest) -> Result<EventsPage, Error> {
        let limit = clamp_limit(request.limit);
        let filter = EventListFilter {
            window: request.window,
            now: self.clock.utc(),
            limit,
            offset: request.offset,
        };
        let events = self.store.list(&filter).await.map_err(map_store_error)?;
        Ok(EventsPage {
            events,
            limit,
            offset: request.offset,
        })
    }

    async fn created_by(&self, user_id: &UserId) -> Result<Vec<Event>, Error> {
        self.store
            .list_created_by(user_id)
            .await
            .map_err(map_store_error)
    }

    async fn joined_by(&self, user_id: &UserId) -> Result<Vec<Event>, Error> {
        self.store
            .list_joined_by(user_id)
            .await
            .map_err(map_store_error)
    }

    async fn attendance(&self, event_id: &Uuid) -> Result<Option<Attendance>, Error> {
        let attendance = self.get(event_id).await?.map(|event| Attendance {
            capacity: event.capacity.get(),
            attending: u32::try_from(event.member_count()).unwrap_or(u32::MAX),
            spots_remaining: event.spots_remaining(),
        });
        Ok(attendance)
    }
}
