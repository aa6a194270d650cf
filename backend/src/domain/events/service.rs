//! Owner-side event CRUD services.
//!
//! Creation and edits never touch the member set — membership changes flow
//! exclusively through the admission path. The one point of contact is the
//! capacity floor: an owner may raise capacity freely but may not lower it
//! below the current member count, and the store evaluates that floor
//! atomically against the live membership.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use uuid::Uuid;

use crate::domain::events::{Event, EventDraft, EventValidationError};
use crate::domain::ports::{
    CreateEventRequest, EventStore, EventUpdate, EventsCommand, UpdateEventRequest,
};
use crate::domain::{Error, UserId};

use super::admission::map_store_error;

/// Map an aggregate validation failure onto a caller error.
pub(crate) fn map_validation_error(error: EventValidationError) -> Error {
    Error::invalid_request(error.to_string())
}

/// Event CRUD service implementing the driving port.
#[derive(Clone)]
pub struct EventsService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> EventsService<S> {
    /// Create a new service over the authoritative store.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S> EventsService<S>
where
    S: EventStore,
{
    /// Fetch the event and confirm the caller owns it.
    async fn owned_event(&self, event_id: &Uuid, caller: &UserId) -> Result<Event, Error> {
        let event = self
            .store
            .get(event_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("event not found"))?;
        if event.creator_id != *caller {
            return Err(Error::forbidden("only the event creator may modify it"));
        }
        Ok(event)
    }
}

#[async_trait]
impl<S> EventsCommand for EventsService<S>
where
    S: EventStore,
{
    async fn create(&self, request: CreateEventRequest) -> Result<Event, Error> {
        let now = self.clock.utc();
        let event = Event::new(EventDraft {
            id: Uuid::new_v4(),
            creator_id: request.creator_id,
            title: request.title,
            description: request.description,
            location: request.location,
            scheduled_at: request.scheduled_at,
            capacity: request.capacity,
            members: Vec::new(),
            active: true,
            created_at: now,
            updated_at: now,
        })
        .map_err(map_validation_error)?;

        self.store.insert(&event).await.map_err(map_store_error)?;
        tracing::info!(event_id = %event.id, creator = %event.creator_id, "event created");
        Ok(event)
    }

    async fn update(&self, request: UpdateEventRequest) -> Result<Event, Error> {
        let UpdateEventRequest {
            event_id,
            caller,
            patch,
        } = request;

        // Ownership is immutable, so this read cannot go stale in a way that
        // matters; the capacity floor is re-checked atomically by the store.
        let _ = self.owned_event(&event_id, &caller).await?;

        let now = self.clock.utc();
        match self
            .store
            .update_details(&event_id, patch, now)
            .await
            .map_err(map_store_error)?
        {
            EventUpdate::Applied(event) => Ok(event),
            EventUpdate::CapacityConflict { members } => Err(Error::conflict(
                "capacity may not be lowered below the current attendee count",
            )
            .with_details(json!({
                "reason": "capacity_below_members",
                "members": members,
            }))),
            EventUpdate::NotFound => Err(Error::not_found("event not found")),
        }
    }

    async fn deactivate(&self, event_id: &Uuid, caller: &UserId) -> Result<Event, Error> {
        let _ = self.owned_event(event_id, caller).await?;

        let now = self.clock.utc();
        let event = self
            .store
            .deactivate(event_id, now)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("event not found"))?;
        tracing::info!(%event_id, "event deactivated");
        Ok(event)
    }
}
