//! Driving port for owner-side event CRUD.
//!
//! Ownership violations and capacity conflicts are caller errors and travel
//! through [`crate::domain::Error`] (unlike RSVP admission, where "not
//! applied" is a normal outcome).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::events::{Capacity, Event, EventTitle};
use crate::domain::{Error, UserId};

use super::EventPatch;

/// Fields for a new event. The creator becomes the owner; the member set
/// starts empty.
#[derive(Debug, Clone)]
pub struct CreateEventRequest {
    /// Authenticated caller creating the event.
    pub creator_id: UserId,
    /// Validated title.
    pub title: EventTitle,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional venue description.
    pub location: Option<String>,
    /// Scheduled start instant.
    pub scheduled_at: DateTime<Utc>,
    /// Attendance capacity.
    pub capacity: Capacity,
}

/// Owner edit of an existing event.
#[derive(Debug, Clone)]
pub struct UpdateEventRequest {
    /// Event to edit.
    pub event_id: Uuid,
    /// Authenticated caller; must be the creator.
    pub caller: UserId,
    /// Fields to change.
    pub patch: EventPatch,
}

/// Port for event creation, editing, and soft deletion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventsCommand: Send + Sync {
    /// Create a new event owned by the caller.
    async fn create(&self, request: CreateEventRequest) -> Result<Event, Error>;

    /// Apply owner edits. Fails with `forbidden` for non-owners and with a
    /// `conflict` carrying the member count when capacity would drop below
    /// the current membership.
    async fn update(&self, request: UpdateEventRequest) -> Result<Event, Error>;

    /// Soft-delete an event (`active = false`). Owner only.
    async fn deactivate(&self, event_id: &Uuid, caller: &UserId) -> Result<Event, Error>;
}

/// Fixture implementation: creation is unavailable and lookups miss.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEventsCommand;

#[async_trait]
impl EventsCommand for FixtureEventsCommand {
    async fn create(&self, _request: CreateEventRequest) -> Result<Event, Error> {
        Err(Error::internal("event creation is not available"))
    }

    async fn update(&self, _request: UpdateEventRequest) -> Result<Event, Error> {
        Err(Error::not_found("event not found"))
    }

    async fn deactivate(&self, _event_id: &Uuid, _caller: &UserId) -> Result<Event, Error> {
        Err(Error::not_found("event not found"))
    }
}
