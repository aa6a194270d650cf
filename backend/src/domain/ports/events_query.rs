//! Driving port for the read paths consumed by surrounding UI.
//!
//! Queries never mutate. Listing figures may be stale the instant they are
//! produced; admission decisions never consult them.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::events::Event;
use crate::domain::{Error, UserId};

use super::EventWindow;

/// Maximum page size accepted by [`EventsQuery::list`].
pub const LIST_LIMIT_MAX: u32 = 100;
/// Page size used when the caller does not supply one.
pub const LIST_LIMIT_DEFAULT: u32 = 20;

/// Listing parameters.
#[derive(Debug, Clone, Copy)]
pub struct ListEventsRequest {
    /// Time window to select.
    pub window: EventWindow,
    /// Maximum number of events to return (capped at [`LIST_LIMIT_MAX`]).
    pub limit: u32,
    /// Number of events to skip.
    pub offset: u32,
}

/// One page of active events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    /// Events in window order.
    pub events: Vec<Event>,
    /// Effective limit applied to this page.
    pub limit: u32,
    /// Offset this page started from.
    pub offset: u32,
}

/// Aggregate attendance counts for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    /// Configured capacity.
    pub capacity: u32,
    /// Current member count.
    pub attending: u32,
    /// Spots still open; never negative.
    pub spots_remaining: u32,
}

/// Port for event read paths.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventsQuery: Send + Sync {
    /// Fetch one active event. Deactivated events read as absent; owners see
    /// them via [`EventsQuery::created_by`].
    async fn get(&self, event_id: &Uuid) -> Result<Option<Event>, Error>;

    /// List active events in the requested window.
    async fn list(&self, request: ListEventsRequest) -> Result<EventsPage, Error>;

    /// Events the user created, newest schedule first, including
    /// deactivated ones.
    async fn created_by(&self, user_id: &UserId) -> Result<Vec<Event>, Error>;

    /// Active events the user has joined, soonest schedule first.
    async fn joined_by(&self, user_id: &UserId) -> Result<Vec<Event>, Error>;

    /// Attendance counts for one active event.
    async fn attendance(&self, event_id: &Uuid) -> Result<Option<Attendance>, Error>;
}

/// Fixture implementation returning empty results.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEventsQuery;

#[async_trait]
impl EventsQuery for FixtureEventsQuery {
    async fn get(&self, _event_id: &Uuid) -> Result<Option<Event>, Error> {
        Ok(None)
    }

    async fn list(&self, request: ListEventsRequest) -> Result<EventsPage, Error> {
        Ok(EventsPage {
            events: Vec::new(),
            limit: request.limit,
            offset: request.offset,
        })
    }

    async fn created_by(&self, _user_id: &UserId) -> Result<Vec<Event>, Error> {
        Ok(Vec::new())
    }

    async fn joined_by(&self, _user_id: &UserId) -> Result<Vec<Event>, Error> {
        Ok(Vec::new())
    }

    async fn attendance(&self, _event_id: &Uuid) -> Result<Option<Attendance>, Error> {
        Ok(None)
    }
}
