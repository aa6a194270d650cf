//! Event CRUD and listing HTTP handlers.
//!
//! ```text
//! POST   /api/v1/events
//! GET    /api/v1/events
//! GET    /api/v1/events/{event_id}
//! PATCH  /api/v1/events/{event_id}
//! DELETE /api/v1/events/{event_id}
//! GET    /api/v1/events/{event_id}/attendance
//! GET    /api/v1/users/me/events
//! GET    /api/v1/users/me/rsvps
//! ```
//!
//! Reads are open; mutations require a session and are owner-only beyond
//! creation. Everything here is request/response mapping — invariants live in
//! the domain services.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::events::{Capacity, Event, EventTitle};
use crate::domain::ports::{
    Attendance, CreateEventRequest, EventPatch, EventWindow, ListEventsRequest,
    UpdateEventRequest,
};
use crate::domain::Error;
use crate::inbound::http::schemas::{ErrorSchema, EventSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    field_validation_error, missing_field_error, parse_rfc3339_timestamp, FieldName,
};
use crate::inbound::http::ApiResult;

const TITLE_FIELD: FieldName = FieldName::new("title");
const SCHEDULED_AT_FIELD: FieldName = FieldName::new("scheduledAt");
const CAPACITY_FIELD: FieldName = FieldName::new("capacity");
const WHEN_FIELD: FieldName = FieldName::new("when");

#[derive(Debug, Deserialize)]
struct EventPath {
    event_id: Uuid,
}

/// Request payload for creating an event.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventBody {
    /// Event title.
    pub title: Option<String>,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional venue description.
    pub location: Option<String>,
    /// Scheduled start, RFC 3339.
    pub scheduled_at: Option<String>,
    /// Attendance capacity, at least 1.
    pub capacity: Option<u32>,
}

/// Request payload for owner edits; absent fields are left untouched.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventBody {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement location.
    pub location: Option<String>,
    /// Replacement schedule, RFC 3339.
    pub scheduled_at: Option<String>,
    /// Replacement capacity.
    pub capacity: Option<u32>,
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Time window: `upcoming` (default), `past`, or `all`.
    pub when: Option<String>,
    /// Page size.
    pub limit: Option<u32>,
    /// Page start.
    pub offset: Option<u32>,
}

/// Response payload for a single event.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    /// Event identifier.
    pub id: String,
    /// Owner identifier.
    pub creator_id: String,
    /// Event title.
    pub title: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Venue description.
    pub location: Option<String>,
    /// Scheduled start, RFC 3339.
    pub scheduled_at: String,
    /// Attendance capacity.
    pub capacity: u32,
    /// Attendee ids in join order.
    pub attendees: Vec<String>,
    /// Spots still open.
    pub spots_remaining: u32,
    /// Soft-delete flag.
    pub active: bool,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
    /// Modification timestamp, RFC 3339.
    pub updated_at: String,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        let spots_remaining = event.spots_remaining();
        Self {
            id: event.id.to_string(),
            creator_id: event.creator_id.to_string(),
            title: event.title.to_string(),
            description: event.description,
            location: event.location,
            scheduled_at: event.scheduled_at.to_rfc3339(),
            capacity: event.capacity.get(),
            attendees: event
                .members
                .iter()
                .map(std::string::ToString::to_string)
                .collect(),
            spots_remaining,
            active: event.active,
            created_at: event.created_at.to_rfc3339(),
            updated_at: event.updated_at.to_rfc3339(),
        }
    }
}

/// Response payload for a listing page.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventsPageResponse {
    /// Events in window order.
    pub events: Vec<EventResponse>,
    /// Effective page size.
    pub limit: u32,
    /// Page start.
    pub offset: u32,
}

fn parse_title(raw: String) -> Result<EventTitle, Error> {
    EventTitle::new(raw).map_err(|error| field_validation_error(TITLE_FIELD, error))
}

fn parse_capacity(raw: u32) -> Result<Capacity, Error> {
    Capacity::new(raw).map_err(|error| field_validation_error(CAPACITY_FIELD, error))
}

fn parse_window(raw: Option<String>) -> Result<EventWindow, Error> {
    match raw.as_deref() {
        None | Some("upcoming") => Ok(EventWindow::Upcoming),
        Some("past") => Ok(EventWindow::Past),
        Some("all") => Ok(EventWindow::All),
        Some(other) => Err(field_validation_error(
            WHEN_FIELD,
            format!("unknown window: {other} (expected upcoming, past, or all)"),
        )),
    }
}

fn parse_update_body(body: UpdateEventBody) -> Result<EventPatch, Error> {
    Ok(EventPatch {
        title: body.title.map(parse_title).transpose()?,
        description: body.description,
        location: body.location,
        scheduled_at: body
            .scheduled_at
            .map(|raw| parse_rfc3339_timestamp(raw, SCHEDULED_AT_FIELD))
            .transpose()?,
        capacity: body.capacity.map(parse_capacity).transpose()?,
    })
}

/// Create an event owned by the session user.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = CreateEventBody,
    responses(
        (status = 201, description = "Event created", body = EventSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["events"],
    operation_id = "createEvent"
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateEventBody>,
) -> ApiResult<HttpResponse> {
    let creator_id = session.require_user_id()?;
    let body = payload.into_inner();

    let title = parse_title(body.title.ok_or_else(|| missing_field_error(TITLE_FIELD))?)?;
    let scheduled_at = parse_rfc3339_timestamp(
        body.scheduled_at
            .ok_or_else(|| missing_field_error(SCHEDULED_AT_FIELD))?,
        SCHEDULED_AT_FIELD,
    )?;
    let capacity = parse_capacity(
        body.capacity
            .ok_or_else(|| missing_field_error(CAPACITY_FIELD))?,
    )?;

    let event = state
        .events
        .create(CreateEventRequest {
            creator_id,
            title,
            description: body.description,
            location: body.location,
            scheduled_at,
            capacity,
        })
        .await?;
    Ok(HttpResponse::Created().json(EventResponse::from(event)))
}

/// List active events in a time window.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(
        ("when" = Option<String>, Query, description = "upcoming (default), past, or all"),
        ("limit" = Option<u32>, Query, description = "page size, capped at 100"),
        ("offset" = Option<u32>, Query, description = "page start"),
    ),
    responses(
        (status = 200, description = "Events page", body = EventsPageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["events"],
    operation_id = "listEvents",
    security([])
)]
#[get("/events")]
pub async fn list_events(
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<EventsPageResponse>> {
    let ListQuery {
        when,
        limit,
        offset,
    } = query.into_inner();
    let page = state
        .events_query
        .list(ListEventsRequest {
            window: parse_window(when)?,
            limit: limit.unwrap_or(0),
            offset: offset.unwrap_or(0),
        })
        .await?;

    Ok(web::Json(EventsPageResponse {
        events: page.events.into_iter().map(EventResponse::from).collect(),
        limit: page.limit,
        offset: page.offset,
    }))
}

/// Fetch one event.
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}",
    params(("event_id" = Uuid, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Event detail", body = EventSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["events"],
    operation_id = "getEvent",
    security([])
)]
#[get("/events/{event_id}")]
pub async fn get_event(
    state: web::Data<HttpState>,
    path: web::Path<EventPath>,
) -> ApiResult<web::Json<EventResponse>> {
    let event = state
        .events_query
        .get(&path.event_id)
        .await?
        .ok_or_else(|| Error::not_found("event not found"))?;
    Ok(web::Json(EventResponse::from(event)))
}

/// Apply owner edits to an event.
#[utoipa::path(
    patch,
    path = "/api/v1/events/{event_id}",
    params(("event_id" = Uuid, Path, description = "Event identifier")),
    request_body = UpdateEventBody,
    responses(
        (status = 200, description = "Updated event", body = EventSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Capacity below attendee count", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["events"],
    operation_id = "updateEvent"
)]
#[patch("/events/{event_id}")]
pub async fn update_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<EventPath>,
    payload: web::Json<UpdateEventBody>,
) -> ApiResult<web::Json<EventResponse>> {
    let caller = session.require_user_id()?;
    let patch = parse_update_body(payload.into_inner())?;
    let event = state
        .events
        .update(UpdateEventRequest {
            event_id: path.event_id,
            caller,
            patch,
        })
        .await?;
    Ok(web::Json(EventResponse::from(event)))
}

/// Soft-delete an event.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{event_id}",
    params(("event_id" = Uuid, Path, description = "Event identifier")),
    responses(
        (status = 204, description = "Event deactivated"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["events"],
    operation_id = "deleteEvent"
)]
#[delete("/events/{event_id}")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<EventPath>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    state.events.deactivate(&path.event_id, &caller).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Attendance counts for one event.
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}/attendance",
    params(("event_id" = Uuid, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Attendance counts"),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["events"],
    operation_id = "getAttendance",
    security([])
)]
#[get("/events/{event_id}/attendance")]
pub async fn get_attendance(
    state: web::Data<HttpState>,
    path: web::Path<EventPath>,
) -> ApiResult<web::Json<Attendance>> {
    let attendance = state
        .events_query
        .attendance(&path.event_id)
        .await?
        .ok_or_else(|| Error::not_found("event not found"))?;
    Ok(web::Json(attendance))
}

/// Events created by the session user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/events",
    responses(
        (status = 200, description = "Created events", body = [EventSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["events"],
    operation_id = "myEvents"
)]
#[get("/users/me/events")]
pub async fn my_events(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<EventResponse>>> {
    let user_id = session.require_user_id()?;
    let events = state.events_query.created_by(&user_id).await?;
    Ok(web::Json(
        events.into_iter().map(EventResponse::from).collect(),
    ))
}

/// Active events the session user has joined.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/rsvps",
    responses(
        (status = 200, description = "Joined events", body = [EventSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["events"],
    operation_id = "myRsvps"
)]
#[get("/users/me/rsvps")]
pub async fn my_rsvps(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<EventResponse>>> {
    let user_id = session.require_user_id()?;
    let events = state.events_query.joined_by(&user_id).await?;
    Ok(web::Json(
        events.into_iter().map(EventResponse::from).collect(),
    ))
}
