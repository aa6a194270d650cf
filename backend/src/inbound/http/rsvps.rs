//! RSVP HTTP handlers: join and leave.
//!
//! ```text
//! POST   /api/v1/events/{event_id}/rsvp
//! DELETE /api/v1/events/{event_id}/rsvp
//! ```
//!
//! Every rejection maps to a distinct, actionable error: the HTTP status
//! carries the category (`404`/`409`) and `details.reason` carries the
//! specific cause. Capacity exhaustion always reports `spotsRemaining: 0`
//! explicitly rather than a generic failure.

use actix_web::{delete, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{
    JoinOutcome, JoinRejection, LeaveOutcome, LeaveRejection, RsvpSnapshot,
};
use crate::domain::Error;
use crate::inbound::http::events::EventResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

#[derive(Debug, Deserialize)]
struct EventPath {
    event_id: Uuid,
}

/// Response payload for a successful join or leave.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RsvpResponse {
    /// Post-mutation event state.
    pub event: EventResponse,
    /// Spots still open, computed from the same snapshot as `event`.
    pub spots_remaining: u32,
}

impl From<RsvpSnapshot> for RsvpResponse {
    fn from(snapshot: RsvpSnapshot) -> Self {
        Self {
            spots_remaining: snapshot.spots_remaining,
            event: EventResponse::from(snapshot.event),
        }
    }
}

fn map_join_rejection(rejection: JoinRejection) -> Error {
    match rejection {
        JoinRejection::NotFound => Error::not_found("event not found"),
        JoinRejection::EventEnded => Error::conflict("this event has already taken place")
            .with_details(json!({ "reason": "event_ended" })),
        JoinRejection::CreatorImplicitlyAttending => {
            Error::conflict("you created this event, so you are already attending")
                .with_details(json!({ "reason": "creator_implicitly_attending" }))
        }
        JoinRejection::AlreadyJoined => Error::conflict("you have already joined this event")
            .with_details(json!({ "reason": "already_joined" })),
        JoinRejection::AtCapacity { spots_remaining } => Error::conflict("this event is full")
            .with_details(json!({
                "reason": "at_capacity",
                "spotsRemaining": spots_remaining,
            })),
        JoinRejection::TransientConflict => {
            Error::conflict("the event changed while handling the request, please retry")
                .with_details(json!({ "reason": "transient_conflict", "retryable": true }))
        }
    }
}

fn map_leave_rejection(rejection: LeaveRejection) -> Error {
    match rejection {
        LeaveRejection::NotFound => Error::not_found("event not found"),
        LeaveRejection::NotJoined => Error::conflict("you have not joined this event")
            .with_details(json!({ "reason": "not_joined" })),
    }
}

/// Join an event as the session user.
#[utoipa::path(
    post,
    path = "/api/v1/events/{event_id}/rsvp",
    params(("event_id" = Uuid, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Joined", body = RsvpResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Join did not apply; details.reason says why", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["rsvps"],
    operation_id = "joinEvent"
)]
#[post("/events/{event_id}/rsvp")]
pub async fn join_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<EventPath>,
) -> ApiResult<web::Json<RsvpResponse>> {
    let user_id = session.require_user_id()?;
    match state.rsvp.join(&path.event_id, &user_id).await? {
        JoinOutcome::Joined(snapshot) => Ok(web::Json(RsvpResponse::from(snapshot))),
        JoinOutcome::Rejected(rejection) => Err(map_join_rejection(rejection)),
    }
}

/// Leave an event as the session user.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{event_id}/rsvp",
    params(("event_id" = Uuid, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Left", body = RsvpResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Leave did not apply; details.reason says why", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["rsvps"],
    operation_id = "leaveEvent"
)]
#[delete("/events/{event_id}/rsvp")]
pub async fn leave_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<EventPath>,
) -> ApiResult<web::Json<RsvpResponse>> {
    let user_id = session.require_user_id()?;
    match state.rsvp.leave(&path.event_id, &user_id).await? {
        LeaveOutcome::Left(snapshot) => Ok(web::Json(RsvpResponse::from(snapshot))),
        LeaveOutcome::Rejected(rejection) => Err(map_leave_rejection(rejection)),
    }
}
