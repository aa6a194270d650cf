//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the structure of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns
//! belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with the current state of the resource.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service is unavailable; retry later.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "this event is full")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients, e.g. `reason` and
    /// `spotsRemaining` on RSVP conflicts.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::User`].
///
/// Application user with stable identifier and display name.
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    /// Stable user identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    /// Display name shown to other users.
    #[schema(value_type = String, example = "Ada Lovelace")]
    display_name: String,
}

/// OpenAPI schema for [`crate::domain::events::Event`].
///
/// Fixed-capacity event with its attendee list and derived spots-remaining
/// figure.
#[derive(ToSchema)]
#[schema(as = crate::domain::events::Event)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EventSchema {
    /// Event identifier.
    #[schema(example = "0d9be267-38fa-4a17-bf6c-8ae9ab2b1bdb")]
    id: String,
    /// Owner identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    creator_id: String,
    /// Event title.
    #[schema(example = "Board games night")]
    title: String,
    /// Free-text description.
    description: Option<String>,
    /// Venue description.
    location: Option<String>,
    /// Scheduled start, RFC 3339.
    #[schema(example = "2025-06-14T19:00:00Z")]
    scheduled_at: String,
    /// Attendance capacity.
    #[schema(example = 8, minimum = 1)]
    capacity: u32,
    /// Attendee ids in join order.
    attendees: Vec<String>,
    /// Spots still open.
    #[schema(example = 3)]
    spots_remaining: u32,
    /// Soft-delete flag.
    active: bool,
    /// Creation timestamp, RFC 3339.
    created_at: String,
    /// Modification timestamp, RFC 3339.
    updated_at: String,
}
