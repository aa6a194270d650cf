//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed domain entities and the RSVP core
//! (admission control, facade, queries) behind the port traits in [`ports`].
//! Keep types immutable and document invariants in each type's Rustdoc;
//! framework concerns stay in the inbound and outbound layers.

pub mod error;
pub mod events;
pub mod ports;
pub mod user;

pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::events::{
    AdmissionController, EventsQueryService, EventsService, RsvpService,
};
pub use self::user::{DisplayName, User, UserId, UserValidationError};

/// Convenient result alias for domain operations.
pub type ApiResult<T> = Result<T, Error>;
