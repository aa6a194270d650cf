//! Event aggregate and its validated value types.
//!
//! An event is the unit of admission control: a fixed-capacity gathering with
//! a membership set owned exclusively by the event store. Everything here is
//! plain data with validated constructors; the concurrency-sensitive logic
//! lives in [`admission`] and [`rsvp`].
//!
//! ## Invariants
//! - `members` contains no duplicate user ids (set semantics; insertion order
//!   is preserved for display only).
//! - `|members| <= capacity`.
//! - Whether an event is "past" is derived from `scheduled_at` against an
//!   injected clock, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

pub mod admission;
pub mod query_impl;
pub mod rsvp;
pub mod service;

pub use admission::AdmissionController;
pub use query_impl::EventsQueryService;
pub use rsvp::RsvpService;
pub use service::EventsService;

/// Minimum allowed length for an event title.
pub const TITLE_MIN: usize = 3;
/// Maximum allowed length for an event title.
pub const TITLE_MAX: usize = 120;
/// Maximum allowed length for an event description.
pub const DESCRIPTION_MAX: usize = 2000;
/// Maximum allowed length for an event location.
pub const LOCATION_MAX: usize = 200;

/// Validation errors returned by the event constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    /// The title was empty or whitespace-only.
    EmptyTitle,
    /// The title was shorter than the minimum.
    TitleTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// The title exceeded the maximum.
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The description exceeded the maximum.
    DescriptionTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The location exceeded the maximum.
    LocationTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Capacity must be at least one.
    ZeroCapacity,
    /// The same user appeared twice in the member set.
    DuplicateMember {
        /// Offending user id.
        user_id: UserId,
    },
    /// The member set exceeded the capacity.
    OverCapacity {
        /// Configured capacity.
        capacity: u32,
        /// Actual member count.
        members: usize,
    },
}

impl std::fmt::Display for EventValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "event title must not be empty"),
            Self::TitleTooShort { min } => {
                write!(f, "event title must be at least {min} characters")
            }
            Self::TitleTooLong { max } => {
                write!(f, "event title must be at most {max} characters")
            }
            Self::DescriptionTooLong { max } => {
                write!(f, "event description must be at most {max} characters")
            }
            Self::LocationTooLong { max } => {
                write!(f, "event location must be at most {max} characters")
            }
            Self::ZeroCapacity => write!(f, "event capacity must be at least 1"),
            Self::DuplicateMember { user_id } => {
                write!(f, "user {user_id} appears more than once in the member set")
            }
            Self::OverCapacity { capacity, members } => {
                write!(f, "member count {members} exceeds capacity {capacity}")
            }
        }
    }
}

impl std::error::Error for EventValidationError {}

/// Validated event title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventTitle(String);

impl EventTitle {
    /// Validate and construct an [`EventTitle`].
    pub fn new(title: impl Into<String>) -> Result<Self, EventValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }
        let length = title.chars().count();
        if length < TITLE_MIN {
            return Err(EventValidationError::TitleTooShort { min: TITLE_MIN });
        }
        if length > TITLE_MAX {
            return Err(EventValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(title))
    }

    /// Borrow the validated title.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for EventTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EventTitle> for String {
    fn from(value: EventTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for EventTitle {
    type Error = EventValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Attendance capacity, always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Capacity(u32);

impl Capacity {
    /// Validate and construct a [`Capacity`].
    pub const fn new(capacity: u32) -> Result<Self, EventValidationError> {
        if capacity == 0 {
            return Err(EventValidationError::ZeroCapacity);
        }
        Ok(Self(capacity))
    }

    /// The raw capacity value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Capacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Capacity> for u32 {
    fn from(value: Capacity) -> Self {
        value.0
    }
}

impl TryFrom<u32> for Capacity {
    type Error = EventValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unvalidated event fields, produced by adapters and consumed by
/// [`Event::new`].
#[derive(Debug, Clone)]
pub struct EventDraft {
    /// Stable event identifier.
    pub id: Uuid,
    /// Owner identity; immutable after creation.
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
    /// Current member set in join order.
    pub members: Vec<UserId>,
    /// Soft-delete flag.
    pub active: bool,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A fixed-capacity event with its membership set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Stable event identifier.
    pub id: Uuid,
    /// Owner identity; immutable after creation.
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
    /// Current member set in join order.
    pub members: Vec<UserId>,
    /// Soft-delete flag.
    pub active: bool,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

fn normalise_text(
    value: Option<String>,
    max: usize,
    too_long: impl FnOnce(usize) -> EventValidationError,
) -> Result<Option<String>, EventValidationError> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if trimmed.chars().count() > max {
                return Err(too_long(max));
            }
            Ok(Some(trimmed.to_owned()))
        }
    }
}

impl Event {
    /// Validate a draft into an event.
    ///
    /// Checks the membership invariants (no duplicates, within capacity) and
    /// normalises the optional text fields: surrounding whitespace is trimmed
    /// and blank values collapse to `None`.
    pub fn new(draft: EventDraft) -> Result<Self, EventValidationError> {
        let EventDraft {
            id,
            creator_id,
            title,
            description,
            location,
            scheduled_at,
            capacity,
            members,
            active,
            created_at,
            updated_at,
        } = draft;

        let description = normalise_text(description, DESCRIPTION_MAX, |max| {
            EventValidationError::DescriptionTooLong { max }
        })?;
        let location = normalise_text(location, LOCATION_MAX, |max| {
            EventValidationError::LocationTooLong { max }
        })?;

        let mut seen = std::collections::HashSet::with_capacity(members.len());
        for member in &members {
            if !seen.insert(*member) {
                return Err(EventValidationError::DuplicateMember { user_id: *member });
            }
        }
        if members.len() > capacity.get() as usize {
            return Err(EventValidationError::OverCapacity {
                capacity: capacity.get(),
                members: members.len(),
            });
        }

        Ok(Self {
            id,
            creator_id,
            title,
            description,
            location,
            scheduled_at,
            capacity,
            members,
            active,
            created_at,
            updated_at,
        })
    }

    /// Number of spots still open, never negative.
    pub fn spots_remaining(&self) -> u32 {
        let members = u32::try_from(self.members.len()).unwrap_or(u32::MAX);
        self.capacity.get().saturating_sub(members)
    }

    /// Current member count.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether the given user is in the member set.
    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.members.contains(user_id)
    }

    /// Whether the event's scheduled instant is at or before `now`.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at <= now
    }
}

#[cfg(test)]
mod tests;
