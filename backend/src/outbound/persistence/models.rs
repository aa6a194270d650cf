//! Diesel row models and row→domain conversions.
//!
//! Rows are internal to the persistence layer; domain types cross the port
//! boundary only after passing their validated constructors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::events::{Capacity, Event, EventDraft, EventTitle};
use crate::domain::ports::EventStoreError;
use crate::domain::UserId;

use super::schema::{event_members, events, users};

/// Read model for the `users` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Primary key.
    pub id: Uuid,
    /// Display name column.
    pub display_name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for the `users` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// Display name column.
    pub display_name: &'a str,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Read model for the `events` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventRow {
    /// Primary key.
    pub id: Uuid,
    /// Owner user id.
    pub creator_id: Uuid,
    /// Title column.
    pub title: String,
    /// Description column.
    pub description: Option<String>,
    /// Location column.
    pub location: Option<String>,
    /// Scheduled start instant.
    pub scheduled_at: DateTime<Utc>,
    /// Capacity column.
    pub capacity: i32,
    /// Soft-delete flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for the `events` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = events)]
pub struct NewEventRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// Owner user id.
    pub creator_id: Uuid,
    /// Title column.
    pub title: &'a str,
    /// Description column.
    pub description: Option<&'a str>,
    /// Location column.
    pub location: Option<&'a str>,
    /// Scheduled start instant.
    pub scheduled_at: DateTime<Utc>,
    /// Capacity column.
    pub capacity: i32,
    /// Soft-delete flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset for owner field edits; `None` skips the column.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = events)]
pub struct EventChangeset {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement location.
    pub location: Option<String>,
    /// Replacement schedule.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Replacement capacity.
    pub capacity: Option<i32>,
    /// Modification timestamp; always stamped.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert model for the `event_members` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = event_members)]
pub struct NewEventMemberRow {
    /// Event the membership belongs to.
    pub event_id: Uuid,
    /// Member user id.
    pub user_id: Uuid,
    /// Join timestamp.
    pub joined_at: DateTime<Utc>,
}

fn map_validation<E: std::fmt::Display>(error: E) -> EventStoreError {
    EventStoreError::query(error.to_string())
}

/// Convert a capacity column value into the domain newtype.
pub fn capacity_from_column(capacity: i32) -> Result<Capacity, EventStoreError> {
    let raw = u32::try_from(capacity).map_err(|_| {
        EventStoreError::query(format!("capacity column out of range: {capacity}"))
    })?;
    Capacity::new(raw).map_err(map_validation)
}

/// Convert the domain capacity into its column value.
pub fn capacity_to_column(capacity: Capacity) -> Result<i32, EventStoreError> {
    i32::try_from(capacity.get()).map_err(|_| {
        EventStoreError::query(format!("capacity out of column range: {capacity}"))
    })
}

/// Convert an event row plus its member ids (in join order) into a validated
/// domain event.
pub fn row_to_event(row: EventRow, member_ids: Vec<Uuid>) -> Result<Event, EventStoreError> {
    let EventRow {
        id,
        creator_id,
        title,
        description,
        location,
        scheduled_at,
        capacity,
        active,
        created_at,
        updated_at,
    } = row;

    Event::new(EventDraft {
        id,
        creator_id: UserId::from_uuid(creator_id),
        title: EventTitle::new(title).map_err(map_validation)?,
        description,
        location,
        scheduled_at,
        capacity: capacity_from_column(capacity)?,
        members: member_ids.into_iter().map(UserId::from_uuid).collect(),
        active,
        created_at,
        updated_at,
    })
    .map_err(map_validation)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion edge cases.
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn valid_row() -> EventRow {
        let now = Utc::now();
        EventRow {
            id: Uuid::new_v4(),
            creator_id: Uuid::new_v4(),
            title: "Evening picnic".to_owned(),
            description: None,
            location: Some("Riverside park".to_owned()),
            scheduled_at: now + chrono::Duration::days(1),
            capacity: 8,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn row_conversion_preserves_member_order(valid_row: EventRow) {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let event =
            row_to_event(valid_row, vec![first, second]).expect("valid row should convert");
        assert_eq!(
            event.members,
            vec![UserId::from_uuid(first), UserId::from_uuid(second)]
        );
    }

    #[rstest]
    fn row_conversion_rejects_invalid_capacity(mut valid_row: EventRow) {
        valid_row.capacity = 0;

        let error = row_to_event(valid_row, Vec::new()).expect_err("invalid capacity should fail");
        assert!(matches!(error, EventStoreError::Query { .. }));
    }

    #[rstest]
    fn row_conversion_rejects_more_members_than_capacity(mut valid_row: EventRow) {
        valid_row.capacity = 1;

        let members = vec![Uuid::new_v4(), Uuid::new_v4()];
        let error = row_to_event(valid_row, members).expect_err("over-capacity row should fail");
        assert!(matches!(error, EventStoreError::Query { .. }));
    }

    #[rstest]
    #[case(-1)]
    #[case(0)]
    fn capacity_column_conversion_rejects_non_positive(#[case] capacity: i32) {
        assert!(capacity_from_column(capacity).is_err());
    }
}
