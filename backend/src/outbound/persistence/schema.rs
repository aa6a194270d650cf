//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// User accounts table.
    ///
    /// Stores registered users with their display names and audit timestamps.
    /// The `id` column is the primary key (UUID v4).
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Human-readable display name (max 32 characters).
        display_name -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Events table.
    ///
    /// One row per event; the membership set lives in `event_members`.
    /// Every membership mutation locks this row (`SELECT ... FOR UPDATE`),
    /// which is what serialises concurrent admissions per event.
    events (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owner user id; immutable after creation.
        creator_id -> Uuid,
        /// Event title (max 120 characters).
        title -> Varchar,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Optional venue description (max 200 characters).
        location -> Nullable<Varchar>,
        /// Scheduled start instant.
        scheduled_at -> Timestamptz,
        /// Attendance capacity; CHECK (capacity >= 1).
        capacity -> Int4,
        /// Soft-delete flag.
        active -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Event membership table.
    ///
    /// Composite primary key `(event_id, user_id)` is the database-level
    /// backstop for the no-duplicate-membership invariant.
    event_members (event_id, user_id) {
        /// Event the membership belongs to.
        event_id -> Uuid,
        /// Member user id.
        user_id -> Uuid,
        /// Join timestamp; also the display ordering for attendee lists.
        joined_at -> Timestamptz,
    }
}

diesel::joinable!(event_members -> events (event_id));
diesel::joinable!(event_members -> users (user_id));
diesel::joinable!(events -> users (creator_id));

diesel::allow_tables_to_appear_in_same_query!(users, events, event_members);
