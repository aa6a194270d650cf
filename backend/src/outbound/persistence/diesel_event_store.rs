//! PostgreSQL-backed `EventStore` implementation using Diesel ORM.
//!
//! # Atomicity
//!
//! Every membership mutation runs in a transaction that first takes a
//! `SELECT ... FOR UPDATE` lock on the event row. All admission writes for
//! one event contend on that lock, so the precondition check and the
//! membership insert/delete form one indivisible unit: a contender blocked on
//! the lock re-evaluates the predicate against the committed state of the
//! winner. This is the per-event mutual-exclusion variant of the conditional
//! update contract; commit order is the effective admission order.
//!
//! Multi-statement reads run under `REPEATABLE READ` so the event row and its
//! member rows come from a single snapshot.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::events::Event;
use crate::domain::ports::{
    Admission, EventListFilter, EventPatch, EventStore, EventStoreError, EventUpdate, EventWindow,
};
use crate::domain::UserId;

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    capacity_from_column, capacity_to_column, row_to_event, EventChangeset, EventRow,
    NewEventMemberRow, NewEventRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{event_members, events};

/// Diesel-backed implementation of the event store port.
#[derive(Clone)]
pub struct DieselEventStore {
    pool: DbPool,
}

impl DieselEventStore {
    /// Create a new store with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to store errors.
fn map_pool_error(error: PoolError) -> EventStoreError {
    map_basic_pool_error(error, EventStoreError::connection)
}

/// Map Diesel errors to store errors.
fn map_diesel_error(error: DieselError) -> EventStoreError {
    if let DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, info) = &error {
        return EventStoreError::write_conflict(info.message().to_owned());
    }
    map_basic_diesel_error(error, EventStoreError::query, EventStoreError::connection)
}

/// Error type threaded through membership transactions so that both Diesel
/// failures and row-conversion failures can abort the transaction.
#[derive(Debug)]
enum TxError {
    Diesel(DieselError),
    Store(EventStoreError),
}

impl From<DieselError> for TxError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

impl From<EventStoreError> for TxError {
    fn from(error: EventStoreError) -> Self {
        Self::Store(error)
    }
}

fn map_tx_error(error: TxError) -> EventStoreError {
    match error {
        TxError::Diesel(error) => map_diesel_error(error),
        TxError::Store(error) => error,
    }
}

/// Resolve a finished membership transaction into an admission outcome.
///
/// A unique violation on the membership primary key means another transaction
/// admitted the same user first; the precondition no longer holds, which is a
/// normal [`Admission::NotApplied`], not an error.
fn finish_admission(result: Result<Admission, TxError>) -> Result<Admission, EventStoreError> {
    match result {
        Ok(admission) => Ok(admission),
        Err(TxError::Diesel(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))) => {
            Ok(Admission::NotApplied)
        }
        Err(error) => Err(map_tx_error(error)),
    }
}

/// Lock the event row for the remainder of the transaction.
async fn lock_event_row(
    conn: &mut AsyncPgConnection,
    event_id: Uuid,
) -> Result<Option<EventRow>, DieselError> {
    events::table
        .find(event_id)
        .select(EventRow::as_select())
        .for_update()
        .first::<EventRow>(conn)
        .await
        .optional()
}

/// Member ids for one event in join order.
async fn load_member_ids(
    conn: &mut AsyncPgConnection,
    event_id: Uuid,
) -> Result<Vec<Uuid>, DieselError> {
    event_members::table
        .filter(event_members::event_id.eq(event_id))
        .order(event_members::joined_at.asc())
        .select(event_members::user_id)
        .load(conn)
        .await
}

/// Member ids for a page of events, grouped by event, in join order.
async fn load_member_map(
    conn: &mut AsyncPgConnection,
    event_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Uuid>>, DieselError> {
    let pairs: Vec<(Uuid, Uuid)> = event_members::table
        .filter(event_members::event_id.eq_any(event_ids))
        .order(event_members::joined_at.asc())
        .select((event_members::event_id, event_members::user_id))
        .load(conn)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::with_capacity(event_ids.len());
    for (event_id, user_id) in pairs {
        grouped.entry(event_id).or_default().push(user_id);
    }
    Ok(grouped)
}

fn rows_to_events(
    rows: Vec<EventRow>,
    mut members: HashMap<Uuid, Vec<Uuid>>,
) -> Result<Vec<Event>, EventStoreError> {
    rows.into_iter()
        .map(|row| {
            let member_ids = members.remove(&row.id).unwrap_or_default();
            row_to_event(row, member_ids)
        })
        .collect()
}

/// Which slice of the events table a snapshot read selects.
#[derive(Debug, Clone, Copy)]
enum EventsSelection {
    /// Active events in a time window, paginated.
    Window(EventListFilter),
    /// Everything a user created, including deactivated events.
    CreatedBy(Uuid),
    /// Active events a user has joined.
    JoinedBy(Uuid),
}

async fn select_event_rows(
    conn: &mut AsyncPgConnection,
    selection: EventsSelection,
) -> Result<Vec<EventRow>, DieselError> {
    match selection {
        EventsSelection::Window(filter) => {
            let mut query = events::table
                .filter(events::active.eq(true))
                .select(EventRow::as_select())
                .into_boxed();
            query = match filter.window {
                EventWindow::Upcoming => query
                    .filter(events::scheduled_at.gt(filter.now))
                    .order(events::scheduled_at.asc()),
                EventWindow::Past => query
                    .filter(events::scheduled_at.le(filter.now))
                    .order(events::scheduled_at.desc()),
                EventWindow::All => query.order(events::scheduled_at.asc()),
            };
            query
                .limit(i64::from(filter.limit))
                .offset(i64::from(filter.offset))
                .load(conn)
                .await
        }
        EventsSelection::CreatedBy(creator) => {
            events::table
                .filter(events::creator_id.eq(creator))
                .order(events::scheduled_at.desc())
                .select(EventRow::as_select())
                .load(conn)
                .await
        }
        EventsSelection::JoinedBy(member) => {
            events::table
                .inner_join(event_members::table)
                .filter(event_members::user_id.eq(member))
                .filter(events::active.eq(true))
                .order(events::scheduled_at.asc())
                .select(EventRow::as_select())
                .load(conn)
                .await
        }
    }
}

impl DieselEventStore {
    /// Load a slice of events plus their member sets from one snapshot.
    async fn load_events_snapshot(
        &self,
        selection: EventsSelection,
    ) -> Result<Vec<Event>, EventStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (rows, members) = conn
            .build_transaction()
            .read_only()
            .repeatable_read()
            .run(|conn| {
                async move {
                    let rows = select_event_rows(conn, selection).await?;
                    let event_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
                    let members = load_member_map(conn, &event_ids).await?;
                    Ok::<_, DieselError>((rows, members))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        rows_to_events(rows, members)
    }
}

#[async_trait]
impl EventStore for DieselEventStore {
    async fn insert(&self, event: &Event) -> Result<(), EventStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewEventRow {
            id: event.id,
            creator_id: *event.creator_id.as_uuid(),
            title: event.title.as_str(),
            description: event.description.as_deref(),
            location: event.location.as_deref(),
            scheduled_at: event.scheduled_at,
            capacity: capacity_to_column(event.capacity)?,
            active: event.active,
            created_at: event.created_at,
            updated_at: event.updated_at,
        };

        diesel::insert_into(events::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn get(&self, event_id: &Uuid) -> Result<Option<Event>, EventStoreError> {
        let event_id = *event_id;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let found = conn
            .build_transaction()
            .read_only()
            .repeatable_read()
            .run(|conn| {
                async move {
                    let row = events::table
                        .find(event_id)
                        .select(EventRow::as_select())
                        .first::<EventRow>(conn)
                        .await
                        .optional()?;
                    match row {
                        None => Ok::<_, DieselError>(None),
                        Some(row) => {
                            let member_ids = load_member_ids(conn, event_id).await?;
                            Ok(Some((row, member_ids)))
                        }
                    }
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        found
            .map(|(row, member_ids)| row_to_event(row, member_ids))
            .transpose()
    }

    async fn update_details(
        &self,
        event_id: &Uuid,
        patch: EventPatch,
        now: DateTime<Utc>,
    ) -> Result<EventUpdate, EventStoreError> {
        let event_id = *event_id;
        let capacity_column = patch.capacity.map(capacity_to_column).transpose()?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<EventUpdate, TxError, _>(|conn| {
            async move {
                let Some(_) = lock_event_row(conn, event_id).await? else {
                    return Ok(EventUpdate::NotFound);
                };
                let member_ids = load_member_ids(conn, event_id).await?;

                // The row lock makes this check atomic with the write below:
                // admissions for this event are blocked until commit.
                if let Some(capacity) = patch.capacity {
                    if (capacity.get() as usize) < member_ids.len() {
                        return Ok(EventUpdate::CapacityConflict {
                            members: member_ids.len(),
                        });
                    }
                }

                let changeset = EventChangeset {
                    title: patch.title.map(String::from),
                    description: patch.description,
                    location: patch.location,
                    scheduled_at: patch.scheduled_at,
                    capacity: capacity_column,
                    updated_at: Some(now),
                };
                let row: EventRow = diesel::update(events::table.find(event_id))
                    .set(&changeset)
                    .returning(EventRow::as_returning())
                    .get_result(conn)
                    .await?;

                let event = row_to_event(row, member_ids)?;
                Ok(EventUpdate::Applied(event))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn deactivate(
        &self,
        event_id: &Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Event>, EventStoreError> {
        let event_id = *event_id;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<Option<Event>, TxError, _>(|conn| {
            async move {
                let row: Option<EventRow> = diesel::update(events::table.find(event_id))
                    .set((events::active.eq(false), events::updated_at.eq(now)))
                    .returning(EventRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;
                let Some(row) = row else {
                    return Ok(None);
                };
                let member_ids = load_member_ids(conn, event_id).await?;
                let event = row_to_event(row, member_ids)?;
                Ok(Some(event))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn conditional_add_member(
        &self,
        event_id: &Uuid,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Admission, EventStoreError> {
        let event_id = *event_id;
        let member_id = *user_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result = conn
            .transaction::<Admission, TxError, _>(|conn| {
                async move {
                    let Some(row) = lock_event_row(conn, event_id).await? else {
                        return Ok(Admission::NotApplied);
                    };
                    let member_ids = load_member_ids(conn, event_id).await?;
                    let capacity = capacity_from_column(row.capacity)?;

                    let precondition_holds = row.active
                        && row.scheduled_at > now
                        && !member_ids.contains(&member_id)
                        && member_ids.len() < capacity.get() as usize;
                    if !precondition_holds {
                        return Ok(Admission::NotApplied);
                    }

                    diesel::insert_into(event_members::table)
                        .values(&NewEventMemberRow {
                            event_id,
                            user_id: member_id,
                            joined_at: now,
                        })
                        .execute(conn)
                        .await?;
                    diesel::update(events::table.find(event_id))
                        .set(events::updated_at.eq(now))
                        .execute(conn)
                        .await?;

                    let mut updated = row;
                    updated.updated_at = now;
                    let mut members = member_ids;
                    members.push(member_id);
                    let event = row_to_event(updated, members)?;
                    Ok(Admission::Applied(event))
                }
                .scope_boxed()
            })
            .await;

        finish_admission(result)
    }

    async fn conditional_remove_member(
        &self,
        event_id: &Uuid,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Admission, EventStoreError> {
        let event_id = *event_id;
        let member_id = *user_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result = conn
            .transaction::<Admission, TxError, _>(|conn| {
                async move {
                    let Some(row) = lock_event_row(conn, event_id).await? else {
                        return Ok(Admission::NotApplied);
                    };
                    let member_ids = load_member_ids(conn, event_id).await?;
                    if !member_ids.contains(&member_id) {
                        return Ok(Admission::NotApplied);
                    }

                    diesel::delete(
                        event_members::table.filter(
                            event_members::event_id
                                .eq(event_id)
                                .and(event_members::user_id.eq(member_id)),
                        ),
                    )
                    .execute(conn)
                    .await?;
                    diesel::update(events::table.find(event_id))
                        .set(events::updated_at.eq(now))
                        .execute(conn)
                        .await?;

                    let mut updated = row;
                    updated.updated_at = now;
                    let members = member_ids
                        .into_iter()
                        .filter(|id| *id != member_id)
                        .collect();
                    let event = row_to_event(updated, members)?;
                    Ok(Admission::Applied(event))
                }
                .scope_boxed()
            })
            .await;

        finish_admission(result)
    }

    async fn list(&self, filter: &EventListFilter) -> Result<Vec<Event>, EventStoreError> {
        self.load_events_snapshot(EventsSelection::Window(*filter))
            .await
    }

    async fn list_created_by(&self, user_id: &UserId) -> Result<Vec<Event>, EventStoreError> {
        self.load_events_snapshot(EventsSelection::CreatedBy(*user_id.as_uuid()))
            .await
    }

    async fn list_joined_by(&self, user_id: &UserId) -> Result<Vec<Event>, EventStoreError> {
        self.load_events_snapshot(EventsSelection::JoinedBy(*user_id.as_uuid()))
            .await
    }
}
