//! Admission control: capacity and uniqueness enforcement on join/leave.
//!
//! The controller is the only component allowed to change a membership set,
//! and it does so exclusively through the store's conditional operations —
//! a single atomic check-and-mutate per call. Under contention for the last
//! spot, whichever caller's conditional update the store applies first wins;
//! the other deterministically fails its precondition. The controller never
//! reads state to decide whether to mutate, and it never explains *why* an
//! attempt did not apply — diagnosis is the facade's job and is messaging
//! only ([`super::rsvp`]).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{Admission, EventStore, EventStoreError};
use crate::domain::{Error, UserId};

/// Map a store failure onto the transport-agnostic error taxonomy.
///
/// Write conflicts surface as retryable conflicts; the facade does not retry
/// on the caller's behalf.
pub(crate) fn map_store_error(error: EventStoreError) -> Error {
    match error {
        EventStoreError::Connection { message } => {
            Error::service_unavailable(format!("event store unavailable: {message}"))
        }
        EventStoreError::Query { message } => {
            Error::internal(format!("event store error: {message}"))
        }
        EventStoreError::WriteConflict { message } => {
            Error::conflict(format!("concurrent update, please retry: {message}")).with_details(
                serde_json::json!({ "reason": "write_conflict", "retryable": true }),
            )
        }
    }
}

/// Enforces the membership invariants on join and leave.
#[derive(Debug, Clone)]
pub struct AdmissionController<S> {
    store: Arc<S>,
}

impl<S> AdmissionController<S> {
    /// Create a controller over the authoritative store.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> AdmissionController<S>
where
    S: EventStore,
{
    /// Attempt to add `user_id` to the event's member set.
    ///
    /// Succeeds iff the event exists, is active, is scheduled after `now`,
    /// does not already contain the user, and has a spot free — all evaluated
    /// atomically with the insertion. On success the returned snapshot
    /// reflects the exact post-mutation state.
    ///
    /// Calling twice in succession for the same user is safe: if the first
    /// call applied, the second fails the uniqueness precondition and reports
    /// [`Admission::NotApplied`] with no side effects.
    pub async fn try_join(
        &self,
        event_id: &Uuid,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Admission, EventStoreError> {
        self.store
            .conditional_add_member(event_id, user_id, now)
            .await
    }

    /// Attempt to remove `user_id` from the event's member set.
    ///
    /// Succeeds iff the event exists and contains the user.
    pub async fn try_leave(
        &self,
        event_id: &Uuid,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Admission, EventStoreError> {
        self.store
            .conditional_remove_member(event_id, user_id, now)
            .await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use chrono::Utc;
    use mockall::predicate::eq;
    use rstest::rstest;

    use crate::domain::ports::MockEventStore;
    use crate::domain::ErrorCode;

    use super::*;

    #[tokio::test]
    async fn try_join_delegates_to_the_conditional_operation() {
        let event_id = Uuid::new_v4();
        let user_id = UserId::random();
        let now = Utc::now();

        let mut store = MockEventStore::new();
        store
            .expect_conditional_add_member()
            .with(eq(event_id), eq(user_id), eq(now))
            .once()
            .returning(|_, _, _| Ok(Admission::NotApplied));
        // The controller must not consult any read path.
        store.expect_get().never();

        let controller = AdmissionController::new(Arc::new(store));
        let admission = controller
            .try_join(&event_id, &user_id, now)
            .await
            .expect("store call should succeed");
        assert_eq!(admission, Admission::NotApplied);
    }

    #[tokio::test]
    async fn try_leave_delegates_to_the_conditional_operation() {
        let event_id = Uuid::new_v4();
        let user_id = UserId::random();
        let now = Utc::now();

        let mut store = MockEventStore::new();
        store
            .expect_conditional_remove_member()
            .with(eq(event_id), eq(user_id), eq(now))
            .once()
            .returning(|_, _, _| Ok(Admission::NotApplied));
        store.expect_get().never();

        let controller = AdmissionController::new(Arc::new(store));
        let admission = controller
            .try_leave(&event_id, &user_id, now)
            .await
            .expect("store call should succeed");
        assert_eq!(admission, Admission::NotApplied);
    }

    #[rstest]
    #[case(EventStoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(EventStoreError::query("bad statement"), ErrorCode::InternalError)]
    #[case(EventStoreError::write_conflict("serialization"), ErrorCode::Conflict)]
    fn store_errors_map_to_the_expected_codes(
        #[case] error: EventStoreError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(map_store_error(error).code(), expected);
    }

    #[rstest]
    fn write_conflicts_are_flagged_retryable() {
        let error = map_store_error(EventStoreError::write_conflict("serialization"));
        let retryable = error
            .details()
            .and_then(|details| details.get("retryable"))
            .and_then(serde_json::Value::as_bool);
        assert_eq!(retryable, Some(true));
    }
}
