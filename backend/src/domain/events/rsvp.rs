//! RSVP facade: orchestrates a join/leave request and classifies failures.
//!
//! The atomic attempt itself does not report which precondition failed, so
//! when it does not apply the facade performs one best-effort follow-up read
//! and walks the conditions in priority order. That diagnostic read is
//! inherently racy and is used for caller-facing messaging only — it never
//! decides whether to mutate. When every condition passes on the follow-up
//! read, the precondition must have flipped between the attempt and the
//! read, and the caller is told to retry; the facade itself never retries.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::events::Event;
use crate::domain::ports::{
    Admission, EventStore, JoinOutcome, JoinRejection, LeaveOutcome, LeaveRejection, RsvpCommand,
    RsvpSnapshot,
};
use crate::domain::{Error, UserId};

use super::admission::{map_store_error, AdmissionController};

/// RSVP service implementing the driving port.
#[derive(Clone)]
pub struct RsvpService<S> {
    admission: AdmissionController<S>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> RsvpService<S> {
    /// Create a new service over the authoritative store.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            admission: AdmissionController::new(store.clone()),
            store,
            clock,
        }
    }
}

impl<S> RsvpService<S>
where
    S: EventStore,
{
    /// Diagnose a join attempt that did not apply.
    ///
    /// Priority order: missing event, ended event, creator, existing
    /// membership, exhausted capacity, then transient conflict. Deactivated
    /// events read as missing.
    fn classify_join(event: Option<Event>, user_id: &UserId, now: DateTime<Utc>) -> JoinRejection {
        let Some(event) = event else {
            return JoinRejection::NotFound;
        };
        if !event.active {
            return JoinRejection::NotFound;
        }
        if event.is_past(now) {
            return JoinRejection::EventEnded;
        }
        if event.creator_id == *user_id {
            return JoinRejection::CreatorImplicitlyAttending;
        }
        if event.is_member(user_id) {
            return JoinRejection::AlreadyJoined;
        }
        if event.spots_remaining() == 0 {
            return JoinRejection::AtCapacity { spots_remaining: 0 };
        }
        JoinRejection::TransientConflict
    }

    /// Diagnose a leave attempt that did not apply.
    fn classify_leave(event: Option<Event>) -> LeaveRejection {
        match event {
            None => LeaveRejection::NotFound,
            Some(event) if !event.active => LeaveRejection::NotFound,
            Some(_) => LeaveRejection::NotJoined,
        }
    }

    async fn diagnostic_read(&self, event_id: &Uuid) -> Result<Option<Event>, Error> {
        self.store.get(event_id).await.map_err(map_store_error)
    }
}

#[async_trait]
impl<S> RsvpCommand for RsvpService<S>
where
    S: EventStore,
{
    async fn join(&self, event_id: &Uuid, user_id: &UserId) -> Result<JoinOutcome, Error> {
        let now = self.clock.utc();
        match self.admission.try_join(event_id, user_id, now).await {
            Ok(Admission::Applied(event)) => {
                tracing::info!(%event_id, %user_id, "rsvp join applied");
                Ok(JoinOutcome::Joined(RsvpSnapshot::from_event(event)))
            }
            Ok(Admission::NotApplied) => {
                let event = self.diagnostic_read(event_id).await?;
                let rejection = Self::classify_join(event, user_id, now);
                tracing::debug!(%event_id, %user_id, ?rejection, "rsvp join rejected");
                Ok(JoinOutcome::Rejected(rejection))
            }
            Err(error) => Err(map_store_error(error)),
        }
    }

    async fn leave(&self, event_id: &Uuid, user_id: &UserId) -> Result<LeaveOutcome, Error> {
        let now = self.clock.utc();
        match self.admission.try_leave(event_id, user_id, now).await {
            Ok(Admission::Applied(event)) => {
                tracing::info!(%event_id, %user_id, "rsvp leave applied");
                Ok(LeaveOutcome::Left(RsvpSnapshot::from_event(event)))
            }
            Ok(Admission::NotApplied) => {
                let event = self.diagnostic_read(event_id).await?;
                Ok(LeaveOutcome::Rejected(Self::classify_leave(event)))
            }
            Err(error) => Err(map_store_error(error)),
        }
    }
}

#[cfg(test)]
mod tests;
