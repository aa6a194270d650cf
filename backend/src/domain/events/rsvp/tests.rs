//! Behavioural coverage for the RSVP facade: success paths, the failure
//! classification priority order, and store-error surfacing.

use chrono::{DateTime, Duration, Utc};
use mockable::MockClock;
use rstest::rstest;
use uuid::Uuid;

use crate::domain::events::{Capacity, EventDraft, EventTitle};
use crate::domain::ports::{EventStoreError, MockEventStore};
use crate::domain::ErrorCode;

use super::*;

fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T18:00:00Z")
        .expect("valid fixture timestamp")
        .with_timezone(&Utc)
}

fn clock_at(now: DateTime<Utc>) -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(now);
    Arc::new(clock)
}

struct EventSpec {
    creator_id: UserId,
    members: Vec<UserId>,
    capacity: u32,
    scheduled_at: DateTime<Utc>,
    active: bool,
}

impl Default for EventSpec {
    fn default() -> Self {
        Self {
            creator_id: UserId::random(),
            members: Vec::new(),
            capacity: 2,
            scheduled_at: fixed_now() + Duration::days(1),
            active: true,
        }
    }
}

fn build_event(spec: EventSpec) -> Event {
    Event::new(EventDraft {
        id: Uuid::new_v4(),
        creator_id: spec.creator_id,
        title: EventTitle::new("Rooftop film night").expect("valid title"),
        description: None,
        location: None,
        scheduled_at: spec.scheduled_at,
        capacity: Capacity::new(spec.capacity).expect("valid capacity"),
        members: spec.members,
        active: spec.active,
        created_at: fixed_now() - Duration::days(3),
        updated_at: fixed_now() - Duration::days(3),
    })
    .expect("valid event fixture")
}

fn service_with(store: MockEventStore) -> RsvpService<MockEventStore> {
    RsvpService::new(Arc::new(store), clock_at(fixed_now()))
}

#[tokio::test]
async fn join_returns_the_post_mutation_snapshot() {
    let user = UserId::random();
    let joined = build_event(EventSpec {
        members: vec![user],
        ..EventSpec::default()
    });
    let event_id = joined.id;

    let mut store = MockEventStore::new();
    let snapshot = joined.clone();
    store
        .expect_conditional_add_member()
        .once()
        .returning(move |_, _, _| Ok(Admission::Applied(snapshot.clone())));
    // A successful attempt needs no diagnostic read.
    store.expect_get().never();

    let outcome = service_with(store)
        .join(&event_id, &user)
        .await
        .expect("join should succeed");

    match outcome {
        JoinOutcome::Joined(snapshot) => {
            assert_eq!(snapshot.spots_remaining, 1);
            assert!(snapshot.event.is_member(&user));
        }
        JoinOutcome::Rejected(rejection) => panic!("unexpected rejection: {rejection:?}"),
    }
}

async fn rejected_join(event: Option<Event>, user: UserId) -> JoinRejection {
    let mut store = MockEventStore::new();
    store
        .expect_conditional_add_member()
        .once()
        .returning(|_, _, _| Ok(Admission::NotApplied));
    store
        .expect_get()
        .once()
        .returning(move |_| Ok(event.clone()));

    let outcome = service_with(store)
        .join(&Uuid::new_v4(), &user)
        .await
        .expect("join should not error");

    match outcome {
        JoinOutcome::Rejected(rejection) => rejection,
        JoinOutcome::Joined(_) => panic!("expected rejection"),
    }
}

#[tokio::test]
async fn missing_event_classifies_as_not_found() {
    let rejection = rejected_join(None, UserId::random()).await;
    assert_eq!(rejection, JoinRejection::NotFound);
}

#[tokio::test]
async fn deactivated_event_classifies_as_not_found() {
    let event = build_event(EventSpec {
        active: false,
        ..EventSpec::default()
    });
    let rejection = rejected_join(Some(event), UserId::random()).await;
    assert_eq!(rejection, JoinRejection::NotFound);
}

#[tokio::test]
async fn past_event_outranks_every_other_cause() {
    let user = UserId::random();
    // Past, caller is the creator, already a member, and full: the schedule
    // check must win.
    let event = build_event(EventSpec {
        creator_id: user,
        members: vec![user],
        capacity: 1,
        scheduled_at: fixed_now() - Duration::hours(1),
        ..EventSpec::default()
    });
    let rejection = rejected_join(Some(event), user).await;
    assert_eq!(rejection, JoinRejection::EventEnded);
}

#[tokio::test]
async fn creator_outranks_membership_and_capacity() {
    let user = UserId::random();
    let event = build_event(EventSpec {
        creator_id: user,
        members: vec![user],
        capacity: 1,
        ..EventSpec::default()
    });
    let rejection = rejected_join(Some(event), user).await;
    assert_eq!(rejection, JoinRejection::CreatorImplicitlyAttending);
}

#[tokio::test]
async fn existing_membership_outranks_capacity() {
    let user = UserId::random();
    let event = build_event(EventSpec {
        members: vec![user],
        capacity: 1,
        ..EventSpec::default()
    });
    let rejection = rejected_join(Some(event), user).await;
    assert_eq!(rejection, JoinRejection::AlreadyJoined);
}

#[tokio::test]
async fn full_event_reports_zero_spots_remaining() {
    let event = build_event(EventSpec {
        members: vec![UserId::random(), UserId::random()],
        capacity: 2,
        ..EventSpec::default()
    });
    let rejection = rejected_join(Some(event), UserId::random()).await;
    assert_eq!(rejection, JoinRejection::AtCapacity { spots_remaining: 0 });
}

#[tokio::test]
async fn unexplained_rejection_classifies_as_transient_conflict() {
    // Every precondition passes on the diagnostic read: the state must have
    // flipped between the attempt and the read.
    let event = build_event(EventSpec::default());
    let rejection = rejected_join(Some(event), UserId::random()).await;
    assert_eq!(rejection, JoinRejection::TransientConflict);
}

#[tokio::test]
async fn leave_returns_the_post_mutation_snapshot() {
    let user = UserId::random();
    let after_leave = build_event(EventSpec::default());
    let event_id = after_leave.id;

    let mut store = MockEventStore::new();
    let snapshot = after_leave.clone();
    store
        .expect_conditional_remove_member()
        .once()
        .returning(move |_, _, _| Ok(Admission::Applied(snapshot.clone())));
    store.expect_get().never();

    let outcome = service_with(store)
        .leave(&event_id, &user)
        .await
        .expect("leave should succeed");

    match outcome {
        LeaveOutcome::Left(snapshot) => {
            assert_eq!(snapshot.spots_remaining, 2);
            assert!(!snapshot.event.is_member(&user));
        }
        LeaveOutcome::Rejected(rejection) => panic!("unexpected rejection: {rejection:?}"),
    }
}

#[rstest]
#[case(None, LeaveRejection::NotFound)]
#[case(Some(EventSpec { active: false, ..EventSpec::default() }), LeaveRejection::NotFound)]
#[case(Some(EventSpec::default()), LeaveRejection::NotJoined)]
#[tokio::test]
async fn leave_rejections_classify_by_event_state(
    #[case] spec: Option<EventSpec>,
    #[case] expected: LeaveRejection,
) {
    let event = spec.map(build_event);
    let mut store = MockEventStore::new();
    store
        .expect_conditional_remove_member()
        .once()
        .returning(|_, _, _| Ok(Admission::NotApplied));
    store
        .expect_get()
        .once()
        .returning(move |_| Ok(event.clone()));

    let outcome = service_with(store)
        .leave(&Uuid::new_v4(), &UserId::random())
        .await
        .expect("leave should not error");

    assert_eq!(outcome, LeaveOutcome::Rejected(expected));
}

#[tokio::test]
async fn write_conflicts_surface_as_retryable_errors() {
    let mut store = MockEventStore::new();
    store
        .expect_conditional_add_member()
        .once()
        .returning(|_, _, _| Err(EventStoreError::write_conflict("serialization failure")));
    store.expect_get().never();

    let error = service_with(store)
        .join(&Uuid::new_v4(), &UserId::random())
        .await
        .expect_err("store conflict should surface");

    assert_eq!(error.code(), ErrorCode::Conflict);
}
