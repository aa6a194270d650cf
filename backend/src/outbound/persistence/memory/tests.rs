//! Behavioural coverage for the in-memory store contract: admission
//! predicates, capacity floor, soft-delete cascade, and listing windows.

use chrono::Duration;
use rstest::rstest;

use crate::domain::events::{Capacity, EventTitle};
use crate::domain::DisplayName;

use super::*;

fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T18:00:00Z")
        .expect("valid fixture timestamp")
        .with_timezone(&Utc)
}

fn event(scheduled_at: DateTime<Utc>, capacity: u32, active: bool) -> Event {
    Event::new(EventDraft {
        id: Uuid::new_v4(),
        creator_id: UserId::random(),
        title: EventTitle::new("Climbing session").expect("valid title"),
        description: None,
        location: None,
        scheduled_at,
        capacity: Capacity::new(capacity).expect("valid capacity"),
        members: Vec::new(),
        active,
        created_at: fixed_now() - Duration::days(1),
        updated_at: fixed_now() - Duration::days(1),
    })
    .expect("valid event fixture")
}

fn upcoming_event(capacity: u32) -> Event {
    event(fixed_now() + Duration::days(1), capacity, true)
}

async fn seeded(events: &[Event]) -> InMemoryEventStore {
    let store = InMemoryEventStore::new();
    for event in events {
        store.insert(event).await.expect("insert should succeed");
    }
    store
}

#[tokio::test]
async fn insert_rejects_duplicate_ids() {
    let event = upcoming_event(3);
    let store = seeded(&[event.clone()]).await;

    let error = store.insert(&event).await.expect_err("duplicate must fail");
    assert!(matches!(error, EventStoreError::Query { .. }));
}

#[tokio::test]
async fn add_member_applies_and_reports_the_new_snapshot() {
    let event = upcoming_event(2);
    let store = seeded(&[event.clone()]).await;
    let user = UserId::random();

    let admission = store
        .conditional_add_member(&event.id, &user, fixed_now())
        .await
        .expect("operation should succeed");

    match admission {
        Admission::Applied(snapshot) => {
            assert!(snapshot.is_member(&user));
            assert_eq!(snapshot.spots_remaining(), 1);
            assert_eq!(snapshot.updated_at, fixed_now());
        }
        Admission::NotApplied => panic!("expected the join to apply"),
    }
}

#[rstest]
#[case::missing_event(None)]
#[case::inactive(Some(event(fixed_now() + Duration::days(1), 2, false)))]
#[case::past(Some(event(fixed_now() - Duration::hours(1), 2, true)))]
#[tokio::test]
async fn add_member_refuses_when_the_predicate_fails(#[case] seed: Option<Event>) {
    let target = seed
        .as_ref()
        .map_or_else(Uuid::new_v4, |event| event.id);
    let store = match seed {
        Some(event) => seeded(&[event]).await,
        None => InMemoryEventStore::new(),
    };

    let admission = store
        .conditional_add_member(&target, &UserId::random(), fixed_now())
        .await
        .expect("operation should succeed");
    assert_eq!(admission, Admission::NotApplied);
}

#[tokio::test]
async fn add_member_is_idempotent_per_user() {
    let event = upcoming_event(3);
    let store = seeded(&[event.clone()]).await;
    let user = UserId::random();

    let first = store
        .conditional_add_member(&event.id, &user, fixed_now())
        .await
        .expect("first join should succeed");
    assert!(first.is_applied());

    let second = store
        .conditional_add_member(&event.id, &user, fixed_now())
        .await
        .expect("second join should succeed");
    assert_eq!(second, Admission::NotApplied);

    let stored = store
        .get(&event.id)
        .await
        .expect("get should succeed")
        .expect("event exists");
    assert_eq!(stored.member_count(), 1);
}

#[tokio::test]
async fn add_member_stops_exactly_at_capacity() {
    let event = upcoming_event(2);
    let store = seeded(&[event.clone()]).await;

    for _ in 0..2 {
        let admission = store
            .conditional_add_member(&event.id, &UserId::random(), fixed_now())
            .await
            .expect("join should succeed");
        assert!(admission.is_applied());
    }

    let overflow = store
        .conditional_add_member(&event.id, &UserId::random(), fixed_now())
        .await
        .expect("operation should succeed");
    assert_eq!(overflow, Admission::NotApplied);
}

#[tokio::test]
async fn remove_member_requires_membership() {
    let event = upcoming_event(2);
    let store = seeded(&[event.clone()]).await;
    let user = UserId::random();

    let missing = store
        .conditional_remove_member(&event.id, &user, fixed_now())
        .await
        .expect("operation should succeed");
    assert_eq!(missing, Admission::NotApplied);

    store
        .conditional_add_member(&event.id, &user, fixed_now())
        .await
        .expect("join should succeed");
    let removed = store
        .conditional_remove_member(&event.id, &user, fixed_now())
        .await
        .expect("leave should succeed");
    match removed {
        Admission::Applied(snapshot) => assert!(!snapshot.is_member(&user)),
        Admission::NotApplied => panic!("expected the leave to apply"),
    }
}

#[tokio::test]
async fn update_details_enforces_the_capacity_floor() {
    let event = upcoming_event(3);
    let store = seeded(&[event.clone()]).await;
    for _ in 0..2 {
        store
            .conditional_add_member(&event.id, &UserId::random(), fixed_now())
            .await
            .expect("join should succeed");
    }

    let patch = EventPatch {
        capacity: Some(Capacity::new(1).expect("valid capacity")),
        ..EventPatch::default()
    };
    let outcome = store
        .update_details(&event.id, patch, fixed_now())
        .await
        .expect("update should succeed");
    assert_eq!(outcome, EventUpdate::CapacityConflict { members: 2 });

    let raise = EventPatch {
        capacity: Some(Capacity::new(10).expect("valid capacity")),
        ..EventPatch::default()
    };
    let outcome = store
        .update_details(&event.id, raise, fixed_now())
        .await
        .expect("update should succeed");
    assert!(matches!(outcome, EventUpdate::Applied(_)));
}

#[tokio::test]
async fn deactivation_cascades_out_of_joined_listings() {
    let event = upcoming_event(4);
    let store = seeded(&[event.clone()]).await;
    let user = UserId::random();
    store
        .conditional_add_member(&event.id, &user, fixed_now())
        .await
        .expect("join should succeed");

    let joined = store
        .list_joined_by(&user)
        .await
        .expect("listing should succeed");
    assert_eq!(joined.len(), 1);

    store
        .deactivate(&event.id, fixed_now())
        .await
        .expect("deactivate should succeed")
        .expect("event exists");

    let joined = store
        .list_joined_by(&user)
        .await
        .expect("listing should succeed");
    assert!(joined.is_empty(), "deactivated events must drop out");

    // Membership is retained on the record itself.
    let stored = store
        .get(&event.id)
        .await
        .expect("get should succeed")
        .expect("event exists");
    assert!(stored.is_member(&user));
}

#[tokio::test]
async fn list_windows_partition_and_order_events() {
    let soon = event(fixed_now() + Duration::hours(2), 3, true);
    let later = event(fixed_now() + Duration::days(3), 3, true);
    let finished = event(fixed_now() - Duration::days(1), 3, true);
    let hidden = event(fixed_now() + Duration::hours(5), 3, false);
    let store = seeded(&[soon.clone(), later.clone(), finished.clone(), hidden]).await;

    let filter = |window| EventListFilter {
        window,
        now: fixed_now(),
        limit: 10,
        offset: 0,
    };

    let upcoming = store
        .list(&filter(EventWindow::Upcoming))
        .await
        .expect("listing should succeed");
    assert_eq!(
        upcoming.iter().map(|event| event.id).collect::<Vec<_>>(),
        vec![soon.id, later.id],
        "soonest first, inactive hidden"
    );

    let past = store
        .list(&filter(EventWindow::Past))
        .await
        .expect("listing should succeed");
    assert_eq!(
        past.iter().map(|event| event.id).collect::<Vec<_>>(),
        vec![finished.id]
    );

    let all = store
        .list(&filter(EventWindow::All))
        .await
        .expect("listing should succeed");
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn list_applies_offset_and_limit() {
    let first = event(fixed_now() + Duration::hours(1), 3, true);
    let second = event(fixed_now() + Duration::hours(2), 3, true);
    let third = event(fixed_now() + Duration::hours(3), 3, true);
    let store = seeded(&[first.clone(), second.clone(), third.clone()]).await;

    let page = store
        .list(&EventListFilter {
            window: EventWindow::Upcoming,
            now: fixed_now(),
            limit: 1,
            offset: 1,
        })
        .await
        .expect("listing should succeed");

    assert_eq!(
        page.iter().map(|event| event.id).collect::<Vec<_>>(),
        vec![second.id]
    );
}

#[tokio::test]
async fn user_repository_round_trips_users() {
    let repo = InMemoryUserRepository::new();
    let user = User::new(
        UserId::random(),
        DisplayName::new("Grace Hopper").expect("valid name"),
    );

    repo.insert(&user).await.expect("insert should succeed");
    let found = repo
        .find_by_id(&user.id)
        .await
        .expect("lookup should succeed");
    assert_eq!(found, Some(user));
}
