//! Regression coverage for the event aggregate.

use chrono::{Duration, Utc};
use rstest::{fixture, rstest};
use uuid::Uuid;

use super::*;

#[fixture]
fn draft() -> EventDraft {
    let now = Utc::now();
    EventDraft {
        id: Uuid::new_v4(),
        creator_id: UserId::random(),
        title: EventTitle::new("Board games night").expect("valid title"),
        description: Some("Bring your own snacks".to_owned()),
        location: Some("Community hall".to_owned()),
        scheduled_at: now + Duration::days(7),
        capacity: Capacity::new(4).expect("valid capacity"),
        members: Vec::new(),
        active: true,
        created_at: now,
        updated_at: now,
    }
}

#[rstest]
#[case("", EventValidationError::EmptyTitle)]
#[case("Go", EventValidationError::TitleTooShort { min: TITLE_MIN })]
fn title_rejects_invalid_input(#[case] raw: &str, #[case] expected: EventValidationError) {
    assert_eq!(EventTitle::new(raw).expect_err("should fail"), expected);
}

#[rstest]
fn title_rejects_overlong_input() {
    let raw = "a".repeat(TITLE_MAX + 1);
    assert_eq!(
        EventTitle::new(raw).expect_err("should fail"),
        EventValidationError::TitleTooLong { max: TITLE_MAX }
    );
}

#[rstest]
fn capacity_rejects_zero() {
    assert_eq!(
        Capacity::new(0).expect_err("should fail"),
        EventValidationError::ZeroCapacity
    );
}

#[rstest]
fn event_normalises_blank_optional_text(mut draft: EventDraft) {
    draft.description = Some("   ".to_owned());
    draft.location = Some("  Community hall ".to_owned());

    let event = Event::new(draft).expect("valid draft");
    assert_eq!(event.description, None);
    assert_eq!(event.location.as_deref(), Some("Community hall"));
}

#[rstest]
fn event_rejects_duplicate_members(mut draft: EventDraft) {
    let user = UserId::random();
    draft.members = vec![user, UserId::random(), user];

    let error = Event::new(draft).expect_err("duplicate member should fail");
    assert_eq!(error, EventValidationError::DuplicateMember { user_id: user });
}

#[rstest]
fn event_rejects_members_beyond_capacity(mut draft: EventDraft) {
    draft.capacity = Capacity::new(1).expect("valid capacity");
    draft.members = vec![UserId::random(), UserId::random()];

    let error = Event::new(draft).expect_err("over-capacity should fail");
    assert_eq!(
        error,
        EventValidationError::OverCapacity {
            capacity: 1,
            members: 2,
        }
    );
}

#[rstest]
fn spots_remaining_tracks_member_count(mut draft: EventDraft) {
    draft.members = vec![UserId::random(), UserId::random(), UserId::random()];
    let event = Event::new(draft).expect("valid draft");

    assert_eq!(event.spots_remaining(), 1);
    assert_eq!(event.member_count(), 3);
}

#[rstest]
fn is_past_compares_against_the_supplied_instant(draft: EventDraft) {
    let event = Event::new(draft).expect("valid draft");

    assert!(!event.is_past(event.scheduled_at - Duration::seconds(1)));
    assert!(event.is_past(event.scheduled_at));
    assert!(event.is_past(event.scheduled_at + Duration::seconds(1)));
}

#[rstest]
fn event_serialises_with_camel_case_field_names(draft: EventDraft) {
    let event = Event::new(draft).expect("valid draft");
    let value = serde_json::to_value(&event).expect("event serialises");

    assert!(value.get("creatorId").is_some());
    assert!(value.get("scheduledAt").is_some());
    assert!(value.get("creator_id").is_none());
}
