//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod event_store;
mod events_command;
mod events_query;
mod rsvp;
mod user_repository;

#[cfg(test)]
pub use event_store::MockEventStore;
pub use event_store::{
    Admission, EventListFilter, EventPatch, EventStore, EventStoreError, EventUpdate, EventWindow,
    FixtureEventStore,
};
#[cfg(test)]
pub use events_command::MockEventsCommand;
pub use events_command::{
    CreateEventRequest, EventsCommand, FixtureEventsCommand, UpdateEventRequest,
};
#[cfg(test)]
pub use events_query::MockEventsQuery;
pub use events_query::{
    Attendance, EventsPage, EventsQuery, FixtureEventsQuery, ListEventsRequest, LIST_LIMIT_DEFAULT,
    LIST_LIMIT_MAX,
};
#[cfg(test)]
pub use rsvp::MockRsvpCommand;
pub use rsvp::{
    FixtureRsvpCommand, JoinOutcome, JoinRejection, LeaveOutcome, LeaveRejection, RsvpCommand,
    RsvpSnapshot,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};
