//! In-memory event store and user repository.
//!
//! The store is an arena of event records addressed by id, each behind its
//! own mutex. A conditional membership operation locks exactly one event,
//! evaluates the precondition, and mutates while still holding the lock —
//! the check and the write are indivisible, and operations on the same event
//! are linearized by the mutex. Critical sections contain no awaits.
//!
//! This adapter backs development mode and the behavioural test-suite; the
//! Diesel adapter provides the same contract against PostgreSQL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::events::{Event, EventDraft};
use crate::domain::ports::{
    Admission, EventListFilter, EventPatch, EventStore, EventStoreError, EventUpdate, EventWindow,
    UserPersistenceError, UserRepository,
};
use crate::domain::{User, UserId};

fn poisoned() -> EventStoreError {
    EventStoreError::query("event arena lock poisoned")
}

/// In-memory implementation of the event store port.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<Uuid, Arc<Mutex<Event>>>>,
}

impl InMemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, event_id: &Uuid) -> Result<Option<Arc<Mutex<Event>>>, EventStoreError> {
        let events = self.events.read().map_err(|_| poisoned())?;
        Ok(events.get(event_id).cloned())
    }

    fn lock_entry<'a>(
        entry: &'a Arc<Mutex<Event>>,
    ) -> Result<MutexGuard<'a, Event>, EventStoreError> {
        entry.lock().map_err(|_| poisoned())
    }

    /// Clone every event currently stored.
    fn snapshot_all(&self) -> Result<Vec<Event>, EventStoreError> {
        let entries: Vec<Arc<Mutex<Event>>> = {
            let events = self.events.read().map_err(|_| poisoned())?;
            events.values().cloned().collect()
        };
        entries
            .iter()
            .map(|entry| Self::lock_entry(entry).map(|guard| guard.clone()))
            .collect()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert(&self, event: &Event) -> Result<(), EventStoreError> {
        let mut events = self.events.write().map_err(|_| poisoned())?;
        if events.contains_key(&event.id) {
            return Err(EventStoreError::query(format!(
                "duplicate event id: {}",
                event.id
            )));
        }
        events.insert(event.id, Arc::new(Mutex::new(event.clone())));
        Ok(())
    }

    async fn get(&self, event_id: &Uuid) -> Result<Option<Event>, EventStoreError> {
        let Some(entry) = self.entry(event_id)? else {
            return Ok(None);
        };
        let guard = Self::lock_entry(&entry)?;
        Ok(Some(guard.clone()))
    }

    async fn update_details(
        &self,
        event_id: &Uuid,
        patch: EventPatch,
        now: DateTime<Utc>,
    ) -> Result<EventUpdate, EventStoreError> {
        let Some(entry) = self.entry(event_id)? else {
            return Ok(EventUpdate::NotFound);
        };
        let mut guard = Self::lock_entry(&entry)?;

        if let Some(capacity) = patch.capacity {
            if (capacity.get() as usize) < guard.members.len() {
                return Ok(EventUpdate::CapacityConflict {
                    members: guard.members.len(),
                });
            }
        }

        let current = guard.clone();
        let updated = Event::new(EventDraft {
            id: current.id,
            creator_id: current.creator_id,
            title: patch.title.unwrap_or(current.title),
            description: patch.description.or(current.description),
            location: patch.location.or(current.location),
            scheduled_at: patch.scheduled_at.unwrap_or(current.scheduled_at),
            capacity: patch.capacity.unwrap_or(current.capacity),
            members: current.members,
            active: current.active,
            created_at: current.created_at,
            updated_at: now,
        })
        .map_err(|error| EventStoreError::query(error.to_string()))?;

        *guard = updated.clone();
        Ok(EventUpdate::Applied(updated))
    }

    async fn deactivate(
        &self,
        event_id: &Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Event>, EventStoreError> {
        let Some(entry) = self.entry(event_id)? else {
            return Ok(None);
        };
        let mut guard = Self::lock_entry(&entry)?;
        guard.active = false;
        guard.updated_at = now;
        Ok(Some(guard.clone()))
    }

    async fn conditional_add_member(
        &self,
        event_id: &Uuid,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Admission, EventStoreError> {
        let Some(entry) = self.entry(event_id)? else {
            return Ok(Admission::NotApplied);
        };
        let mut guard = Self::lock_entry(&entry)?;

        let precondition_holds = guard.active
            && !guard.is_past(now)
            && !guard.is_member(user_id)
            && guard.spots_remaining() > 0;
        if !precondition_holds {
            return Ok(Admission::NotApplied);
        }

        guard.members.push(*user_id);
        guard.updated_at = now;
        Ok(Admission::Applied(guard.clone()))
    }

    async fn conditional_remove_member(
        &self,
        event_id: &Uuid,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Admission, EventStoreError> {
        let Some(entry) = self.entry(event_id)? else {
            return Ok(Admission::NotApplied);
        };
        let mut guard = Self::lock_entry(&entry)?;

        if !guard.is_member(user_id) {
            return Ok(Admission::NotApplied);
        }

        guard.members.retain(|member| member != user_id);
        guard.updated_at = now;
        Ok(Admission::Applied(guard.clone()))
    }

    async fn list(&self, filter: &EventListFilter) -> Result<Vec<Event>, EventStoreError> {
        let mut events: Vec<Event> = self
            .snapshot_all()?
            .into_iter()
            .filter(|event| event.active)
            .filter(|event| match filter.window {
                EventWindow::Upcoming => event.scheduled_at > filter.now,
                EventWindow::Past => event.scheduled_at <= filter.now,
                EventWindow::All => true,
            })
            .collect();

        match filter.window {
            EventWindow::Past => {
                events.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
            }
            EventWindow::Upcoming | EventWindow::All => {
                events.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at));
            }
        }

        Ok(events
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn list_created_by(&self, user_id: &UserId) -> Result<Vec<Event>, EventStoreError> {
        let mut events: Vec<Event> = self
            .snapshot_all()?
            .into_iter()
            .filter(|event| event.creator_id == *user_id)
            .collect();
        events.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(events)
    }

    async fn list_joined_by(&self, user_id: &UserId) -> Result<Vec<Event>, EventStoreError> {
        let mut events: Vec<Event> = self
            .snapshot_all()?
            .into_iter()
            .filter(|event| event.active && event.is_member(user_id))
            .collect();
        events.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at));
        Ok(events)
    }
}

/// In-memory implementation of the user repository port.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| UserPersistenceError::query("user table lock poisoned"))?;
        users.insert(*user.id.as_uuid(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let users = self
            .users
            .read()
            .map_err(|_| UserPersistenceError::query("user table lock poisoned"))?;
        Ok(users.get(id.as_uuid()).cloned())
    }
}

#[cfg(test)]
mod tests;
