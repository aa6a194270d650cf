//! Persistence adapters implementing the store and repository ports.
//!
//! Two families of adapter provide the same contract:
//!
//! - **PostgreSQL** via Diesel with async support through `diesel-async` and
//!   `bb8` pooling. Membership admission serialises on a per-event row lock;
//!   see [`DieselEventStore`].
//! - **In-memory** arena used by development mode and the behavioural test
//!   suite; see [`InMemoryEventStore`].
//!
//! Adapters are thin translators between rows and domain types. No business
//! logic resides here beyond the atomicity the port contract demands.

pub(crate) mod diesel_error_mapping;
mod diesel_event_store;
mod diesel_user_repository;
mod memory;
mod models;
mod pool;
mod schema;

pub use diesel_event_store::DieselEventStore;
pub use diesel_user_repository::DieselUserRepository;
pub use memory::{InMemoryEventStore, InMemoryUserRepository};
pub use pool::{DbPool, PoolConfig, PoolError};
