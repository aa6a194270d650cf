//! Authentication helpers used by HTTP handlers.
//!
//! Credential issuance and verification live outside this service: callers
//! arrive with a user id they claim, and the helpers here only confirm that
//! the identity exists before it is trusted by the core. Keep the HTTP
//! modules focused on request/response mapping by concentrating identity
//! derivation here.

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Error, User, UserId};

use super::ApiResult;

/// Map user repository failures onto the transport-agnostic taxonomy.
pub(crate) fn map_user_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

/// Resolve a claimed identity against the user repository.
pub async fn authenticate(users: &dyn UserRepository, user_id: &UserId) -> ApiResult<User> {
    let user = users
        .find_by_id(user_id)
        .await
        .map_err(map_user_repository_error)?;
    user.ok_or_else(|| Error::unauthorized("unknown user"))
}
