//! User identity HTTP handlers.
//!
//! ```text
//! POST /api/v1/users {"displayName":"Ada Lovelace"}
//! POST /api/v1/login {"userId":"3fa85f64-..."}
//! GET  /api/v1/users/me
//! ```
//!
//! Registration doubles as sign-in: both endpoints establish the session
//! cookie the rest of the API requires. Passwords and token issuance are an
//! external identity provider's job; `login` only checks the claimed user
//! exists before trusting it.

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::{DisplayName, User, UserId};
use crate::inbound::http::auth::{authenticate, map_user_repository_error};
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    field_validation_error, missing_field_error, parse_uuid, FieldName,
};
use crate::inbound::http::ApiResult;

const DISPLAY_NAME_FIELD: FieldName = FieldName::new("displayName");
const USER_ID_FIELD: FieldName = FieldName::new("userId");

/// Registration request body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name shown to other users.
    pub display_name: Option<String>,
}

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Identity to establish a session for.
    pub user_id: Option<String>,
}

/// Register a new user and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let raw_name = payload
        .into_inner()
        .display_name
        .ok_or_else(|| missing_field_error(DISPLAY_NAME_FIELD))?;
    let display_name = DisplayName::new(raw_name)
        .map_err(|error| field_validation_error(DISPLAY_NAME_FIELD, error))?;

    let user = User::new(UserId::random(), display_name);
    state
        .users
        .insert(&user)
        .await
        .map_err(map_user_repository_error)?;
    session.persist_user(&user.id)?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok(HttpResponse::Created().json(user))
}

/// Establish a session for an existing user.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session established", body = UserSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let raw_id = payload
        .into_inner()
        .user_id
        .ok_or_else(|| missing_field_error(USER_ID_FIELD))?;
    let user_id = UserId::from_uuid(parse_uuid(raw_id, USER_ID_FIELD)?);

    let user = authenticate(state.users.as_ref(), &user_id).await?;
    session.persist_user(&user.id)?;
    Ok(web::Json(user))
}

/// Return the currently authenticated user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let user_id = session.require_user_id()?;
    let user = authenticate(state.users.as_ref(), &user_id).await?;
    Ok(web::Json(user))
}
