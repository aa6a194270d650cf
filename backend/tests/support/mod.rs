//! Shared fixtures for the integration test-suite.

use std::sync::Arc;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Cookie, Key};
use actix_web::{test as actix_test, web, App};
use mockable::DefaultClock;
use serde_json::{json, Value};

use backend::domain::{EventsQueryService, EventsService, RsvpService};
use backend::inbound::http::events::{
    create_event, delete_event, get_attendance, get_event, list_events, my_events, my_rsvps,
    update_event,
};
use backend::inbound::http::rsvps::{join_event, leave_event};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::{current_user, login, register};
use backend::outbound::persistence::{InMemoryEventStore, InMemoryUserRepository};

/// HTTP state backed by fresh in-memory adapters.
pub fn in_memory_state() -> web::Data<HttpState> {
    let store = Arc::new(InMemoryEventStore::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let clock = Arc::new(DefaultClock);
    web::Data::new(HttpState::new(
        users,
        Arc::new(EventsService::new(store.clone(), clock.clone())),
        Arc::new(EventsQueryService::new(store.clone(), clock.clone())),
        Arc::new(RsvpService::new(store, clock)),
    ))
}

/// Full application with every route mounted, backed by the given state.
pub fn app_with_state(
    state: web::Data<HttpState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build();

    App::new().wrap(session).service(
        web::scope("/api/v1")
            .app_data(state)
            .service(register)
            .service(login)
            .service(current_user)
            .service(create_event)
            .service(list_events)
            .service(get_event)
            .service(update_event)
            .service(delete_event)
            .service(get_attendance)
            .service(my_events)
            .service(my_rsvps)
            .service(join_event)
            .service(leave_event),
    )
}

/// Register a user and return the session cookie plus the user id.
pub async fn register_user<S, B>(app: &S, name: &str) -> (Cookie<'static>, String)
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
    B::Error: std::fmt::Debug,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({ "displayName": name }))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success(), "registration failed");
    let cookie = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned();
    let body: Value = actix_test::read_body_json(response).await;
    let user_id = body
        .get("id")
        .and_then(Value::as_str)
        .expect("user id in response")
        .to_owned();
    (cookie, user_id)
}

/// Create an upcoming event as the cookie's user and return its id.
pub async fn create_upcoming_event<S, B>(
    app: &S,
    cookie: &Cookie<'static>,
    title: &str,
    capacity: u32,
) -> String
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
    B::Error: std::fmt::Debug,
{
    create_event_at(
        app,
        cookie,
        title,
        capacity,
        &(chrono::Utc::now() + chrono::Duration::days(7)).to_rfc3339(),
    )
    .await
}

/// Create an event with an explicit schedule and return its id.
pub async fn create_event_at<S, B>(
    app: &S,
    cookie: &Cookie<'static>,
    title: &str,
    capacity: u32,
    scheduled_at: &str,
) -> String
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
    B::Error: std::fmt::Debug,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/events")
            .cookie(cookie.clone())
            .set_json(json!({
                "title": title,
                "scheduledAt": scheduled_at,
                "capacity": capacity,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(
        response.status(),
        actix_web::http::StatusCode::CREATED,
        "event creation failed"
    );
    let body: Value = actix_test::read_body_json(response).await;
    body.get("id")
        .and_then(Value::as_str)
        .expect("event id in response")
        .to_owned()
}

/// The `details.reason` field of an error payload.
pub fn error_reason(body: &Value) -> Option<&str> {
    body.get("details")
        .and_then(|details| details.get("reason"))
        .and_then(Value::as_str)
}
