//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
use state_builders::build_http_state;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};

use backend::inbound::http::events::{
    create_event, delete_event, get_attendance, get_event, list_events, my_events, my_rsvps,
    update_event,
};
use backend::inbound::http::health::{live, ready, HealthState};
use backend::inbound::http::rsvps::{join_event, leave_event};
use backend::inbound::http::users::{current_user, login, register};
use backend::Trace;
#[cfg(debug_assertions)]
use backend::ApiDoc;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Build and start the HTTP server from the given configuration.
///
/// The returned [`Server`] future completes when the server shuts down. The
/// readiness probe flips to 200 once the listener is bound.
pub fn run(config: &ServerConfig) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(config));
    let health_state = web::Data::new(HealthState::new());
    let key = config.key.clone();
    let cookie_secure = config.cookie_secure;
    let same_site = config.same_site;
    #[cfg(feature = "metrics")]
    let prometheus = config.prometheus.clone().unwrap_or_else(make_metrics);

    let server_http_state = http_state;
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".into())
            .cookie_path("/".into())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(same_site)
            .build();

        let api = web::scope("/api/v1")
            .wrap(session)
            .app_data(server_http_state.clone())
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
            .service(leave_event);

        let app = App::new()
            .app_data(server_health_state.clone())
            .wrap(Trace)
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    Ok(server.run())
}

#[cfg(feature = "metrics")]
fn make_metrics() -> actix_web_prom::PrometheusMetrics {
    actix_web_prom::PrometheusMetricsBuilder::new("muster")
        .endpoint("/metrics")
        .build()
        .expect("configure Prometheus metrics")
}
