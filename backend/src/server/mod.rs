//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;

pub use config::ServerConfig;
#[cfg(feature = "metrics")]
pub(crate) use metrics::build_prometheus;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use fittrack::Trace;
use fittrack::composition::{wire_in_memory, wire_postgres};
#[cfg(debug_assertions)]
use fittrack::doc::ApiDoc;
use fittrack::inbound::http::api_scope;
use fittrack::inbound::http::health::{HealthState, live, ready};
use fittrack::inbound::http::state::HttpState;
use fittrack::outbound::security::Argon2PasswordHasher;
#[cfg(feature = "metrics")]
use metrics::MetricsLayer;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api_scope())
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Handlers are backed by PostgreSQL when the configuration carries a pool
/// and by a fresh in-memory store otherwise.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        db_pool,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;

    let hasher = Arc::new(Argon2PasswordHasher::default());
    let http_state = match &db_pool {
        Some(pool) => {
            info!("using PostgreSQL storage");
            wire_postgres(pool, hasher)
        }
        None => {
            info!("no database configured; using in-memory storage");
            wire_in_memory(hasher)
        }
    };
    let http_state = web::Data::new(http_state);

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let app = build_app(server_health_state.clone(), http_state.clone());

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}
