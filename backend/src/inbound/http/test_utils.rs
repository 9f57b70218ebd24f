//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use super::api_scope;
use crate::Trace;
use crate::composition::wire_in_memory;
use crate::domain::ports::FixturePasswordHasher;

/// The full `/api/v1` surface over a fresh in-memory store.
///
/// Passwords are "hashed" with [`FixturePasswordHasher`].
pub fn test_app() -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = wire_in_memory(Arc::new(FixturePasswordHasher));
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(api_scope())
}
