//! FitTrack backend library.
//!
//! Layout follows ports and adapters:
//! - [`domain`]: entities, ports, the unit of work and the use cases.
//! - [`outbound`]: in-memory and PostgreSQL repositories, password hashing.
//! - [`inbound`]: the actix-web HTTP surface.
//! - [`composition`]: wiring adapters and use cases into handler state.

pub mod composition;
pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
