//! Request tracing middleware.
//!
//! Every request runs with a [`TraceId`] in task-local scope. A caller may
//! supply one in the `trace-id` request header (it must be a UUID); otherwise
//! a fresh one is generated. The id is echoed in the `trace-id` response
//! header and captured by any domain error raised while handling the request.

use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, error, info_span};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Attaches a request-scoped [`TraceId`] and a tracing span to each request.
///
/// ```
/// use actix_web::App;
/// use fittrack::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

fn incoming_trace_id(req: &ServiceRequest) -> Option<TraceId> {
    req.headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = incoming_trace_id(&req).unwrap_or_else(TraceId::generate);
        let span = info_span!(
            "request",
            trace_id = %trace_id,
            method = %req.method(),
            path = %req.path()
        );
        let fut = self.service.call(req);
        Box::pin(
            TraceId::scope(trace_id, async move {
                let mut res = fut.await?;
                match HeaderValue::from_str(&trace_id.to_string()) {
                    Ok(value) => {
                        res.response_mut()
                            .headers_mut()
                            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                    }
                    Err(error) => {
                        error!(%error, "failed to encode trace identifier header");
                    }
                }
                Ok(res)
            })
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use super::*;
    use crate::domain::Error as DomainError;

    const CALLER_TRACE_ID: &str = "6f1c1d2e-0b7a-4f54-9d0e-2b1f6c3a9e11";

    fn header(res: &ServiceResponse, name: &str) -> String {
        res.headers()
            .get(name)
            .expect("trace id header")
            .to_str()
            .expect("header is ascii")
            .to_owned()
    }

    #[rstest]
    #[actix_web::test]
    async fn handlers_see_the_trace_id_returned_in_the_header() {
        let app = test::init_service(App::new().wrap(Trace).route(
            "/",
            web::get().to(|| async {
                let id = TraceId::current().expect("trace id in scope");
                HttpResponse::Ok().body(id.to_string())
            }),
        ))
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let trace_id = header(&res, TRACE_ID_HEADER);
        let body = test::read_body(res).await;

        assert_eq!(std::str::from_utf8(&body).expect("utf8 body"), trace_id);
    }

    #[rstest]
    #[actix_web::test]
    async fn caller_supplied_trace_ids_are_kept() {
        let app = test::init_service(
            App::new()
                .wrap(Trace)
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/")
            .insert_header((TRACE_ID_HEADER, CALLER_TRACE_ID))
            .to_request();
        let res = test::call_service(&app, request).await;

        assert_eq!(header(&res, TRACE_ID_HEADER), CALLER_TRACE_ID);
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_caller_trace_ids_are_replaced() {
        let app = test::init_service(
            App::new()
                .wrap(Trace)
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/")
            .insert_header((TRACE_ID_HEADER, "not-a-uuid"))
            .to_request();
        let res = test::call_service(&app, request).await;

        assert_ne!(header(&res, TRACE_ID_HEADER), "not-a-uuid");
    }

    #[rstest]
    #[actix_web::test]
    async fn errors_capture_the_scoped_trace_id() {
        let app = test::init_service(App::new().wrap(Trace).route(
            "/",
            web::get().to(|| async {
                Err::<HttpResponse, _>(DomainError::not_found("user 1 does not exist"))
            }),
        ))
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let trace_id = header(&res, TRACE_ID_HEADER);
        let body: DomainError = test::read_body_json(res).await;

        assert_eq!(body.trace_id(), Some(trace_id.as_str()));
    }
}
