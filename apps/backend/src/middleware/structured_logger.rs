//! One `request_completed` event per request, levelled by status class.

use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::{header, StatusCode};
use actix_web::Error as ActixError;
use futures_util::future::LocalBoxFuture;
use tracing::{event, Level};

use crate::trace_ctx;

pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

/// What gets logged once the response status is known.
struct Completed {
    method: String,
    route: String,
    bearer: bool,
    trace_id: String,
}

impl Completed {
    fn emit(&self, status: StatusCode, start: Instant) {
        let duration_us = start.elapsed().as_micros() as u64;
        let status_code = status.as_u16();
        let Completed {
            method,
            route,
            bearer,
            trace_id,
        } = self;

        // `event!` needs a constant level, hence one arm per level.
        macro_rules! completed {
            ($level:expr) => {
                event!(
                    $level,
                    http.method = %method,
                    http.route = %route,
                    http.status_code = status_code,
                    bearer = *bearer,
                    duration_us,
                    trace_id = %trace_id,
                    message = "request_completed"
                )
            };
        }

        if status.is_server_error() {
            completed!(Level::ERROR);
        } else if status.is_client_error() {
            completed!(Level::WARN);
        } else {
            completed!(Level::INFO);
        }
    }
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let completed = Completed {
            method: req.method().to_string(),
            // Route pattern rather than the raw path: usernames stay out of logs.
            route: req
                .match_pattern()
                .unwrap_or_else(|| req.path().to_string()),
            bearer: req.headers().contains_key(header::AUTHORIZATION),
            trace_id: trace_ctx::trace_id(),
        };

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            completed.emit(status, start);

            result
        })
    }
}
