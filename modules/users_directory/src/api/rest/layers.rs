use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderName, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Handler timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub fn request_id_header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

/// Request id carried through handler execution.
#[derive(Clone, Debug)]
pub struct XRequestId(pub String);

tokio::task_local! {
    static REQUEST_ID: String;
}

/// The `x-request-id` of the request being handled, if any.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(Clone::clone).ok()
}

/// Exposes the request id to handlers, both as an extension and to
/// [`current_request_id`] for problem responses.
pub async fn push_request_id(mut req: Request<Body>, next: Next) -> Response {
    let Some(rid) = req
        .headers()
        .get(request_id_header())
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
    else {
        return next.run(req).await;
    };

    req.extensions_mut().insert(XRequestId(rid.clone()));
    REQUEST_ID.scope(rid, next.run(req)).await
}

fn make_span(req: &Request<Body>) -> tracing::Span {
    let rid = req
        .headers()
        .get(request_id_header())
        .and_then(|v| v.to_str().ok())
        .unwrap_or("n/a");
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        uri = %req.uri().path(),
        version = ?req.version(),
        module = "users_directory",
        request_id = %rid,
    )
}

#[allow(clippy::type_complexity)]
pub fn trace_layer(
) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, fn(&Request<Body>) -> tracing::Span> {
    TraceLayer::new_for_http().make_span_with(make_span as fn(&Request<Body>) -> tracing::Span)
}

/// Wrap `router` in the HTTP middleware stack, outermost first:
/// SetRequestId -> PropagateRequestId -> Trace -> Timeout -> PushRequestId -> (CORS) -> BodyLimit
pub fn with_http_layers(router: Router, timeout: Duration, cors_enabled: bool) -> Router {
    let router = router.layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));
    let router = if cors_enabled {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    let router = router.layer(middleware::from_fn(push_request_id));

    let x_request_id = request_id_header();
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(PropagateRequestIdLayer::new(x_request_id))
            .layer(trace_layer())
            .layer(TimeoutLayer::new(timeout)),
    )
}
