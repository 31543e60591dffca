use crate::error::AppError;
use crate::handlers::{docs, markets, tvl};
use crate::state::AppState;
use axum::{
    body::Body,
    http::{HeaderName, Method, Request, Uri},
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Time-ordered request ids for requests that arrive without one
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(value))
    }
}

async fn fallback(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(format!("Route not found: {} {}", method, uri.path()))
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/tvl", get(tvl::get_tvl))
        .route("/markets", get(markets::get_market));

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuidV7))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(CorsLayer::permissive());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/api-docs.json", get(docs::openapi))
        .fallback(fallback)
        .layer(middleware)
        .with_state(state)
}
