use std::any::Any;

use axum::{
    body::Body,
    http::{Method, Request},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::error::AppError;
use crate::handlers::{fallback, portfolio, versions};
use crate::state::AppState;

/// Build the application with every route and middleware layer.
pub fn build_app(state: AppState) -> Router {
    with_layers(routes().with_state(state))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(portfolio::redirect_to_portfolio).fallback(fallback::method_not_allowed),
        )
        .route("/health", get(health_check))
        .route(
            "/portfolio",
            get(portfolio::get_portfolio)
                .post(portfolio::submit_portfolio)
                .fallback(fallback::method_not_allowed),
        )
        .route(
            "/v1/portfolio",
            get(versions::portfolio_v1).fallback(fallback::method_not_allowed),
        )
        .route(
            "/v2/portfolio",
            get(versions::portfolio_v2).fallback(fallback::method_not_allowed),
        )
        .fallback(fallback::not_found)
}

/// CORS, request logging and panic recovery, outermost first.
pub fn with_layers(router: Router) -> Router {
    // Credentials rule out a literal `*`, so origin and headers mirror the request.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    // Only method and path are recorded; query strings and bodies carry personal fields.
    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
            )
        })
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(trace)
}

async fn health_check() -> &'static str {
    "OK"
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(anyhow::anyhow!("Handler panicked: {}", detail)).into_response()
}
