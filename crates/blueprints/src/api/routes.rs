//! API route definitions.

use axum::http::{HeaderValue, Method, header};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::auth::{SCOPE_BLUEPRINTS_READ, SCOPE_BLUEPRINTS_WRITE, ScopeGuard, require_scope};

use super::handlers;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state);

    // Tracing layer with request spans and timing
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let read_gate = middleware::from_fn_with_state(
        ScopeGuard::new(state.auth.clone(), SCOPE_BLUEPRINTS_READ),
        require_scope,
    );
    let write_gate = middleware::from_fn_with_state(
        ScopeGuard::new(state.auth.clone(), SCOPE_BLUEPRINTS_WRITE),
        require_scope,
    );

    // Each method declares exactly one required scope.
    let blueprint_routes = Router::new().route(
        "/api/blueprints",
        get(handlers::list_blueprints)
            .route_layer(read_gate)
            .merge(post(handlers::create_blueprint).route_layer(write_gate)),
    );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/login", post(handlers::login));

    Router::new()
        .merge(public_routes)
        .merge(blueprint_routes)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(cors)
        .layer(trace_layer)
}

/// Build the CORS layer based on configuration.
///
/// With no configured origins, cross-origin requests are denied.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins = state.auth.allowed_origins();

    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let headers = [header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("CORS: Invalid origin in config: {}", origin);
                None
            })
        })
        .collect();

    if origins.is_empty() {
        if allowed_origins.is_empty() {
            tracing::warn!("CORS: No origins configured, denying all cross-origin requests");
        } else {
            tracing::error!("CORS: All configured origins are invalid!");
        }
        // "null" never matches a real origin.
        CorsLayer::new().allow_origin(AllowOrigin::exact(HeaderValue::from_static("null")))
    } else {
        tracing::info!("CORS: Allowing {} origin(s)", origins.len());
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
    }
}
