//! Main application router.

use crate::{
    controllers::{
        auth_controller, content_controller, health_controller, media_controller,
        message_controller, report_controller, user_controller,
    },
    middleware::{auth_middleware, logging_middleware, AuthMiddlewareState},
    state::AppState,
};
use agora_config::ServerConfig;
use agora_core::ContentKind;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Creates the main application router.
pub fn create_router(state: AppState, server_config: &ServerConfig) -> Router {
    let auth_state = AuthMiddlewareState::new(state.identity.clone());

    let mut api_router = Router::new()
        .nest("/auth", auth_controller::router())
        .nest("/users", user_controller::router())
        .nest("/feeds", content_controller::feed_router())
        .nest("/messages", message_controller::router())
        .nest("/reports", report_controller::router())
        .nest("/media", media_controller::router());
    for kind in ContentKind::ALL {
        api_router = api_router.nest(&format!("/{}", kind.collection()), content_controller::router(kind));
    }
    let api_router = api_router.layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    let router = Router::new()
        .merge(health_controller::router())
        .nest("/api", api_router)
        .route("/", get(root))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(server_config.max_body_size))
        .layer(create_cors_layer(server_config))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(middleware::from_fn(logging_middleware));

    info!("Router created with REST endpoints under /api");
    router
}

/// Creates a CORS layer based on server configuration.
fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if !server_config.cors_enabled {
        return CorsLayer::new();
    }
    if server_config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server_config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

async fn root() -> &'static str {
    "Agora API"
}
