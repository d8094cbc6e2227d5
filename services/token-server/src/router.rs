use crate::{config::Environment, handlers, state::AppState};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let environment = app_state.config.environment;

    let api_router = Router::new()
        .route("/get-token", get(handlers::get_token))
        .with_state(app_state);

    let app = Router::new().nest("/api", api_router);

    match environment {
        Environment::Production => app,
        Environment::Development => app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        ),
    }
}
