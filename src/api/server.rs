//! HTTP API server

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{hash_password, require_admin, require_auth, TokenService};
use crate::config::Config;
use crate::error::Result;
use crate::store::Store;

use super::routes;

/// Application state shared across handlers
pub struct AppState {
    pub tokens: TokenService,
    pub store: Store,
}

pub type SharedState = Arc<AppState>;

/// Build the application state from configuration.
///
/// The signing secret goes to the token service and nowhere else.
pub async fn build_state(config: &Config) -> Result<SharedState> {
    config.validate()?;

    let tokens = TokenService::new(&config.auth);
    let store = Store::new();

    if let Some(admin) = &config.admin {
        let password = admin.password.clone();
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| crate::error::Error::Other(e.to_string()))??;
        store.ensure_admin(&admin.username, hash).await?;
    }

    Ok(Arc::new(AppState { tokens, store }))
}

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let state = build_state(&config).await?;

    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let tokens = state.tokens.clone();

    let public_user_routes = Router::new()
        .route("/register", post(routes::register))
        .route("/login", post(routes::login))
        .route("/books", get(routes::list_books));

    let authed_user_routes = Router::new()
        .route(
            "/orders",
            post(routes::create_order).get(routes::list_my_orders),
        )
        .route_layer(from_fn_with_state(tokens.clone(), require_auth));

    let admin_routes = Router::new()
        .route("/books", post(routes::create_book))
        .route(
            "/books/{id}",
            put(routes::update_book).delete(routes::delete_book),
        )
        .route("/orders", get(routes::list_orders))
        .route("/orders/{id}", put(routes::update_order_status))
        .route_layer(from_fn_with_state(tokens, require_admin));

    Router::new()
        .route("/health", get(routes::health))
        .nest("/users", public_user_routes.merge(authed_user_routes))
        .nest("/admin", admin_routes)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
