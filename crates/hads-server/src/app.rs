//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use hads_site::CUSTOM_CSS_ROUTE;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// Every route other than the stylesheet is a document route.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let pages = get(handlers::pages::get_page).post(handlers::pages::save_page);

    let router = Router::new()
        .route(CUSTOM_CSS_ROUTE, get(handlers::assets::custom_css))
        .route("/", pages.clone())
        .route("/{*path}", pages);

    security::header_layers()
        .fold(router, Router::layer)
        .with_state(state)
}
