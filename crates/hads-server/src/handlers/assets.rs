//! Custom stylesheet endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use hads_site::CUSTOM_CSS_ROUTE;

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /_hads/custom.css.
pub(crate) async fn custom_css(State(state): State<Arc<AppState>>) -> Result<Response, ServerError> {
    let not_found = || ServerError::FileNotFound(CUSTOM_CSS_ROUTE.to_owned());
    let path = state.custom_css.as_ref().ok_or_else(not_found)?;
    let css = tokio::fs::read_to_string(path).await.map_err(|_| not_found())?;

    Ok(([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css).into_response())
}
