//! Document endpoints.
//!
//! GET resolves a route to a page, a raw file or a redirect. POST saves the
//! submitted content to an existing file. Pages are HTML unless the client
//! asks for JSON.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use axum::extract::{FromRequest, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use hads_site::{Page, QueryOptions, Resolution, extract_route};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::state::AppState;

/// Page as returned to JSON clients.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageResponse<'a> {
    #[serde(flatten)]
    page: &'a Page,
    /// Directory uploads go to, relative to the root.
    images_dir: &'a str,
}

/// Body of POST requests.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SaveForm {
    content: Option<String>,
}

/// Handle GET on any document route.
pub(crate) async fn get_page(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let route = extract_route(uri.path());
    let query = QueryOptions::from_query(&params);
    tracing::debug!(route = %route, "GET");

    let resolution = state.resolver.resolve(&route, &query);
    respond(&state, &route, resolution, &headers).await
}

/// Handle POST on any document route.
pub(crate) async fn save_page(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, ServerError> {
    let route = extract_route(request.uri().path());
    let headers = request.headers().clone();
    tracing::debug!(route = %route, "POST");

    let form = if is_json(&headers, &header::CONTENT_TYPE) {
        Json::<SaveForm>::from_request(request, &state)
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?
            .0
    } else {
        Form::<SaveForm>::from_request(request, &state)
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?
            .0
    };

    let resolution = state.resolver.save(&route, form.content.as_deref());
    respond(&state, &route, resolution, &headers).await
}

async fn respond(
    state: &AppState,
    route: &str,
    resolution: Resolution,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    match resolution {
        Resolution::Page(page) => Ok(page_response(state, &page, headers)),
        Resolution::RawFile { route, path } => raw_file(&route, &path).await,
        Resolution::Redirect(location) => Ok(Redirect::to(&location).into_response()),
        Resolution::NotHandled => Err(ServerError::PageNotFound(route.to_owned())),
        Resolution::ReadOnly => Err(ServerError::ReadOnly(route.to_owned())),
    }
}

fn page_response(state: &AppState, page: &Page, headers: &HeaderMap) -> Response {
    let status = StatusCode::from_u16(page.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if is_json(headers, &header::ACCEPT) {
        let body = PageResponse {
            page,
            images_dir: &state.images_dir,
        };
        (status, Json(body)).into_response()
    } else {
        (status, Html(state.layout.render(page))).into_response()
    }
}

async fn raw_file(route: &str, path: &Path) -> Result<Response, ServerError> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|_| ServerError::FileNotFound(route.to_owned()))?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Ok(([(header::CONTENT_TYPE, mime.to_string())], content).into_response())
}

/// Whether the header `name` names a JSON media type.
fn is_json(headers: &HeaderMap, name: &header::HeaderName) -> bool {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"))
}
