//! HTTP surface of the dashboard
//!
//! `GET /` renders the page for the widget state in the query string,
//! `GET /api/view` returns the same view as JSON and `GET /healthz` is a
//! liveness probe. Handlers only read the shared [`Dashboard`].

use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{error, info};
use serde_json::Value;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::filter::FilterState;
use crate::pipeline::Dashboard;
use crate::render::render_page;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub title: Arc<str>,
}

/// A pipeline failure reported as a 500
#[derive(Debug)]
pub struct AppError(DashboardError);

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

/// Widget state from a raw query string; absent query means defaults
#[must_use]
pub fn filters_from_query(dashboard: &Dashboard, query: Option<&str>) -> FilterState {
    match query {
        Some(query) => FilterState::from_query_pairs(
            url::form_urlencoded::parse(query.as_bytes()),
            dashboard.options(),
        ),
        None => dashboard.default_filters(),
    }
}

async fn index(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> std::result::Result<Html<String>, AppError> {
    let filters = filters_from_query(&state.dashboard, query.as_deref());
    let view = state.dashboard.run(&filters)?;
    Ok(Html(render_page(&state.title, state.dashboard.options(), &view)?))
}

async fn view(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> std::result::Result<Json<Value>, AppError> {
    let filters = filters_from_query(&state.dashboard, query.as_deref());
    let view = state.dashboard.run(&filters)?;
    Ok(Json(view.to_json()?))
}

async fn healthz() -> &'static str {
    "ok"
}

/// Routes of the dashboard
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/view", get(view))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Serve the dashboard until the process is stopped
pub async fn serve(dashboard: Dashboard, config: &DashboardConfig) -> Result<()> {
    let state = AppState {
        dashboard: Arc::new(dashboard),
        title: Arc::from(config.page_title.as_str()),
    };

    let server_error = |source: std::io::Error| DashboardError::Server {
        addr: config.bind_addr.clone(),
        source,
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str())
        .await
        .map_err(server_error)?;
    info!("Dashboard listening on http://{}", config.bind_addr);

    axum::serve(listener, router(state))
        .await
        .map_err(server_error)
}
