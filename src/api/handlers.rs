//! HTTP API handlers.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::market::{Currency, MarketSource, SortOrder};
use crate::table::{MarketTable, PageSize, QueryState, TableSnapshot};
use crate::viewer::SourceViewer;

use super::render;

/// Application state shared with handlers.
pub struct AppState<S> {
    /// The market table every request reads and drives.
    pub table: MarketTable<S>,
    /// Embedded source files.
    pub viewer: SourceViewer,
    /// Prometheus handle, when the recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            viewer: self.viewer.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<S: MarketSource> AppState<S> {
    /// Create new app state over a table.
    pub fn new(table: MarketTable<S>) -> Self {
        Self {
            table,
            viewer: SourceViewer::embedded(),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Run a fetch in the background; the page polls for the result.
    fn spawn_fetch(&self, query: QueryState) {
        let table = self.table.clone();
        tokio::spawn(async move {
            // Outcome is recorded in the table state.
            let _ = table.fetch_page(query).await;
        });
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether the first fetch has settled.
    pub ready: bool,
    /// Whether a fetch is in flight.
    pub loading: bool,
}

#[derive(Debug, Deserialize)]
pub struct CurrencyParams {
    pub value: Currency,
}

#[derive(Debug, Deserialize)]
pub struct OrderParams {
    pub value: SortOrder,
}

/// Pagination control change. A missing page keeps the current one.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SourceParams {
    pub file: Option<String>,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 once a fetch has settled, 503 before.
pub async fn ready<S: MarketSource>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let response = ReadyResponse {
        ready: state.table.is_ready(),
        loading: state.table.is_loading(),
    };

    if response.ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Dashboard page.
pub async fn index<S: MarketSource>(State(state): State<AppState<S>>) -> Html<String> {
    Html(render::render_dashboard(&state.table.snapshot()))
}

/// JSON snapshot of the table.
pub async fn markets<S: MarketSource>(State(state): State<AppState<S>>) -> Json<TableSnapshot> {
    Json(state.table.snapshot())
}

/// Currency selector.
pub async fn select_currency<S: MarketSource>(
    State(state): State<AppState<S>>,
    Query(params): Query<CurrencyParams>,
) -> Redirect {
    let query = state.table.set_currency(params.value);
    state.spawn_fetch(query);
    Redirect::to("/")
}

/// Sort order selector.
pub async fn select_order<S: MarketSource>(
    State(state): State<AppState<S>>,
    Query(params): Query<OrderParams>,
) -> Redirect {
    let query = state.table.set_sort_order(params.value);
    state.spawn_fetch(query);
    Redirect::to("/")
}

/// Pagination control: page and/or page size.
pub async fn change_page<S: MarketSource>(
    State(state): State<AppState<S>>,
    Query(params): Query<PageParams>,
) -> Response {
    let current = state.table.query();
    let page = params.page.unwrap_or(current.page);
    let page_size = match params.page_size.map(PageSize::try_from).transpose() {
        Ok(size) => size.unwrap_or(current.page_size),
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match state.table.set_pagination(page, page_size) {
        Ok(query) => {
            state.spawn_fetch(query);
            Redirect::to("/").into_response()
        }
        Err(e) => {
            debug!(error = %e, "Rejected pagination change");
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Source viewer page.
pub async fn source<S: MarketSource>(
    State(state): State<AppState<S>>,
    Query(params): Query<SourceParams>,
) -> Response {
    match state.viewer.file(params.file.as_deref()) {
        Some(file) => Html(render::render_source_page(&state.viewer, file)).into_response(),
        None => (StatusCode::NOT_FOUND, "no such source file").into_response(),
    }
}

/// Prometheus metrics in text exposition format.
pub async fn metrics<S: MarketSource>(State(state): State<AppState<S>>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
