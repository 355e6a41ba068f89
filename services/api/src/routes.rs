use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Local;
use driving_school::billing::views::AvailableMonthsView;
use driving_school::billing::{available_months, BillingSummary, Period, YearMonth};
use driving_school::auth::{auth_router, require_session};
use driving_school::config::{AuthConfig, BillingConfig};
use driving_school::error::AppError;
use driving_school::report::{FinancialReport, ReportFormat};
use driving_school::scheduling::{scheduling_router, ClassEditor, SchedulingService};
use driving_school::store::{SnapshotSource, StoreCommands};
use driving_school::students::{students_router, StudentService};
use serde::Deserialize;
use serde_json::json;

use crate::infra::AppState;

pub(crate) struct BillingState<S> {
    store: Arc<S>,
    top_students: usize,
}

/// Every API route over one store, plus the operational endpoints. With
/// `require_session` the office routes sit behind the session guard; the
/// login message lookup and the operational endpoints stay open.
pub(crate) fn with_office_routes<S>(
    store: Arc<S>,
    billing: &BillingConfig,
    auth: &AuthConfig,
) -> Router
where
    S: SnapshotSource + StoreCommands + 'static,
{
    let scheduling = Arc::new(SchedulingService::new(
        Arc::clone(&store),
        ClassEditor::from_config(billing),
    ));
    let students = Arc::new(StudentService::new(
        Arc::clone(&store),
        billing.promo_policy(),
    ));

    let mut office = scheduling_router(scheduling)
        .merge(students_router(students))
        .merge(billing_router(Arc::new(BillingState {
            store,
            top_students: billing.top_students,
        })));
    if auth.require_session {
        office = office.route_layer(middleware::from_fn(require_session));
    }

    office
        .merge(auth_router())
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

fn billing_router<S>(state: Arc<BillingState<S>>) -> Router
where
    S: SnapshotSource + 'static,
{
    Router::new()
        .route("/api/v1/billing/summary", get(summary_endpoint::<S>))
        .route("/api/v1/billing/months", get(months_endpoint::<S>))
        .route("/api/v1/billing/report", get(report_endpoint::<S>))
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportQuery {
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    format: Option<String>,
}

fn bad_request(message: impl std::fmt::Display) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message.to_string() })),
    )
        .into_response()
}

fn period_of(query: &ReportQuery) -> Result<Period, Response> {
    match query.period.as_deref() {
        Some(raw) => raw.parse().map_err(bad_request),
        None => Ok(Period::AllTime),
    }
}

pub(crate) async fn summary_endpoint<S>(
    State(state): State<Arc<BillingState<S>>>,
    Query(query): Query<ReportQuery>,
) -> Response
where
    S: SnapshotSource + 'static,
{
    let period = match period_of(&query) {
        Ok(period) => period,
        Err(response) => return response,
    };
    let summary = BillingSummary::compute(&state.store.snapshot(), period, state.top_students);
    (StatusCode::OK, Json(summary.view())).into_response()
}

pub(crate) async fn months_endpoint<S>(State(state): State<Arc<BillingState<S>>>) -> Response
where
    S: SnapshotSource + 'static,
{
    let current = YearMonth::of(Local::now().date_naive());
    let months = available_months(&state.store.snapshot().classes, current);
    (StatusCode::OK, Json(AvailableMonthsView { current, months })).into_response()
}

pub(crate) async fn report_endpoint<S>(
    State(state): State<Arc<BillingState<S>>>,
    Query(query): Query<ReportQuery>,
) -> Response
where
    S: SnapshotSource + 'static,
{
    let period = match period_of(&query) {
        Ok(period) => period,
        Err(response) => return response,
    };
    let format = match query.format.as_deref().map(str::parse::<ReportFormat>) {
        Some(Ok(format)) => format,
        Some(Err(message)) => return bad_request(message),
        None => ReportFormat::Html,
    };

    let summary = BillingSummary::compute(&state.store.snapshot(), period, state.top_students);
    let report = FinancialReport::build(&summary, Local::now().naive_local());
    let body = match report.render(format) {
        Ok(body) => body,
        Err(err) => return AppError::from(err).into_response(),
    };
    let disposition = format!("inline; filename=\"{}\"", report.file_name(format));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}
