use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::calendar::ClassFilter;
use super::editor::{ClassChanges, ClassDraft};
use super::service::{SchedulingError, SchedulingService};
use crate::billing::YearMonth;
use crate::domain::{ClassId, ClassStatus, StudentId};
use crate::error::{error_response, store_status, validation_response};
use crate::store::{SnapshotSource, StoreCommands};

/// Class CRUD, pricing suggestions and the calendar grid.
pub fn scheduling_router<S>(service: Arc<SchedulingService<S>>) -> Router
where
    S: SnapshotSource + StoreCommands + 'static,
{
    Router::new()
        .route(
            "/api/v1/classes",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route("/api/v1/classes/suggestion", post(suggestion_handler::<S>))
        .route(
            "/api/v1/classes/:class_id",
            get(get_handler::<S>)
                .patch(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .route("/api/v1/calendar/week", get(week_handler::<S>))
        .route("/api/v1/calendar/month", get(month_handler::<S>))
        .with_state(service)
}

fn failure(err: SchedulingError) -> Response {
    match err {
        SchedulingError::Validation(error) => validation_response(&error),
        SchedulingError::NotFound(_) => error_response(StatusCode::NOT_FOUND, err),
        SchedulingError::Store(error) => error_response(store_status(&error), error),
    }
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<SchedulingService<S>>>,
    Query(filter): Query<ClassFilter>,
) -> Response
where
    S: SnapshotSource + StoreCommands + 'static,
{
    (StatusCode::OK, Json(service.list(&filter))).into_response()
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<SchedulingService<S>>>,
    Json(draft): Json<ClassDraft>,
) -> Response
where
    S: SnapshotSource + StoreCommands + 'static,
{
    match service.create(draft).await {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn get_handler<S>(
    State(service): State<Arc<SchedulingService<S>>>,
    Path(class_id): Path<String>,
) -> Response
where
    S: SnapshotSource + StoreCommands + 'static,
{
    match service.get(&ClassId::new(class_id)) {
        Ok(class) => (StatusCode::OK, Json(class)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn update_handler<S>(
    State(service): State<Arc<SchedulingService<S>>>,
    Path(class_id): Path<String>,
    Json(changes): Json<ClassChanges>,
) -> Response
where
    S: SnapshotSource + StoreCommands + 'static,
{
    let id = ClassId::new(class_id);
    match service.update(&id, changes).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "id": id }))).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<SchedulingService<S>>>,
    Path(class_id): Path<String>,
) -> Response
where
    S: SnapshotSource + StoreCommands + 'static,
{
    match service.delete(&ClassId::new(class_id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => failure(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestionRequest {
    student_id: StudentId,
    #[serde(default)]
    class_id: Option<ClassId>,
}

pub(crate) async fn suggestion_handler<S>(
    State(service): State<Arc<SchedulingService<S>>>,
    Json(request): Json<SuggestionRequest>,
) -> Response
where
    S: SnapshotSource + StoreCommands + 'static,
{
    let suggestion = service.suggest(&request.student_id, request.class_id.as_ref());
    (StatusCode::OK, Json(suggestion)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarQuery {
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    month: Option<String>,
    #[serde(default)]
    student: Option<StudentId>,
    #[serde(default)]
    status: Option<ClassStatus>,
}

impl CalendarQuery {
    fn filter(&self) -> ClassFilter {
        ClassFilter {
            student: self.student.clone(),
            status: self.status,
        }
    }
}

pub(crate) async fn week_handler<S>(
    State(service): State<Arc<SchedulingService<S>>>,
    Query(query): Query<CalendarQuery>,
) -> Response
where
    S: SnapshotSource + StoreCommands + 'static,
{
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    (StatusCode::OK, Json(service.week(date, &query.filter()))).into_response()
}

pub(crate) async fn month_handler<S>(
    State(service): State<Arc<SchedulingService<S>>>,
    Query(query): Query<CalendarQuery>,
) -> Response
where
    S: SnapshotSource + StoreCommands + 'static,
{
    let month = match query.month.as_deref() {
        Some(raw) => match raw.parse::<YearMonth>() {
            Ok(month) => month,
            Err(err) => return error_response(StatusCode::BAD_REQUEST, err),
        },
        None => YearMonth::of(query.date.unwrap_or_else(|| Local::now().date_naive())),
    };
    (StatusCode::OK, Json(service.month(month, &query.filter()))).into_response()
}
