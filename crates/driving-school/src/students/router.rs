use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::editor::{StudentChanges, StudentForm};
use super::service::{StudentService, StudentServiceError};
use crate::domain::StudentId;
use crate::error::{error_response, store_status, validation_response};
use crate::store::{SnapshotSource, StoreCommands};

pub fn students_router<S>(service: Arc<StudentService<S>>) -> Router
where
    S: SnapshotSource + StoreCommands + 'static,
{
    Router::new()
        .route(
            "/api/v1/students",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route(
            "/api/v1/students/:student_id",
            get(get_handler::<S>)
                .patch(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .route(
            "/api/v1/students/:student_id/profile",
            get(profile_handler::<S>),
        )
        .with_state(service)
}

fn failure(err: StudentServiceError) -> Response {
    match err {
        StudentServiceError::Validation(error) => validation_response(&error),
        StudentServiceError::NotFound(_) => error_response(StatusCode::NOT_FOUND, err),
        StudentServiceError::Store(error) => error_response(store_status(&error), error),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    q: String,
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<StudentService<S>>>,
    Query(search): Query<SearchQuery>,
) -> Response
where
    S: SnapshotSource + StoreCommands + 'static,
{
    (StatusCode::OK, Json(service.list(&search.q))).into_response()
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<StudentService<S>>>,
    Json(form): Json<StudentForm>,
) -> Response
where
    S: SnapshotSource + StoreCommands + 'static,
{
    match service.create(form).await {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn get_handler<S>(
    State(service): State<Arc<StudentService<S>>>,
    Path(student_id): Path<String>,
) -> Response
where
    S: SnapshotSource + StoreCommands + 'static,
{
    match service.get(&StudentId::new(student_id)) {
        Ok(student) => (StatusCode::OK, Json(student)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn profile_handler<S>(
    State(service): State<Arc<StudentService<S>>>,
    Path(student_id): Path<String>,
) -> Response
where
    S: SnapshotSource + StoreCommands + 'static,
{
    match service.profile(&StudentId::new(student_id)) {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn update_handler<S>(
    State(service): State<Arc<StudentService<S>>>,
    Path(student_id): Path<String>,
    Json(changes): Json<StudentChanges>,
) -> Response
where
    S: SnapshotSource + StoreCommands + 'static,
{
    let id = StudentId::new(student_id);
    match service.update(&id, changes).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "id": id }))).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<StudentService<S>>>,
    Path(student_id): Path<String>,
) -> Response
where
    S: SnapshotSource + StoreCommands + 'static,
{
    match service.delete(&StudentId::new(student_id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => failure(err),
    }
}
