//! Student HTTP Routes
//!
//! CRUD and query endpoints, nested under `/api/v1/students`.
//!
//! Empty list results answer 204 with no body. Path, query-string and body
//! rejections are answered as 400 with the usual JSON error body.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use crate::observability::MetricsRegistry;
use crate::store::RecordStore;
use crate::students::{
    NewStudent, StoreStudentRepository, Student, StudentError, StudentId, StudentResult,
    StudentService,
};

// ==================
// Shared State
// ==================

/// Student state shared across handlers
pub struct StudentState {
    pub service: StudentService<StoreStudentRepository>,
}

impl StudentState {
    pub fn new(store: Arc<RecordStore>, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            service: StudentService::new(StoreStudentRepository::new(store), metrics),
        }
    }

    /// State over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(RecordStore::in_memory()),
            Arc::new(MetricsRegistry::new()),
        )
    }

    pub fn metrics(&self) -> Arc<MetricsRegistry> {
        Arc::clone(self.service.metrics())
    }
}

impl Default for StudentState {
    fn default() -> Self {
        Self::in_memory()
    }
}

// ==================
// Request Types
// ==================

#[derive(Debug, Deserialize)]
pub struct AgeRangeQuery {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Deserialize)]
pub struct NameSearchQuery {
    pub name: String,
}

// ==================
// Student Routes
// ==================

/// Create student routes
pub fn student_routes(state: Arc<StudentState>) -> Router {
    Router::new()
        .route("/", get(list_students_handler).post(add_student_handler))
        .route(
            "/:id",
            get(get_student_handler)
                .head(student_exists_handler)
                .put(update_student_handler)
                .delete(delete_student_handler),
        )
        .route(
            "/email/:email",
            get(get_by_email_handler).delete(delete_by_email_handler),
        )
        .route("/lastname/:last_name", get(by_last_name_handler))
        .route("/firstname/:first_name", get(by_first_name_handler))
        .route("/firstname-prefix/:prefix", get(by_first_name_prefix_handler))
        .route("/older-than/:age", get(older_than_handler))
        .route("/younger-than/:age", get(younger_than_handler))
        .route("/between-ages", get(between_ages_handler))
        .route("/domain/:domain", get(by_domain_handler))
        .route("/search", get(search_handler))
        .route("/all", delete(delete_all_handler))
        .route("/count", get(count_handler))
        .route("/count/lastname/:last_name", get(count_by_last_name_handler))
        .route("/average-age", get(average_age_handler))
        .route("/oldest", get(oldest_handler))
        .route("/youngest", get(youngest_handler))
        .route("/ordered-by-lastname", get(ordered_by_last_name_handler))
        .route("/ordered-by-age-desc", get(ordered_by_age_desc_handler))
        .with_state(state)
}

// ==================
// Helper Functions
// ==================

/// 204 when empty, otherwise 200 with the list
fn list_response(students: Vec<Student>) -> Response {
    if students.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::OK, Json(students)).into_response()
    }
}

fn found(student: Option<Student>) -> StudentResult<Json<Student>> {
    student.map(Json).ok_or(StudentError::NotFound)
}

fn path_param<T>(param: Result<Path<T>, PathRejection>) -> StudentResult<T> {
    param
        .map(|Path(value)| value)
        .map_err(|e| StudentError::InvalidInput(e.body_text()))
}

fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> StudentResult<T> {
    params
        .map(|Query(value)| value)
        .map_err(|e| StudentError::InvalidInput(e.body_text()))
}

fn json_body(body: Result<Json<NewStudent>, JsonRejection>) -> StudentResult<NewStudent> {
    body.map(|Json(value)| value)
        .map_err(|e| StudentError::InvalidInput(e.body_text()))
}

// ==================
// Lookup Handlers
// ==================

async fn list_students_handler(
    State(state): State<Arc<StudentState>>,
) -> StudentResult<Response> {
    Ok(list_response(state.service.find_all_students()?))
}

async fn get_student_handler(
    State(state): State<Arc<StudentState>>,
    id: Result<Path<StudentId>, PathRejection>,
) -> StudentResult<Json<Student>> {
    let id = path_param(id)?;
    found(state.service.find_student_by_id(id)?)
}

async fn student_exists_handler(
    State(state): State<Arc<StudentState>>,
    id: Result<Path<StudentId>, PathRejection>,
) -> StatusCode {
    let Ok(id) = path_param(id) else {
        return StatusCode::BAD_REQUEST;
    };
    match state.service.exists_by_id(id) {
        Ok(true) => StatusCode::OK,
        Ok(false) => StatusCode::NOT_FOUND,
        Err(e) => e.status_code(),
    }
}

async fn get_by_email_handler(
    State(state): State<Arc<StudentState>>,
    email: Result<Path<String>, PathRejection>,
) -> StudentResult<Json<Student>> {
    let email = path_param(email)?;
    found(state.service.find_student_by_email(&email)?)
}

async fn by_last_name_handler(
    State(state): State<Arc<StudentState>>,
    last_name: Result<Path<String>, PathRejection>,
) -> StudentResult<Response> {
    let last_name = path_param(last_name)?;
    Ok(list_response(state.service.find_students_by_last_name(&last_name)?))
}

async fn by_first_name_handler(
    State(state): State<Arc<StudentState>>,
    first_name: Result<Path<String>, PathRejection>,
) -> StudentResult<Response> {
    let first_name = path_param(first_name)?;
    Ok(list_response(state.service.find_students_by_first_name(&first_name)?))
}

async fn by_first_name_prefix_handler(
    State(state): State<Arc<StudentState>>,
    prefix: Result<Path<String>, PathRejection>,
) -> StudentResult<Response> {
    let prefix = path_param(prefix)?;
    Ok(list_response(
        state.service.find_students_by_first_name_prefix(&prefix)?,
    ))
}

async fn older_than_handler(
    State(state): State<Arc<StudentState>>,
    age: Result<Path<i32>, PathRejection>,
) -> StudentResult<Response> {
    let age = path_param(age)?;
    Ok(list_response(state.service.find_students_older_than(age)?))
}

async fn younger_than_handler(
    State(state): State<Arc<StudentState>>,
    age: Result<Path<i32>, PathRejection>,
) -> StudentResult<Response> {
    let age = path_param(age)?;
    Ok(list_response(state.service.find_students_younger_than(age)?))
}

async fn between_ages_handler(
    State(state): State<Arc<StudentState>>,
    range: Result<Query<AgeRangeQuery>, QueryRejection>,
) -> StudentResult<Response> {
    let range = query_params(range)?;
    Ok(list_response(
        state.service.find_students_between_ages(range.min, range.max)?,
    ))
}

async fn by_domain_handler(
    State(state): State<Arc<StudentState>>,
    domain: Result<Path<String>, PathRejection>,
) -> StudentResult<Response> {
    let domain = path_param(domain)?;
    Ok(list_response(state.service.find_students_by_email_domain(&domain)?))
}

async fn search_handler(
    State(state): State<Arc<StudentState>>,
    search: Result<Query<NameSearchQuery>, QueryRejection>,
) -> StudentResult<Response> {
    let search = query_params(search)?;
    Ok(list_response(state.service.search_by_name(&search.name)?))
}

// ==================
// Aggregate Handlers
// ==================

async fn count_handler(State(state): State<Arc<StudentState>>) -> StudentResult<Json<u64>> {
    Ok(Json(state.service.student_count()?))
}

async fn count_by_last_name_handler(
    State(state): State<Arc<StudentState>>,
    last_name: Result<Path<String>, PathRejection>,
) -> StudentResult<Json<u64>> {
    let last_name = path_param(last_name)?;
    Ok(Json(state.service.count_by_last_name(&last_name)?))
}

async fn average_age_handler(
    State(state): State<Arc<StudentState>>,
) -> StudentResult<Json<Option<f64>>> {
    Ok(Json(state.service.average_age()?))
}

async fn oldest_handler(State(state): State<Arc<StudentState>>) -> StudentResult<Json<Student>> {
    found(state.service.oldest_student()?)
}

async fn youngest_handler(
    State(state): State<Arc<StudentState>>,
) -> StudentResult<Json<Student>> {
    found(state.service.youngest_student()?)
}

async fn ordered_by_last_name_handler(
    State(state): State<Arc<StudentState>>,
) -> StudentResult<Response> {
    Ok(list_response(state.service.find_all_ordered_by_last_name()?))
}

async fn ordered_by_age_desc_handler(
    State(state): State<Arc<StudentState>>,
) -> StudentResult<Response> {
    Ok(list_response(state.service.find_all_ordered_by_age_desc()?))
}

// ==================
// Write Handlers
// ==================

async fn add_student_handler(
    State(state): State<Arc<StudentState>>,
    body: Result<Json<NewStudent>, JsonRejection>,
) -> StudentResult<(StatusCode, Json<Student>)> {
    let candidate = json_body(body)?;
    let student = state.service.add_student(candidate)?;
    Ok((StatusCode::CREATED, Json(student)))
}

async fn update_student_handler(
    State(state): State<Arc<StudentState>>,
    id: Result<Path<StudentId>, PathRejection>,
    body: Result<Json<NewStudent>, JsonRejection>,
) -> StudentResult<Json<Student>> {
    let id = path_param(id)?;
    let details = json_body(body)?;
    found(state.service.update_student(id, details)?)
}

async fn delete_student_handler(
    State(state): State<Arc<StudentState>>,
    id: Result<Path<StudentId>, PathRejection>,
) -> StudentResult<StatusCode> {
    let id = path_param(id)?;
    if state.service.delete_student(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StudentError::NotFound)
    }
}

async fn delete_by_email_handler(
    State(state): State<Arc<StudentState>>,
    email: Result<Path<String>, PathRejection>,
) -> StudentResult<StatusCode> {
    let email = path_param(email)?;
    if state.service.delete_student_by_email(&email)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StudentError::NotFound)
    }
}

async fn delete_all_handler(State(state): State<Arc<StudentState>>) -> StudentResult<StatusCode> {
    state.service.delete_all_students()?;
    Ok(StatusCode::NO_CONTENT)
}
