pub mod palette;

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::routing::{delete, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

#[derive(Deserialize)]
struct FreeTeachersQuery {
    day: Day,
    period: u8,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    subject: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClassTimetableResponse {
    #[serde(flatten)]
    pub timetable: ClassTimetable,
    pub subject_colors: BTreeMap<String, &'static str>,
}

#[derive(Debug, Serialize)]
pub struct TeacherTimetableResponse {
    #[serde(flatten)]
    pub timetable: TeacherTimetable,
    pub subject_colors: BTreeMap<String, &'static str>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/periods", post(create_period))
        .route("/periods/{id}", delete(delete_period))
        .route("/classes/{id}/timetable", get(class_timetable))
        .route("/classes/{id}/timetable/generate", post(auto_generate))
        .route("/teachers/free", get(free_teachers))
        .route("/teachers/{id}/timetable", get(teacher_timetable))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.timetable.store().ping().await?;
    Ok(StatusCode::OK)
}

async fn create_period(
    State(state): State<AppState>,
    body: Result<Json<NewPeriodRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Period>), AppError> {
    let Json(req) = body?;
    let period = state.timetable.create_period(req).await?;
    Ok((StatusCode::CREATED, Json(period)))
}

async fn delete_period(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.timetable.delete_period(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn auto_generate(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    body: Result<Option<Json<AutoGenerateRequest>>, JsonRejection>,
) -> Result<Json<GenerationReport>, AppError> {
    // No body means the full configured week.
    let req = body?.map(|Json(req)| req).unwrap_or_default();
    let report = state
        .timetable
        .auto_generate(&class_id, req.number_of_days, req.periods_per_day)
        .await?;
    Ok(Json(report))
}

async fn class_timetable(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> Result<Json<ClassTimetableResponse>, AppError> {
    let timetable = state.timetable.class_timetable(&class_id).await?;
    let subject_colors = palette::legend(timetable.grid.occupied());
    Ok(Json(ClassTimetableResponse {
        timetable,
        subject_colors,
    }))
}

async fn teacher_timetable(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<Json<TeacherTimetableResponse>, AppError> {
    let timetable = state.timetable.teacher_timetable(&teacher_id).await?;
    let subject_colors = palette::legend(timetable.grid.occupied());
    Ok(Json(TeacherTimetableResponse {
        timetable,
        subject_colors,
    }))
}

async fn free_teachers(
    State(state): State<AppState>,
    query: Result<Query<FreeTeachersQuery>, QueryRejection>,
) -> Result<Json<Vec<TeacherRecord>>, AppError> {
    let Query(params) = query?;
    let filter = FreeTeacherFilter {
        department: params.department,
        subject: params.subject,
    };
    let teachers = state
        .timetable
        .find_free_teachers(params.day, params.period, &filter)
        .await?;
    Ok(Json(teachers))
}
