use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::Project;
use crate::error::AppError;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_project))
        .route("/:id", get(get_project).put(update_project))
        .route("/user/:id", get(list_projects_by_user))
        .route("/delete", post(delete_projects))
        .route("/calendar/user/:id", get(project_calendar))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteProjectsRequest {
    pub ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCalendarEntry {
    pub id: String,
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

async fn get_project(
    Path(project_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Project>, AppError> {
    let project = state
        .repo
        .get_project(&project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

async fn list_projects_by_user(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, AppError> {
    let projects = state.repo.list_projects_by_user(&user_id).await?;
    Ok(Json(projects))
}

async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<Json<Project>, AppError> {
    let (Some(name), Some(description), Some(user_id)) =
        (body.name, body.description, body.user_id)
    else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };
    if name.is_empty() || description.is_empty() || user_id.is_empty() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let project = state
        .repo
        .create_project(&name, &description, &user_id)
        .await?;
    info!(project_id = %project.id, "project created");

    Ok(Json(project))
}

async fn update_project(
    Path(project_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, AppError> {
    let (Some(name), Some(description)) = (body.name, body.description) else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };
    if name.is_empty() || description.is_empty() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let project = state
        .repo
        .update_project(&project_id, &name, &description)
        .await?;

    Ok(Json(project))
}

async fn delete_projects(
    State(state): State<AppState>,
    Json(body): Json<DeleteProjectsRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let ids = body.ids.unwrap_or_default();
    if ids.is_empty() {
        return Err(AppError::BadRequest("Missing project ids".to_string()));
    }

    let count = state.repo.delete_projects(&ids).await?;
    info!(count, "projects deleted");

    Ok(Json(json!({ "count": count })))
}

/// Calendar view: each of the user's projects with the date span its travels
/// cover within the requested month. Projects without any dated travels in
/// that month are filtered out.
async fn project_calendar(
    Path(user_id): Path<String>,
    Query(params): Query<CalendarQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectCalendarEntry>>, AppError> {
    let month = params
        .month
        .ok_or_else(|| AppError::BadRequest("Missing month".to_string()))?;

    let projects = state.repo.list_projects_by_user(&user_id).await?;

    let mut entries = Vec::with_capacity(projects.len());
    for project in projects {
        let period = state.repo.project_period(&project.id, &month).await?;
        if period.start_date.is_none() {
            continue;
        }
        entries.push(ProjectCalendarEntry {
            id: project.id,
            name: project.name,
            start_date: period.start_date,
            end_date: period.end_date,
        });
    }

    Ok(Json(entries))
}
