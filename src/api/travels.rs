use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::domain::{GroupedPeriodRow, Period, Travel, TravelData, TravelUpdate};
use crate::error::AppError;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_travel))
        .route("/:id", delete(delete_travel).put(update_travel))
        .route("/:id/:project_id", get(list_travels))
        .route("/:id/grouped/:period", get(grouped_by_user))
        .route("/:id/:project_id/grouped/:period", get(grouped_by_project))
        .route("/calendar/:id/:month", get(travels_calendar))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTravelRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<i64>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub user_id: Option<String>,
    pub project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTravelRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<i64>,
    pub date: Option<String>,
    pub category: Option<String>,
}

async fn list_travels(
    Path((user_id, project_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Travel>>, AppError> {
    let travels = state
        .repo
        .list_by_user_and_project(&user_id, &project_id)
        .await?;
    Ok(Json(travels))
}

async fn create_travel(
    State(state): State<AppState>,
    Json(body): Json<CreateTravelRequest>,
) -> Result<Json<Travel>, AppError> {
    let (
        Some(name),
        Some(description),
        Some(amount),
        Some(date),
        Some(category),
        Some(user_id),
        Some(project_id),
    ) = (
        body.name,
        body.description,
        body.amount,
        body.date,
        body.category,
        body.user_id,
        body.project_id,
    )
    else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };

    if [&name, &description, &date, &category, &user_id, &project_id]
        .iter()
        .any(|s| s.is_empty())
    {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let travel = state
        .repo
        .create_travel(&TravelData {
            name,
            description,
            amount,
            date,
            category,
            user_id,
            project_id,
        })
        .await?;

    Ok(Json(travel))
}

async fn update_travel(
    Path(travel_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<UpdateTravelRequest>,
) -> Result<Json<Travel>, AppError> {
    let (Some(name), Some(description), Some(amount), Some(date), Some(category)) = (
        body.name,
        body.description,
        body.amount,
        body.date,
        body.category,
    ) else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };

    if [&name, &description, &date, &category]
        .iter()
        .any(|s| s.is_empty())
    {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let travel = state
        .repo
        .update_travel(
            &travel_id,
            &TravelUpdate {
                name,
                description,
                amount,
                date,
                category,
            },
        )
        .await?;

    Ok(Json(travel))
}

async fn delete_travel(
    Path(travel_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Travel>, AppError> {
    let travel = state.repo.delete_travel(&travel_id).await?;
    Ok(Json(travel))
}

async fn grouped_by_user(
    Path((user_id, period)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<Vec<GroupedPeriodRow>>, AppError> {
    let period: Period = period
        .parse()
        .map_err(|_| AppError::InvalidPeriod(period.clone()))?;

    let rows = state.repo.group_by_period(&user_id, period, None).await?;
    Ok(Json(rows))
}

async fn grouped_by_project(
    Path((user_id, project_id, period)): Path<(String, String, String)>,
    State(state): State<AppState>,
) -> Result<Json<Vec<GroupedPeriodRow>>, AppError> {
    let period: Period = period
        .parse()
        .map_err(|_| AppError::InvalidPeriod(period.clone()))?;

    let rows = state
        .repo
        .group_by_period(&user_id, period, Some(&project_id))
        .await?;
    Ok(Json(rows))
}

async fn travels_calendar(
    Path((user_id, month)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Travel>>, AppError> {
    let travels = state.repo.list_by_user_and_month(&user_id, &month).await?;
    Ok(Json(travels))
}
