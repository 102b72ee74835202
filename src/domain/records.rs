//! Persistent record types exposed through the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Users are provisioned by the external identity provider; this service only
/// reads them to embed in project responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// A named tag attached to travel records, created on demand by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// An expense entry with amount and date, owned by a user within a project.
///
/// `category_id` always holds a resolved category id at persistence time;
/// free-text category names are resolved before the insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Travel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub amount: i64,
    pub date: DateTime<Utc>,
    pub category_id: String,
    pub user_id: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Validated payload for creating a travel record. `date` stays a raw string
/// until the repository parses it; `category` is a name, resolved to an id
/// on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelData {
    pub name: String,
    pub description: String,
    pub amount: i64,
    pub date: String,
    pub category: String,
    pub user_id: String,
    pub project_id: String,
}

/// Validated payload for updating a travel record. Ownership references are
/// immutable after creation and are not part of the update surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelUpdate {
    pub name: String,
    pub description: String,
    pub amount: i64,
    pub date: String,
    pub category: String,
}

/// Inclusive date span covered by a project's travels within one calendar
/// month. Both ends are `null` when the project has no dated travels there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPeriod {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}
