//! Travel record CRUD and period aggregation.

use crate::domain::{
    month_range, parse_flexible_date, parse_month_label, GroupedPeriodRow, Period, Travel,
    TravelData, TravelUpdate,
};
use crate::error::AppError;
use chrono::SecondsFormat;
use sqlx::Row;
use tracing::warn;
use uuid::Uuid;

use super::{travel_from_row, Repository};

const TRAVEL_SELECT: &str = r#"
    SELECT t.id, t.name, t.description, t.amount, t.date,
           t.category_id, t.user_id, t.project_id,
           c.name AS category_name
    FROM travels t
    JOIN categories c ON c.id = t.category_id
"#;

impl Repository {
    /// Create a travel record.
    ///
    /// Parses the date before touching the datastore and resolves the
    /// category name to an id; the persisted row never carries free text.
    ///
    /// # Errors
    /// `InvalidDateFormat` when the date does not parse; database errors
    /// otherwise.
    pub async fn create_travel(&self, data: &TravelData) -> Result<Travel, AppError> {
        let parsed_date = match parse_flexible_date(&data.date) {
            Some(d) => d,
            None => {
                warn!(date = %data.date, "Invalid date format");
                return Err(AppError::InvalidDateFormat);
            }
        };

        let category = self.get_or_create_category(&data.category).await?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO travels (id, name, description, amount, date,
                                 category_id, user_id, project_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.amount)
        .bind(parsed_date.to_rfc3339_opts(SecondsFormat::Millis, true))
        .bind(&category.id)
        .bind(&data.user_id)
        .bind(&data.project_id)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(Travel {
            id,
            name: data.name.clone(),
            description: data.description.clone(),
            amount: data.amount,
            date: parsed_date,
            category_id: category.id,
            user_id: data.user_id.clone(),
            project_id: data.project_id.clone(),
            category: None,
        })
    }

    /// Update a travel record, re-parsing the date and re-resolving the
    /// category name.
    ///
    /// # Errors
    /// `InvalidDateFormat` for a bad date, `NotFound` for an unknown id.
    pub async fn update_travel(&self, id: &str, data: &TravelUpdate) -> Result<Travel, AppError> {
        let parsed_date = match parse_flexible_date(&data.date) {
            Some(d) => d,
            None => {
                warn!(travel_id = %id, date = %data.date, "Invalid date format");
                return Err(AppError::InvalidDateFormat);
            }
        };

        let category = self.get_or_create_category(&data.category).await?;

        let result = sqlx::query(
            r#"
            UPDATE travels
            SET name = ?, description = ?, amount = ?, date = ?, category_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.amount)
        .bind(parsed_date.to_rfc3339_opts(SecondsFormat::Millis, true))
        .bind(&category.id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Travel {} not found", id)));
        }

        self.get_travel(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Travel {} not found", id)))
    }

    /// Delete a travel record by id, returning the deleted record.
    ///
    /// # Errors
    /// `NotFound` when the id does not exist.
    pub async fn delete_travel(&self, id: &str) -> Result<Travel, AppError> {
        let travel = self
            .get_travel(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Travel {} not found", id)))?;

        sqlx::query("DELETE FROM travels WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(travel)
    }

    /// Fetch a travel record by id with its category populated.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_travel(&self, id: &str) -> Result<Option<Travel>, AppError> {
        let sql = format!("{} WHERE t.id = ?", TRAVEL_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(travel_from_row))
    }

    /// Fetch all travel records for a user within a project, categories
    /// populated, unordered.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_by_user_and_project(
        &self,
        user_id: &str,
        project_id: &str,
    ) -> Result<Vec<Travel>, AppError> {
        let sql = format!("{} WHERE t.user_id = ? AND t.project_id = ?", TRAVEL_SELECT);
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(travel_from_row).collect())
    }

    /// Fetch all travel records for a user within the calendar month named by
    /// `month_label` (e.g. `2024年1月`). The window is inclusive: first day
    /// 00:00:00.000 through last day 23:59:59.999.
    ///
    /// # Errors
    /// `InvalidDateFormat` when the label does not contain exactly two
    /// integer groups; no query is issued in that case.
    pub async fn list_by_user_and_month(
        &self,
        user_id: &str,
        month_label: &str,
    ) -> Result<Vec<Travel>, AppError> {
        let (year, month) = parse_month_label(month_label).ok_or(AppError::InvalidDateFormat)?;
        let (start, end) = month_range(year, month).ok_or(AppError::InvalidDateFormat)?;

        let sql = format!(
            "{} WHERE t.user_id = ? AND t.date >= ? AND t.date <= ?",
            TRAVEL_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(start.to_rfc3339_opts(SecondsFormat::Millis, true))
            .bind(end.to_rfc3339_opts(SecondsFormat::Millis, true))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(travel_from_row).collect())
    }

    /// Aggregate travel count and amount per period bucket for a user,
    /// optionally restricted to one project, ordered ascending by the
    /// grouping key.
    ///
    /// Each `Period` variant maps to a fixed query template; only the static
    /// project-filter fragment varies and every value is bound.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn group_by_period(
        &self,
        user_id: &str,
        period: Period,
        project_id: Option<&str>,
    ) -> Result<Vec<GroupedPeriodRow>, AppError> {
        let project_filter = if project_id.is_some() {
            "AND project_id = ?"
        } else {
            ""
        };

        let (sql, has_year) = match period {
            Period::Year => (
                format!(
                    "SELECT CAST(strftime('%Y', date) AS INTEGER) AS period_key, \
                     COUNT(*) AS travel_count, SUM(amount) AS total_amount \
                     FROM travels WHERE user_id = ? {} \
                     GROUP BY period_key ORDER BY period_key ASC",
                    project_filter
                ),
                false,
            ),
            Period::Month => (
                format!(
                    "SELECT CAST(strftime('%m', date) AS INTEGER) AS period_key, \
                     CAST(strftime('%Y', date) AS INTEGER) AS year, \
                     COUNT(*) AS travel_count, SUM(amount) AS total_amount \
                     FROM travels WHERE user_id = ? {} \
                     GROUP BY year, period_key ORDER BY year ASC, period_key ASC",
                    project_filter
                ),
                true,
            ),
            Period::Week => (
                format!(
                    "SELECT CAST(strftime('%W', date) AS INTEGER) AS period_key, \
                     CAST(strftime('%Y', date) AS INTEGER) AS year, \
                     COUNT(*) AS travel_count, SUM(amount) AS total_amount \
                     FROM travels WHERE user_id = ? {} \
                     GROUP BY year, period_key ORDER BY year ASC, period_key ASC",
                    project_filter
                ),
                true,
            ),
        };

        let mut query = sqlx::query(&sql).bind(user_id);
        if let Some(project_id) = project_id {
            query = query.bind(project_id);
        }

        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| GroupedPeriodRow {
                period_key: row.get("period_key"),
                year: if has_year { row.get("year") } else { None },
                travel_count: row.get("travel_count"),
                total_amount: row.get("total_amount"),
            })
            .collect())
    }
}
