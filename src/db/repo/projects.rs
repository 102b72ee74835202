//! Project CRUD and calendar-period queries.

use crate::domain::{month_range, parse_month_label, Project, ProjectPeriod, User};
use crate::error::AppError;
use chrono::SecondsFormat;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_stored_date, Repository};

const PROJECT_SELECT: &str = r#"
    SELECT p.id, p.name, p.description, p.user_id,
           u.id AS joined_user_id, u.name AS user_name, u.email AS user_email
    FROM projects p
    LEFT JOIN users u ON u.id = p.user_id
"#;

fn project_from_row(row: &SqliteRow) -> Project {
    let joined_user_id: Option<String> = row.get("joined_user_id");
    let user = joined_user_id.map(|id| User {
        id,
        name: row.get("user_name"),
        email: row.get("user_email"),
    });

    Project {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        user_id: row.get("user_id"),
        user,
    }
}

impl Repository {
    /// Fetch a project by id with its owning user embedded when present.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_project(&self, id: &str) -> Result<Option<Project>, AppError> {
        let sql = format!("{} WHERE p.id = ?", PROJECT_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(project_from_row))
    }

    /// Fetch all projects owned by a user.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_projects_by_user(&self, user_id: &str) -> Result<Vec<Project>, AppError> {
        let sql = format!(
            "{} WHERE p.user_id = ? ORDER BY p.created_at ASC",
            PROJECT_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(project_from_row).collect())
    }

    /// Create a project.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn create_project(
        &self,
        name: &str,
        description: &str,
        user_id: &str,
    ) -> Result<Project, AppError> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO projects (id, name, description, user_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(description)
        .bind(user_id)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(Project {
            id,
            name: name.to_string(),
            description: description.to_string(),
            user_id: user_id.to_string(),
            user: None,
        })
    }

    /// Update a project's name and description.
    ///
    /// # Errors
    /// `NotFound` when the id does not exist.
    pub async fn update_project(
        &self,
        id: &str,
        name: &str,
        description: &str,
    ) -> Result<Project, AppError> {
        let result = sqlx::query("UPDATE projects SET name = ?, description = ? WHERE id = ?")
            .bind(name)
            .bind(description)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Project {} not found", id)));
        }

        self.get_project(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))
    }

    /// Delete a batch of projects in a single statement, returning the number
    /// of rows deleted.
    ///
    /// # Errors
    /// Returns an error if the deletion fails.
    pub async fn delete_projects(&self, ids: &[String]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("DELETE FROM projects WHERE id IN ({})", placeholders);

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Compute the inclusive date span of a project's travels within the
    /// calendar month named by `month_label`. Both ends are `None` when the
    /// project has no usable travel dates in that window.
    ///
    /// # Errors
    /// `InvalidDateFormat` when the label is malformed; no query is issued in
    /// that case.
    pub async fn project_period(
        &self,
        project_id: &str,
        month_label: &str,
    ) -> Result<ProjectPeriod, AppError> {
        let (year, month) = parse_month_label(month_label).ok_or(AppError::InvalidDateFormat)?;
        let (start, end) = month_range(year, month).ok_or(AppError::InvalidDateFormat)?;

        let rows = sqlx::query(
            "SELECT id, date FROM travels WHERE project_id = ? AND date >= ? AND date <= ?",
        )
        .bind(project_id)
        .bind(start.to_rfc3339_opts(SecondsFormat::Millis, true))
        .bind(end.to_rfc3339_opts(SecondsFormat::Millis, true))
        .fetch_all(&self.pool)
        .await?;

        let mut earliest = None;
        let mut latest = None;
        for row in &rows {
            let id: String = row.get("id");
            let date_str: Option<String> = row.get("date");
            // Rows without a readable date are skipped rather than failing
            // the whole span.
            let Some(date_str) = date_str else { continue };
            let date = parse_stored_date(&id, &date_str);

            earliest = Some(match earliest {
                Some(current) if current <= date => current,
                _ => date,
            });
            latest = Some(match latest {
                Some(current) if current >= date => current,
                _ => date,
            });
        }

        Ok(ProjectPeriod {
            start_date: earliest,
            end_date: latest,
        })
    }

    /// Insert a user row. Users are provisioned by the external identity
    /// sync; this is the write seam it uses.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name, email = excluded.email
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use crate::domain::TravelData;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn user1() -> User {
        User {
            id: "user1".to_string(),
            name: "Test User".to_string(),
            email: "user1@example.com".to_string(),
        }
    }

    async fn create_travel_on(repo: &Repository, project_id: &str, date: &str) {
        repo.create_travel(&TravelData {
            name: "Trip".to_string(),
            description: "Trip".to_string(),
            amount: 10,
            date: date.to_string(),
            category: "Misc".to_string(),
            user_id: "user1".to_string(),
            project_id: project_id.to_string(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_get_project_embeds_user() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_user(&user1()).await.unwrap();

        let created = repo
            .create_project("Kyoto", "Spring trip", "user1")
            .await
            .unwrap();

        let fetched = repo.get_project(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Kyoto");
        assert_eq!(fetched.user.as_ref().unwrap().email, "user1@example.com");
    }

    #[tokio::test]
    async fn test_get_project_without_user_row() {
        let (repo, _temp) = setup_test_db().await;

        let created = repo
            .create_project("Solo", "No user row", "ghost")
            .await
            .unwrap();

        let fetched = repo.get_project(&created.id).await.unwrap().unwrap();
        assert!(fetched.user.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_project_returns_none() {
        let (repo, _temp) = setup_test_db().await;
        assert!(repo.get_project("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_project() {
        let (repo, _temp) = setup_test_db().await;

        let created = repo.create_project("Old", "Old", "user1").await.unwrap();
        let updated = repo
            .update_project(&created.id, "New", "New description")
            .await
            .unwrap();
        assert_eq!(updated.name, "New");
        assert_eq!(updated.description, "New description");
    }

    #[tokio::test]
    async fn test_update_unknown_project_is_not_found() {
        let (repo, _temp) = setup_test_db().await;

        let result = repo.update_project("missing", "x", "x").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_projects_batched() {
        let (repo, _temp) = setup_test_db().await;

        let p1 = repo.create_project("A", "A", "user1").await.unwrap();
        let p2 = repo.create_project("B", "B", "user1").await.unwrap();
        repo.create_project("C", "C", "user1").await.unwrap();

        let count = repo
            .delete_projects(&[p1.id.clone(), p2.id.clone()])
            .await
            .unwrap();
        assert_eq!(count, 2);

        let remaining = repo.list_projects_by_user("user1").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "C");
    }

    #[tokio::test]
    async fn test_delete_projects_empty_is_noop() {
        let (repo, _temp) = setup_test_db().await;
        assert_eq!(repo.delete_projects(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_project_period_min_max() {
        let (repo, _temp) = setup_test_db().await;

        for date in ["2024-04-01", "2024-04-10", "2024-04-05"] {
            create_travel_on(&repo, "project1", date).await;
        }
        // Outside the requested month; must not widen the span.
        create_travel_on(&repo, "project1", "2024-05-02").await;

        let period = repo.project_period("project1", "2024-04").await.unwrap();
        assert_eq!(
            period.start_date.unwrap().format("%Y-%m-%d").to_string(),
            "2024-04-01"
        );
        assert_eq!(
            period.end_date.unwrap().format("%Y-%m-%d").to_string(),
            "2024-04-10"
        );
    }

    #[tokio::test]
    async fn test_project_period_empty_returns_nulls() {
        let (repo, _temp) = setup_test_db().await;

        let period = repo.project_period("project1", "2024-04").await.unwrap();
        assert!(period.start_date.is_none());
        assert!(period.end_date.is_none());
    }

    #[tokio::test]
    async fn test_project_period_invalid_label() {
        let (repo, _temp) = setup_test_db().await;

        let result = repo.project_period("project1", "invalid-month").await;
        assert!(matches!(result, Err(AppError::InvalidDateFormat)));
    }
}
