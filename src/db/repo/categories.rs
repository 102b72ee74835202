//! Category lookup and lazy creation.

use crate::domain::Category;
use sqlx::Row;
use uuid::Uuid;

use super::Repository;

impl Repository {
    /// Get a category by exact name, creating it when absent.
    ///
    /// The UNIQUE constraint on `categories.name` plus the conflict-ignoring
    /// insert make concurrent calls for the same unseen name converge on a
    /// single row.
    ///
    /// # Errors
    /// Returns an error if the lookup or insert fails.
    pub async fn get_or_create_category(&self, name: &str) -> Result<Category, sqlx::Error> {
        if let Some(existing) = self.find_category_by_name(name).await? {
            return Ok(existing);
        }

        sqlx::query(
            r#"
            INSERT INTO categories (id, name)
            VALUES (?, ?)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .execute(&self.pool)
        .await?;

        // Re-select rather than trusting our generated id: a concurrent
        // insert may have won the conflict.
        let row = sqlx::query("SELECT id, name FROM categories WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(Category {
            id: row.get("id"),
            name: row.get("name"),
        })
    }

    /// Look up a category by exact name.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Category>, sqlx::Error> {
        let row = sqlx::query("SELECT id, name FROM categories WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Category {
            id: r.get("id"),
            name: r.get("name"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::db::migrations::init_db;
    use crate::db::Repository;
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

    #[tokio::test]
    async fn test_creates_category_on_first_reference() {
        let (repo, _temp) = setup_test_db().await;

        let category = repo.get_or_create_category("Transport").await.unwrap();
        assert_eq!(category.name, "Transport");
        assert!(!category.id.is_empty());
    }

    #[tokio::test]
    async fn test_second_call_returns_existing_row() {
        let (repo, _temp) = setup_test_db().await;

        let first = repo.get_or_create_category("Lodging").await.unwrap();
        let second = repo.get_or_create_category("Lodging").await.unwrap();
        assert_eq!(first, second);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_distinct_names_create_distinct_rows() {
        let (repo, _temp) = setup_test_db().await;

        let a = repo.get_or_create_category("Meals").await.unwrap();
        let b = repo.get_or_create_category("Flights").await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_find_missing_category_returns_none() {
        let (repo, _temp) = setup_test_db().await;

        let result = repo.find_category_by_name("Nothing").await.unwrap();
        assert!(result.is_none());
    }
}
