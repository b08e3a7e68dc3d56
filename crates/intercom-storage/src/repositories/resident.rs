#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::Resident;
use chrono::Utc;
use sqlx::SqlitePool;

/// Repository trait for Resident entity operations
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// so no async-trait crate is needed.
pub trait ResidentRepository: Send + Sync {
    /// Find a resident by ID
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Resident>>;

    /// Find all residents of a unit (trimmed comparison), oldest first
    async fn find_by_unit(&self, unit_number: &str) -> StorageResult<Vec<Resident>>;

    /// List all residents ordered by unit
    async fn list(&self) -> StorageResult<Vec<Resident>>;

    /// Create a new resident
    async fn create(&self, resident: &Resident) -> StorageResult<i64>;

    /// Update an existing resident
    async fn update(&self, resident: &Resident) -> StorageResult<()>;

    /// Delete a resident by ID
    async fn delete(&self, id: i64) -> StorageResult<()>;
}

/// SQLite implementation of ResidentRepository
pub struct SqliteResidentRepository {
    pool: SqlitePool,
}

impl SqliteResidentRepository {
    /// Create a new SQLite resident repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ResidentRepository for SqliteResidentRepository {
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Resident>> {
        let resident = sqlx::query_as::<_, Resident>(
            r#"
            SELECT id, name, unit_number, passcode, created_at, updated_at
            FROM residents
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(resident)
    }

    async fn find_by_unit(&self, unit_number: &str) -> StorageResult<Vec<Resident>> {
        let residents = sqlx::query_as::<_, Resident>(
            r#"
            SELECT id, name, unit_number, passcode, created_at, updated_at
            FROM residents
            WHERE trim(unit_number) = ?
            ORDER BY id
            "#,
        )
        .bind(unit_number.trim())
        .fetch_all(&self.pool)
        .await?;

        Ok(residents)
    }

    async fn list(&self) -> StorageResult<Vec<Resident>> {
        let residents = sqlx::query_as::<_, Resident>(
            r#"
            SELECT id, name, unit_number, passcode, created_at, updated_at
            FROM residents
            ORDER BY unit_number, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(residents)
    }

    async fn create(&self, resident: &Resident) -> StorageResult<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO residents (name, unit_number, passcode, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&resident.name)
        .bind(&resident.unit_number)
        .bind(&resident.passcode)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update(&self, resident: &Resident) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE residents
            SET name = ?, unit_number = ?, passcode = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&resident.name)
        .bind(&resident.unit_number)
        .bind(&resident.passcode)
        .bind(Utc::now())
        .bind(resident.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Resident", "id", resident.id));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM residents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Resident", "id", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;

    async fn setup_test_db() -> Database {
        Database::in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_resident() {
        let db = setup_test_db().await;
        let repo = SqliteResidentRepository::new(db.pool().clone());

        let id = repo
            .create(&Resident::new("Ana Souza", "204", "1234"))
            .await
            .unwrap();
        assert!(id > 0);

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.name, "Ana Souza");
        assert_eq!(found.unit_number, "204");
        assert_eq!(found.passcode, "1234");
    }

    #[tokio::test]
    async fn test_find_by_unit_trims_and_orders() {
        let db = setup_test_db().await;
        let repo = SqliteResidentRepository::new(db.pool().clone());

        let first = repo.create(&Resident::new("First", " 204 ", "1111")).await.unwrap();
        let second = repo.create(&Resident::new("Second", "204", "2222")).await.unwrap();
        repo.create(&Resident::new("Other", "205", "3333")).await.unwrap();

        let residents = repo.find_by_unit("204 ").await.unwrap();
        let ids: Vec<i64> = residents.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn test_update_resident() {
        let db = setup_test_db().await;
        let repo = SqliteResidentRepository::new(db.pool().clone());

        let id = repo.create(&Resident::new("Ana", "204", "1234")).await.unwrap();
        let mut resident = repo.find_by_id(id).await.unwrap().unwrap();
        resident.passcode = "5678".to_string();
        repo.update(&resident).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.passcode, "5678");
        assert!(found.updated_at >= found.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_resident() {
        let db = setup_test_db().await;
        let repo = SqliteResidentRepository::new(db.pool().clone());

        let mut ghost = Resident::new("Ghost", "1", "0000");
        ghost.id = 999;
        let err = repo.update(&ghost).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_resident() {
        let db = setup_test_db().await;
        let repo = SqliteResidentRepository::new(db.pool().clone());

        let id = repo.create(&Resident::new("Ana", "204", "1234")).await.unwrap();
        repo.delete(id).await.unwrap();

        assert!(repo.find_by_id(id).await.unwrap().is_none());
        assert!(repo.delete(id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_residents() {
        let db = setup_test_db().await;
        let repo = SqliteResidentRepository::new(db.pool().clone());

        repo.create(&Resident::new("B", "301", "1234")).await.unwrap();
        repo.create(&Resident::new("A", "101", "1234")).await.unwrap();

        let units: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.unit_number)
            .collect();
        assert_eq!(units, vec!["101", "301"]);
    }
}
