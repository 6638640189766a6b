use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use super::{duplicate_email, Store};
use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskChanges, User};

const USER_COLUMNS: &str = "id, email, hashed_password, created_at, updated_at";
const TASK_COLUMNS: &str = "id, title, description, status, owner_id, created_at, updated_at";

/// PostgreSQL-backed store.
///
/// Each operation runs in its own transaction: committed when the operation
/// succeeds, rolled back when the transaction is dropped on any error path.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool for the given database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies any pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("migration failed: {}", e)))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn count_users(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Removes every task and user.
    pub async fn clear_all(&self) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("TRUNCATE TABLE tasks, users CASCADE")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, hashed_password) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&mut *tx)
        .await;

        let user = match inserted {
            Ok(user) => user,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(duplicate_email());
            }
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let mut tx = self.pool.begin().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_task(&self, owner_id: Uuid, task: NewTask) -> Result<Task, AppError> {
        let mut tx = self.pool.begin().await?;
        let created = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (title, description, status, owner_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(task.title)
        .bind(task.description)
        .bind(task.status)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn list_tasks(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Task>, AppError> {
        let mut tx = self.pool.begin().await?;
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks
             WHERE owner_id = $1
             ORDER BY created_at ASC, id ASC
             LIMIT $2 OFFSET $3",
            TASK_COLUMNS
        ))
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(tasks)
    }

    async fn get_task(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
        let mut tx = self.pool.begin().await?;
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(task)
    }

    async fn update_task(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let (set_description, description) = match changes.description {
            Some(description) => (true, description),
            None => (false, None),
        };

        // updated_at is maintained by the set_tasks_updated_at trigger.
        let mut tx = self.pool.begin().await?;
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET title = COALESCE($3, title),
                 description = CASE WHEN $4 THEN $5 ELSE description END,
                 status = COALESCE($6, status)
             WHERE id = $1 AND owner_id = $2
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .bind(changes.title)
        .bind(set_description)
        .bind(description)
        .bind(changes.status)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(task)
    }

    async fn delete_task(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
