use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::{SqlitePoolOptions, SqliteRow}, Pool, Row, Sqlite};
use uuid::Uuid;

use crate::domain::{
    error::StoreError,
    store::{StoreResult, TodoStore},
    todo::{format_date, Todo, TodoId},
};

const COLUMNS: &str = "id, content, date, done";

/// Table-backed store. Single-row statements are atomic, including the toggle.
#[derive(Clone)]
pub struct SqliteTodoStore {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTodoStore {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let mut options = SqlitePoolOptions::new().max_connections(5);
        // Every connection to `:memory:` opens its own empty database.
        if database_url.contains(":memory:") {
            options = options.max_connections(1).idle_timeout(None).max_lifetime(None);
        }
        let pool = options.connect(database_url).await.map_err(backend)?;
        tracing::debug!(database_url, "connected to todo table");
        Ok(Self { pool: Arc::new(pool) })
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn init(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                date TEXT NOT NULL,
                done INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&*self.pool)
        .await
        .map_err(backend)?;
        sqlx::query("CREATE INDEX IF NOT EXISTS todos_date_idx ON todos (date DESC)")
            .execute(&*self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn read_all(&self) -> StoreResult<Vec<Todo>> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM todos ORDER BY rowid"))
            .fetch_all(&*self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(row_to_todo).collect()
    }

    async fn count(&self) -> StoreResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos")
            .fetch_one(&*self.pool)
            .await
            .map_err(backend)?;
        usize::try_from(count).map_err(|_| StoreError::Malformed(format!("negative row count {count}")))
    }

    async fn list_newest_first(&self, offset: usize, limit: usize) -> StoreResult<Vec<Todo>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM todos ORDER BY date DESC, rowid DESC LIMIT ?1 OFFSET ?2"
        ))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&*self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(row_to_todo).collect()
    }

    async fn find(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM todos WHERE id = ?1"))
            .bind(id.to_string())
            .fetch_optional(&*self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(row_to_todo).transpose()
    }

    async fn insert(&self, todo: &Todo) -> StoreResult<()> {
        sqlx::query("INSERT INTO todos (id, content, date, done) VALUES (?1, ?2, ?3, ?4)")
            .bind(todo.id.to_string())
            .bind(&todo.content)
            .bind(format_date(&todo.date))
            .bind(todo.done)
            .execute(&*self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn update_content(&self, id: TodoId, content: &str) -> StoreResult<Option<Todo>> {
        let row = sqlx::query(&format!("UPDATE todos SET content = ?2 WHERE id = ?1 RETURNING {COLUMNS}"))
            .bind(id.to_string())
            .bind(content)
            .fetch_optional(&*self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(row_to_todo).transpose()
    }

    async fn toggle_done(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let row = sqlx::query(&format!("UPDATE todos SET done = NOT done WHERE id = ?1 RETURNING {COLUMNS}"))
            .bind(id.to_string())
            .fetch_optional(&*self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(row_to_todo).transpose()
    }

    async fn delete(&self, id: TodoId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id.to_string())
            .execute(&*self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM todos").execute(&*self.pool).await.map_err(backend)?;
        Ok(())
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    let retryable = matches!(
        err,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed
    );
    StoreError::Backend { source: Box::new(err), retryable }
}

fn row_to_todo(row: &SqliteRow) -> StoreResult<Todo> {
    let malformed = |e: sqlx::Error| StoreError::Malformed(e.to_string());
    let id_str: String = row.try_get("id").map_err(malformed)?;
    let content: String = row.try_get("content").map_err(malformed)?;
    let date_str: String = row.try_get("date").map_err(malformed)?;
    let done: bool = row.try_get("done").map_err(malformed)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| StoreError::Malformed(format!("id `{id_str}`: {e}")))?;
    let date = DateTime::parse_from_rfc3339(&date_str)
        .map_err(|e| StoreError::Malformed(format!("date `{date_str}`: {e}")))?
        .with_timezone(&Utc);

    Ok(Todo { id: TodoId(id), content, date, done })
}
