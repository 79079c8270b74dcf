use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, QueryBuilder, Row, Sqlite,
};
use uuid::Uuid;

use crate::domain::{
    repository::{fold, StoreError, StoreResult, TodoFilter, TodoRepository},
    todo::{NewTodo, Priority, Todo, TodoId},
};

const SELECT_TODO: &str = "SELECT id, title, description, priority, completed, created_at, updated_at FROM todos";
const ORDER_BY: &str = " ORDER BY created_at ASC, id ASC";

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self { StoreError::Unavailable(e.to_string()) }
}

/// Todo collection kept in SQLite, one row per document.
#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTodoRepository {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        Self::connect_with(database_url, 5).await
    }

    pub async fn connect_with(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = if is_in_memory(database_url) {
            // Every connection to :memory: opens its own database, so pin to one that never expires.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_with(options)
                .await?
        };
        tracing::debug!(database_url, "connected to sqlite");
        Ok(Self { pool: Arc::new(pool) })
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn init(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                title_key TEXT NOT NULL,
                description TEXT,
                description_key TEXT,
                priority INTEGER NOT NULL CHECK (priority BETWEEN 1 AND 3),
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        for index in [
            "CREATE INDEX IF NOT EXISTS idx_todos_completed ON todos (completed)",
            "CREATE INDEX IF NOT EXISTS idx_todos_priority ON todos (priority, completed)",
            "CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos (created_at)",
        ] {
            sqlx::query(index).execute(&*self.pool).await?;
        }
        Ok(())
    }

    async fn insert(&self, input: NewTodo) -> StoreResult<Todo> {
        let todo = input.with_id(TodoId(Uuid::new_v4()));
        sqlx::query(
            "INSERT INTO todos (id, title, title_key, description, description_key, priority, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(todo.id.0.to_string())
        .bind(&todo.title)
        .bind(fold(&todo.title))
        .bind(&todo.description)
        .bind(todo.description.as_deref().map(fold))
        .bind(i64::from(todo.priority.level()))
        .bind(todo.completed)
        .bind(timestamp(&todo.created_at))
        .bind(timestamp(&todo.updated_at))
        .execute(&*self.pool)
        .await?;
        Ok(todo)
    }

    async fn find_by_id(&self, id: &TodoId) -> StoreResult<Option<Todo>> {
        let row = sqlx::query(&format!("{SELECT_TODO} WHERE id = ?1"))
            .bind(id.0.to_string())
            .fetch_optional(&*self.pool)
            .await?;
        row.map(row_to_todo).transpose()
    }

    async fn find_all(&self) -> StoreResult<Vec<Todo>> {
        let rows = sqlx::query(&format!("{SELECT_TODO}{ORDER_BY}"))
            .fetch_all(&*self.pool)
            .await?;
        rows.into_iter().map(row_to_todo).collect()
    }

    async fn find_by(&self, filter: &TodoFilter) -> StoreResult<Vec<Todo>> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_TODO);
        push_filter(&mut query, filter);
        query.push(ORDER_BY);
        let rows = query.build().fetch_all(&*self.pool).await?;
        rows.into_iter().map(row_to_todo).collect()
    }

    async fn update(&self, todo: &Todo) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE todos SET title = ?2, title_key = ?3, description = ?4, description_key = ?5,
                priority = ?6, completed = ?7, updated_at = ?8
             WHERE id = ?1",
        )
        .bind(todo.id.0.to_string())
        .bind(&todo.title)
        .bind(fold(&todo.title))
        .bind(&todo.description)
        .bind(todo.description.as_deref().map(fold))
        .bind(i64::from(todo.priority.level()))
        .bind(todo.completed)
        .bind(timestamp(&todo.updated_at))
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &TodoId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id.0.to_string())
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, filter: &TodoFilter) -> StoreResult<u64> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM todos");
        push_filter(&mut query, filter);
        let count = query.build_query_scalar::<i64>().fetch_one(&*self.pool).await?;
        Ok(count.max(0) as u64)
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &TodoFilter) {
    match filter {
        TodoFilter::Completed(completed) => {
            query.push(" WHERE completed = ").push_bind(*completed);
        }
        TodoFilter::Priority(priority) => {
            query.push(" WHERE priority = ").push_bind(i64::from(priority.level()));
        }
        TodoFilter::TitleContains(text) => {
            query.push(" WHERE instr(title_key, ").push_bind(fold(text)).push(") > 0");
        }
        TodoFilter::DescriptionContains(text) => {
            query.push(" WHERE instr(description_key, ").push_bind(fold(text)).push(") > 0");
        }
        TodoFilter::PriorityAndCompleted(priority, completed) => {
            query
                .push(" WHERE priority = ")
                .push_bind(i64::from(priority.level()))
                .push(" AND completed = ")
                .push_bind(*completed);
        }
        TodoFilter::CreatedSince(since) => {
            query.push(" WHERE created_at >= ").push_bind(timestamp(since));
        }
    }
}

/// Fixed-width UTC form, so text order matches time order.
fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn row_to_todo(row: SqliteRow) -> StoreResult<Todo> {
    let id_str: String = row.try_get("id")?;
    let corrupt = |reason: String| StoreError::Corrupt { id: id_str.clone(), reason };

    let id = Uuid::parse_str(&id_str).map_err(|e| corrupt(e.to_string()))?;
    let priority: i64 = row.try_get("priority")?;
    let priority = Priority::try_from(priority).map_err(|e| corrupt(e.to_string()))?;
    let created_at_str: String = row.try_get("created_at")?;
    let updated_at_str: String = row.try_get("updated_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str).map_err(|e| corrupt(e.to_string()))?.with_timezone(&Utc);
    let updated_at = DateTime::parse_from_rfc3339(&updated_at_str).map_err(|e| corrupt(e.to_string()))?.with_timezone(&Utc);

    Ok(Todo {
        id: TodoId(id),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        priority,
        completed: row.try_get("completed")?,
        created_at,
        updated_at,
    })
}
