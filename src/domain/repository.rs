use async_trait::async_trait;
use chrono::{DateTime, Utc};
use super::todo::{NewTodo, Priority, Todo, TodoId};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt document {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Field predicate a repository resolves into a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoFilter {
    Completed(bool),
    Priority(Priority),
    /// Case-insensitive substring of the title.
    TitleContains(String),
    /// Case-insensitive substring of the description.
    DescriptionContains(String),
    PriorityAndCompleted(Priority, bool),
    /// `created_at` at or after the bound.
    CreatedSince(DateTime<Utc>),
}

impl TodoFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            TodoFilter::Completed(c) => todo.completed == *c,
            TodoFilter::Priority(p) => todo.priority == *p,
            TodoFilter::TitleContains(text) => fold(&todo.title).contains(&fold(text)),
            TodoFilter::DescriptionContains(text) => todo.description.as_deref().is_some_and(|d| fold(d).contains(&fold(text))),
            TodoFilter::PriorityAndCompleted(p, c) => todo.priority == *p && todo.completed == *c,
            TodoFilter::CreatedSince(bound) => todo.created_at >= *bound,
        }
    }
}

/// Case folding used for substring predicates.
pub fn fold(text: &str) -> String { text.to_lowercase() }

#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn init(&self) -> StoreResult<()>;
    async fn insert(&self, input: NewTodo) -> StoreResult<Todo>;
    async fn find_by_id(&self, id: &TodoId) -> StoreResult<Option<Todo>>;
    async fn find_all(&self) -> StoreResult<Vec<Todo>>;
    async fn find_by(&self, filter: &TodoFilter) -> StoreResult<Vec<Todo>>;
    /// Overwrites the stored document; `false` when the id no longer exists.
    async fn update(&self, todo: &Todo) -> StoreResult<bool>;
    async fn delete(&self, id: &TodoId) -> StoreResult<bool>;
    async fn count(&self, filter: &TodoFilter) -> StoreResult<u64>;
}
