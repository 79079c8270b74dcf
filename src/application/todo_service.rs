use crate::domain::repository::{StoreResult, TodoFilter, TodoRepository};
use crate::domain::todo::{NewTodo, Priority, Todo, TodoDraft, TodoId};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoStats {
    pub total_completed: u64,
    pub total_incomplete: u64,
    pub low_priority: u64,
    pub medium_priority: u64,
    pub high_priority: u64,
}

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn create(&self, input: TodoDraft) -> StoreResult<Todo>;
    async fn get(&self, id: TodoId) -> StoreResult<Option<Todo>>;
    async fn list(&self) -> StoreResult<Vec<Todo>>;
    async fn update(&self, id: TodoId, input: TodoDraft) -> StoreResult<Option<Todo>>;
    async fn delete(&self, id: TodoId) -> StoreResult<bool>;
    async fn set_completed(&self, id: TodoId, completed: bool) -> StoreResult<Option<Todo>>;
    async fn list_by_status(&self, completed: bool) -> StoreResult<Vec<Todo>>;
    async fn list_by_priority(&self, priority: Priority) -> StoreResult<Vec<Todo>>;
    async fn list_by_priority_and_status(&self, priority: Priority, completed: bool) -> StoreResult<Vec<Todo>>;
    async fn search_by_title(&self, text: &str) -> StoreResult<Vec<Todo>>;
    async fn search_by_description(&self, text: &str) -> StoreResult<Vec<Todo>>;
    async fn list_high_priority_incomplete(&self) -> StoreResult<Vec<Todo>>;
    async fn list_created_within_days(&self, days: u32) -> StoreResult<Vec<Todo>>;
    async fn count_by_status(&self, completed: bool) -> StoreResult<u64>;
    async fn count_by_priority(&self, priority: Priority) -> StoreResult<u64>;
    async fn stats(&self) -> StoreResult<TodoStats>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }

    async fn save(&self, todo: Todo) -> StoreResult<Option<Todo>> {
        // The document may have been deleted since it was read.
        Ok(self.repo.update(&todo).await?.then_some(todo))
    }
}

#[async_trait]
impl<R: TodoRepository> TodoService for TodoServiceImpl<R> {
    async fn create(&self, input: TodoDraft) -> StoreResult<Todo> {
        let todo = self.repo.insert(NewTodo::from_draft(input, Utc::now())).await?;
        tracing::info!(id = %todo.id, "todo created");
        Ok(todo)
    }

    async fn get(&self, id: TodoId) -> StoreResult<Option<Todo>> { self.repo.find_by_id(&id).await }

    async fn list(&self) -> StoreResult<Vec<Todo>> { self.repo.find_all().await }

    async fn update(&self, id: TodoId, input: TodoDraft) -> StoreResult<Option<Todo>> {
        let Some(mut todo) = self.repo.find_by_id(&id).await? else { return Ok(None) };
        todo.title = input.title;
        todo.description = input.description;
        todo.priority = input.priority;
        todo.touch(Utc::now());
        let saved = self.save(todo).await?;
        if saved.is_some() { tracing::info!(%id, "todo updated"); }
        Ok(saved)
    }

    async fn delete(&self, id: TodoId) -> StoreResult<bool> {
        let deleted = self.repo.delete(&id).await?;
        if deleted { tracing::info!(%id, "todo deleted"); }
        Ok(deleted)
    }

    async fn set_completed(&self, id: TodoId, completed: bool) -> StoreResult<Option<Todo>> {
        let Some(mut todo) = self.repo.find_by_id(&id).await? else { return Ok(None) };
        todo.completed = completed;
        todo.touch(Utc::now());
        let saved = self.save(todo).await?;
        if saved.is_some() { tracing::info!(%id, completed, "todo completion changed"); }
        Ok(saved)
    }

    async fn list_by_status(&self, completed: bool) -> StoreResult<Vec<Todo>> {
        self.repo.find_by(&TodoFilter::Completed(completed)).await
    }

    async fn list_by_priority(&self, priority: Priority) -> StoreResult<Vec<Todo>> {
        self.repo.find_by(&TodoFilter::Priority(priority)).await
    }

    async fn list_by_priority_and_status(&self, priority: Priority, completed: bool) -> StoreResult<Vec<Todo>> {
        self.repo.find_by(&TodoFilter::PriorityAndCompleted(priority, completed)).await
    }

    async fn search_by_title(&self, text: &str) -> StoreResult<Vec<Todo>> {
        tracing::debug!(text, "title search");
        self.repo.find_by(&TodoFilter::TitleContains(text.to_owned())).await
    }

    async fn search_by_description(&self, text: &str) -> StoreResult<Vec<Todo>> {
        tracing::debug!(text, "description search");
        self.repo.find_by(&TodoFilter::DescriptionContains(text.to_owned())).await
    }

    async fn list_high_priority_incomplete(&self) -> StoreResult<Vec<Todo>> {
        self.list_by_priority_and_status(Priority::High, false).await
    }

    async fn list_created_within_days(&self, days: u32) -> StoreResult<Vec<Todo>> {
        let since = Utc::now() - Duration::days(i64::from(days));
        self.repo.find_by(&TodoFilter::CreatedSince(since)).await
    }

    async fn count_by_status(&self, completed: bool) -> StoreResult<u64> {
        self.repo.count(&TodoFilter::Completed(completed)).await
    }

    async fn count_by_priority(&self, priority: Priority) -> StoreResult<u64> {
        self.repo.count(&TodoFilter::Priority(priority)).await
    }

    async fn stats(&self) -> StoreResult<TodoStats> {
        Ok(TodoStats {
            total_completed: self.count_by_status(true).await?,
            total_incomplete: self.count_by_status(false).await?,
            low_priority: self.count_by_priority(Priority::Low).await?,
            medium_priority: self.count_by_priority(Priority::Medium).await?,
            high_priority: self.count_by_priority(Priority::High).await?,
        })
    }
}
