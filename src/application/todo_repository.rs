use async_trait::async_trait;

use crate::domain::error::TodoError;
use crate::domain::page::{PageRequest, TodoPage};
use crate::domain::store::TodoStore;
use crate::domain::todo::{Todo, TodoId};

pub type TodoResult<T> = Result<T, TodoError>;

/// Pagination and mutation semantics over a [`TodoStore`].
///
/// Inputs are assumed valid: content checks and id parsing happen at the HTTP
/// boundary before any of these are called.
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    /// Newest-first page. Pages past the end come back empty, never as an error.
    async fn get(&self, request: PageRequest) -> TodoResult<TodoPage>;
    async fn create_by_content(&self, content: String) -> TodoResult<Todo>;
    async fn update_content(&self, id: TodoId, content: String) -> TodoResult<Todo>;
    async fn toggle_done(&self, id: TodoId) -> TodoResult<Todo>;
    async fn delete_by_id(&self, id: TodoId) -> TodoResult<()>;
}

#[derive(Clone)]
pub struct TodoRepositoryImpl<S: TodoStore> {
    store: S,
}

impl<S: TodoStore> TodoRepositoryImpl<S> {
    pub fn new(store: S) -> Self { Self { store } }
}

#[async_trait]
impl<S: TodoStore> TodoRepository for TodoRepositoryImpl<S> {
    async fn get(&self, request: PageRequest) -> TodoResult<TodoPage> {
        let total = self.store.count().await?;
        let pages = request.pages_for(total);
        let todos = if request.offset() >= total {
            Vec::new()
        } else {
            self.store.list_newest_first(request.offset(), request.limit() as usize).await?
        };
        tracing::debug!(page = request.page(), limit = request.limit(), total, pages, "listed todos");
        Ok(TodoPage { total, pages, todos })
    }

    async fn create_by_content(&self, content: String) -> TodoResult<Todo> {
        let todo = Todo::new(content);
        self.store.insert(&todo).await?;
        tracing::info!(id = %todo.id, "created todo");
        Ok(todo)
    }

    async fn update_content(&self, id: TodoId, content: String) -> TodoResult<Todo> {
        self.store.update_content(id, &content).await?.ok_or(TodoError::NotFound(id))
    }

    async fn toggle_done(&self, id: TodoId) -> TodoResult<Todo> {
        let todo = self.store.toggle_done(id).await?.ok_or(TodoError::NotFound(id))?;
        tracing::info!(%id, done = todo.done, "toggled todo");
        Ok(todo)
    }

    async fn delete_by_id(&self, id: TodoId) -> TodoResult<()> {
        if !self.store.delete(id).await? {
            return Err(TodoError::NotFound(id));
        }
        tracing::info!(%id, "deleted todo");
        Ok(())
    }
}
