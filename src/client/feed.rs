//! Client-side view state for the todo list: accumulated pages, a local
//! search filter and optimistic bookkeeping for toggles.

use validator::Validate;

use super::api::TodoApi;
use super::error::ClientError;
use crate::domain::page::DEFAULT_CLIENT_LIMIT;
use crate::domain::todo::{Todo, TodoId};

#[derive(Debug, Validate)]
struct NewTodo {
    #[validate(length(min = 3, message = "You need a content to create a TODO"))]
    content: String,
}

/// Case-insensitive substring match on `content`. Runs over whatever has been
/// fetched so far; the server never sees the search text.
pub fn filter_todos_by_content<'a>(todos: &'a [Todo], search: &str) -> Vec<&'a Todo> {
    let search = search.to_lowercase();
    todos.iter().filter(|todo| todo.content.to_lowercase().contains(&search)).collect()
}

pub struct TodoFeed {
    api: TodoApi,
    limit: u32,
    page: u32,
    total_pages: usize,
    todos: Vec<Todo>,
    search: String,
    loaded: bool,
}

impl TodoFeed {
    pub fn new(api: TodoApi) -> Self { Self::with_limit(api, DEFAULT_CLIENT_LIMIT) }

    pub fn with_limit(api: TodoApi, limit: u32) -> Self {
        Self { api, limit: limit.max(1), page: 1, total_pages: 0, todos: Vec::new(), search: String::new(), loaded: false }
    }

    pub fn page(&self) -> u32 { self.page }
    pub fn total_pages(&self) -> usize { self.total_pages }
    pub fn todos(&self) -> &[Todo] { &self.todos }
    pub fn search(&self) -> &str { &self.search }
    pub fn is_loaded(&self) -> bool { self.loaded }

    pub fn set_search(&mut self, search: impl Into<String>) { self.search = search.into(); }

    /// The fetched records that match the current search.
    pub fn visible(&self) -> Vec<&Todo> { filter_todos_by_content(&self.todos, &self.search) }

    pub fn has_more_pages(&self) -> bool { self.total_pages > self.page as usize }

    /// Nothing to show once the first load has finished.
    pub fn has_no_todos(&self) -> bool { self.loaded && self.visible().is_empty() }

    /// Replace the view with the first page.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let result = self.api.get(1, self.limit).await;
        self.loaded = true;
        let page = result?;
        self.page = 1;
        self.total_pages = page.pages;
        self.todos = page.todos;
        Ok(())
    }

    /// Append the next page. Records already on screen (shifted down by
    /// creations since the last fetch) are not repeated.
    pub async fn load_more(&mut self) -> Result<(), ClientError> {
        let next = self.page + 1;
        let page = self.api.get(next, self.limit).await?;
        self.page = next;
        self.total_pages = page.pages;
        for todo in page.todos {
            if !self.todos.iter().any(|t| t.id == todo.id) {
                self.todos.push(todo);
            }
        }
        Ok(())
    }

    /// Create on the server, then show the new record first.
    pub async fn create(&mut self, content: &str) -> Result<&Todo, ClientError> {
        let draft = NewTodo { content: content.to_string() };
        if let Err(errors) = draft.validate() {
            tracing::debug!(%errors, "rejected new todo");
            return Err(ClientError::Validation("You need a content to create a TODO".into()));
        }
        let todo = self.api.create_by_content(content).await?;
        self.todos.insert(0, todo);
        Ok(&self.todos[0])
    }

    /// Replace the content of a record on screen once the server accepts it.
    pub async fn update_content(&mut self, id: TodoId, content: &str) -> Result<(), ClientError> {
        let draft = NewTodo { content: content.to_string() };
        if draft.validate().is_err() {
            return Err(ClientError::Validation("You need a content to update a TODO".into()));
        }
        let updated = self.api.update_content(id, content).await?;
        if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
            *todo = updated;
        }
        Ok(())
    }

    /// Flip the record on screen immediately, then ask the server.
    ///
    /// A failed request leaves the flipped state on screen: there is no
    /// rollback here, unlike [`TodoFeed::delete`] which only touches the view
    /// after the server confirms.
    pub async fn toggle_done(&mut self, id: TodoId) -> Result<(), ClientError> {
        if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
            todo.done = !todo.done;
        }
        let confirmed = self.api.toggle_done(id).await?;
        if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
            todo.done = confirmed.done;
        }
        Ok(())
    }

    pub async fn delete(&mut self, id: TodoId) -> Result<(), ClientError> {
        match self.api.delete_by_id(id).await {
            Ok(()) => {
                self.todos.retain(|t| t.id != id);
                Ok(())
            }
            Err(err) => {
                tracing::error!(%id, error = %err, "Failed to delete");
                Err(err)
            }
        }
    }
}
