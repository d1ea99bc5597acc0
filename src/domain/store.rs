use async_trait::async_trait;

use super::error::StoreError;
use super::todo::{Todo, TodoId};

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable set of todo records addressable by id.
///
/// Implementations own their concurrency discipline: `toggle_done` must flip the
/// flag without a caller-visible read/compare/write gap.
#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    async fn init(&self) -> StoreResult<()>;
    /// Every record, in storage order.
    async fn read_all(&self) -> StoreResult<Vec<Todo>>;
    async fn count(&self) -> StoreResult<usize>;
    /// Up to `limit` records starting at `offset`, newest `date` first.
    async fn list_newest_first(&self, offset: usize, limit: usize) -> StoreResult<Vec<Todo>>;
    async fn find(&self, id: TodoId) -> StoreResult<Option<Todo>>;
    async fn insert(&self, todo: &Todo) -> StoreResult<()>;
    async fn update_content(&self, id: TodoId, content: &str) -> StoreResult<Option<Todo>>;
    async fn toggle_done(&self, id: TodoId) -> StoreResult<Option<Todo>>;
    /// `false` when no record had this id.
    async fn delete(&self, id: TodoId) -> StoreResult<bool>;
    async fn clear(&self) -> StoreResult<()>;
}
