use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use tokio::{fs, sync::Mutex};

use crate::domain::{
    error::StoreError,
    store::{StoreResult, TodoStore},
    todo::{Todo, TodoId},
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct TodoDocument {
    #[serde(default, deserialize_with = "null_as_empty")]
    todos: Vec<Todo>,
}

/// A `null` collection reads the same as an absent one.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Todo>, D::Error> {
    Ok(Option::<Vec<Todo>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Single JSON document holding every record. Each mutation rewrites the whole
/// file, serialised by an in-process lock. Not safe for concurrent writers in
/// other processes.
#[derive(Clone)]
pub struct FileTodoStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileTodoStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Arc::new(Mutex::new(())) }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Overwrite the stored set with `todos`, in the given order.
    pub async fn replace_all(&self, todos: Vec<Todo>) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        self.save(&TodoDocument { todos }).await
    }

    async fn load(&self) -> StoreResult<TodoDocument> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(TodoDocument::default()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(TodoDocument::default());
        }
        serde_json::from_str(&text)
            .map_err(|e| StoreError::Malformed(format!("{}: {e}", self.path.display())))
    }

    async fn save(&self, doc: &TodoDocument) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() { fs::create_dir_all(parent).await?; }
        }
        let rendered = serde_json::to_string_pretty(doc)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, rendered).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Load, apply `f` to the record with `id`, save. `None` when absent.
    async fn modify(&self, id: TodoId, f: impl FnOnce(&mut Todo)) -> StoreResult<Option<Todo>> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        let Some(todo) = doc.todos.iter_mut().find(|t| t.id == id) else { return Ok(None) };
        f(todo);
        let updated = todo.clone();
        self.save(&doc).await?;
        Ok(Some(updated))
    }
}

#[async_trait]
impl TodoStore for FileTodoStore {
    async fn init(&self) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        // Surfaces an unreadable or unwritable medium at startup.
        let doc = self.load().await?;
        self.save(&doc).await?;
        tracing::debug!(path = %self.path.display(), records = doc.todos.len(), "opened todo file");
        Ok(())
    }

    async fn read_all(&self) -> StoreResult<Vec<Todo>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.todos)
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.read_all().await?.len())
    }

    async fn list_newest_first(&self, offset: usize, limit: usize) -> StoreResult<Vec<Todo>> {
        let mut todos = self.read_all().await?;
        // Reverse first so the stable sort keeps later insertions ahead on equal dates.
        todos.reverse();
        todos.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(todos.into_iter().skip(offset).take(limit).collect())
    }

    async fn find(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        Ok(self.read_all().await?.into_iter().find(|t| t.id == id))
    }

    async fn insert(&self, todo: &Todo) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        doc.todos.push(todo.clone());
        self.save(&doc).await
    }

    async fn update_content(&self, id: TodoId, content: &str) -> StoreResult<Option<Todo>> {
        self.modify(id, |todo| todo.content = content.to_string()).await
    }

    async fn toggle_done(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        self.modify(id, |todo| todo.done = !todo.done).await
    }

    async fn delete(&self, id: TodoId) -> StoreResult<bool> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        let before = doc.todos.len();
        doc.todos.retain(|t| t.id != id);
        if doc.todos.len() == before {
            return Ok(false);
        }
        self.save(&doc).await?;
        Ok(true)
    }

    async fn clear(&self) -> StoreResult<()> {
        self.replace_all(Vec::new()).await
    }
}
