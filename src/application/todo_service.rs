use crate::domain::repository::TodoRepository;
use crate::domain::todo::{NewTodo, Todo, TodoId};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const MARKED_COMPLETE: &str = "All items marked complete successfully!";
pub const MARKED_INCOMPLETE: &str = "All items marked incomplete successfully!";
pub const REMOVED_ALL: &str = "All items removed successfully!";

/// Record half of a `{success, todo}` reply. A failed store echoes the unsaved input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SavedTodo {
    Persisted(Todo),
    Unsaved(NewTodo),
}

impl SavedTodo {
    pub fn persisted(&self) -> Option<&Todo> {
        match self {
            SavedTodo::Persisted(t) => Some(t),
            SavedTodo::Unsaved(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Saved {
    pub success: bool,
    pub todo: SavedTodo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkMessage {
    pub message: String,
}

impl BulkMessage {
    fn new(message: &str) -> Self { Self { message: message.to_string() } }
}

/// Operations behind `/api/v1`. `None` means the bound todo does not exist.
///
/// The `mark_all_*` and `remove_all_items` operations act on the single bound row only,
/// which is what the routes have always done despite their names.
#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Todo>>;
    async fn store(&self, input: NewTodo) -> Result<Saved>;
    async fn show(&self, id: TodoId) -> Result<Option<Todo>>;
    /// Accepted and ignored: the todo is looked up but never changed.
    async fn update(&self, id: TodoId) -> Result<Option<()>>;
    async fn destroy(&self, id: TodoId) -> Result<Option<Saved>>;
    async fn mark_all_complete(&self, id: TodoId) -> Result<Option<BulkMessage>>;
    async fn mark_all_incomplete(&self, id: TodoId) -> Result<Option<BulkMessage>>;
    async fn remove_all_items(&self, id: TodoId) -> Result<Option<BulkMessage>>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

#[async_trait]
impl<R: TodoRepository> TodoService for TodoServiceImpl<R> {
    async fn list(&self) -> Result<Vec<Todo>> { self.repo.list().await }

    async fn store(&self, mut input: NewTodo) -> Result<Saved> {
        // An empty description is stored as no description.
        input.text = input.text.filter(|text| !text.is_empty());
        match self.repo.create(input.clone()).await {
            Ok(todo) => {
                tracing::debug!(id = %todo.id, "todo stored");
                Ok(Saved { success: true, todo: SavedTodo::Persisted(todo) })
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to store todo");
                Ok(Saved { success: false, todo: SavedTodo::Unsaved(input) })
            }
        }
    }

    async fn show(&self, id: TodoId) -> Result<Option<Todo>> { self.repo.get(id).await }

    async fn update(&self, id: TodoId) -> Result<Option<()>> {
        Ok(self.repo.get(id).await?.map(|_| ()))
    }

    async fn destroy(&self, id: TodoId) -> Result<Option<Saved>> {
        let Some(todo) = self.repo.get(id).await? else { return Ok(None) };
        let success = self.repo.delete(id).await?;
        Ok(Some(Saved { success, todo: SavedTodo::Persisted(todo) }))
    }

    async fn mark_all_complete(&self, id: TodoId) -> Result<Option<BulkMessage>> {
        let updated = self.repo.set_completed(id, true).await?;
        Ok(updated.map(|_| BulkMessage::new(MARKED_COMPLETE)))
    }

    async fn mark_all_incomplete(&self, id: TodoId) -> Result<Option<BulkMessage>> {
        let updated = self.repo.set_completed(id, false).await?;
        Ok(updated.map(|_| BulkMessage::new(MARKED_INCOMPLETE)))
    }

    async fn remove_all_items(&self, id: TodoId) -> Result<Option<BulkMessage>> {
        if self.repo.get(id).await?.is_none() { return Ok(None) }
        self.repo.delete(id).await?;
        Ok(Some(BulkMessage::new(REMOVED_ALL)))
    }
}
