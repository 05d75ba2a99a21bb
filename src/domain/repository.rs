use async_trait::async_trait;
use super::todo::{NewTodo, Todo, TodoId};

#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    async fn create(&self, input: NewTodo) -> anyhow::Result<Todo>;
    async fn get(&self, id: TodoId) -> anyhow::Result<Option<Todo>>;
    /// All rows in insertion order.
    async fn list(&self) -> anyhow::Result<Vec<Todo>>;
    async fn set_completed(&self, id: TodoId, completed: bool) -> anyhow::Result<Option<Todo>>;
    async fn delete(&self, id: TodoId) -> anyhow::Result<bool>;
}
