pub mod api;
pub mod board;

use thiserror::Error;

use crate::{
    application::todo_service::Saved,
    domain::todo::{NewTodo, Todo, TodoId},
};

use self::{api::TodoApi, board::TodoBoard};

/// Rejected client transitions. Network failures are logged, not returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("a todo is being edited")]
    EditInProgress,
    #[error("a removal is waiting for confirmation")]
    ConfirmPending,
    #[error("no todo is being edited")]
    NotEditing,
    #[error("nothing to confirm")]
    NothingToConfirm,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("a new todo is still being sent")]
    SubmitInFlight,
    #[error("no todo with id {0}")]
    UnknownTodo(TodoId),
}

/// A create request that has left the board and is waiting for the service's reply.
#[derive(Debug, Clone)]
pub struct PendingSubmit {
    title: String,
    payload: NewTodo,
}

impl PendingSubmit {
    pub fn payload(&self) -> &NewTodo { &self.payload }
}

/// A [`TodoBoard`] wired to the service for its two round trips: the initial load and create.
///
/// Each round trip is split into a `start_*` step and a `finish_*` step so a caller can run
/// the request elsewhere and keep using the board until the reply arrives. [`TodoClient::load`]
/// and [`TodoClient::submit`] chain the two steps around an inline await.
pub struct TodoClient<A: TodoApi> {
    api: A,
    board: TodoBoard,
}

impl<A: TodoApi> TodoClient<A> {
    pub fn new(api: A) -> Self { Self { api, board: TodoBoard::new() } }

    pub fn api(&self) -> &A { &self.api }

    pub fn board(&self) -> &TodoBoard { &self.board }

    pub fn board_mut(&mut self) -> &mut TodoBoard { &mut self.board }

    pub fn start_load(&mut self) { self.board.set_loading(true); }

    /// Applies a listing. The loading flag is cleared whether or not the fetch worked.
    pub fn finish_load(&mut self, result: anyhow::Result<Vec<Todo>>) -> bool {
        let loaded = match result {
            Ok(todos) => {
                tracing::info!(count = todos.len(), "todos loaded");
                self.board.replace_all(todos);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load todos");
                false
            }
        };
        self.board.set_loading(false);
        loaded
    }

    /// Takes the draft for sending. A blank title, an open session or a create already in
    /// flight is rejected before any request. The form is cleared as the request leaves,
    /// so it ends up empty however the request turns out.
    pub fn start_submit(&mut self) -> Result<PendingSubmit, ClientError> {
        let payload = self.board.begin_submit()?;
        self.board.clear_draft();
        self.board.set_submitting(true);
        Ok(PendingSubmit { title: payload.title.clone(), payload })
    }

    /// Applies the create reply: the local title plus the server's id, text, flag and timestamps.
    pub fn finish_submit(&mut self, pending: PendingSubmit, result: anyhow::Result<Saved>) -> Option<TodoId> {
        self.board.set_submitting(false);
        let saved = match result {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(error = %e, "failed to create todo");
                return None;
            }
        };
        match saved.todo.persisted() {
            Some(server) if saved.success => {
                let todo = Todo { title: pending.title, ..server.clone() };
                let id = todo.id;
                tracing::debug!(%id, "todo created");
                self.board.append_created(todo);
                Some(id)
            }
            _ => {
                tracing::warn!("service did not store the todo");
                None
            }
        }
    }

    /// Fetches every todo once.
    pub async fn load(&mut self) -> bool {
        self.start_load();
        let result = self.api.list().await;
        self.finish_load(result)
    }

    /// Sends the draft as a new todo and waits for the reply.
    pub async fn submit(&mut self) -> Result<Option<TodoId>, ClientError> {
        let pending = self.start_submit()?;
        let result = self.api.create(pending.payload().clone()).await;
        Ok(self.finish_submit(pending, result))
    }
}
