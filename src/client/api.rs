use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::{
    application::todo_service::Saved,
    domain::todo::{NewTodo, Todo},
    http::types::Data,
};

/// The two service calls the client makes.
#[async_trait]
pub trait TodoApi: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Todo>>;
    async fn create(&self, input: NewTodo) -> Result<Saved>;
}

#[derive(Clone)]
pub struct HttpTodoApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTodoApi {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:8000/api/v1`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    fn todos_url(&self) -> String { format!("{}/todos", self.base_url) }
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list(&self) -> Result<Vec<Todo>> {
        let url = self.todos_url();
        let body: Data<Vec<Todo>> = self.http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.data)
    }

    async fn create(&self, input: NewTodo) -> Result<Saved> {
        let url = self.todos_url();
        let saved = self.http
            .post(&url)
            .json(&input)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?
            .error_for_status()?
            .json()
            .await?;
        Ok(saved)
    }
}
