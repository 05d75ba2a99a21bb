use std::{net::SocketAddr, time::Duration};

use todo_crud::{
    application::todo_service::TodoServiceImpl,
    client::{api::{HttpTodoApi, TodoApi}, ClientError, TodoClient},
    domain::repository::TodoRepository,
    http::routing::{self, todos},
    infrastructure::sqlite_repo::SqliteTodoRepository,
};

async fn serve() -> SocketAddr {
    let repo = SqliteTodoRepository::connect("sqlite::memory:").await.unwrap();
    repo.init().await.unwrap();
    let router = routing::app(todos::router(todos::AppState { service: TodoServiceImpl::new(repo) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    addr
}

fn api(addr: SocketAddr) -> HttpTodoApi { HttpTodoApi::new(format!("http://{addr}/api/v1/")) }

#[tokio::test]
async fn local_completion_diverges_from_the_server() {
    let addr = serve().await;
    let mut client = TodoClient::new(api(addr));
    assert!(client.load().await);
    assert!(client.board().is_empty());

    client.board_mut().draft_mut().title = "Buy milk".into();
    client.board_mut().draft_mut().text = "2%".into();
    let id = client.submit().await.unwrap().unwrap();

    let server_view = api(addr).list().await.unwrap();
    assert_eq!(server_view.len(), 1);
    assert_eq!(server_view[0].id, id);
    assert_eq!(server_view[0].title, "Buy milk");
    assert_eq!(server_view[0].text.as_deref(), Some("2%"));
    assert!(!server_view[0].completed);

    client.board_mut().toggle_complete(id).unwrap();
    assert!(client.board().get(id).unwrap().completed);

    let mut fresh = TodoClient::new(api(addr));
    assert!(fresh.load().await);
    assert!(!fresh.board().get(id).unwrap().completed);
}

#[tokio::test]
async fn blank_titles_never_leave_the_client() {
    let addr = serve().await;
    let mut client = TodoClient::new(api(addr));
    client.load().await;
    client.board_mut().draft_mut().title = "   ".into();
    assert_eq!(client.submit().await, Err(ClientError::EmptyTitle));
    assert!(api(addr).list().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_service_is_logged_not_raised() {
    // Bind and drop to get a port nothing listens on.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let mut client = TodoClient::new(api(addr));
    assert!(!client.load().await);
    assert!(!client.board().is_loading());

    client.board_mut().draft_mut().title = "offline".into();
    assert_eq!(client.submit().await, Ok(None));
    assert!(client.board().draft().title.is_empty());
    assert!(client.board().is_empty());
}

#[tokio::test]
async fn board_keeps_working_while_create_is_unanswered() {
    // Accepts connections and never answers them.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let mut client = TodoClient::new(api(addr));
    client.finish_load(Ok(vec![]));
    client.board_mut().draft_mut().title = "stuck".into();
    let pending = client.start_submit().unwrap();

    let http = client.api().clone();
    let payload = pending.payload().clone();
    let mut request = tokio::spawn(async move { http.create(payload).await });
    assert!(tokio::time::timeout(Duration::from_millis(300), &mut request).await.is_err());

    assert!(client.board().is_submitting());
    assert!(client.board().draft().title.is_empty());
    client.board_mut().draft_mut().title = "typed meanwhile".into();
    client.board_mut().mark_all_complete().unwrap();
    assert_eq!(client.start_submit().unwrap_err(), ClientError::SubmitInFlight);

    request.abort();
    assert_eq!(client.finish_submit(pending, Err(anyhow::anyhow!("gave up"))), None);
    assert!(!client.board().is_submitting());
    assert_eq!(client.board().draft().title, "typed meanwhile");
}
