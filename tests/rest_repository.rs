//! Drives `RestTaskRepository` against an in-process HTTP server.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use taskpad::adapters::api::{RestTaskRepository, TaskApiClient};
use taskpad::domain::{parse_date, TaskDraft, TaskId};
use taskpad::ports::{ApiRoutes, RepositoryError, TaskRepository};

#[derive(Clone, Default)]
struct TaskServer {
    tasks: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<AtomicI64>,
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
}

impl TaskServer {
    fn record_auth(&self, headers: &HeaderMap) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.auth_headers.lock().unwrap().push(auth);
    }

    fn router(self) -> Router {
        Router::new()
            .route("/api/tasks", get(list).post(create).delete(delete_all))
            .route("/api/tasks/search", get(search))
            .route("/api/tasks/{id}", axum::routing::put(update).delete(delete_one))
            .with_state(self)
    }
}

async fn list(State(server): State<TaskServer>, headers: HeaderMap) -> Json<Value> {
    server.record_auth(&headers);
    let tasks = server.tasks.lock().unwrap().clone();
    Json(json!({ "success": true, "message": "Tasks retrieved", "data": tasks }))
}

async fn create(
    State(server): State<TaskServer>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    server.record_auth(&headers);
    let id = server.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    body["id"] = json!(id);
    body["completed"] = json!(false);
    server.tasks.lock().unwrap().push(body.clone());
    // Bare payload, no envelope
    (StatusCode::CREATED, Json(body))
}

async fn update(
    State(server): State<TaskServer>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut tasks = server.tasks.lock().unwrap();
    let task = tasks
        .iter_mut()
        .find(|t| t["id"] == json!(id))
        .ok_or(StatusCode::NOT_FOUND)?;
    task["title"] = body["title"].clone();
    task["description"] = body.get("description").cloned().unwrap_or(Value::Null);
    task["dueDate"] = body["dueDate"].clone();
    Ok(Json(json!({ "success": true, "data": task.clone() })))
}

async fn delete_one(State(server): State<TaskServer>, Path(id): Path<i64>) -> StatusCode {
    let mut tasks = server.tasks.lock().unwrap();
    let before = tasks.len();
    tasks.retain(|t| t["id"] != json!(id));
    if tasks.len() < before {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn delete_all(State(server): State<TaskServer>) -> Json<Value> {
    server.tasks.lock().unwrap().clear();
    Json(json!({ "success": true, "message": "All tasks deleted", "data": null }))
}

/// Answers with `due_date` keys and no envelope, like older deployments.
async fn search(
    State(server): State<TaskServer>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let tasks = server.tasks.lock().unwrap();
    let matches: Vec<Value> = tasks
        .iter()
        .filter(|t| match (params.get("title"), params.get("due_date")) {
            (Some(title), _) => t["title"]
                .as_str()
                .is_some_and(|s| s.to_lowercase().contains(&title.to_lowercase())),
            (None, Some(due)) => t["dueDate"] == json!(due),
            (None, None) => false,
        })
        .map(|t| {
            json!({
                "id": t["id"],
                "title": t["title"],
                "description": t["description"],
                "due_date": t["dueDate"],
                "completed": t["completed"],
            })
        })
        .collect();
    Json(Value::Array(matches))
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn repository(base_url: &str, token: Option<&str>) -> RestTaskRepository {
    let client = TaskApiClient::new(
        base_url,
        token.map(str::to_string),
        Duration::from_secs(5),
    )
    .unwrap();
    RestTaskRepository::new(client, ApiRoutes::default())
}

fn draft(title: &str, description: Option<&str>, due: &str) -> TaskDraft {
    TaskDraft::new(
        title,
        description.map(str::to_string),
        parse_date(due).unwrap(),
    )
}

#[tokio::test]
async fn create_list_update_delete() {
    let base_url = serve(TaskServer::default().router()).await;
    let repo = repository(&base_url, None);

    let milk = assert_ok!(repo.create_task(&draft("Buy milk", None, "2030-02-01")).await);
    assert_eq!(milk.id, Some(TaskId(1)));
    assert_eq!(milk.description, None);
    let report = assert_ok!(
        repo.create_task(&draft("Write report", Some("Q1 numbers"), "2030-01-15"))
            .await
    );
    assert_eq!(report.description.as_deref(), Some("Q1 numbers"));

    let all = assert_ok!(repo.get_all_tasks().await);
    assert_eq!(all.len(), 2);

    let updated = assert_ok!(
        repo.update_task(TaskId(1), &draft("Buy oat milk", None, "2030-02-02"))
            .await
    );
    assert_eq!(updated.title, "Buy oat milk");
    assert_eq!(updated.due_date, parse_date("2030-02-02").unwrap());

    assert_ok!(repo.delete_task(TaskId(2)).await);
    let remaining = assert_ok!(repo.get_all_tasks().await);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, Some(TaskId(1)));
}

#[tokio::test]
async fn searches_accept_snake_case_dates() {
    let base_url = serve(TaskServer::default().router()).await;
    let repo = repository(&base_url, None);

    assert_ok!(repo.create_task(&draft("Milk & eggs", None, "2030-03-01")).await);
    assert_ok!(repo.create_task(&draft("Dentist", None, "2030-03-02")).await);

    let by_title = assert_ok!(repo.search_tasks_by_title("milk & EGGS").await);
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].title, "Milk & eggs");

    let by_date = assert_ok!(
        repo.search_tasks_by_due_date(parse_date("2030-03-02").unwrap())
            .await
    );
    assert_eq!(by_date.len(), 1);
    assert_eq!(by_date[0].title, "Dentist");
}

#[tokio::test]
async fn delete_all_uses_collection_endpoint() {
    let base_url = serve(TaskServer::default().router()).await;
    let repo = repository(&base_url, None);

    assert_ok!(repo.create_task(&draft("One", None, "2030-01-01")).await);
    assert_ok!(repo.create_task(&draft("Two", None, "2030-01-02")).await);
    assert_ok!(repo.delete_all_tasks().await);
    assert!(assert_ok!(repo.get_all_tasks().await).is_empty());
}

#[tokio::test]
async fn missing_task_maps_to_not_found() {
    let base_url = serve(TaskServer::default().router()).await;
    let repo = repository(&base_url, None);

    let err = assert_err!(repo.delete_task(TaskId(42)).await);
    assert_eq!(err, RepositoryError::NotFound("Not found".to_string()));

    let err = assert_err!(
        repo.update_task(TaskId(42), &draft("Ghost", None, "2030-01-01"))
            .await
    );
    assert_eq!(err, RepositoryError::from_status(404));
}

#[tokio::test]
async fn error_statuses_map_to_taxonomy() {
    for code in [400u16, 401, 403, 404, 408, 429, 500, 502, 503, 504] {
        let status = StatusCode::from_u16(code).unwrap();
        let router = Router::new().route(
            "/api/tasks",
            get(move || async move { (status, "nope") }),
        );
        let repo = repository(&serve(router).await, None);

        let err = assert_err!(repo.get_all_tasks().await);
        assert_eq!(err, RepositoryError::from_status(code), "status {code}");
        assert_eq!(err.can_retry(), code != 401, "status {code}");
    }
}

#[tokio::test]
async fn unsuccessful_envelope_is_a_failure() {
    let router = Router::new()
        .route(
            "/api/tasks",
            get(|| async { Json(json!({ "success": false, "message": "Quota exceeded" })) }),
        )
        .route(
            "/api/tasks/search",
            get(|| async { Json(json!({ "success": false })) }),
        );
    let repo = repository(&serve(router).await, None);

    let err = assert_err!(repo.get_all_tasks().await);
    assert_eq!(err, RepositoryError::Failure("Quota exceeded".to_string()));

    let err = assert_err!(repo.search_tasks_by_title("anything").await);
    assert_eq!(err.message(), "Request failed");
}

#[tokio::test]
async fn malformed_body_is_a_response_error() {
    let router = Router::new().route(
        "/api/tasks",
        get(|| async { Json(json!([{ "title": "No date" }])) }),
    );
    let repo = repository(&serve(router).await, None);

    let err = assert_err!(repo.get_all_tasks().await);
    assert!(matches!(err, RepositoryError::Response(_)), "{err:?}");
}

#[tokio::test]
async fn refused_connection_is_no_internet() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let repo = repository(&format!("http://{addr}/api"), None);
    let err = assert_err!(repo.get_all_tasks().await);
    assert_eq!(err, RepositoryError::no_internet());
    assert!(err.can_retry());
}

#[tokio::test]
async fn bearer_token_sent_only_when_configured() {
    let server = TaskServer::default();
    let base_url = serve(server.clone().router()).await;

    assert_ok!(repository(&base_url, Some("s3cret")).get_all_tasks().await);
    assert_ok!(repository(&base_url, None).get_all_tasks().await);
    assert_ok!(repository(&base_url, Some("")).get_all_tasks().await);

    let seen = server.auth_headers.lock().unwrap().clone();
    assert_eq!(seen, vec![Some("Bearer s3cret".to_string()), None, None]);
}
