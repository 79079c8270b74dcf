use axum::body::to_bytes;
use axum::Router;
use serde_json::{json, Value};
use todo_api::application::todo_service::TodoServiceImpl;
use todo_api::domain::repository::TodoRepository;
use todo_api::http::{routes::todos, routing};
use todo_api::infrastructure::sqlite_repo::SqliteTodoRepository;

async fn app() -> Router {
    // use in-memory sqlite for tests
    let repo = SqliteTodoRepository::connect("sqlite::memory:").await.unwrap();
    repo.init().await.unwrap();
    let service = TodoServiceImpl::new(repo);
    routing::app(todos::router(todos::AppState { service }))
}

#[tokio::test]
async fn acceptance_buy_milk_lifecycle() {
    let app = app().await;

    // create
    let res = request(&app, "POST", "/api/todos", Some(json!({ "title": "Buy milk", "priority": 3 }))).await;
    assert_eq!(res.status(), 201);
    let created = body_json(res).await;
    assert_eq!(created["completed"], false);
    assert_eq!(created["priority"], 3);
    assert_eq!(created["createdAt"], created["updatedAt"]);
    assert!(created["description"].is_null());
    let id = created["id"].as_str().unwrap().to_string();

    // complete
    let res = request(&app, "PATCH", &format!("/api/todos/{id}/complete"), None).await;
    assert_eq!(res.status(), 200);
    let completed = body_json(res).await;
    assert_eq!(completed["completed"], true);
    assert_ne!(completed["updatedAt"], created["updatedAt"]);
    assert_eq!(completed["createdAt"], created["createdAt"]);

    // filter by priority
    let res = request(&app, "GET", "/api/todos/priority/3", None).await;
    assert_eq!(res.status(), 200);
    let listed = body_json(res).await;
    assert!(listed.as_array().unwrap().iter().any(|t| t["id"] == id.as_str()));

    // delete, then gone
    let res = request(&app, "DELETE", &format!("/api/todos/{id}"), None).await;
    assert_eq!(res.status(), 204);
    let res = request(&app, "GET", &format!("/api/todos/{id}"), None).await;
    assert_eq!(res.status(), 404);
    let res = request(&app, "DELETE", &format!("/api/todos/{id}"), None).await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn acceptance_create_list_get_update_delete() {
    let app = app().await;

    let res = request(&app, "POST", "/api/todos", Some(json!({ "title": "Test", "description": "First" }))).await;
    assert_eq!(res.status(), 201);
    let created = body_json(res).await;
    assert_eq!(created["priority"], 1);
    let id = created["id"].as_str().unwrap().to_string();

    let res = request(&app, "GET", "/api/todos", None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);

    let res = request(&app, "GET", &format!("/api/todos/{id}"), None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(body_json(res).await["description"], "First");

    let res = request(&app, "PUT", &format!("/api/todos/{id}"), Some(json!({ "title": "Renamed", "priority": 2 }))).await;
    assert_eq!(res.status(), 200);
    let updated = body_json(res).await;
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["priority"], 2);
    assert!(updated["description"].is_null());
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let res = request(&app, "PATCH", &format!("/api/todos/{id}/incomplete"), None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(body_json(res).await["completed"], false);

    let missing = "00000000-0000-0000-0000-000000000000";
    let res = request(&app, "PUT", &format!("/api/todos/{missing}"), Some(json!({ "title": "x" }))).await;
    assert_eq!(res.status(), 404);
    let res = request(&app, "PATCH", &format!("/api/todos/{missing}/complete"), None).await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn acceptance_validation_errors_name_fields() {
    let app = app().await;

    let res = request(&app, "POST", "/api/todos", Some(json!({ "title": "" }))).await;
    assert_eq!(res.status(), 400);
    let body = body_json(res).await;
    assert!(body["errors"].as_array().unwrap().iter().any(|e| e["field"] == "title"));
    assert!(body.to_string().contains("Title"));

    let res = request(&app, "POST", "/api/todos", Some(json!({ "title": "ok", "description": "d".repeat(501), "priority": 7 }))).await;
    assert_eq!(res.status(), 400);
    assert_eq!(body_json(res).await["errors"].as_array().unwrap().len(), 2);

    let res = request(&app, "GET", "/api/todos/priority/5", None).await;
    assert_eq!(res.status(), 400);
    let res = request(&app, "GET", "/api/todos/recent/400", None).await;
    assert_eq!(res.status(), 400);

    let res = request(&app, "GET", "/api/todos", None).await;
    assert!(body_json(res).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn acceptance_queries_and_stats() {
    let app = app().await;
    let mut ids = Vec::new();
    for (title, priority) in [("Write report", 3), ("Read REPORT notes", 1), ("Call mom", 2), ("Fix bike", 3)] {
        let res = request(&app, "POST", "/api/todos", Some(json!({ "title": title, "priority": priority, "description": format!("about {title}") }))).await;
        assert_eq!(res.status(), 201);
        ids.push(body_json(res).await["id"].as_str().unwrap().to_string());
    }
    let res = request(&app, "PATCH", &format!("/api/todos/{}/complete", ids[0]), None).await;
    assert_eq!(res.status(), 200);

    let res = request(&app, "GET", "/api/todos/search?title=report", None).await;
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 2);

    let res = request(&app, "GET", "/api/todos/search/description?description=BIKE", None).await;
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);

    let res = request(&app, "GET", "/api/todos/status/true", None).await;
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);
    let res = request(&app, "GET", "/api/todos/status/false", None).await;
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 3);

    let res = request(&app, "GET", "/api/todos/high-priority/incomplete", None).await;
    let urgent = body_json(res).await;
    assert_eq!(urgent.as_array().unwrap().len(), 1);
    assert_eq!(urgent[0]["id"], ids[3].as_str());

    let res = request(&app, "GET", "/api/todos/priority/3/status/true", None).await;
    assert_eq!(body_json(res).await[0]["id"], ids[0].as_str());

    let res = request(&app, "GET", "/api/todos/recent/1", None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 4);

    let res = request(&app, "GET", "/api/todos/stats", None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(
        body_json(res).await,
        json!({ "totalCompleted": 1, "totalIncomplete": 3, "lowPriority": 1, "mediumPriority": 1, "highPriority": 2 })
    );

    let res = request(&app, "GET", "/api/todos/health", None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(body_json(res).await, json!({ "status": "UP", "message": "Todo API is running" }));
}

async fn body_json(res: hyper::Response<axum::body::Body>) -> Value {
    serde_json::from_slice(&to_bytes(res.into_body(), 1024 * 1024).await.unwrap()).unwrap()
}

async fn request(app: &Router, method: &str, path: &str, body: Option<Value>) -> hyper::Response<axum::body::Body> {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    let req = Request::builder().method(Method::from_bytes(method.as_bytes()).unwrap()).uri(path);
    let req = match body {
        Some(json) => req.header("content-type", "application/json").body(Body::from(json.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}
