use todo_feed::{application::todo_repository::TodoRepositoryImpl, http::routing, http::routing::todos, infrastructure::{file_store::FileTodoStore, sqlite_store::SqliteTodoStore}};
use todo_feed::domain::store::TodoStore;
use axum::body::to_bytes;
use axum::Router;
use serde_json::{json, Value};

async fn sqlite_app() -> Router {
    // use in-memory sqlite for tests
    let store = SqliteTodoStore::connect("sqlite::memory:").await.unwrap();
    store.init().await.unwrap();
    routing::app(todos::router(todos::AppState::new(TodoRepositoryImpl::new(store))))
}

#[tokio::test]
async fn acceptance_create_list_toggle_delete() {
    let app = sqlite_app().await;

    // create
    let res = request(&app, "POST", "/api/todos", Some(json!({ "content": "Buy milk" }))).await;
    assert_eq!(res.status(), 201);
    let body = json_body(res).await;
    let id = body["todo"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["todo"]["done"], false);

    // list
    let res = request(&app, "GET", "/api/todos?page=1&limit=5", None).await;
    assert_eq!(res.status(), 200);
    let body = json_body(res).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["pages"], 1);
    assert_eq!(body["todos"][0]["content"], "Buy milk");
    assert_eq!(body["todos"][0]["done"], false);

    // toggle twice
    let res = request(&app, "PUT", &format!("/api/todos/{}/toggle-done", id), None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(json_body(res).await["todo"]["done"], true);
    let res = request(&app, "PUT", &format!("/api/todos/{}/toggle-done", id), None).await;
    assert_eq!(json_body(res).await["todo"]["done"], false);

    // update content
    let res = request(&app, "PATCH", &format!("/api/todos/{}", id), Some(json!({ "content": "Buy oat milk" }))).await;
    assert_eq!(res.status(), 200);
    assert_eq!(json_body(res).await["todo"]["content"], "Buy oat milk");

    // delete
    let res = request(&app, "DELETE", &format!("/api/todos/{}", id), None).await;
    assert_eq!(res.status(), 204);
    assert!(to_bytes(res.into_body(), 1024).await.unwrap().is_empty());

    // delete again 404
    let res = request(&app, "DELETE", &format!("/api/todos/{}", id), None).await;
    assert_eq!(res.status(), 404);
    assert!(json_body(res).await["error"]["message"].as_str().unwrap().contains(&id));
}

#[tokio::test]
async fn acceptance_pages_are_newest_first() {
    let app = sqlite_app().await;
    for content in ["A", "B"] {
        let res = request(&app, "POST", "/api/todos", Some(json!({ "content": content }))).await;
        assert_eq!(res.status(), 201);
    }

    let first = json_body(request(&app, "GET", "/api/todos?page=1&limit=1", None).await).await;
    assert_eq!(first["todos"].as_array().unwrap().len(), 1);
    assert_eq!(first["todos"][0]["content"], "B");
    let second = json_body(request(&app, "GET", "/api/todos?page=2&limit=1", None).await).await;
    assert_eq!(second["todos"][0]["content"], "A");

    let beyond = json_body(request(&app, "GET", "/api/todos?page=9&limit=1", None).await).await;
    assert_eq!(beyond["todos"], json!([]));
    assert_eq!((&beyond["total"], &beyond["pages"]), (&first["total"], &first["pages"]));

    // server default limit is 2
    let default = json_body(request(&app, "GET", "/api/todos", None).await).await;
    assert_eq!(default["todos"].as_array().unwrap().len(), 2);
    assert_eq!(default["pages"], 1);

    let huge = request(&app, "GET", "/api/todos?page=1&limit=5000000000", None).await;
    assert_eq!(huge.status(), 200);
    let huge = json_body(huge).await;
    assert_eq!(huge["todos"].as_array().unwrap().len(), 2);
    assert_eq!(huge["pages"], 1);
}

#[tokio::test]
async fn acceptance_rejects_bad_input() {
    let app = sqlite_app().await;

    let res = request(&app, "GET", "/api/todos?page=abc", None).await;
    assert_eq!(res.status(), 400);
    assert_eq!(json_body(res).await["error"]["message"], "`page` must be a number");
    let res = request(&app, "GET", "/api/todos?limit=x", None).await;
    assert_eq!(res.status(), 400);
    assert_eq!(json_body(res).await["error"]["message"], "`limit` must be a number");
    let res = request(&app, "GET", "/api/todos?page=0", None).await;
    assert_eq!(res.status(), 400);

    for body in [json!({}), json!({ "content": 42 }), json!({ "content": "" })] {
        let res = request(&app, "POST", "/api/todos", Some(body)).await;
        assert_eq!(res.status(), 400);
        let body = json_body(res).await;
        assert_eq!(body["error"]["message"], "You need to provide a content to create a TODO");
        assert!(!body["error"]["description"].is_null());
    }
    let res = request(&app, "POST", "/api/todos", None).await;
    assert_eq!(res.status(), 400);

    let res = request(&app, "PUT", "/api/todos/not-a-uuid/toggle-done", None).await;
    assert_eq!(res.status(), 400);
    let res = request(&app, "DELETE", "/api/todos/f478cf949df94d56acfb0dd00246a85d", None).await;
    assert_eq!(res.status(), 400);

    // nothing was created along the way
    assert_eq!(json_body(request(&app, "GET", "/api/todos", None).await).await["total"], 0);
}

#[tokio::test]
async fn acceptance_unknown_ids_are_404() {
    let app = sqlite_app().await;
    let id = "f478cf94-9df9-4d56-acfb-0dd00246a85d";
    let res = request(&app, "PUT", &format!("/api/todos/{}/toggle-done", id), None).await;
    assert_eq!(res.status(), 404);
    let res = request(&app, "DELETE", &format!("/api/todos/{}", id), None).await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn acceptance_unsupported_verbs_are_405() {
    let app = sqlite_app().await;
    let id = "f478cf94-9df9-4d56-acfb-0dd00246a85d";
    for (method, path) in [
        ("DELETE", "/api/todos".to_string()),
        ("PUT", "/api/todos".to_string()),
        ("GET", format!("/api/todos/{}", id)),
        ("GET", format!("/api/todos/{}/toggle-done", id)),
        ("POST", "/api".to_string()),
    ] {
        let res = request(&app, method, &path, None).await;
        assert_eq!(res.status(), 405, "{method} {path}");
        assert_eq!(json_body(res).await["error"]["message"], "Method not allowed");
    }
}

#[tokio::test]
async fn acceptance_misc_routes() {
    let app = sqlite_app().await;
    let res = request(&app, "GET", "/health", None).await;
    assert_eq!(res.status(), 200);
    let res = request(&app, "GET", "/api", None).await;
    assert_eq!(json_body(res).await, json!({ "message": "hello" }));
    let res = request(&app, "GET", "/nowhere", None).await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn acceptance_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.json");
    let store = FileTodoStore::new(&path);
    store.init().await.unwrap();
    let app = routing::app(todos::router(todos::AppState::new(TodoRepositoryImpl::new(store))));

    let res = request(&app, "POST", "/api/todos", Some(json!({ "content": "Buy milk" }))).await;
    assert_eq!(res.status(), 201);
    let id = json_body(res).await["todo"]["id"].as_str().unwrap().to_string();

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["todos"][0]["id"], id.as_str());

    let res = request(&app, "PUT", &format!("/api/todos/{}/toggle-done", id), None).await;
    assert_eq!(json_body(res).await["todo"]["done"], true);
    let res = request(&app, "DELETE", &format!("/api/todos/{}", id), None).await;
    assert_eq!(res.status(), 204);
    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["todos"], json!([]));
}

#[tokio::test]
async fn acceptance_store_failure_is_generic_500() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.json");
    std::fs::write(&path, "{ not json").unwrap();
    let app = routing::app(todos::router(todos::AppState::new(TodoRepositoryImpl::new(FileTodoStore::new(&path)))));

    let res = request(&app, "DELETE", "/api/todos/f478cf94-9df9-4d56-acfb-0dd00246a85d", None).await;
    assert_eq!(res.status(), 500);
    assert_eq!(json_body(res).await, json!({ "error": { "message": "Internal server error" } }));
    let res = request(&app, "GET", "/api/todos", None).await;
    assert_eq!(res.status(), 500);
}

async fn json_body(res: hyper::Response<axum::body::Body>) -> Value {
    serde_json::from_slice(&to_bytes(res.into_body(), 1024 * 1024).await.unwrap()).unwrap()
}

async fn request(app: &Router, method: &str, path: &str, body: Option<Value>) -> hyper::Response<axum::body::Body> {
    use axum::body::Body;
    use axum::http::{Request, Method};
    use tower::ServiceExt;

    let req = Request::builder().method(Method::from_bytes(method.as_bytes()).unwrap()).uri(path);
    let req = match body {
        Some(json) => req.header("content-type", "application/json").body(Body::from(json.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}
