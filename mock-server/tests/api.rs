use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, Record};
use serde_json::{json, Value};
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

type App = axum::routing::RouterIntoService<String>;

async fn call(app: &mut App, req: Request<String>) -> axum::response::Response {
    ServiceExt::ready(app).await.unwrap().call(req).await.unwrap()
}

/// Router with a `users` collection holding two records.
async fn seeded() -> App {
    let mut app = Router::into_service(app());
    call(&mut app, empty_request("POST", "/collection?collection=users")).await;
    call(
        &mut app,
        json_request("POST", "/records?collection=users", r#"{"id":"1","name":"Ada","age":36}"#),
    )
    .await;
    call(
        &mut app,
        json_request("POST", "/records?collection=users", r#"{"id":"2","name":"Grace","age":45}"#),
    )
    .await;
    app
}

// --- collections ---

#[tokio::test]
async fn list_collections_empty_is_null() {
    let resp = app()
        .oneshot(empty_request("GET", "/collection"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert!(body.is_null());
}

#[tokio::test]
async fn create_then_list_collections() {
    let mut app = Router::into_service(app());
    let resp = call(&mut app, empty_request("POST", "/collection?collection=users")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Collection users created");

    let resp = call(&mut app, empty_request("GET", "/collection")).await;
    let names: Vec<String> = body_json(resp).await;
    assert_eq!(names, vec!["users"]);
}

#[tokio::test]
async fn create_collection_without_param_is_rejected() {
    let resp = app()
        .oneshot(empty_request("POST", "/collection"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- records ---

#[tokio::test]
async fn add_record_to_missing_collection_returns_404() {
    let resp = app()
        .oneshot(json_request("POST", "/records?collection=nope", r#"{"a":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_record_assigns_id() {
    let mut app = Router::into_service(app());
    call(&mut app, empty_request("POST", "/collection?collection=notes")).await;
    let resp = call(
        &mut app,
        json_request("POST", "/records?collection=notes", r#"{"text":"hi"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = call(&mut app, empty_request("GET", "/records?collection=notes")).await;
    let records: Vec<Record> = body_json(resp).await;
    assert_eq!(records.len(), 1);
    assert!(records[0]["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(records[0]["text"], "hi");
}

#[tokio::test]
async fn query_honors_limit() {
    let mut app = seeded().await;
    let resp = call(&mut app, empty_request("GET", "/records?collection=users&limit=1")).await;
    let records: Vec<Record> = body_json(resp).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "Ada");
}

// --- find / where ---

#[tokio::test]
async fn find_one_hit_and_miss() {
    let mut app = seeded().await;
    let resp = call(&mut app, empty_request("GET", "/findone?collection=users&id=2")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let record: Record = body_json(resp).await;
    assert_eq!(record["name"], "Grace");

    let resp = call(&mut app, empty_request("GET", "/findone?collection=users&id=9")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(resp).await, "record not found");
}

#[tokio::test]
async fn where_matches_numbers_by_text() {
    let mut app = seeded().await;
    let resp = call(
        &mut app,
        empty_request("GET", "/where?collection=users&field=age&value=45"),
    )
    .await;
    let records: Vec<Record> = body_json(resp).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], "2");
}

#[tokio::test]
async fn where_decodes_percent_encoding() {
    let mut app = Router::into_service(app());
    call(&mut app, empty_request("POST", "/collection?collection=tags")).await;
    call(
        &mut app,
        json_request("POST", "/records?collection=tags", r#"{"id":"t","label":"a b&c"}"#),
    )
    .await;
    let resp = call(
        &mut app,
        empty_request("GET", "/where?collection=tags&field=label&value=a%20b%26c"),
    )
    .await;
    let records: Vec<Record> = body_json(resp).await;
    assert_eq!(records.len(), 1);
}

// --- field writes ---

#[tokio::test]
async fn update_existing_field() {
    let mut app = seeded().await;
    let resp = call(
        &mut app,
        empty_request("PUT", "/update?collection=users&field=age&value=37&id=1"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let record: Record = body_json(resp).await;
    assert_eq!(record["age"], json!(37));
}

#[tokio::test]
async fn update_unknown_field_is_rejected() {
    let mut app = seeded().await;
    let resp = call(
        &mut app,
        empty_request("PUT", "/update?collection=users&field=email&value=x&id=1"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "field email does not exist");
}

#[tokio::test]
async fn add_field_then_duplicate() {
    let mut app = seeded().await;
    let resp = call(
        &mut app,
        empty_request("PUT", "/addField?collection=users&field=admin&value=true&id=2"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let record: Record = body_json(resp).await;
    assert_eq!(record["admin"], json!(true));

    let resp = call(
        &mut app,
        empty_request("PUT", "/addField?collection=users&field=admin&value=false&id=2"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn field_write_on_missing_record_returns_404() {
    let mut app = seeded().await;
    let resp = call(
        &mut app,
        empty_request("PUT", "/addField?collection=users&field=x&value=1&id=nope"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
