//! HTTP-level tests for the v1 API, running against the in-memory store.

use axum_test::TestServer;
use serde_json::{Value, json};

use librarium_server::{AppState, build_app};

fn server() -> TestServer {
    TestServer::new(build_app(AppState::in_memory())).expect("router must start")
}

async fn create_publisher(server: &TestServer, name: &str) -> i64 {
    let response = server
        .post("/api/v1/publishers")
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["pkid"].as_i64().unwrap()
}

async fn create_author(server: &TestServer, name: &str) -> i64 {
    let response = server
        .post("/api/v1/authors")
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["pkid"].as_i64().unwrap()
}

fn book_body(isbn: &str, author_id: i64, publisher_id: i64) -> Value {
    json!({
        "title": "T",
        "isbn": isbn,
        "price": 19.99,
        "edition": "1st",
        "printing": "2025-06",
        "imageUrl": "http://example.com/cover.jpg",
        "authorIds": [author_id],
        "publisherId": publisher_id,
    })
}

#[tokio::test]
async fn health_endpoint_responds() {
    let server = server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn book_crud_round_trip() {
    let server = server();
    let publisher = create_publisher(&server, "Acme").await;
    let author = create_author(&server, "Ada").await;

    let response = server
        .post("/api/v1/books")
        .json(&book_body("X1", author, publisher))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created = response.json::<Value>();
    let book_id = created["pkid"].as_i64().unwrap();
    assert_eq!(created["authorIds"], json!([author]));

    let response = server.get(&format!("/api/v1/books/{book_id}")).await;
    response.assert_status_ok();
    let fetched = response.json::<Value>();
    assert_eq!(fetched["isbn"], "X1");
    assert_eq!(fetched["publisher"]["name"], "Acme");
    assert_eq!(fetched["authors"][0]["name"], "Ada");

    let response = server.get("/api/v1/books/isbn/X1").await;
    response.assert_status_ok();

    let response = server
        .put(&format!("/api/v1/books/{book_id}"))
        .json(&json!({ "title": "Renamed" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["title"], "Renamed");

    let response = server.delete(&format!("/api/v1/books/{book_id}")).await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);

    let response = server.get(&format!("/api/v1/books/{book_id}")).await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn book_creation_resolves_bare_author_and_publisher_names() {
    let server = server();

    let response = server
        .post("/api/v1/books")
        .json(&json!({
            "title": "T",
            "isbn": "X2",
            "price": 10.0,
            "edition": "1st",
            "printing": "2025-01",
            "imageUrl": "http://example.com/x.jpg",
            "authorNames": ["Ada"],
            "translatorNames": ["Grace"],
            "publisherName": "Implicit Press",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created = response.json::<Value>();
    assert_eq!(created["authorIds"].as_array().unwrap().len(), 1);
    assert_eq!(created["translatorIds"].as_array().unwrap().len(), 1);

    // The implicitly created rows are visible through the directories.
    let authors = server.get("/api/v1/authors").await.json::<Value>();
    let names: Vec<&str> = authors
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Ada"));
    assert!(names.contains(&"Grace"));

    let publishers = server.get("/api/v1/publishers").await.json::<Value>();
    assert_eq!(publishers[0]["name"], "Implicit Press");
}

#[tokio::test]
async fn missing_mandatory_relations_are_a_bad_request() {
    let server = server();
    create_publisher(&server, "P").await;

    let response = server
        .post("/api/v1/books")
        .json(&json!({
            "title": "T",
            "isbn": "X3",
            "price": 10.0,
            "edition": "1st",
            "printing": "2025-01",
            "imageUrl": "http://example.com/x.jpg",
            "publisherId": 1,
        }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn duplicate_isbn_is_a_conflict() {
    let server = server();
    let publisher = create_publisher(&server, "P").await;
    let author = create_author(&server, "A").await;

    server
        .post("/api/v1/books")
        .json(&book_body("X4", author, publisher))
        .await
        .assert_status(axum::http::StatusCode::CREATED);
    let response = server
        .post("/api/v1/books")
        .json(&book_body("X4", author, publisher))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn guarded_deletes_surface_as_conflicts() {
    let server = server();
    let publisher = create_publisher(&server, "P").await;
    let author = create_author(&server, "A").await;

    server
        .post("/api/v1/books")
        .json(&book_body("X5", author, publisher))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server.delete(&format!("/api/v1/authors/{author}")).await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
    let message = response.json::<Value>()["error"]["message"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(message.contains("1 related"));

    let response = server
        .delete(&format!("/api/v1/publishers/{publisher}"))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn translator_clear_via_empty_wire_list() {
    let server = server();
    let publisher = create_publisher(&server, "P").await;
    let author = create_author(&server, "A").await;
    let translator = create_author(&server, "T").await;

    let mut body = book_body("X6", author, publisher);
    body["translatorIds"] = json!([translator]);
    let response = server.post("/api/v1/books").json(&body).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let book_id = response.json::<Value>()["pkid"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/v1/books/{book_id}"))
        .json(&json!({ "translatorIds": [] }))
        .await;
    response.assert_status_ok();
    // An empty set is serialized as an absent field.
    assert!(response.json::<Value>().get("translatorIds").is_none());
}

#[tokio::test]
async fn update_with_no_effective_fields_is_a_bad_request() {
    let server = server();
    let publisher = create_publisher(&server, "P").await;
    let author = create_author(&server, "A").await;

    let response = server
        .post("/api/v1/books")
        .json(&book_body("X7", author, publisher))
        .await;
    let book_id = response.json::<Value>()["pkid"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/v1/books/{book_id}"))
        .json(&json!({ "title": "   ", "price": -4.0 }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn publisher_rename_collision_is_a_conflict() {
    let server = server();
    create_publisher(&server, "First").await;
    let second = create_publisher(&server, "Second").await;

    let response = server
        .put(&format!("/api/v1/publishers/{second}"))
        .json(&json!({ "name": "First" }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn user_registry_crud() {
    let server = server();

    let response = server
        .post("/api/v1/users")
        .json(&json!({
            "name": "Kay",
            "email": "kay@example.com",
            "birthdate": "1990-04-02",
            "gender": "unknown",
            "height": 1.75,
            "status": true,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let user_id = response.json::<Value>()["pkid"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/v1/users/{user_id}"))
        .json(&json!({ "height": 1.8 }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["height"], 1.8);

    let response = server.delete(&format!("/api/v1/users/{user_id}")).await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);

    let response = server.get(&format!("/api/v1/users/{user_id}")).await;
    response.assert_status_not_found();
}
