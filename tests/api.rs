//! HTTP-level tests for the catalog API.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use bookshelf_rs::auth::AuthService;
use bookshelf_rs::config::Config;
use bookshelf_rs::db::Database;
use bookshelf_rs::server::{self, AppState};
use bookshelf_rs::stats::{AreaRecord, CityRecord, DailyRecord, ProvinceRecord};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

struct TestApp {
    app: Router,
    db: Database,
    config: Config,
    _upload_dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.upload.dir = upload_dir.path().to_path_buf();

    let db = Database::open_memory().unwrap();
    let auth = AuthService::new(db.clone(), 30);
    let state = AppState::new(config.clone(), db.clone(), auth);

    TestApp {
        app: server::create_router(state),
        db,
        config,
        _upload_dir: upload_dir,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json_with_token(uri: &str, body: Value, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(uri: &str, field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn create_body(file_name: &str, username: Option<&str>) -> Value {
    let mut body = json!({
        "fileName": file_name,
        "title": "Some Title",
        "author": "Some Author",
        "category": 1,
        "categoryText": "Novels",
    });
    if let Some(username) = username {
        body["username"] = json!(username);
    }
    body
}

// ============================================================================
// GET / DELETE VALIDATION
// ============================================================================

#[tokio::test]
async fn get_without_file_name_is_bad_request() {
    let t = test_app();

    for uri in ["/book/get", "/book/get?fileName="] {
        let response = t.app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["code"], -1);
    }
}

#[tokio::test]
async fn delete_without_file_name_is_bad_request() {
    let t = test_app();
    t.db.insert_book(&book("b-1")).unwrap();

    let response = t.app.clone().oneshot(get("/book/delete")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The store was never touched
    assert!(t.db.get_book("b-1").unwrap().is_some());
}

#[tokio::test]
async fn get_unknown_book_is_not_found() {
    let t = test_app();
    let response = t
        .app
        .clone()
        .oneshot(get("/book/get?fileName=ghost"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_returns_book_envelope() {
    let t = test_app();
    t.db.insert_book(&book("b-1")).unwrap();

    let response = t
        .app
        .clone()
        .oneshot(get("/book/get?fileName=b-1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["code"], 0);
    assert_eq!(json["data"]["fileName"], "b-1");
}

#[tokio::test]
async fn delete_removes_book() {
    let t = test_app();
    t.db.insert_book(&book("b-1")).unwrap();

    let response = t
        .app
        .clone()
        .oneshot(get("/book/delete?fileName=b-1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["code"], 0);
    assert_eq!(json["msg"], "delete succeeded");
    assert!(t.db.get_book("b-1").unwrap().is_none());
}

fn book(file_name: &str) -> bookshelf_rs::book::Book {
    bookshelf_rs::book::Book::from_fields(bookshelf_rs::book::BookFields {
        file_name: file_name.to_string(),
        title: "Title".to_string(),
        author: "Author".to_string(),
        category: Some(1),
        category_text: Some("Novels".to_string()),
        ..Default::default()
    })
}

// ============================================================================
// UPLOAD
// ============================================================================

#[tokio::test]
async fn upload_without_file_is_fail_envelope() {
    let t = test_app();

    // Multipart body present, but no field named "file"
    let request = multipart_request("/book/upload", "attachment", "x.epub", b"data");
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["code"], -1);
    assert_eq!(json["msg"], "upload ebook failed");

    // The parser was never run and nothing was written
    assert!(!t.config.upload.book_dir().exists());
}

#[tokio::test]
async fn upload_empty_file_is_fail_envelope() {
    let t = test_app();

    let request = multipart_request("/book/upload", "file", "x.epub", b"");
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["code"], -1);
}

#[tokio::test]
async fn upload_parse_failure_is_500_and_temp_file_removed() {
    let t = test_app();

    let request = multipart_request("/book/upload", "file", "broken.epub", b"not a zip archive");
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["code"], -1);
    // Upstream detail is not exposed verbatim
    assert_eq!(json["msg"], "implementation failure");

    // Best-effort cleanup removed the temp file
    let leftover: Vec<_> = std::fs::read_dir(t.config.upload.book_dir())
        .map(|entries| entries.collect())
        .unwrap_or_default();
    assert!(leftover.is_empty());
}

// ============================================================================
// CREATE / UPDATE IDENTITY
// ============================================================================

#[tokio::test]
async fn create_inserts_book_with_client_username_when_no_token() {
    let t = test_app();

    let response = t
        .app
        .clone()
        .oneshot(post_json("/book/create", create_body("b-1", Some("mallory"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["code"], 0);

    let found = t.db.get_book("b-1").unwrap().unwrap();
    assert_eq!(found.username.as_deref(), Some("mallory"));
}

#[tokio::test]
async fn create_overrides_username_with_token_identity() {
    let t = test_app();
    let auth = AuthService::new(t.db.clone(), 30);
    auth.create_user("alice", "password123").unwrap();
    let (_, token) = auth.login("alice", "password123").unwrap();

    let request = post_json_with_token("/book/create", create_body("b-1", Some("mallory")), &token);
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let found = t.db.get_book("b-1").unwrap().unwrap();
    assert_eq!(found.username.as_deref(), Some("alice"));
}

#[tokio::test]
async fn update_overrides_username_with_token_identity() {
    let t = test_app();
    t.db.insert_book(&book("b-1")).unwrap();

    let auth = AuthService::new(t.db.clone(), 30);
    auth.create_user("alice", "password123").unwrap();
    let (_, token) = auth.login("alice", "password123").unwrap();

    let request = post_json_with_token("/book/update", create_body("b-1", Some("mallory")), &token);
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["msg"], "update succeeded");

    let found = t.db.get_book("b-1").unwrap().unwrap();
    assert_eq!(found.username.as_deref(), Some("alice"));
}

#[tokio::test]
async fn update_unknown_book_is_not_found() {
    let t = test_app();
    let response = t
        .app
        .clone()
        .oneshot(post_json("/book/update", create_body("ghost", None)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_token_is_ignored_not_rejected() {
    let t = test_app();

    let request = post_json_with_token("/book/create", create_body("b-1", Some("bob")), "bogus");
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let found = t.db.get_book("b-1").unwrap().unwrap();
    assert_eq!(found.username.as_deref(), Some("bob"));
}

// ============================================================================
// LIST / AGGREGATIONS
// ============================================================================

#[tokio::test]
async fn list_meta_defaults_and_zero_total() {
    let t = test_app();

    let response = t.app.clone().oneshot(get("/book/list")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["code"], 0);
    assert_eq!(json["page"], 1);
    assert_eq!(json["pageSize"], 20);
    assert_eq!(json["total"], 0);
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn list_meta_is_numeric_for_string_query_values() {
    let t = test_app();
    for i in 1..=7 {
        t.db.insert_book(&book(&format!("b-{}", i))).unwrap();
    }

    let response = t
        .app
        .clone()
        .oneshot(get("/book/list?page=2&pageSize=5"))
        .await
        .unwrap();
    let json = body_json(response).await;

    assert!(json["page"].is_u64());
    assert!(json["pageSize"].is_u64());
    assert_eq!(json["page"], 2);
    assert_eq!(json["pageSize"], 5);
    assert_eq!(json["total"], 7);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn list_with_extreme_paging_is_empty_not_an_error() {
    let t = test_app();
    t.db.insert_book(&book("b-1")).unwrap();

    let response = t
        .app
        .clone()
        .oneshot(get("/book/list?page=4294967295&pageSize=4294967295"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["code"], 0);
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn clear_empties_catalog() {
    let t = test_app();
    t.db.insert_book(&book("b-1")).unwrap();

    let response = t.app.clone().oneshot(get("/book/clear")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(t.db.count_books().unwrap(), 0);
}

#[tokio::test]
async fn category_returns_aggregation() {
    let t = test_app();
    t.db.insert_book(&book("b-1")).unwrap();
    t.db.insert_book(&book("b-2")).unwrap();

    let response = t.app.clone().oneshot(get("/book/category")).await.unwrap();
    let json = body_json(response).await;

    assert_eq!(json["code"], 0);
    assert_eq!(json["data"][0]["category"], 1);
    assert_eq!(json["data"][0]["categoryText"], "Novels");
    assert_eq!(json["data"][0]["num"], 2);
}

#[tokio::test]
async fn home_returns_aggregation() {
    let t = test_app();
    t.db.insert_book(&book("b-1")).unwrap();

    let response = t.app.clone().oneshot(get("/book/home")).await.unwrap();
    let json = body_json(response).await;

    assert_eq!(json["code"], 0);
    assert_eq!(json["data"]["total"], 1);
    assert!(json["data"]["recent"].is_array());
    assert!(json["data"]["categories"].is_array());
}

// ============================================================================
// STATS ENDPOINTS
// ============================================================================

#[tokio::test]
async fn area_returns_combined_reshaped_list() {
    let t = test_app();
    t.db.save_area_record(&AreaRecord {
        province_name: "Hubei".to_string(),
        current_confirmed: 0,
        confirmed: 0,
        cured: 0,
        dead: 0,
        current_confirmed_incr: 1,
        confirmed_incr: 2,
        cured_incr: 3,
        dead_incr: 4,
    })
    .unwrap();
    t.db.save_province_record(&ProvinceRecord {
        province_name: "Hubei".to_string(),
        current_confirmed: 100,
        confirmed: 0,
        cured: 0,
        dead: 0,
    })
    .unwrap();
    t.db.save_city_record(&CityRecord {
        province_name: "Hubei".to_string(),
        city_name: "Wuhan".to_string(),
        current_confirmed: 0,
        confirmed: 0,
        cured: 0,
        dead: 0,
    })
    .unwrap();

    let response = t.app.clone().oneshot(get("/book/area")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);

    // Incr entry: four counts nested under incrVo, removed from the top level
    assert_eq!(
        data[0]["incrVo"],
        json!({
            "currentConfirmedIncr": 1,
            "confirmedIncr": 2,
            "curedIncr": 3,
            "deadIncr": 4,
        })
    );
    assert!(data[0].get("currentConfirmedIncr").is_none());

    // Province entry: cities attached
    assert_eq!(data[1]["provinceName"], "Hubei");
    assert_eq!(data[1]["cities"][0]["cityName"], "Wuhan");
}

#[tokio::test]
async fn c_info_passes_daily_records_through() {
    let t = test_app();
    t.db.save_daily_record(&DailyRecord {
        date: "2020-02-01".to_string(),
        current_confirmed: 100,
        confirmed: 200,
        cured: 50,
        dead: 10,
    })
    .unwrap();

    let response = t.app.clone().oneshot(get("/book/c_info")).await.unwrap();
    let json = body_json(response).await;

    assert_eq!(json["code"], 0);
    assert_eq!(json["data"][0]["date"], "2020-02-01");
    assert_eq!(json["data"][0]["confirmed"], 200);
}

// ============================================================================
// LOGIN
// ============================================================================

#[tokio::test]
async fn login_returns_token() {
    let t = test_app();
    let auth = AuthService::new(t.db.clone(), 30);
    auth.create_user("alice", "password123").unwrap();

    let response = t
        .app
        .clone()
        .oneshot(post_json(
            "/user/login",
            json!({"username": "alice", "password": "password123"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["code"], 0);
    assert_eq!(json["data"]["username"], "alice");
    assert!(!json["data"]["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn login_with_wrong_password_is_bad_request() {
    let t = test_app();
    let auth = AuthService::new(t.db.clone(), 30);
    auth.create_user("alice", "password123").unwrap();

    let response = t
        .app
        .clone()
        .oneshot(post_json(
            "/user/login",
            json!({"username": "alice", "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
