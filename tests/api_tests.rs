use std::{sync::Arc, time::Duration};

use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use cinerec_api::{
    models::MovieRecord,
    routes::{create_router, AppState},
    services::{
        posters::{PosterError, PosterProvider},
        CredentialStore, PosterService, SessionStore, SimilarityIndex,
    },
};

const FALLBACK: &str = "https://img.test/none.png";

const POSTER_TIMEOUT: Duration = Duration::from_millis(300);

/// Serves a poster for every title except "D"; "C" hangs past the timeout
struct StubPosters;

#[async_trait::async_trait]
impl PosterProvider for StubPosters {
    async fn lookup(&self, title: &str) -> Result<String, PosterError> {
        match title {
            "D" => Err(PosterError::NoMatch),
            "C" => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("https://img.test/C.jpg".to_string())
            }
            _ => Ok(format!("https://img.test/{}.jpg", title)),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn create_test_server() -> (TempDir, TestServer) {
    create_test_server_with_ttl(Duration::from_secs(3600))
}

fn create_test_server_with_ttl(session_ttl: Duration) -> (TempDir, TestServer) {
    let dir = tempfile::tempdir().unwrap();

    let catalog = ["A", "B", "C", "D"]
        .iter()
        .enumerate()
        .map(|(i, title)| MovieRecord::new(i, *title))
        .collect();
    let matrix = vec![
        vec![1.0, 0.9, 0.1, 0.5],
        vec![0.9, 1.0, 0.3, 0.2],
        vec![0.1, 0.3, 1.0, 0.4],
        vec![0.5, 0.2, 0.4, 1.0],
    ];
    let index = SimilarityIndex::new(catalog, matrix).unwrap();

    let credentials = CredentialStore::new(dir.path().join("users.csv"));
    let posters = PosterService::new(Arc::new(StubPosters), FALLBACK, POSTER_TIMEOUT);
    let sessions = SessionStore::new(session_ttl);
    let state = Arc::new(AppState::new(credentials, index, posters, sessions, 2));

    (dir, TestServer::new(create_router(state)).unwrap())
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

async fn signup_and_login(server: &TestServer, username: &str, password: &str) -> String {
    server
        .post("/api/v1/auth/signup")
        .json(&json!({ "username": username, "password": password }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({ "username": username, "password": password }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let (_dir, server) = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_signup_creates_account() {
    let (dir, server) = create_test_server();

    let response = server
        .post("/api/v1/auth/signup")
        .json(&json!({ "username": "alice", "password": "pw1" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["username"], "alice");

    let store = CredentialStore::new(dir.path().join("users.csv"));
    assert!(store.verify("alice", "pw1").unwrap());
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let (dir, server) = create_test_server();
    signup_and_login(&server, "alice", "pw1").await;

    let response = server
        .post("/api/v1/auth/signup")
        .json(&json!({ "username": "alice", "password": "x" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    let store = CredentialStore::new(dir.path().join("users.csv"));
    assert_eq!(store.load().unwrap().len(), 1);
    assert!(store.verify("alice", "pw1").unwrap());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (_dir, server) = create_test_server();
    signup_and_login(&server, "alice", "pw1").await;

    let wrong_password = server
        .post("/api/v1/auth/login")
        .json(&json!({ "username": "alice", "password": "nope" }))
        .await;
    let unknown_user = server
        .post("/api/v1/auth/login")
        .json(&json!({ "username": "mallory", "password": "pw1" }))
        .await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_user.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.json::<Value>(), unknown_user.json::<Value>());
}

#[tokio::test]
async fn test_recommend_requires_session() {
    let (_dir, server) = create_test_server();

    server
        .post("/api/v1/recommendations")
        .json(&json!({ "title": "A" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .post("/api/v1/recommendations")
        .add_header(AUTHORIZATION, bearer(&uuid::Uuid::new_v4().to_string()))
        .json(&json!({ "title": "A" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_recommendation_flow() {
    let (_dir, server) = create_test_server();
    let token = signup_and_login(&server, "alice", "pw1").await;

    let response = server
        .post("/api/v1/recommendations")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "A" }))
        .await;

    response.assert_status_ok();
    let body: Vec<Value> = response.json();
    assert_eq!(
        body,
        vec![
            json!({ "title": "B", "score": 0.9, "poster_url": "https://img.test/B.jpg" }),
            json!({ "title": "D", "score": 0.5, "poster_url": FALLBACK }),
        ]
    );
}

#[tokio::test]
async fn test_recommendation_k_is_capped_by_catalog() {
    let (_dir, server) = create_test_server();
    let token = signup_and_login(&server, "alice", "pw1").await;

    let response = server
        .post("/api/v1/recommendations")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "C", "k": 10 }))
        .await;

    response.assert_status_ok();
    let titles: Vec<String> = response
        .json::<Vec<Value>>()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["D", "B", "A"]);
}

#[tokio::test]
async fn test_slow_poster_falls_back_without_stalling() {
    let (_dir, server) = create_test_server();
    let token = signup_and_login(&server, "alice", "pw1").await;

    let started = std::time::Instant::now();
    let response = server
        .post("/api/v1/recommendations")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "D", "k": 3 }))
        .await;

    response.assert_status_ok();
    assert!(started.elapsed() < Duration::from_secs(5));

    let body: Vec<Value> = response.json();
    let posters: Vec<(&str, &str)> = body
        .iter()
        .map(|r| (r["title"].as_str().unwrap(), r["poster_url"].as_str().unwrap()))
        .collect();
    assert_eq!(
        posters,
        vec![
            ("A", "https://img.test/A.jpg"),
            ("C", FALLBACK),
            ("B", "https://img.test/B.jpg"),
        ]
    );
}

#[tokio::test]
async fn test_recommendation_rejects_bad_requests() {
    let (_dir, server) = create_test_server();
    let token = signup_and_login(&server, "alice", "pw1").await;

    server
        .post("/api/v1/recommendations")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "Not A Movie" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .post("/api/v1/recommendations")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "A", "k": 0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_titles_lists_catalog() {
    let (_dir, server) = create_test_server();

    server
        .get("/api/v1/titles")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let token = signup_and_login(&server, "alice", "pw1").await;
    let response = server
        .get("/api/v1/titles")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let titles: Vec<MovieRecord> = response.json();
    assert_eq!(titles.len(), 4);
    assert_eq!(titles[3], MovieRecord::new(3, "D"));
}

#[tokio::test]
async fn test_me_and_logout() {
    let (_dir, server) = create_test_server();
    let token = signup_and_login(&server, "alice", "pw1").await;

    let response = server
        .get("/api/v1/auth/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["username"], "alice");

    server
        .post("/api/v1/auth/logout")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get("/api/v1/auth/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_is_unauthorized() {
    let (_dir, server) = create_test_server_with_ttl(Duration::ZERO);
    let token = signup_and_login(&server, "alice", "pw1").await;

    server
        .get("/api/v1/auth/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .post("/api/v1/recommendations")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "A" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (_dir, server) = create_test_server();
    let request_id = uuid::Uuid::new_v4().to_string();

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_str(&request_id).unwrap(),
        )
        .await;

    assert_eq!(response.header("x-request-id"), request_id.as_str());
}
