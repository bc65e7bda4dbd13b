//! REST surface tests: the full router (routes plus middleware) driven with
//! `tower::ServiceExt::oneshot`.

mod common;

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use users_directory::api::rest::dto::{BlockResultDto, UserDto};
use users_directory::api::rest::problem::APPLICATION_PROBLEM_JSON;
use users_directory::config::{TokenConfig, UsersDirectoryConfig};
use users_directory::UsersDirectory;

use common::create_test_db;

async fn test_router() -> Router {
    create_test_directory_router(UsersDirectoryConfig::default()).await
}

async fn create_test_directory_router(cfg: UsersDirectoryConfig) -> Router {
    let db = create_test_db().await;
    UsersDirectory::init(db, &cfg).router(Duration::from_secs(30), false)
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn bearer(id: i32, secret: &str) -> String {
    let token = encode(
        &Header::default(),
        &json!({ "id": id }),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();
    format!("Bearer {token}")
}

/// Token with an arbitrary header and a signature nobody can check.
fn foreign_bearer(alg: &str, id: i32) -> String {
    let part = |v: Value| URL_SAFE_NO_PAD.encode(v.to_string());
    format!(
        "Bearer {}.{}.{}",
        part(json!({"alg": alg, "typ": "JWT"})),
        part(json!({"id": id})),
        if alg == "none" { "" } else { "c2lnbmF0dXJl" }
    )
}

fn search_as(uri: &str, auth: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, auth)
        .body(Body::empty())
        .unwrap()
}

async fn create(router: &Router, username: &str, birthdate: &str) -> UserDto {
    let (status, body) = send(
        router,
        json_req(
            "POST",
            "/users",
            json!({
                "name": "Ada",
                "surname": "Lovelace",
                "username": username,
                "birthdate": birthdate,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn create_returns_201_then_409_on_duplicate() {
    let router = test_router().await;
    let ada = create(&router, "ada", "1990-01-01").await;
    assert_eq!(ada.username, "ada");

    let (status, body) = send(
        &router,
        json_req(
            "POST",
            "/users",
            json!({"name": "A", "surname": "L", "username": "ada", "birthdate": "1991-02-02"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "USERS_USERNAME_CONFLICT");
    assert_eq!(body["status"], 409);
}

#[tokio::test]
async fn malformed_bodies_are_problem_400() {
    let router = test_router().await;

    let req = Request::builder()
        .method("POST")
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        APPLICATION_PROBLEM_JSON
    );

    let (status, body) = send(
        &router,
        json_req("POST", "/users", json!({"name": "A", "surname": "B", "username": "c", "birthdate": "yesterday"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "USERS_MALFORMED_BODY");

    let (status, body) = send(
        &router,
        json_req("POST", "/users", json!({"name": "", "surname": "B", "username": "c", "birthdate": "1990-01-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "USERS_VALIDATION");
}

#[tokio::test]
async fn get_update_delete_lifecycle() {
    let router = test_router().await;
    let ada = create(&router, "ada", "1990-01-01").await;
    let path = format!("/users/{}", ada.id);

    let (status, body) = send(&router, get(&path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["birthdate"], "1990-01-01");

    let (status, body) = send(&router, json_req("PUT", &path, json!({"surname": "King"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["surname"], "King");
    assert_eq!(body["name"], "Ada");

    let (status, body) = send(
        &router,
        Request::builder()
            .method("DELETE")
            .uri(&path)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = send(&router, get(&path)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USERS_NOT_FOUND");
    assert_eq!(body["instance"], path);

    let (status, _) = send(&router, get("/users/not-a-number")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_returns_all_users_in_id_order() {
    let router = test_router().await;
    let (status, body) = send(&router, get("/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    create(&router, "ada", "1990-01-01").await;
    create(&router, "grace", "1985-01-01").await;

    let (status, body) = send(&router, get("/users")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["ada", "grace"]);
}

#[tokio::test]
async fn block_then_search_hides_blocked_user() {
    let router = test_router().await;
    let a = create(&router, "ada", "1990-01-01").await;
    let b = create(&router, "adam", "1990-01-01").await;

    let (status, body) = send(
        &router,
        json_req("POST", "/block", json!({"blockerId": a.id, "blockedId": b.id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let result: BlockResultDto = serde_json::from_value(body).unwrap();
    assert_eq!(result.result.id, a.id);
    assert_eq!(result.result.blocked_user_ids, vec![b.id]);

    let (status, body) =
        send(&router, search_as("/users/search?username=ad", &bearer(a.id, "any"))).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap() as i32)
        .collect();
    assert_eq!(ids, vec![a.id]);

    let (status, _) = send(
        &router,
        json_req("DELETE", "/block", json!({"blockerId": a.id, "blockedId": b.id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) =
        send(&router, search_as("/users/search?username=ad", &bearer(a.id, "any"))).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn block_errors_map_to_400_and_404() {
    let router = test_router().await;
    let a = create(&router, "ada", "1990-01-01").await;

    let (status, _) = send(
        &router,
        json_req("POST", "/block", json!({"blockerId": a.id, "blockedId": a.id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        json_req("POST", "/block", json!({"blockerId": a.id, "blockedId": 999})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USERS_BLOCKED_NOT_FOUND");

    let (status, body) = send(
        &router,
        json_req("DELETE", "/block", json!({"blockerId": 999, "blockedId": a.id})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USERS_BLOCKER_NOT_FOUND");

    let (status, _) = send(&router, json_req("POST", "/block", json!({"blockerId": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_status_codes() {
    let router = test_router().await;
    let a = create(&router, "ada", "1990-01-01").await;

    // no token
    let (status, body) = send(&router, get("/users/search")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "USERS_INVALID_QUERY");

    // undecodable token
    let (status, _) = send(&router, search_as("/users/search", "Bearer nope")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // unknown requester
    let (status, _) = send(&router, search_as("/users/search", &bearer(12345, "k"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // bad ages
    let auth = bearer(a.id, "k");
    for uri in [
        "/users/search?minAge=abc",
        "/users/search?maxAge=-3",
        "/users/search?maxAge=121",
    ] {
        let (status, _) = send(&router, search_as(uri, &auth)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }

    // empty age values are ignored
    let (status, body) = send(&router, search_as("/users/search?minAge=&maxAge=", &auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn verified_tokens_require_the_configured_secret() {
    let cfg = UsersDirectoryConfig {
        token: TokenConfig {
            verify_secret: Some("s3cret".into()),
        },
        ..Default::default()
    };
    let router = create_test_directory_router(cfg).await;
    let a = create(&router, "ada", "1990-01-01").await;

    let (status, _) = send(&router, search_as("/users/search", &bearer(a.id, "s3cret"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, search_as("/users/search", &bearer(a.id, "forged"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_reads_identity_from_any_token_algorithm() {
    let router = test_router().await;
    let a = create(&router, "ada", "1990-01-01").await;
    let b = create(&router, "bob", "1990-01-01").await;
    let (status, _) = send(
        &router,
        json_req("POST", "/block", json!({"blockerId": a.id, "blockedId": b.id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    for alg in ["RS256", "ES256", "none"] {
        let (status, body) =
            send(&router, search_as("/users/search", &foreign_bearer(alg, a.id))).await;
        assert_eq!(status, StatusCode::OK, "{alg}: {body}");
        let ids: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![i64::from(a.id)], "{alg}");
    }
}

#[tokio::test]
async fn request_id_is_generated_or_propagated() {
    let router = test_router().await;

    let resp = router.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let req = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "abc-123");
}

#[tokio::test]
async fn problems_carry_the_request_id() {
    let router = test_router().await;

    let req = Request::builder()
        .uri("/users/999")
        .header("x-request-id", "req-789")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["request_id"], "req-789");

    // generated ids are echoed in the header and the body alike
    let resp = router.clone().oneshot(get("/users/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let header_id = resp.headers().get("x-request-id").unwrap().to_str().unwrap().to_owned();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["request_id"], header_id.as_str());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let router = test_router().await;
    let (status, body) = send(&router, get("/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/users/search"]["get"].is_object());
    assert!(body["components"]["schemas"]["UserDto"].is_object());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let router = test_router().await;
    let huge = "x".repeat(2 * 1024 * 1024);
    let body =
        json!({"name": huge, "surname": "B", "username": "c", "birthdate": "1990-01-01"})
            .to_string();
    let req = Request::builder()
        .method("POST")
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
