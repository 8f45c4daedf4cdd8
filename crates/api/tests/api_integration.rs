//! API integration tests.
//!
//! The router runs against an in-memory `SQLite` database with migrations
//! applied, so requests exercise the full service stack.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware::from_fn_with_state,
};
use quill_api::{AppState, auth_middleware, router as api_router};
use quill_common::{
    IdGenerator, LocalStorage,
    config::{Config, DatabaseConfig, LogConfig, PaginationConfig, ServerConfig, StorageSettings},
};
use quill_db::test_utils::{insert_user, setup_test_db};
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_config(media_dir: PathBuf) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            url: "http://localhost:8000".to_string(),
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        storage: StorageSettings {
            base_path: media_dir,
            base_url: "/media".to_string(),
            max_avatar_bytes: 1024 * 1024,
        },
        pagination: PaginationConfig {
            default_page_size: 2,
            max_page_size: 100,
        },
        log: LogConfig::default(),
    }
}

/// Router plus seeded accounts: `alice` (token-u1), `bob` (token-u2) and
/// staff user `admin` (token-u3).
async fn create_test_router() -> Router {
    let db = Arc::new(setup_test_db().await.unwrap());
    insert_user(&db, "u1", "alice", false).await;
    insert_user(&db, "u2", "bob", false).await;
    insert_user(&db, "u3", "admin", true).await;

    let media_dir =
        std::env::temp_dir().join(format!("quill-api-{}", IdGenerator::new().generate()));
    let config = test_config(media_dir.clone());
    let storage = Arc::new(LocalStorage::new(media_dir, config.storage.base_url.clone()));
    let state = AppState::new(db, storage, &config);

    api_router()
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_post(app: &Router, token: &str, body: Value) -> Value {
    let (status, post) = send(app, "POST", "/posts/", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{post}");
    post
}

#[tokio::test]
async fn test_health() {
    let app = create_test_router().await;
    let (status, body) = send(&app, "GET", "/health/", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router().await;
    let (status, _) = send(&app, "GET", "/nope/", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = create_test_router().await;

    let (status, body) = send(
        &app,
        "POST",
        "/register/",
        None,
        Some(json!({
            "username": "Carol",
            "email": "carol@example.com",
            "password": "long enough",
            "confirm_password": "long enough",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["user"]["username"], "Carol");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/login/",
        None,
        Some(json!({"username": "carol", "password": "long enough"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"], token.as_str());

    let (status, me) = send(&app, "GET", "/auth/me/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "carol@example.com");
    assert_eq!(me["is_staff"], false);
    assert!(me.get("password").is_none());
}

#[tokio::test]
async fn test_register_rejects_duplicate_username() {
    let app = create_test_router().await;

    let (status, body) = send(
        &app,
        "POST",
        "/register/",
        None,
        Some(json!({
            "username": "ALICE",
            "email": "someone@example.com",
            "password": "long enough",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    assert_eq!(body["message"], "username ALICE is already taken.");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = create_test_router().await;

    let (status, body) = send(
        &app,
        "POST",
        "/login/",
        None,
        Some(json!({"username": "alice", "password": "whatever"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn test_writes_require_authentication() {
    let app = create_test_router().await;

    let (status, body) = send(&app, "POST", "/posts/", None, Some(json!({"title": "x"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, _) = send(&app, "GET", "/auth/me/", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_category_writes_require_staff() {
    let app = create_test_router().await;
    let payload = json!({"name": "Rust", "slug": "Rust"});

    let (status, body) = send(&app, "POST", "/categories/", Some("token-u1"), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "permission_denied");

    let (status, body) = send(&app, "POST", "/categories/", Some("token-u3"), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["slug"], "rust");

    let (status, body) = send(&app, "GET", "/categories/rust/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Rust");

    let (status, body) = send(&app, "GET", "/categories/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, _) = send(&app, "DELETE", "/categories/rust/", Some("token-u3"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/categories/rust/", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_lifecycle() {
    let app = create_test_router().await;
    send(&app, "POST", "/tags/", Some("token-u3"), Some(json!({"name": "Rust", "slug": "rust"}))).await;

    let post = create_post(
        &app,
        "token-u1",
        json!({"title": "Hello World!", "body": "", "tags": ["rust"]}),
    )
    .await;
    let id = post["id"].as_str().unwrap().to_string();
    assert_eq!(post["slug"], "hello-world");
    assert_eq!(post["status"], "DRAFT");
    assert_eq!(post["author"]["username"], "alice");
    assert_eq!(post["tags"][0]["slug"], "rust");
    assert_eq!(post["comments"], json!([]));

    let (status, body) = send(&app, "POST", &format!("/posts/{id}/publish/"), Some("token-u1"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Published post must have body.");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/posts/{id}/"),
        Some("token-u2"),
        Some(json!({"body": "hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You do not have permission to modify this post.");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/posts/{id}/"),
        Some("token-u1"),
        Some(json!({"body": "Some content", "status": "PUBLISHED"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "PUBLISHED");
    assert!(body["published_at"].is_string());
    assert_eq!(body["excerpt"], "Some content");

    let (status, body) = send(&app, "POST", &format!("/posts/{id}/unpublish/"), Some("token-u3"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "DRAFT");
    assert!(body["published_at"].is_null());

    let (status, _) = send(&app, "DELETE", &format!("/posts/{id}/"), Some("token-u1"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, "GET", &format!("/posts/{id}/"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Post not found.");
}

#[tokio::test]
async fn test_likes_bookmarks_and_counts() {
    let app = create_test_router().await;
    let post = create_post(&app, "token-u1", json!({"title": "Liked", "body": "text"})).await;
    let id = post["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let (status, body) = send(&app, "POST", &format!("/posts/{id}/like/"), Some("token-u2"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "liked"}));
    }
    let (status, body) = send(&app, "POST", &format!("/posts/{id}/bookmark/"), Some("token-u2"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "bookmarked"}));

    let (_, body) = send(&app, "GET", &format!("/posts/{id}/"), Some("token-u2"), None).await;
    assert_eq!(body["like_count"], 1);
    assert_eq!(body["is_liked_by_me"], true);
    assert_eq!(body["is_bookmarked_by_me"], true);

    let (_, body) = send(&app, "GET", &format!("/posts/{id}/"), None, None).await;
    assert_eq!(body["is_liked_by_me"], false);

    let (status, body) = send(&app, "GET", "/bookmarks/", Some("token-u2"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["id"], id.as_str());

    let (status, _) = send(&app, "DELETE", &format!("/posts/{id}/like/"), Some("token-u2"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &format!("/posts/{id}/like/"), Some("token-u2"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "GET", &format!("/posts/{id}/"), None, None).await;
    assert_eq!(body["like_count"], 0);

    let (status, _) = send(&app, "POST", "/posts/missing/like/", Some("token-u2"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comment_threads() {
    let app = create_test_router().await;
    let post = create_post(&app, "token-u1", json!({"title": "Threads", "body": "text"})).await;
    let post_id = post["id"].as_str().unwrap().to_string();

    let (status, top) = send(
        &app,
        "POST",
        "/comments/",
        Some("token-u2"),
        Some(json!({"post": post_id, "body": "first!"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{top}");
    assert_eq!(top["status"], "VISIBLE");
    let top_id = top["id"].as_str().unwrap().to_string();

    let (status, reply) = send(
        &app,
        "POST",
        "/comments/",
        Some("token-u1"),
        Some(json!({"post": post_id, "parent": top_id, "body": "thanks"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let reply_id = reply["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/comments/",
        Some("token-u2"),
        Some(json!({"post": post_id, "parent": reply_id, "body": "deeper"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "only one reply level allowed.");

    let (status, _) = send(&app, "POST", &format!("/comments/{reply_id}/like/"), Some("token-u2"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = send(&app, "GET", &format!("/posts/{post_id}/"), Some("token-u2"), None).await;
    assert_eq!(detail["comment_count"], 2);
    let comments = detail["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["id"], top_id.as_str());
    assert_eq!(comments[0]["author"]["username"], "bob");
    assert_eq!(comments[0]["replies"][0]["id"], reply_id.as_str());
    assert_eq!(comments[0]["replies"][0]["like_count"], 1);
    assert_eq!(comments[0]["replies"][0]["is_liked_by_me"], true);
    assert!(comments[0]["replies"][0].get("replies").is_none());

    let (status, body) = send(&app, "DELETE", &format!("/comments/{top_id}/"), Some("token-u1"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only author or admin can delete.");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/comments/{reply_id}/"),
        Some("token-u3"),
        Some(json!({"status": "HIDDEN"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = send(&app, "GET", &format!("/posts/{post_id}/"), None, None).await;
    assert_eq!(detail["comments"][0]["replies"], json!([]));

    let (status, _) = send(&app, "DELETE", &format!("/comments/{top_id}/"), Some("token-u2"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/comments/{reply_id}/"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_list_filters_and_pagination() {
    let app = create_test_router().await;
    send(&app, "POST", "/categories/", Some("token-u3"), Some(json!({"name": "News", "slug": "news"}))).await;

    create_post(&app, "token-u1", json!({"title": "One", "body": "b", "status": "PUBLISHED", "category": "news"})).await;
    create_post(&app, "token-u1", json!({"title": "Two", "body": "b"})).await;
    create_post(&app, "token-u2", json!({"title": "Three", "body": "needle", "status": "PUBLISHED"})).await;

    let (status, body) = send(&app, "GET", "/posts/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["page_size"], 2);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, "GET", "/posts/?page=2", None, None).await;
    assert_eq!(body["page"], 2);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, "GET", "/posts/?status=PUBLISHED&page_size=10", None, None).await;
    assert_eq!(body["count"], 2);

    let (_, body) = send(&app, "GET", "/posts/?category=news", None, None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["category"]["slug"], "news");

    let (_, body) = send(&app, "GET", "/posts/?author=BOB", None, None).await;
    assert_eq!(body["count"], 1);

    let (_, body) = send(&app, "GET", "/posts/?search=NEEDLE", None, None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["title"], "Three");
}

#[tokio::test]
async fn test_profile_read_and_multipart_update() {
    let app = create_test_router().await;

    let (status, body) = send(&app, "GET", "/me/profile/", Some("token-u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["avatar"].is_null());

    let boundary = "quill-boundary";
    let mut form = Vec::new();
    form.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"display_name\"\r\n\r\nAlice\r\n\
             --{boundary}\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    form.extend_from_slice(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR");
    form.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method("PATCH")
        .uri("/me/profile/")
        .header(header::AUTHORIZATION, "Bearer token-u1")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(form))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["display_name"], "Alice");
    assert!(body["avatar"].as_str().unwrap().starts_with("/media/avatars/u1/"));
}

#[tokio::test]
async fn test_rejected_comment_patch_keeps_status() {
    let app = create_test_router().await;
    let post = create_post(&app, "token-u1", json!({"title": "Moderated", "body": "text"})).await;
    let post_id = post["id"].as_str().unwrap();

    let (_, comment) = send(
        &app,
        "POST",
        "/comments/",
        Some("token-u2"),
        Some(json!({"post": post_id, "body": "hello"})),
    )
    .await;
    let comment_uri = format!("/comments/{}/", comment["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        "PATCH",
        &comment_uri,
        Some("token-u3"),
        Some(json!({"status": "HIDDEN", "body": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"code": "validation_error", "message": "comment body is required."})
    );

    let (_, stored) = send(&app, "GET", &comment_uri, None, None).await;
    assert_eq!(stored["status"], "VISIBLE");
    assert_eq!(stored["body"], "hello");

    let (status, updated) = send(
        &app,
        "PATCH",
        &comment_uri,
        Some("token-u3"),
        Some(json!({"status": "HIDDEN", "body": "edited"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "HIDDEN");
    assert_eq!(updated["body"], "edited");
}

#[tokio::test]
async fn test_malformed_requests_use_error_body() {
    let app = create_test_router().await;

    let (status, body) = send(&app, "POST", "/posts/", Some("token-u1"), Some(json!({"body": "no title"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, body) = send(&app, "GET", "/posts/?status=bogus", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let request = Request::builder()
        .method("POST")
        .uri("/categories/")
        .header(header::AUTHORIZATION, "Bearer token-u3")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn test_post_slug_folds_accents() {
    let app = create_test_router().await;
    let post = create_post(&app, "token-u1", json!({"title": "Café Déjà Vu", "body": "x"})).await;
    assert_eq!(post["slug"], "cafe-deja-vu");
}
