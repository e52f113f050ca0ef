use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use blogx::{app::build_app, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "----blogx-test-boundary";

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn json_req(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut b = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        b = b.header(header::COOKIE, c);
    }
    b.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().uri(uri);
    if let Some(c) = cookie {
        b = b.header(header::COOKIE, c);
    }
    b.body(Body::empty()).unwrap()
}

fn multipart_post(cookie: Option<&str>, title: &str, body: &str, file: Option<(&str, &str, Vec<u8>)>) -> Request<Body> {
    let mut payload = Vec::new();
    for (name, value) in [("title", title), ("body", body)] {
        payload.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    if let Some((file_name, content_type, data)) = file {
        payload.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"coverImage\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        payload.extend_from_slice(&data);
        payload.extend_from_slice(b"\r\n");
    }
    payload.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut b = Request::builder()
        .method("POST")
        .uri("/blog")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(c) = cookie {
        b = b.header(header::COOKIE, c);
    }
    b.body(Body::from(payload)).unwrap()
}

/// Registers and signs in, returning the `name=value` cookie pair.
async fn sign_up_and_in(app: &Router, name: &str, email: &str) -> String {
    let (status, _, _) = send(
        app,
        json_req(
            "POST",
            "/user/signup",
            None,
            json!({ "full_name": name, "email": email, "password": "password123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, headers, body) = send(
        app,
        json_req("POST", "/user/signin", None, json!({ "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], email);

    let set_cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("session cookie set");
    assert!(set_cookie.contains("HttpOnly"));
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn anonymous_and_tampered_cookies_are_treated_alike() {
    let app = build_app(AppState::fake());

    let (status, _, body) = send(&app, get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], Value::Null);
    assert_eq!(body["blogs"], json!([]));

    let (status, _, body) = send(&app, get("/", Some("token=definitely.not.valid"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], Value::Null);

    let (status, _, _) = send(&app, get("/me", Some("token=definitely.not.valid"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn restricted_page_redirects_anonymous_visitors() {
    let app = build_app(AppState::fake());
    let res = app.clone().oneshot(get("/blog/add-new", None)).await.unwrap();
    assert!(res.status().is_redirection());
    assert_eq!(res.headers()[header::LOCATION], "/user/signin");

    let cookie = sign_up_and_in(&app, "Ada", "ada@example.com").await;
    let (status, _, body) = send(&app, get("/blog/add-new", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ada@example.com");
}

#[tokio::test]
async fn sign_in_failures_share_one_message() {
    let app = build_app(AppState::fake());
    sign_up_and_in(&app, "Ada", "ada@example.com").await;

    let (s1, _, b1) = send(
        &app,
        json_req("POST", "/user/signin", None, json!({ "email": "ada@example.com", "password": "wrong-pass" })),
    )
    .await;
    let (s2, _, b2) = send(
        &app,
        json_req("POST", "/user/signin", None, json!({ "email": "who@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(b1, b2);

    let (status, _, _) = send(
        &app,
        json_req(
            "POST",
            "/user/signup",
            None,
            json!({ "full_name": "Ada", "email": "ada@example.com", "password": "password123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn post_lifecycle_over_http() {
    let app = build_app(AppState::fake());
    let owner = sign_up_and_in(&app, "Owner", "owner@example.com").await;
    let other = sign_up_and_in(&app, "Other", "other@example.com").await;

    // anonymous create
    let (status, _, _) = send(&app, multipart_post(None, "Title", "Body", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // empty title
    let (status, _, _) = send(&app, multipart_post(Some(&owner), "", "hello", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // non-image attachment
    let (status, _, _) = send(
        &app,
        multipart_post(Some(&owner), "Title", "Body", Some(("notes.txt", "text/plain", b"hi".to_vec()))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // oversized image
    let (status, _, _) = send(
        &app,
        multipart_post(Some(&owner), "Title", "Body", Some(("big.png", "image/png", vec![0u8; 6 * 1024 * 1024]))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, headers, post) = send(
        &app,
        multipart_post(Some(&owner), " My post ", "Hello", Some(("cover.PNG", "image/png", vec![1u8; 1024]))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["title"], "My post");
    let id = post["id"].as_str().unwrap().to_string();
    assert_eq!(headers[header::LOCATION], format!("/blog/{id}"));
    let cover = post["cover_image_url"].as_str().unwrap();
    assert!(cover.starts_with("/uploads/blog-") && cover.ends_with(".png"));

    // comments
    let comments_uri = format!("/blog/{id}/comments");
    let (status, _, _) = send(&app, json_req("POST", &comments_uri, None, json!({ "content": "hi" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = send(&app, json_req("POST", &comments_uri, Some(&other), json!({ "content": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _, comment) =
        send(&app, json_req("POST", &comments_uri, Some(&other), json!({ "content": " nice " }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["content"], "nice");
    assert_eq!(comment["created_by"]["full_name"], "Other");

    let missing = format!("/blog/{}/comments", uuid::Uuid::new_v4());
    let (status, _, _) = send(&app, json_req("POST", &missing, Some(&other), json!({ "content": "hello" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // view
    let (status, _, page) = send(&app, get(&format!("/blog/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["blog"]["created_by"]["email"], "owner@example.com");
    assert_eq!(page["blog"]["comments"].as_array().unwrap().len(), 1);

    // delete
    let delete = |cookie: Option<&str>| {
        let mut b = Request::builder().method("DELETE").uri(format!("/blog/{id}"));
        if let Some(c) = cookie {
            b = b.header(header::COOKIE, c);
        }
        b.body(Body::empty()).unwrap()
    };
    let (status, _, _) = send(&app, delete(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = send(&app, delete(Some(&other))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, _) = send(&app, delete(Some(&owner))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&app, get(&format!("/blog/{id}"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, _, home) = send(&app, get("/", Some(&owner))).await;
    assert_eq!(home["blogs"], json!([]));
    assert_eq!(home["user"]["email"], "owner@example.com");
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let app = build_app(AppState::fake());
    let res = app.clone().oneshot(get("/user/logout", None)).await.unwrap();
    assert!(res.status().is_redirection());
    let set_cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("token=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}
