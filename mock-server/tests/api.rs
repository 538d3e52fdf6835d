use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, ApiError, Echo, User, FORM_BODY};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- users ---

#[tokio::test]
async fn list_users_empty() {
    let resp = app().oneshot(empty_request("GET", "/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<User> = body_json(resp).await;
    assert!(users.is_empty());
}

#[tokio::test]
async fn create_user_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/users", r#"{"name":"ada"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: User = body_json(resp).await;
    assert_eq!(user.id, 1);
    assert_eq!(user.name, "ada");
    assert!(user.email.is_none());
}

#[tokio::test]
async fn create_user_missing_name_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/users", r#"{"email":"ada@example.com"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_user_not_found_has_error_body() {
    let resp = app().oneshot(empty_request("GET", "/users/42")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let error: ApiError = body_json(resp).await;
    assert_eq!(error.status, 404);
    assert_eq!(error.message, "user 42 not found");
}

#[tokio::test]
async fn get_user_bad_id_returns_400() {
    let resp = app().oneshot(empty_request("GET", "/users/abc")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_user_not_found() {
    let resp = app()
        .oneshot(json_request("PATCH", "/users/7", r#"{"name":"nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_user_not_found() {
    let resp = app().oneshot(empty_request("DELETE", "/users/7")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/users", r#"{"name":"grace"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: User = body_json(resp).await;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            &format!("/users/{}", created.id),
            r#"{"email":"grace@example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let patched: User = body_json(resp).await;
    assert_eq!(patched.name, "grace");
    assert_eq!(patched.email.as_deref(), Some("grace@example.com"));

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/users/{}", created.id),
            r#"{"name":"hopper"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let replaced: User = body_json(resp).await;
    assert_eq!(replaced.name, "hopper");
    assert!(replaced.email.is_none());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/users/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/users"))
        .await
        .unwrap();
    let users: Vec<User> = body_json(resp).await;
    assert!(users.is_empty());
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_request() {
    let request = Request::builder()
        .method("PUT")
        .uri("/echo?page=2")
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-trace", "abc")
        .body("a=1&b=2".to_string())
        .unwrap();
    let resp = app().oneshot(request).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.path, "/echo");
    assert_eq!(echo.query.as_deref(), Some("page=2"));
    assert_eq!(echo.content_type.as_deref(), Some("application/x-www-form-urlencoded"));
    assert!(echo.headers.contains(&("x-trace".to_string(), "abc".to_string())));
    assert_eq!(echo.body, "a=1&b=2");
}

#[tokio::test]
async fn echo_accepts_any_method() {
    for method in ["GET", "DELETE", "OPTIONS", "PATCH"] {
        let resp = app().oneshot(empty_request(method, "/echo")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{method}");
        let echo: Echo = body_json(resp).await;
        assert_eq!(echo.method, method);
        assert!(echo.body.is_empty());
    }
}

// --- status / form / text ---

#[tokio::test]
async fn status_route_answers_requested_code() {
    let resp = app().oneshot(empty_request("GET", "/status/503")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let error: ApiError = body_json(resp).await;
    assert_eq!(error.status, 503);
    assert_eq!(error.message, "Service Unavailable");
}

#[tokio::test]
async fn status_route_rejects_out_of_range_code() {
    let resp = app().oneshot(empty_request("GET", "/status/1000")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn form_route_is_urlencoded() {
    let resp = app().oneshot(empty_request("GET", "/form")).await.unwrap();

    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "application/x-www-form-urlencoded"
    );
    assert_eq!(body_bytes(resp).await, FORM_BODY.as_bytes());
}

#[tokio::test]
async fn text_route_is_plain_text() {
    let resp = app().oneshot(empty_request("GET", "/text")).await.unwrap();

    let content_type = resp.headers()[http::header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body_bytes(resp).await, "plain text");
}
