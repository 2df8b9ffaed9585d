use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use firstlink_admin::AdminService;
use firstlink_core::{FirstVisitPolicy, Slug, StorageError, VisitorId};
use firstlink_gateway::{App, AppState};
use firstlink_redirector::{Redirector, RedirectorError, Resolution};
use firstlink_storage::InMemoryRepository;
use serde_json::{json, Value};
use tower::ServiceExt;

const FIRST_URL: &str = "https://first.example/welcome";
const NEXT_URL: &str = "https://next.example/home";

fn app(policy: FirstVisitPolicy) -> Router {
    App::router(AppState::from_store(InMemoryRepository::new(), policy))
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/redirects")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn visit(slug: &str, ip: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(format!("/{slug}"));
    if let Some(ip) = ip {
        builder = builder.header("x-forwarded-for", ip);
    }
    builder.body(Body::empty()).unwrap()
}

async fn create(app: &Router, slug: &str) -> Value {
    let response = send(
        app,
        post_json(json!({ "slug": slug, "firstUrl": FIRST_URL, "nextUrl": NEXT_URL })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

async fn redirect_location(app: &Router, slug: &str, ip: Option<&str>) -> String {
    let response = send(app, visit(slug, ip)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    location(&response).to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app(FirstVisitPolicy::PerVisitor);

    let response = send(&app, get("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn per_visitor_sends_each_visitor_to_first_url_once() {
    let app = app(FirstVisitPolicy::PerVisitor);
    create(&app, "launch").await;

    assert_eq!(redirect_location(&app, "launch", Some("1.1.1.1")).await, FIRST_URL);
    assert_eq!(redirect_location(&app, "launch", Some("1.1.1.1")).await, NEXT_URL);
    assert_eq!(redirect_location(&app, "launch", Some("2.2.2.2")).await, FIRST_URL);
    assert_eq!(
        redirect_location(&app, "launch", Some("2.2.2.2, 10.0.0.1")).await,
        NEXT_URL
    );
}

#[tokio::test]
async fn per_visitor_without_headers_shares_loopback_identity() {
    let app = app(FirstVisitPolicy::PerVisitor);
    create(&app, "launch").await;

    assert_eq!(redirect_location(&app, "launch", None).await, FIRST_URL);
    assert_eq!(redirect_location(&app, "launch", None).await, NEXT_URL);
    assert_eq!(
        redirect_location(&app, "launch", Some("127.0.0.1")).await,
        NEXT_URL
    );
}

#[tokio::test]
async fn per_visitor_handles_oversized_identities() {
    let app = app(FirstVisitPolicy::PerVisitor);
    create(&app, "launch").await;
    let prefix = "9".repeat(300);
    let first = format!("{prefix}1");
    let second = format!("{prefix}2");

    assert_eq!(redirect_location(&app, "launch", Some(first.as_str())).await, FIRST_URL);
    assert_eq!(redirect_location(&app, "launch", Some(first.as_str())).await, NEXT_URL);
    assert_eq!(redirect_location(&app, "launch", Some(second.as_str())).await, FIRST_URL);
}

#[tokio::test]
async fn global_policy_awards_first_visit_once_across_visitors() {
    let app = app(FirstVisitPolicy::Global);
    create(&app, "launch").await;

    assert_eq!(redirect_location(&app, "launch", Some("1.1.1.1")).await, FIRST_URL);
    assert_eq!(redirect_location(&app, "launch", Some("2.2.2.2")).await, NEXT_URL);
    assert_eq!(redirect_location(&app, "launch", Some("1.1.1.1")).await, NEXT_URL);
}

#[tokio::test]
async fn atomic_global_policy_has_single_winner_under_concurrency() {
    let app = app(FirstVisitPolicy::AtomicGlobal);
    create(&app, "launch").await;

    let mut handles = vec![];
    for i in 0..16 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let ip = format!("10.0.0.{i}");
            redirect_location(&app, "launch", Some(ip.as_str())).await
        }));
    }

    let mut firsts = 0;
    for handle in handles {
        let destination = handle.await.unwrap();
        if destination == FIRST_URL {
            firsts += 1;
        } else {
            assert_eq!(destination, NEXT_URL);
        }
    }
    assert_eq!(firsts, 1);
}

#[tokio::test]
async fn redirect_is_not_cacheable() {
    let app = app(FirstVisitPolicy::PerVisitor);
    create(&app, "launch").await;

    let response = send(&app, visit("launch", Some("1.1.1.1"))).await;

    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
}

#[tokio::test]
async fn unknown_slug_is_not_found() {
    let app = app(FirstVisitPolicy::PerVisitor);

    for uri in ["/missing", "/a.b", "/x"] {
        let response = send(&app, get(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Redirect not found" })
        );
    }
}

#[tokio::test]
async fn create_builds_link_from_request_headers() {
    let app = app(FirstVisitPolicy::PerVisitor);

    let body = create(&app, "launch").await;
    assert_eq!(
        body,
        json!({ "slug": "launch", "link": "http://localhost:3000/launch" })
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/redirects")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::HOST, "go.example")
        .header("x-forwarded-proto", "https")
        .body(Body::from(
            json!({ "slug": "other", "firstUrl": FIRST_URL, "nextUrl": NEXT_URL }).to_string(),
        ))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["link"], "https://go.example/other");
}

#[tokio::test]
async fn create_prefers_configured_public_base_url() {
    let state = AppState::from_store(InMemoryRepository::new(), FirstVisitPolicy::PerVisitor)
        .with_public_base_url("https://fl.example/");
    let app = App::router(state);

    let body = create(&app, "launch").await;

    assert_eq!(body["link"], "https://fl.example/launch");
}

#[tokio::test]
async fn create_rejects_slugs_shadowed_by_routes() {
    let app = app(FirstVisitPolicy::PerVisitor);

    for slug in ["health", "api"] {
        let response = send(
            &app,
            post_json(json!({ "slug": slug, "firstUrl": FIRST_URL, "nextUrl": NEXT_URL })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{slug}");
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Invalid slug format" })
        );
    }

    let response = send(&app, get("/health")).await;
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    let list = json_body(send(&app, get("/api/redirects")).await).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn create_rejects_duplicate_slug() {
    let app = app(FirstVisitPolicy::PerVisitor);
    create(&app, "launch").await;

    let response = send(
        &app,
        post_json(json!({ "slug": "launch", "firstUrl": FIRST_URL, "nextUrl": NEXT_URL })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Slug already exists" })
    );
}

#[tokio::test]
async fn create_validates_input() {
    let app = app(FirstVisitPolicy::PerVisitor);

    let response = send(&app, post_json(json!({ "slug": "launch", "firstUrl": FIRST_URL }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Missing required fields: slug, firstUrl, nextUrl" })
    );

    let response = send(
        &app,
        post_json(json!({ "slug": "launch", "firstUrl": "not-a-url", "nextUrl": NEXT_URL })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Invalid URL format" })
    );

    let response = send(
        &app,
        post_json(json!({ "slug": "no spaces", "firstUrl": FIRST_URL, "nextUrl": NEXT_URL })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_rejects_malformed_body() {
    let app = app(FirstVisitPolicy::PerVisitor);

    let request = Request::builder()
        .method("POST")
        .uri("/api/redirects")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn list_get_and_delete_redirects() {
    let app = app(FirstVisitPolicy::PerVisitor);
    create(&app, "launch").await;
    redirect_location(&app, "launch", Some("1.1.1.1")).await;

    let list = json_body(send(&app, get("/api/redirects")).await).await;
    let entries = list.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["slug"], "launch");
    assert_eq!(entries[0]["firstUrl"], FIRST_URL);
    assert_eq!(entries[0]["nextUrl"], NEXT_URL);
    assert_eq!(entries[0]["visitCount"], 1);
    let id = entries[0]["id"].as_u64().unwrap();

    let response = send(&app, get(&format!("/api/redirects/{id}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["slug"], "launch");

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/redirects/{id}"))
        .body(Body::empty())
        .unwrap();
    let response = send(&app, delete).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "message": "Redirect deleted successfully", "slug": "launch" })
    );

    let response = send(&app, get(&format!("/api/redirects/{id}"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = send(&app, visit("launch", Some("1.1.1.1"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_redirect_id_is_not_found() {
    let app = app(FirstVisitPolicy::PerVisitor);

    for uri in ["/api/redirects/999", "/api/redirects/abc"] {
        let response = send(&app, get(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Redirect not found" })
        );
    }
}

struct BrokenRedirector;

#[async_trait]
impl Redirector for BrokenRedirector {
    async fn resolve(
        &self,
        _slug: &Slug,
        _visitor: Option<&VisitorId>,
    ) -> Result<Resolution, RedirectorError> {
        Err(StorageError::Unavailable("connection refused".to_string()).into())
    }
}

#[tokio::test]
async fn storage_failure_is_internal_error() {
    let state = AppState::new(
        Arc::new(BrokenRedirector),
        Arc::new(AdminService::new(InMemoryRepository::new())),
    );
    let app = App::router(state);

    let response = send(&app, visit("launch", Some("1.1.1.1"))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Internal server error" })
    );
}
