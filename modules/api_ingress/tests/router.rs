use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tower::util::ServiceExt;
use tracing_test::traced_test;

use api_ingress::{ApiIngress, ApiIngressConfig};

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn root_returns_welcome_message() {
    let app = ApiIngress::default().build_router(Router::new());
    let resp = app.oneshot(get_req("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        json_body(resp).await["message"],
        "Welcome to Church App API"
    );
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = ApiIngress::default().build_router(Router::new());
    let resp = app.oneshot(get_req("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn module_routes_are_merged() {
    let api = Router::new().route("/ping", get(|| async { "pong" }));
    let app = ApiIngress::default().build_router(api);
    let resp = app.oneshot(get_req("/ping")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_problem_json() {
    let app = ApiIngress::default().build_router(Router::new());
    let resp = app.oneshot(get_req("/nowhere")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
    let body = json_body(resp).await;
    assert_eq!(body["code"], "ROUTE_NOT_FOUND");
    assert_eq!(body["instance"], "/nowhere");
}

#[tokio::test]
async fn cors_preflight_allowed_when_enabled() {
    let app = ApiIngress::default().build_router(Router::new());
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/health")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert!(resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn cors_headers_absent_when_disabled() {
    let ingress = ApiIngress::new(ApiIngressConfig {
        cors_enabled: false,
        ..Default::default()
    });
    let app = ingress.build_router(Router::new());
    let req = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert!(!resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let ingress = ApiIngress::new(ApiIngressConfig {
        body_limit_bytes: 16,
        ..Default::default()
    });
    let api = Router::new().route("/upload", post(|body: String| async move { body }));
    let app = ingress.build_router(api);
    let req = Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(header::CONTENT_LENGTH, "64")
        .body(Body::from(vec![b'a'; 64]))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn docs_routes_follow_config() {
    let doc = utoipa::openapi::OpenApiBuilder::new()
        .info(utoipa::openapi::InfoBuilder::new().title("t").version("1").build())
        .build();

    let off = ApiIngress::default()
        .with_openapi(doc.clone())
        .build_router(Router::new());
    let resp = off.oneshot(get_req("/openapi.json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let on = ApiIngress::new(ApiIngressConfig {
        enable_docs: true,
        ..Default::default()
    })
    .with_openapi(doc)
    .build_router(Router::new());
    let resp = on.clone().oneshot(get_req("/openapi.json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["info"]["title"], "t");

    let resp = on.oneshot(get_req("/docs")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[traced_test]
async fn requests_are_traced_with_request_id() {
    let app = ApiIngress::default().build_router(Router::new());
    let req = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-42")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(logs_contain("http_request"));
    assert!(logs_contain("trace-me-42"));
}

#[tokio::test]
async fn serve_listener_stops_on_shutdown() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let app = ApiIngress::default().build_router(Router::new());
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(api_ingress::serve_listener(listener, app, async move {
        let _ = rx.await;
    }));
    tx.send(()).unwrap();
    let res = tokio::time::timeout(std::time::Duration::from_secs(5), server)
        .await
        .expect("server should stop")
        .unwrap();
    assert!(res.is_ok());
}
