use actix_middleware::{gather_metrics, Logging, MetricsMiddleware, RequestId, RequestIdValue};
use actix_web::{test, web, App, HttpMessage, HttpRequest, HttpResponse};

async fn echo_request_id(req: HttpRequest) -> HttpResponse {
    let id = req
        .extensions()
        .get::<RequestIdValue>()
        .map(|v| v.0.clone())
        .unwrap_or_default();
    HttpResponse::Ok().body(id)
}

async fn failing_handler() -> HttpResponse {
    HttpResponse::InternalServerError().finish()
}

#[actix_web::test]
async fn test_request_id_is_generated_when_missing() {
    let app = test::init_service(
        App::new()
            .wrap(Logging)
            .wrap(RequestId::new())
            .route("/echo", web::get().to(echo_request_id)),
    )
    .await;

    let req = test::TestRequest::get().uri("/echo").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let header = resp
        .headers()
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .expect("response should carry x-request-id");
    assert!(uuid::Uuid::parse_str(&header).is_ok());

    let body = test::read_body(resp).await;
    assert_eq!(body, header.as_bytes());
}

#[actix_web::test]
async fn test_request_id_is_propagated_from_caller() {
    let app = test::init_service(
        App::new()
            .wrap(RequestId::new())
            .route("/echo", web::get().to(echo_request_id)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/echo")
        .insert_header(("x-request-id", "req-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(
        resp.headers().get("x-request-id").and_then(|h| h.to_str().ok()),
        Some("req-123")
    );
}

#[actix_web::test]
async fn test_metrics_use_route_pattern() {
    let app = test::init_service(
        App::new()
            .wrap(MetricsMiddleware)
            .route("/items/{id}", web::get().to(failing_handler)),
    )
    .await;

    let req = test::TestRequest::get().uri("/items/abc").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let rendered = gather_metrics();
    assert!(rendered.contains("http_requests_total"));
    assert!(rendered.contains("path=\"/items/{id}\""));
    assert!(!rendered.contains("/items/abc"));
}
