use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: &'static str,
    latency_ms: u64,
}

/// GET /health: pings the database through the pool
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let start = std::time::Instant::now();

    let database = match db_pool::acquire_with_metrics(&state.db, "chat-service").await {
        Ok(mut conn) => match sqlx::query("SELECT 1").execute(&mut *conn).await {
            Ok(_) => "healthy",
            Err(e) => {
                tracing::warn!(error = %e, "Health check query failed");
                "unhealthy"
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not acquire a connection");
            "unhealthy"
        }
    };

    let body = HealthResponse {
        status: if database == "healthy" { "ok" } else { "unavailable" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        latency_ms: start.elapsed().as_millis() as u64,
    };

    if database == "healthy" {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// GET /metrics
pub async fn metrics() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(actix_middleware::gather_metrics())
}
