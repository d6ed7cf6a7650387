//! # Actix Middleware Library
//!
//! Cross-cutting HTTP middleware shared by the chat backend.
//!
//! ## Modules
//! - `request_id`: X-Request-ID propagation
//! - `logging`: request/response logging through tracing
//! - `metrics`: Prometheus request metrics

pub mod logging;
pub mod metrics;
pub mod request_id;

pub use logging::Logging;
pub use metrics::{gather_metrics, MetricsMiddleware};
pub use request_id::{RequestId, RequestIdValue};
