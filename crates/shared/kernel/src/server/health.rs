use axum::Json;
use axum::http::header;
use axum::response::IntoResponse;
use hq_derive::{api_handler, api_model};
use hq_domain::constants::SYSTEM_TAG;
use std::sync::LazyLock;
use std::time::Instant;

static STARTED_AT: LazyLock<Instant> = LazyLock::new(Instant::now);

#[api_model]
pub(super) struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Seconds since the first health probe.
    uptime: u64,
}

#[api_handler(
    get,
    path = "/health",
    responses((status = OK, description = "Service is up", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health() -> impl IntoResponse {
    let body = HealthResponse {
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
        uptime: STARTED_AT.elapsed().as_secs(),
    };

    ([(header::CACHE_CONTROL, "no-store")], Json(body))
}
