/// Liveness probe.
#[utoipa::path(
    get,
    path = "/ping",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = String)
    )
)]
pub async fn ping() -> &'static str {
    "pong"
}
