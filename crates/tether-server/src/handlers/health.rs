//! `GET /health` — liveness check.

pub async fn handler() -> &'static str { "ok" }
