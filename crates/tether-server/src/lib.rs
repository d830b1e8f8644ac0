//! HTTP layer for Tether.
//!
//! Exposes an axum [`Router`] backed by any [`UnitOfWork`]. Every
//! `POST /identify` runs as one unit of work: the lookup, any mutations, and
//! the cluster re-read commit together or not at all.

pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tether_core::store::UnitOfWork;
use tower_http::trace::TraceLayer;

use handlers::{health, identify};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TETHER_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: UnitOfWork> {
  pub store: Arc<S>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the service router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: UnitOfWork + Clone + 'static,
  S::Error: From<tether_core::Error>,
{
  Router::new()
    .route("/identify", post(identify::handler::<S>))
    .route("/health", get(health::handler))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
