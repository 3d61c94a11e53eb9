use std::sync::Arc;

use sqlx::PgPool;

use crate::recommendation::pipeline::JobMatcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Model backend for job recommendations. Default: `LlmJobMatcher`.
    pub matcher: Arc<dyn JobMatcher>,
}
