//! Risk Scoring Server
//!
//! HTTP front for the scoring core: online predictions against per-user
//! baselines and batch risk reports against the pre-trained outlier model.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   RISKSCORE SERVER                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌──────────────┐   ┌───────────────┐  │
//! │  │ /predict    │   │ /reports     │   │ /baselines    │  │
//! │  │ (online)    │   │ (batch CSV)  │   │ (rebuild)     │  │
//! │  └──────┬──────┘   └──────┬───────┘   └───────┬───────┘  │
//! │         ▼                 ▼                   ▼          │
//! │   BaselineTable    OutlierModelBundle    event log CSV   │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use parking_lot::RwLock;
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

use riskscore_core::{baseline, load_bundle, load_event_log, BaselineTable, OutlierModelBundle};

pub use config::Config;
pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    baselines: Arc<RwLock<Arc<BaselineTable>>>,
    pub model: Option<Arc<OutlierModelBundle>>,
}

impl AppState {
    pub fn new(config: Config, baselines: BaselineTable, model: Option<OutlierModelBundle>) -> Self {
        Self {
            config,
            baselines: Arc::new(RwLock::new(Arc::new(baselines))),
            model: model.map(Arc::new),
        }
    }

    /// Build state from the configured event log and model directory.
    ///
    /// Neither is fatal: a missing log gives an empty baseline table and a
    /// missing bundle disables batch scoring.
    pub fn load(config: Config) -> Self {
        let baselines = match load_event_log(&config.event_log_path) {
            Ok(events) => baseline::build(&events),
            Err(e) => {
                tracing::warn!("Event log unavailable ({}), starting with no baselines", e);
                BaselineTable::new()
            }
        };
        tracing::info!("Baselines ready for {} users", baselines.len());

        let model = match load_bundle(&config.model_dir) {
            Ok(bundle) => Some(bundle),
            Err(e) => {
                tracing::warn!("Model bundle unavailable ({}), batch scoring disabled", e);
                None
            }
        };

        Self::new(config, baselines, model)
    }

    /// Snapshot of the current baseline table
    pub fn baselines(&self) -> Arc<BaselineTable> {
        self.baselines.read().clone()
    }

    /// Swap in a freshly built table; readers keep their snapshot
    pub fn replace_baselines(&self, table: BaselineTable) {
        *self.baselines.write() = Arc::new(table);
    }

    pub fn require_model(&self) -> AppResult<Arc<OutlierModelBundle>> {
        self.model.clone().ok_or(AppError::ModelUnavailable)
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(handlers::health::check))

        // Online scoring
        .route("/predict", post(handlers::predict::predict))
        .route("/api/v1/predict", post(handlers::predict::predict))
        .route("/api/v1/predict/batch", post(handlers::predict::predict_batch))

        // Baselines
        .route("/api/v1/baselines/rebuild", post(handlers::baselines::rebuild))
        .route("/api/v1/baselines/:user_id", get(handlers::baselines::get))

        // Batch reports
        .route("/api/v1/reports/batch", post(handlers::reports::batch))

        // Model
        .route("/api/v1/model", get(handlers::model::info));

    let mut app = routes
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    if !state.config.is_production() {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        );
    }

    app.with_state(state)
}
