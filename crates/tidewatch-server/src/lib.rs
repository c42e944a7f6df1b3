#![forbid(unsafe_code)]
//! HTTP surface of the tidewatch backend: route wiring, shared state and
//! per-request bookkeeping around the store, query and ingest crates.

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use std::time::Duration;
use tidewatch_ingest::UpstreamClient;
use tidewatch_store::{DatasetRepository, JsonFileStore};
use tokio::sync::Mutex;

pub mod config;
mod http;

pub use config::{validate_startup_config_contract, ServerConfig, CONFIG_SCHEMA_VERSION};

pub const CRATE_NAME: &str = "tidewatch-server";

/// Per-route request counts and latency samples, keyed by route template so
/// path parameters do not explode the cardinality.
#[derive(Default)]
pub(crate) struct RequestMetrics {
    counts: Mutex<HashMap<(String, u16), u64>>,
    latency_ns: Mutex<HashMap<String, Vec<u64>>>,
}

impl RequestMetrics {
    pub(crate) async fn observe_request(
        &self,
        route: &str,
        status: StatusCode,
        latency: Duration,
    ) {
        let mut counts = self.counts.lock().await;
        *counts
            .entry((route.to_string(), status.as_u16()))
            .or_insert(0) += 1;
        drop(counts);
        let mut latency_ns = self.latency_ns.lock().await;
        latency_ns
            .entry(route.to_string())
            .or_insert_with(Vec::new)
            .push(latency.as_nanos() as u64);
    }

    pub(crate) async fn totals(&self) -> (u64, usize) {
        let total = self.counts.lock().await.values().copied().sum();
        let routes = self.latency_ns.lock().await.len();
        (total, routes)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DatasetRepository>,
    pub upstream: Arc<UpstreamClient>,
    pub config: ServerConfig,
    pub(crate) metrics: Arc<RequestMetrics>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
    pub ready: Arc<AtomicBool>,
    pub accepting_requests: Arc<AtomicBool>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let store: Arc<dyn DatasetRepository> =
            Arc::new(JsonFileStore::new(config.data_root.clone()));
        let upstream = Arc::new(UpstreamClient::new(
            &config.upstream_base_url,
            &config.upstream_service_key,
            config.upstream_timeout,
        ));
        Self {
            store,
            upstream,
            config,
            metrics: Arc::new(RequestMetrics::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
            ready: Arc::new(AtomicBool::new(false)),
            accepting_requests: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Total observed requests and the number of distinct routes touched.
    pub async fn request_totals(&self) -> (u64, usize) {
        self.metrics.totals().await
    }
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/version", get(http::handlers::version_handler))
        .route(
            "/regions",
            get(http::regions::get_region_handler).put(http::regions::update_region_handler),
        )
        .route("/chart-data", get(http::regions::chart_data_handler))
        .route(
            "/pollution-sources",
            get(http::regions::pollution_sources_handler),
        )
        .route(
            "/species",
            get(http::species::list_species_handler).post(http::species::create_species_handler),
        )
        .route(
            "/species/:id",
            get(http::species::get_species_handler)
                .put(http::species::update_species_handler)
                .delete(http::species::delete_species_handler),
        )
        .route(
            "/real-data",
            get(http::observations::get_real_data_handler)
                .post(http::observations::refresh_real_data_handler),
        )
        .route(
            "/admin",
            get(http::admin::overview_handler).post(http::admin::backup_handler),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
