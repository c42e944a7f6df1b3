#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tidewatch_ingest::{DEFAULT_BASE_URL, DEFAULT_UPSTREAM_TIMEOUT};
use tidewatch_server::{build_router, validate_startup_config_contract, AppState, ServerConfig};
use tokio::net::TcpSocket;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => match value.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => true,
            "0" | "false" | "FALSE" | "no" | "NO" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    let ms = std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}

fn env_string(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("TIDEWATCH_LOG_JSON", true) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => return,
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(_) => return,
        };
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let config = ServerConfig {
        data_root: PathBuf::from(env_string("TIDEWATCH_DATA_ROOT", "data")),
        max_body_bytes: env_usize("TIDEWATCH_MAX_BODY_BYTES", 64 * 1024),
        upstream_base_url: env_string("TIDEWATCH_UPSTREAM_BASE_URL", DEFAULT_BASE_URL),
        upstream_service_key: std::env::var("TIDEWATCH_DATA_GO_KR_API_KEY").unwrap_or_default(),
        upstream_timeout: env_duration_ms(
            "TIDEWATCH_UPSTREAM_TIMEOUT_MS",
            DEFAULT_UPSTREAM_TIMEOUT.as_millis() as u64,
        ),
        environment: env_string("TIDEWATCH_ENV", "development"),
    };
    validate_startup_config_contract(&config)?;

    let state = AppState::new(config);
    state
        .store
        .load()
        .await
        .map_err(|e| format!("store bootstrap failed: {e}"))?;
    state.ready.store(true, Ordering::Relaxed);

    let bind_addr: SocketAddr = env_string("TIDEWATCH_BIND", "0.0.0.0:8080")
        .parse()
        .map_err(|e| format!("invalid TIDEWATCH_BIND: {e}"))?;
    let socket = if bind_addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(|e| format!("socket create failed: {e}"))?;
    socket
        .set_reuseaddr(true)
        .map_err(|e| format!("set_reuseaddr failed: {e}"))?;
    socket
        .set_keepalive(env_bool("TIDEWATCH_TCP_KEEPALIVE_ENABLED", true))
        .map_err(|e| format!("set_keepalive failed: {e}"))?;
    socket
        .bind(bind_addr)
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    let listener = socket
        .listen(1024)
        .map_err(|e| format!("listen failed: {e}"))?;

    let app = build_router(state.clone());
    info!(
        version = env!("CARGO_PKG_VERSION"),
        "tidewatch-server listening on {bind_addr}"
    );

    let drain = env_duration_ms("TIDEWATCH_SHUTDOWN_DRAIN_MS", 5000);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            state.accepting_requests.store(false, Ordering::Relaxed);
            info!("shutdown signal received, draining");
            tokio::time::sleep(drain).await;
            let (requests, routes) = state.request_totals().await;
            info!(requests, routes, "drain complete");
        })
        .await
        .map_err(|e| format!("server error: {e}"))
}
