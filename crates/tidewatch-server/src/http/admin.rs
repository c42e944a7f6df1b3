// SPDX-License-Identifier: Apache-2.0

use super::handlers::{envelope_response, propagated_request_id, with_request_id};
use crate::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde_json::{json, Value};
use std::time::Instant;
use tidewatch_api::ApiError;
use tidewatch_model::now_iso8601;
use tidewatch_query as query;
use tracing::warn;

/// Rows shown in the recently-updated panel.
const RECENT_SPECIES_LIMIT: usize = 5;

pub(crate) async fn overview_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let now = now_iso8601();
    let (status, resp) = envelope_response(overview(&state, &now).await, &now, false);
    state
        .metrics
        .observe_request("/admin", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

async fn overview(state: &AppState, now: &str) -> Result<(StatusCode, Value), ApiError> {
    let dataset = state.store.load().await?;
    let stats = query::dataset_stats(&dataset);
    let recent = query::recent_species(&dataset, RECENT_SPECIES_LIMIT);
    let distribution = query::risk_distribution(&dataset);
    Ok((
        StatusCode::OK,
        json!({
            "stats": stats,
            "recentSpecies": recent,
            "riskDistribution": distribution,
            "systemInfo": {
                "runtime": "axum",
                "environment": state.config.environment,
                "timestamp": now,
            },
        }),
    ))
}

pub(crate) async fn backup_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let now = now_iso8601();
    let (status, resp) = envelope_response(run_backup(&state).await, &now, false);
    state
        .metrics
        .observe_request("/admin", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

async fn run_backup(state: &AppState) -> Result<(StatusCode, Value), ApiError> {
    let receipt = match state.store.backup().await {
        Ok(receipt) => receipt,
        Err(error) => {
            warn!(error = %error, "dataset backup failed");
            return Err(ApiError::storage_unavailable(
                "백업 생성 중 오류가 발생했습니다.",
            ));
        }
    };
    Ok((
        StatusCode::OK,
        json!({
            "message": "데이터 백업이 성공적으로 생성되었습니다.",
            "backupFile": receipt.file_name,
            "bytesWritten": receipt.bytes_written,
            "sha256": receipt.sha256_hex,
        }),
    ))
}
