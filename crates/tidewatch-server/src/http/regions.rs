// SPDX-License-Identifier: Apache-2.0

use super::handlers::{envelope_response, propagated_request_id, wants_pretty, with_request_id};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Instant;
use tidewatch_api::params::{parse_region_param, parse_region_query, parse_region_query_required};
use tidewatch_api::ApiError;
use tidewatch_model::{now_iso8601, SnapshotPatch};
use tidewatch_query as query;
use tracing::info;

pub(crate) async fn get_region_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<BTreeMap<String, String>>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let now = now_iso8601();
    let pretty = wants_pretty(&params);
    let (status, resp) = envelope_response(region_snapshot(&state, &params).await, &now, pretty);
    state
        .metrics
        .observe_request("/regions", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

async fn region_snapshot(
    state: &AppState,
    params: &BTreeMap<String, String>,
) -> Result<(StatusCode, Value), ApiError> {
    let parsed = parse_region_query(params)?;
    let dataset = state.store.load().await?;
    let region = query::region(&dataset, &parsed.region)
        .map_err(|_| ApiError::not_found("지역을 찾을 수 없습니다."))?;
    let snapshot = region
        .time_ranges
        .get(&parsed.time_range)
        .ok_or_else(|| ApiError::not_found("기간을 찾을 수 없습니다."))?;
    Ok((
        StatusCode::OK,
        json!({
            "region": parsed.region.as_str(),
            "regionName": region.name,
            "timeRange": parsed.time_range.as_str(),
            "data": snapshot,
        }),
    ))
}

pub(crate) async fn update_region_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<BTreeMap<String, String>>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let now = now_iso8601();
    let pretty = wants_pretty(&params);
    let (status, resp) =
        envelope_response(apply_region_patch(&state, &params, body).await, &now, pretty);
    state
        .metrics
        .observe_request("/regions", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

async fn apply_region_patch(
    state: &AppState,
    params: &BTreeMap<String, String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Value), ApiError> {
    if !params.contains_key("region") || !params.contains_key("timeRange") {
        return Err(ApiError::validation_failed(
            "지역과 기간을 모두 지정해야 합니다.",
        ));
    }
    let parsed = parse_region_query_required(params)?;
    let Json(raw) = body.map_err(|rejection| ApiError::validation_failed(rejection.body_text()))?;
    let patch: SnapshotPatch = serde_json::from_value(raw)
        .map_err(|e| ApiError::validation_failed(format!("invalid snapshot patch: {e}")))?;

    let _guard = state.store.lock().await?;
    let mut dataset = state.store.load().await?;
    let region = dataset
        .regions
        .get_mut(&parsed.region)
        .ok_or_else(|| ApiError::not_found("지역을 찾을 수 없습니다."))?;
    let snapshot = region
        .time_ranges
        .get_mut(&parsed.time_range)
        .ok_or_else(|| ApiError::not_found("기간을 찾을 수 없습니다."))?;
    patch.apply(snapshot);
    let updated = snapshot.clone();
    dataset.metadata.total_records = dataset.total_records();
    state.store.save(&dataset).await?;
    info!(
        region = %parsed.region,
        time_range = %parsed.time_range,
        "region snapshot updated"
    );
    Ok((
        StatusCode::OK,
        json!({
            "message": "데이터가 성공적으로 업데이트되었습니다.",
            "data": updated,
        }),
    ))
}

pub(crate) async fn chart_data_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<BTreeMap<String, String>>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let now = now_iso8601();
    let pretty = wants_pretty(&params);
    let (status, resp) = envelope_response(chart_series(&state, &params).await, &now, pretty);
    state
        .metrics
        .observe_request("/chart-data", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

async fn chart_series(
    state: &AppState,
    params: &BTreeMap<String, String>,
) -> Result<(StatusCode, Value), ApiError> {
    let parsed = parse_region_query(params)?;
    let dataset = state.store.load().await?;
    let series = query::scale_chart(&dataset.chart_data, &parsed.region);
    Ok((
        StatusCode::OK,
        json!({
            "region": parsed.region.as_str(),
            "timeRange": parsed.time_range.as_str(),
            "chartData": series,
        }),
    ))
}

pub(crate) async fn pollution_sources_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<BTreeMap<String, String>>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let now = now_iso8601();
    let pretty = wants_pretty(&params);
    let (status, resp) = envelope_response(source_breakdown(&state, &params).await, &now, pretty);
    state
        .metrics
        .observe_request("/pollution-sources", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

async fn source_breakdown(
    state: &AppState,
    params: &BTreeMap<String, String>,
) -> Result<(StatusCode, Value), ApiError> {
    let region = parse_region_param(params)?;
    let dataset = state.store.load().await?;
    let sources = query::pollution_sources(&dataset, &region)
        .map_err(|_| ApiError::not_found("지역을 찾을 수 없습니다."))?;
    Ok((
        StatusCode::OK,
        json!({
            "region": region.as_str(),
            "sources": sources,
        }),
    ))
}
