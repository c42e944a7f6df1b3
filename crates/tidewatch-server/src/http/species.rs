// SPDX-License-Identifier: Apache-2.0

use super::handlers::{envelope_response, propagated_request_id, wants_pretty, with_request_id};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Instant;
use tidewatch_api::params::parse_species_list_params;
use tidewatch_api::ApiError;
use tidewatch_model::{now_iso8601, NewSpecies, SpeciesPatch};
use tidewatch_query as query;
use tracing::info;

/// Wire names of the fields a creation payload must carry, checked in order
/// so the first omission is the one reported.
const REQUIRED_SPECIES_FIELDS: [&str; 6] = [
    "species",
    "impact",
    "previousPopulation",
    "currentPopulation",
    "populationChange",
    "trend",
];

fn species_not_found() -> ApiError {
    ApiError::not_found("어종을 찾을 수 없습니다.")
}

/// Path ids are numeric; anything else cannot name a row, so it reads as
/// missing rather than malformed.
fn parse_species_id(raw: &str) -> Result<u32, ApiError> {
    raw.parse::<u32>().map_err(|_| species_not_found())
}

pub(crate) async fn list_species_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<BTreeMap<String, String>>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let now = now_iso8601();
    let pretty = wants_pretty(&params);
    let (status, resp) = envelope_response(list_species(&state, &params).await, &now, pretty);
    state
        .metrics
        .observe_request("/species", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

async fn list_species(
    state: &AppState,
    params: &BTreeMap<String, String>,
) -> Result<(StatusCode, Value), ApiError> {
    let parsed = parse_species_list_params(params)?;
    let dataset = state.store.load().await?;
    let rows = query::sort_species(&dataset.species, parsed.sort, parsed.order, parsed.limit);
    Ok((
        StatusCode::OK,
        json!({
            "species": rows,
            "total": dataset.species.len(),
        }),
    ))
}

pub(crate) async fn create_species_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let now = now_iso8601();
    let (status, resp) = envelope_response(create_species(&state, body, &now).await, &now, false);
    state
        .metrics
        .observe_request("/species", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

fn deserialize_new_species(raw: Value) -> Result<NewSpecies, ApiError> {
    if let Value::Object(ref fields) = raw {
        for name in REQUIRED_SPECIES_FIELDS {
            if !fields.contains_key(name) {
                return Err(ApiError::validation_failed(format!(
                    "필수 필드가 누락되었습니다: {name}"
                )));
            }
        }
    }
    serde_json::from_value(raw)
        .map_err(|e| ApiError::validation_failed(format!("invalid species payload: {e}")))
}

async fn create_species(
    state: &AppState,
    body: Result<Json<Value>, JsonRejection>,
    now: &str,
) -> Result<(StatusCode, Value), ApiError> {
    let Json(raw) = body.map_err(|rejection| ApiError::validation_failed(rejection.body_text()))?;
    let new_species = deserialize_new_species(raw)?;
    new_species.validate()?;

    let _guard = state.store.lock().await?;
    let mut dataset = state.store.load().await?;
    if dataset.has_species_name(&new_species.species, None) {
        return Err(ApiError::conflict("이미 존재하는 어종입니다."));
    }
    let id = dataset.next_species_id();
    let created = new_species.into_species(id, now);
    dataset.species.push(created.clone());
    dataset.metadata.total_records = dataset.total_records();
    state.store.save(&dataset).await?;
    info!(id, species = %created.species, "species created");
    Ok((
        StatusCode::CREATED,
        json!({
            "message": "새 어종이 성공적으로 추가되었습니다.",
            "data": created,
        }),
    ))
}

pub(crate) async fn get_species_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let now = now_iso8601();
    let (status, resp) = envelope_response(fetch_species(&state, &raw_id).await, &now, false);
    state
        .metrics
        .observe_request("/species/{id}", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

async fn fetch_species(state: &AppState, raw_id: &str) -> Result<(StatusCode, Value), ApiError> {
    let id = parse_species_id(raw_id)?;
    let dataset = state.store.load().await?;
    let row = dataset.species_by_id(id).ok_or_else(species_not_found)?;
    Ok((StatusCode::OK, json!({ "data": row })))
}

pub(crate) async fn update_species_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let now = now_iso8601();
    let (status, resp) =
        envelope_response(update_species(&state, &raw_id, body, &now).await, &now, false);
    state
        .metrics
        .observe_request("/species/{id}", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

async fn update_species(
    state: &AppState,
    raw_id: &str,
    body: Result<Json<Value>, JsonRejection>,
    now: &str,
) -> Result<(StatusCode, Value), ApiError> {
    let id = parse_species_id(raw_id)?;
    let Json(raw) = body.map_err(|rejection| ApiError::validation_failed(rejection.body_text()))?;
    let patch: SpeciesPatch = serde_json::from_value(raw)
        .map_err(|e| ApiError::validation_failed(format!("invalid species patch: {e}")))?;
    patch.validate()?;

    let _guard = state.store.lock().await?;
    let mut dataset = state.store.load().await?;
    let Some(index) = dataset.species.iter().position(|s| s.id == id) else {
        return Err(species_not_found());
    };
    if let Some(new_name) = patch.species.as_deref() {
        if dataset.has_species_name(new_name, Some(id)) {
            return Err(ApiError::conflict("이미 존재하는 어종입니다."));
        }
    }
    patch.apply(&mut dataset.species[index], now);
    let updated = dataset.species[index].clone();
    dataset.metadata.total_records = dataset.total_records();
    state.store.save(&dataset).await?;
    info!(id, "species updated");
    Ok((
        StatusCode::OK,
        json!({
            "message": "어종 데이터가 성공적으로 업데이트되었습니다.",
            "data": updated,
        }),
    ))
}

pub(crate) async fn delete_species_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let now = now_iso8601();
    let (status, resp) = envelope_response(delete_species(&state, &raw_id).await, &now, false);
    state
        .metrics
        .observe_request("/species/{id}", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

async fn delete_species(state: &AppState, raw_id: &str) -> Result<(StatusCode, Value), ApiError> {
    let id = parse_species_id(raw_id)?;
    let _guard = state.store.lock().await?;
    let mut dataset = state.store.load().await?;
    let removed = dataset.remove_species(id).ok_or_else(species_not_found)?;
    dataset.metadata.total_records = dataset.total_records();
    state.store.save(&dataset).await?;
    info!(id, species = %removed.species, "species deleted");
    Ok((
        StatusCode::OK,
        json!({
            "message": "어종이 성공적으로 삭제되었습니다.",
            "data": removed,
        }),
    ))
}
