// SPDX-License-Identifier: Apache-2.0

use crate::{AppState, CRATE_NAME};
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tidewatch_api::{error_envelope, map_error, success_envelope, ApiError};

pub(crate) fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

/// Client-supplied correlation id when present, otherwise a fresh one.
/// `x-request-id` wins over `traceparent`.
pub(crate) fn propagated_request_id(headers: &HeaderMap, state: &AppState) -> String {
    if let Some(value) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    if let Some(value) = headers.get("traceparent").and_then(|v| v.to_str().ok()) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return format!("trace-{trimmed}");
        }
    }
    make_request_id(state)
}

pub(crate) fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

pub(crate) fn wants_pretty(params: &BTreeMap<String, String>) -> bool {
    params
        .get("pretty")
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

pub(crate) fn render_json(status: StatusCode, body: Value, pretty: bool) -> Response {
    if pretty {
        if let Ok(bytes) = serde_json::to_vec_pretty(&body) {
            return (
                status,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )],
                bytes,
            )
                .into_response();
        }
    }
    (status, Json(body)).into_response()
}

/// Folds a handler outcome into the uniform response envelope. Success
/// payloads keep the status the helper chose; failures take theirs from the
/// error taxonomy.
pub(crate) fn envelope_response(
    outcome: Result<(StatusCode, Value), ApiError>,
    now: &str,
    pretty: bool,
) -> (StatusCode, Response) {
    match outcome {
        Ok((status, fields)) => {
            let body = success_envelope(fields, now);
            (status, render_json(status, body, pretty))
        }
        Err(error) => {
            let status = StatusCode::from_u16(map_error(&error))
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = error_envelope(&error, now);
            (status, render_json(status, body, pretty))
        }
    }
}

pub(crate) async fn healthz_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = (StatusCode::OK, "ok").into_response();
    state
        .metrics
        .observe_request("/healthz", StatusCode::OK, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

pub(crate) async fn readyz_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let ready = state.ready.load(Ordering::Relaxed)
        && state.accepting_requests.load(Ordering::Relaxed);
    let (status, body) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not-ready")
    };
    let resp = (status, body).into_response();
    state
        .metrics
        .observe_request("/readyz", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

pub(crate) async fn version_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let payload = json!({
        "service": CRATE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "configSchemaVersion": crate::config::CONFIG_SCHEMA_VERSION,
    });
    let mut resp = (StatusCode::OK, Json(payload)).into_response();
    resp.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=30"),
    );
    state
        .metrics
        .observe_request("/version", StatusCode::OK, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServerConfig;

    fn state() -> AppState {
        AppState::new(ServerConfig::default())
    }

    #[test]
    fn request_ids_are_unique_and_prefixed() {
        let state = state();
        let first = make_request_id(&state);
        let second = make_request_id(&state);
        assert!(first.starts_with("req-"));
        assert_ne!(first, second);
    }

    #[test]
    fn propagation_prefers_explicit_header_over_traceparent() {
        let state = state();
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("client-7"));
        headers.insert("traceparent", HeaderValue::from_static("00-abc-def-01"));
        assert_eq!(propagated_request_id(&headers, &state), "client-7");

        let mut headers = HeaderMap::new();
        headers.insert("traceparent", HeaderValue::from_static("00-abc-def-01"));
        assert_eq!(
            propagated_request_id(&headers, &state),
            "trace-00-abc-def-01"
        );

        let headers = HeaderMap::new();
        assert!(propagated_request_id(&headers, &state).starts_with("req-"));
    }

    #[test]
    fn blank_request_id_header_falls_through() {
        let state = state();
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("   "));
        assert!(propagated_request_id(&headers, &state).starts_with("req-"));
    }

    #[test]
    fn response_carries_the_request_id_header() {
        let resp = with_request_id((StatusCode::OK, "ok").into_response(), "req-42");
        assert_eq!(
            resp.headers().get("x-request-id"),
            Some(&HeaderValue::from_static("req-42"))
        );
    }

    #[test]
    fn envelope_response_maps_error_codes_to_statuses() {
        let now = "2025-01-15T09:30:00.000Z";
        let (status, _) = envelope_response(Err(ApiError::not_found("missing")), now, false);
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = envelope_response(Err(ApiError::conflict("taken")), now, false);
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) =
            envelope_response(Ok((StatusCode::CREATED, json!({ "data": 1 }))), now, false);
        assert_eq!(status, StatusCode::CREATED);
    }

    #[test]
    fn pretty_flag_accepts_one_and_true() {
        let mut params = BTreeMap::new();
        assert!(!wants_pretty(&params));
        params.insert("pretty".to_string(), "1".to_string());
        assert!(wants_pretty(&params));
        params.insert("pretty".to_string(), "TRUE".to_string());
        assert!(wants_pretty(&params));
        params.insert("pretty".to_string(), "0".to_string());
        assert!(!wants_pretty(&params));
    }

    #[test]
    fn pretty_rendering_sets_json_content_type() {
        let resp = render_json(StatusCode::OK, json!({"a": 1}), true);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type"),
            Some(&HeaderValue::from_static("application/json"))
        );
        let compact = render_json(StatusCode::OK, json!({"a": 1}), false);
        assert_eq!(compact.status(), StatusCode::OK);
    }
}
