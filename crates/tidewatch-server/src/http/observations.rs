// SPDX-License-Identifier: Apache-2.0

use super::handlers::{
    envelope_response, propagated_request_id, render_json, wants_pretty, with_request_id,
};
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Instant;
use tidewatch_api::params::bool_flag;
use tidewatch_api::{error_envelope, ApiError};
use tidewatch_ingest::{bundle_statistics, to_legacy_dataset, ObservationBundle};
use tidewatch_model::now_iso8601;
use tracing::{info, warn};

/// Every upstream source came back empty or failed; the caller should fall
/// back to the stored dataset. `fallback` rides next to the envelope fields.
fn fallback_envelope(now: &str) -> Value {
    let error = ApiError::upstream_unavailable("유효한 실제 데이터를 가져올 수 없습니다.");
    let mut body = error_envelope(&error, now);
    if let Value::Object(ref mut map) = body {
        map.insert("fallback".to_string(), Value::Bool(true));
    }
    body
}

fn converted_payload(bundle: &ObservationBundle, now: &str) -> (StatusCode, Value) {
    let legacy = to_legacy_dataset(bundle, now);
    let statistics = bundle_statistics(bundle);
    (
        StatusCode::OK,
        json!({
            "message": "실제 해양 데이터를 성공적으로 가져왔습니다.",
            "data": legacy,
            "rawData": bundle.wire(),
            "statistics": statistics,
        }),
    )
}

pub(crate) async fn get_real_data_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<BTreeMap<String, String>>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let now = now_iso8601();
    let refresh = bool_flag(&params, "refresh");
    let pretty = wants_pretty(&params);
    info!(request_id = %request_id, refresh, "real data collection start");

    let bundle = state.upstream.collect_observations().await;
    let (status, resp): (StatusCode, Response) = if bundle.is_valid() {
        envelope_response(Ok(converted_payload(&bundle, &now)), &now, pretty)
    } else {
        warn!(request_id = %request_id, "no upstream source produced data");
        let status = StatusCode::SERVICE_UNAVAILABLE;
        (status, render_json(status, fallback_envelope(&now), pretty))
    };
    state
        .metrics
        .observe_request("/real-data", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

pub(crate) async fn refresh_real_data_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let now = now_iso8601();
    info!(request_id = %request_id, "real data forced refresh");

    let bundle = state.upstream.collect_observations().await;
    let (status, resp) = envelope_response(
        Ok((
            StatusCode::OK,
            json!({
                "message": "실제 데이터가 성공적으로 새로고침되었습니다.",
                "data": bundle.wire(),
            }),
        )),
        &now,
        false,
    );
    state
        .metrics
        .observe_request("/real-data", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_envelope_flags_the_degraded_mode() {
        let body = fallback_envelope("2025-01-15T09:30:00.000Z");
        assert_eq!(body["success"], false);
        assert_eq!(body["fallback"], true);
        assert_eq!(body["error"], "유효한 실제 데이터를 가져올 수 없습니다.");
        assert_eq!(body["code"], "upstream_unavailable");
        assert_eq!(body["timestamp"], "2025-01-15T09:30:00.000Z");
    }

    #[test]
    fn converted_payload_carries_statistics_and_raw_bundle() {
        let bundle = ObservationBundle {
            ocean: tidewatch_ingest::SourceFetch::Failed("refused".to_string()),
            quality: tidewatch_ingest::SourceFetch::Empty,
            research: tidewatch_ingest::SourceFetch::from_items(
                tidewatch_ingest::research_samples(),
            ),
            last_updated: "2025-01-15T09:30:00.000Z".to_string(),
            data_sources: Vec::new(),
        };
        let (status, fields) = converted_payload(&bundle, "2025-01-15T09:30:00.000Z");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fields["statistics"]["microplasticSamples"], 4);
        assert_eq!(fields["statistics"]["oceanStations"], 0);
        assert_eq!(fields["data"]["metadata"]["isRealData"], true);
        assert_eq!(
            fields["rawData"]["microplasticResearch"]
                .as_array()
                .map(Vec::len),
            Some(4)
        );
    }
}
