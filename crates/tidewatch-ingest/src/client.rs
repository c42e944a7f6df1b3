// SPDX-License-Identifier: Apache-2.0

use crate::{
    research_samples, HeavyMetals, IngestError, ObservationBundle, OceanObservation,
    QualityMeasurement, SourceFetch, DATA_SOURCES,
};
use chrono::Utc;
use serde_json::Value;
use std::time::Duration;
use tidewatch_model::now_iso8601;
use tracing::{instrument, warn};

pub const DEFAULT_BASE_URL: &str = "http://apis.data.go.kr";
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

const OCEAN_OBS_PATH: &str = "/1360000/OceanInfoService/getOceanObsInfo";
const WATER_QUALITY_PATH: &str = "/1480523/WaterQualityService/getWaterQualityList";

/// HTTP client for the data.go.kr observation services. The service key is
/// sent as a query parameter and never appears in errors or logs.
pub struct UpstreamClient {
    base_url: String,
    service_key: String,
    http: reqwest::Client,
}

impl UpstreamClient {
    #[must_use]
    pub fn new(base_url: &str, service_key: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            http,
        }
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, IngestError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("serviceKey", self.service_key.as_str()),
                ("dataType", "JSON"),
            ])
            .query(query)
            .send()
            .await
            .map_err(|e| IngestError::upstream(format!("request failed path={path}: {e}")))?;
        if !response.status().is_success() {
            return Err(IngestError::upstream(format!(
                "status {} path={path}",
                response.status()
            )));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| IngestError::decode(format!("invalid json path={path}: {e}")))
    }

    #[instrument(name = "upstream_ocean_observations", skip(self))]
    pub async fn fetch_ocean_observations(&self) -> SourceFetch<OceanObservation> {
        let base_date = Utc::now().format("%Y%m%d").to_string();
        let query = [("numOfRows", "100"), ("base_date", base_date.as_str())];
        match self.get_json(OCEAN_OBS_PATH, &query).await {
            Ok(document) => {
                SourceFetch::from_items(decode_ocean_observations(&document, &now_iso8601()))
            }
            Err(error) => {
                warn!(source = "ocean_observations", error = %error, "upstream fetch failed");
                SourceFetch::Failed(error.to_string())
            }
        }
    }

    #[instrument(name = "upstream_water_quality", skip(self))]
    pub async fn fetch_quality_measurements(&self) -> SourceFetch<QualityMeasurement> {
        let query = [("numOfRows", "50")];
        match self.get_json(WATER_QUALITY_PATH, &query).await {
            Ok(document) => SourceFetch::from_items(decode_quality_measurements(&document)),
            Err(error) => {
                warn!(source = "water_quality", error = %error, "upstream fetch failed");
                SourceFetch::Failed(error.to_string())
            }
        }
    }

    /// Pulls every source. Network sources fan out concurrently; the
    /// research collection is local and cannot fail.
    pub async fn collect_observations(&self) -> ObservationBundle {
        let (ocean, quality) = tokio::join!(
            self.fetch_ocean_observations(),
            self.fetch_quality_measurements()
        );
        ObservationBundle {
            ocean,
            quality,
            research: SourceFetch::from_items(research_samples()),
            last_updated: now_iso8601(),
            data_sources: DATA_SOURCES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// `response.body.items.item` holds either one object or an array of them.
fn item_array(document: &Value) -> Vec<&Value> {
    match document.pointer("/response/body/items/item") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(item @ Value::Object(_)) => vec![item],
        _ => Vec::new(),
    }
}

fn number_field(item: &Value, key: &str) -> f64 {
    match item.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn string_field(item: &Value, key: &str, fallback: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Station readings. Numeric fields arrive as strings and fall back to 0.0
/// when absent or malformed; missing identifiers get placeholders.
#[must_use]
pub fn decode_ocean_observations(document: &Value, timestamp: &str) -> Vec<OceanObservation> {
    item_array(document)
        .into_iter()
        .map(|item| OceanObservation {
            station_id: string_field(item, "stnId", "station-unknown"),
            station_name: string_field(item, "stnNm", "Unknown Station"),
            latitude: number_field(item, "lat"),
            longitude: number_field(item, "lon"),
            temperature: number_field(item, "wtTemp"),
            salinity: number_field(item, "salinity"),
            ph: number_field(item, "ph"),
            dissolved_oxygen: number_field(item, "do"),
            turbidity: number_field(item, "turb"),
            timestamp: timestamp.to_string(),
        })
        .collect()
}

#[must_use]
pub fn decode_quality_measurements(document: &Value) -> Vec<QualityMeasurement> {
    item_array(document)
        .into_iter()
        .map(|item| QualityMeasurement {
            location: string_field(item, "siteName", "Unknown Location"),
            cod: number_field(item, "cod"),
            bod: number_field(item, "bod"),
            total_nitrogen: number_field(item, "tn"),
            total_phosphorus: number_field(item, "tp"),
            suspended_solids: number_field(item, "ss"),
            heavy_metals: HeavyMetals {
                lead: number_field(item, "pb"),
                mercury: number_field(item, "hg"),
                cadmium: number_field(item, "cd"),
            },
        })
        .collect()
}
