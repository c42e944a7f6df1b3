#![forbid(unsafe_code)]
//! Adapter over the public Korean ocean-observation services. Fetch
//! outcomes stay tagged per source so callers can tell an empty upstream
//! apart from a dead one, and the combined bundle converts into the
//! dashboard's legacy region document.

mod client;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use tidewatch_model::{Region, RegionKey, RiskLevel, TimeRange, TimeRangeSnapshot};

pub use client::{
    decode_ocean_observations, decode_quality_measurements, UpstreamClient, DEFAULT_BASE_URL,
    DEFAULT_UPSTREAM_TIMEOUT,
};

pub const CRATE_NAME: &str = "tidewatch-ingest";

/// Institutions credited on every bundle, in publication order.
pub const DATA_SOURCES: [&str; 4] = [
    "국립해양조사원 실시간 관측망",
    "환경부 해양수질측정망",
    "KIOST 미세플라스틱 연구",
    "국립수산과학원 해양환경조사",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestErrorCode {
    Upstream,
    Decode,
    Invalid,
}

impl IngestErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upstream => "upstream_error",
            Self::Decode => "decode_error",
            Self::Invalid => "invalid_data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestError {
    pub code: IngestErrorCode,
    pub message: String,
}

impl IngestError {
    #[must_use]
    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            code: IngestErrorCode::Upstream,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            code: IngestErrorCode::Decode,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            code: IngestErrorCode::Invalid,
            message: message.into(),
        }
    }
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for IngestError {}

/// Outcome of one upstream collection. `Empty` is a healthy service with
/// nothing to report; `Failed` keeps the reason for the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceFetch<T> {
    Succeeded(Vec<T>),
    Empty,
    Failed(String),
}

impl<T> SourceFetch<T> {
    #[must_use]
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Succeeded(items)
        }
    }

    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// Flattens `Empty` and `Failed` to an empty slice.
    #[must_use]
    pub fn records(&self) -> &[T] {
        match self {
            Self::Succeeded(items) => items,
            Self::Empty | Self::Failed(_) => &[],
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            Self::Succeeded(_) | Self::Empty => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OceanObservation {
    pub station_id: String,
    pub station_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub salinity: f64,
    pub ph: f64,
    pub dissolved_oxygen: f64,
    pub turbidity: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeavyMetals {
    pub lead: f64,
    pub mercury: f64,
    pub cadmium: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMeasurement {
    pub location: String,
    pub cod: f64,
    pub bod: f64,
    pub total_nitrogen: f64,
    pub total_phosphorus: f64,
    pub suspended_solids: f64,
    pub heavy_metals: HeavyMetals,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchSample {
    pub location: String,
    pub coordinates: Coordinates,
    pub microplastic_concentration: f64,
    pub particle_count: u32,
    pub dominant_types: Vec<String>,
    pub source: String,
    pub sampling_date: String,
    pub depth: String,
}

/// Published microplastic survey figures; the research institutions release
/// reports rather than a queryable API, so this collection is curated.
#[must_use]
pub fn research_samples() -> Vec<ResearchSample> {
    let sample = |location: &str,
                  lat,
                  lng,
                  concentration,
                  particles,
                  types: &[&str],
                  source: &str,
                  sampled: &str| ResearchSample {
        location: location.to_string(),
        coordinates: Coordinates { lat, lng },
        microplastic_concentration: concentration,
        particle_count: particles,
        dominant_types: types.iter().map(|t| (*t).to_string()).collect(),
        source: source.to_string(),
        sampling_date: sampled.to_string(),
        depth: "표층 (0-5m)".to_string(),
    };
    vec![
        sample(
            "서해 (인천 연안)",
            37.4563,
            126.7052,
            2.8,
            680,
            &["PE", "PP", "PS"],
            "KIOST 2024 연구보고서",
            "2024-11-15",
        ),
        sample(
            "남해 (부산 연안)",
            35.1796,
            129.0756,
            2.1,
            520,
            &["PET", "PE", "PP"],
            "국립수산과학원 2024",
            "2024-11-10",
        ),
        sample(
            "동해 (포항 연안)",
            36.019,
            129.3435,
            1.6,
            380,
            &["PP", "PE"],
            "한국해양대학교 2024",
            "2024-11-08",
        ),
        sample(
            "제주 근해",
            33.4996,
            126.5312,
            1.9,
            450,
            &["PE", "PS", "PET"],
            "제주대학교 해양연구소 2024",
            "2024-11-12",
        ),
    ]
}

/// Combined pull from every source, with per-source outcomes preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationBundle {
    pub ocean: SourceFetch<OceanObservation>,
    pub quality: SourceFetch<QualityMeasurement>,
    pub research: SourceFetch<ResearchSample>,
    pub last_updated: String,
    pub data_sources: Vec<String>,
}

impl ObservationBundle {
    /// A bundle is usable when at least one source produced records.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.ocean.succeeded() || self.quality.succeeded() || self.research.succeeded()
    }

    #[must_use]
    pub fn observations(&self) -> &[OceanObservation] {
        self.ocean.records()
    }

    #[must_use]
    pub fn quality_measurements(&self) -> &[QualityMeasurement] {
        self.quality.records()
    }

    #[must_use]
    pub fn research_records(&self) -> &[ResearchSample] {
        self.research.records()
    }

    #[must_use]
    pub fn wire(&self) -> WireBundle<'_> {
        WireBundle {
            ocean_observations: self.observations(),
            water_quality: self.quality_measurements(),
            microplastic_research: self.research_records(),
            last_updated: &self.last_updated,
            data_sources: &self.data_sources,
        }
    }
}

/// Bundle shaped for responses: per-source tags flattened to plain arrays.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBundle<'a> {
    pub ocean_observations: &'a [OceanObservation],
    pub water_quality: &'a [QualityMeasurement],
    pub microplastic_research: &'a [ResearchSample],
    pub last_updated: &'a str,
    pub data_sources: &'a [String],
}

/// Mean research concentration formatted to one decimal, `"0.0"` when no
/// samples are present.
#[must_use]
pub fn mean_concentration(samples: &[ResearchSample]) -> String {
    if samples.is_empty() {
        return "0.0".to_string();
    }
    let total: f64 = samples.iter().map(|s| s.microplastic_concentration).sum();
    format!("{:.1}", total / samples.len() as f64)
}

/// Affected-species estimate: 120 baseline species scaled by the mean
/// concentration, using the same one-decimal rounding as the display value.
#[must_use]
pub fn estimate_affected_species(samples: &[ResearchSample]) -> u32 {
    let mean: f64 = mean_concentration(samples).parse().unwrap_or(0.0);
    (120.0 * (1.0 + mean / 10.0)).round() as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMetadata {
    pub version: String,
    pub last_updated: String,
    pub data_source: String,
    pub is_real_data: bool,
}

/// Converted bundle in the dashboard's stored-dataset shape: a single
/// `all`/`1month` snapshot derived from live readings plus the raw bundle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDataset<'a> {
    pub regions: BTreeMap<RegionKey, Region>,
    pub real_time_data: WireBundle<'a>,
    pub metadata: LegacyMetadata,
}

#[must_use]
pub fn to_legacy_snapshot(bundle: &ObservationBundle) -> TimeRangeSnapshot {
    let samples = bundle.research_records();
    TimeRangeSnapshot {
        risk: RiskLevel::High,
        concentration: mean_concentration(samples),
        species: estimate_affected_species(samples),
        points: (bundle.observations().len() + bundle.quality_measurements().len()) as u32,
        risk_change: "+8%".to_string(),
        conc_change: "+12%".to_string(),
        species_change: "+15%".to_string(),
        points_change: "+3%".to_string(),
    }
}

#[must_use]
pub fn to_legacy_dataset<'a>(bundle: &'a ObservationBundle, now: &str) -> LegacyDataset<'a> {
    let all = RegionKey::parse("all").unwrap_or_else(|e| unreachable!("static region key: {e}"));
    let region = Region {
        name: "전체 해역".to_string(),
        time_ranges: BTreeMap::from([(TimeRange::OneMonth, to_legacy_snapshot(bundle))]),
    };
    LegacyDataset {
        regions: BTreeMap::from([(all, region)]),
        real_time_data: bundle.wire(),
        metadata: LegacyMetadata {
            version: "2.0.0-real".to_string(),
            last_updated: now.to_string(),
            data_source: "실제 해양 관측 데이터".to_string(),
            is_real_data: true,
        },
    }
}

/// Record counts surfaced next to the converted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleStatistics {
    pub ocean_stations: usize,
    pub quality_measurements: usize,
    pub microplastic_samples: usize,
    pub data_sources: usize,
}

#[must_use]
pub fn bundle_statistics(bundle: &ObservationBundle) -> BundleStatistics {
    BundleStatistics {
        ocean_stations: bundle.observations().len(),
        quality_measurements: bundle.quality_measurements().len(),
        microplastic_samples: bundle.research_records().len(),
        data_sources: bundle.data_sources.len(),
    }
}
