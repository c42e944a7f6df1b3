#![forbid(unsafe_code)]
//! Derived views over a loaded dataset: regional chart scaling, species
//! ordering, key lookups and the admin aggregates. Everything here is pure;
//! callers own loading and persistence.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use tidewatch_model::{
    Dataset, MonthlyPoint, Region, RegionKey, RiskLevel, SourceShare, Species, TimeRange,
    TimeRangeSnapshot,
};

pub const CRATE_NAME: &str = "tidewatch-query";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryErrorCode {
    NotFound,
    Validation,
}

impl QueryErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub code: QueryErrorCode,
    pub message: String,
}

impl QueryError {
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::NotFound,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::Validation,
            message: message.into(),
        }
    }
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for QueryError {}

/// Per-region multipliers applied to the base chart series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub concentration: f64,
    pub particles: f64,
    pub risk: f64,
}

pub const IDENTITY_FACTORS: ScaleFactors = ScaleFactors {
    concentration: 1.0,
    particles: 1.0,
    risk: 1.0,
};

/// Factor table; keys outside it (including `all`) scale by identity.
#[must_use]
pub fn scale_factors(region: &RegionKey) -> ScaleFactors {
    match region.as_str() {
        "west" => ScaleFactors {
            concentration: 1.3,
            particles: 1.2,
            risk: 1.1,
        },
        "east" => ScaleFactors {
            concentration: 0.7,
            particles: 0.8,
            risk: 0.8,
        },
        "south" => ScaleFactors {
            concentration: 0.9,
            particles: 0.95,
            risk: 0.9,
        },
        "jeju" => ScaleFactors {
            concentration: 0.85,
            particles: 0.9,
            risk: 0.85,
        },
        _ => IDENTITY_FACTORS,
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Scales the base series for a region. Concentration keeps one decimal,
/// particles and risk round to the nearest integer, and risk is clamped to
/// 100 for every region.
#[must_use]
pub fn scale_chart(points: &[MonthlyPoint], region: &RegionKey) -> Vec<MonthlyPoint> {
    let factors = scale_factors(region);
    points
        .iter()
        .map(|point| MonthlyPoint {
            month: point.month.clone(),
            concentration: round_tenth(point.concentration * factors.concentration),
            particles: (f64::from(point.particles) * factors.particles).round() as u32,
            risk: ((f64::from(point.risk) * factors.risk).round() as u32).min(100),
        })
        .collect()
}

/// Sortable species columns, named by their wire field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeciesSortKey {
    Id,
    Name,
    Impact,
    PreviousPopulation,
    CurrentPopulation,
    PopulationChange,
    Trend,
    LastUpdated,
}

impl SpeciesSortKey {
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        match raw {
            "id" => Ok(Self::Id),
            "species" => Ok(Self::Name),
            "impact" => Ok(Self::Impact),
            "previousPopulation" => Ok(Self::PreviousPopulation),
            "currentPopulation" => Ok(Self::CurrentPopulation),
            "populationChange" => Ok(Self::PopulationChange),
            "trend" => Ok(Self::Trend),
            "lastUpdated" => Ok(Self::LastUpdated),
            other => Err(QueryError::validation(format!("unknown sort key: {other}"))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "species",
            Self::Impact => "impact",
            Self::PreviousPopulation => "previousPopulation",
            Self::CurrentPopulation => "currentPopulation",
            Self::PopulationChange => "populationChange",
            Self::Trend => "trend",
            Self::LastUpdated => "lastUpdated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        match raw {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(QueryError::validation(format!(
                "unknown sort order: {other}"
            ))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

fn compare_species(a: &Species, b: &Species, key: SpeciesSortKey) -> std::cmp::Ordering {
    match key {
        SpeciesSortKey::Id => a.id.cmp(&b.id),
        SpeciesSortKey::Name => a.species.cmp(&b.species),
        SpeciesSortKey::Impact => a.impact.cmp(&b.impact),
        SpeciesSortKey::PreviousPopulation => a.previous_population.cmp(&b.previous_population),
        SpeciesSortKey::CurrentPopulation => a.current_population.cmp(&b.current_population),
        SpeciesSortKey::PopulationChange => a.population_change.total_cmp(&b.population_change),
        SpeciesSortKey::Trend => a.trend.as_str().cmp(b.trend.as_str()),
        SpeciesSortKey::LastUpdated => {
            // Absent timestamps order before any real one.
            let left = a.last_updated.as_deref().unwrap_or("");
            let right = b.last_updated.as_deref().unwrap_or("");
            left.cmp(right)
        }
    }
}

/// Stable sort of the species collection; `limit == 0` means unlimited,
/// `limit > 0` truncates after ordering.
#[must_use]
pub fn sort_species(
    species: &[Species],
    key: SpeciesSortKey,
    order: SortOrder,
    limit: usize,
) -> Vec<Species> {
    let mut out: Vec<Species> = species.to_vec();
    out.sort_by(|a, b| {
        let ordering = compare_species(a, b, key);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    if limit > 0 {
        out.truncate(limit);
    }
    out
}

pub fn region<'a>(dataset: &'a Dataset, key: &RegionKey) -> Result<&'a Region, QueryError> {
    dataset
        .regions
        .get(key)
        .ok_or_else(|| QueryError::not_found(format!("unknown region: {key}")))
}

pub fn snapshot<'a>(
    dataset: &'a Dataset,
    key: &RegionKey,
    range: TimeRange,
) -> Result<&'a TimeRangeSnapshot, QueryError> {
    region(dataset, key)?
        .time_ranges
        .get(&range)
        .ok_or_else(|| QueryError::not_found(format!("unknown time range: {range} for {key}")))
}

pub fn pollution_sources<'a>(
    dataset: &'a Dataset,
    key: &RegionKey,
) -> Result<&'a [SourceShare], QueryError> {
    dataset
        .pollution_sources
        .get(key)
        .map(Vec::as_slice)
        .ok_or_else(|| QueryError::not_found(format!("unknown region: {key}")))
}

/// Collection counts plus document metadata, shaped for the admin surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    pub regions: usize,
    pub species: usize,
    pub pollution_sources: usize,
    pub chart_data_points: usize,
    pub total_records: u32,
    pub last_updated: String,
    pub version: String,
}

#[must_use]
pub fn dataset_stats(dataset: &Dataset) -> DatasetStats {
    DatasetStats {
        regions: dataset.regions.len(),
        species: dataset.species.len(),
        pollution_sources: dataset.pollution_sources.len(),
        chart_data_points: dataset.chart_data.len(),
        total_records: dataset.metadata.total_records,
        last_updated: dataset.metadata.last_updated.clone(),
        version: dataset.metadata.version.clone(),
    }
}

/// Most recently touched species rows, newest first; rows without a
/// timestamp come last.
#[must_use]
pub fn recent_species(dataset: &Dataset, limit: usize) -> Vec<Species> {
    sort_species(
        &dataset.species,
        SpeciesSortKey::LastUpdated,
        SortOrder::Desc,
        limit,
    )
}

/// Histogram of risk grades over every region and time range.
#[must_use]
pub fn risk_distribution(dataset: &Dataset) -> BTreeMap<RiskLevel, u32> {
    let mut histogram = BTreeMap::new();
    for region in dataset.regions.values() {
        for snapshot in region.time_ranges.values() {
            *histogram.entry(snapshot.risk).or_insert(0) += 1;
        }
    }
    histogram
}

#[cfg(test)]
mod query_tests;
