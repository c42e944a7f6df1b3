// SPDX-License-Identifier: Apache-2.0

use crate::keys::{RegionKey, RiskLevel, TimeRange, Trend, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root of the persisted document.
///
/// Serialized field order is declaration order, so `save(load())` reproduces
/// the file byte-for-byte apart from `metadata.lastUpdated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub regions: BTreeMap<RegionKey, Region>,
    pub species: Vec<Species>,
    pub pollution_sources: BTreeMap<RegionKey, Vec<SourceShare>>,
    pub chart_data: Vec<MonthlyPoint>,
    pub metadata: DatasetMetadata,
}

impl Dataset {
    /// Record count over the whole document: four snapshots per region plus
    /// species rows, source breakdowns and chart points.
    #[must_use]
    pub fn total_records(&self) -> u32 {
        (self.regions.len() * 4 + self.species.len() + self.pollution_sources.len()
            + self.chart_data.len()) as u32
    }

    #[must_use]
    pub fn max_species_id(&self) -> u32 {
        self.species.iter().map(|s| s.id).max().unwrap_or(0)
    }

    #[must_use]
    pub fn next_species_id(&self) -> u32 {
        self.max_species_id() + 1
    }

    #[must_use]
    pub fn species_by_id(&self, id: u32) -> Option<&Species> {
        self.species.iter().find(|s| s.id == id)
    }

    pub fn species_by_id_mut(&mut self, id: u32) -> Option<&mut Species> {
        self.species.iter_mut().find(|s| s.id == id)
    }

    /// Removes the species row with the given id, preserving order of the
    /// remaining rows.
    pub fn remove_species(&mut self, id: u32) -> Option<Species> {
        let idx = self.species.iter().position(|s| s.id == id)?;
        Some(self.species.remove(idx))
    }

    /// Display-name uniqueness check; `excluding_id` skips the row being
    /// renamed so a no-op rename does not collide with itself.
    #[must_use]
    pub fn has_species_name(&self, name: &str, excluding_id: Option<u32>) -> bool {
        self.species
            .iter()
            .any(|s| s.species == name && excluding_id != Some(s.id))
    }

    /// Structural integrity of a loaded document.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (key, region) in &self.regions {
            for range in TimeRange::ALL {
                if !region.time_ranges.contains_key(&range) {
                    return Err(ValidationError(format!(
                        "region {key} is missing time range {range}"
                    )));
                }
            }
        }
        let mut seen_ids = std::collections::BTreeSet::new();
        let mut seen_names = std::collections::BTreeSet::new();
        for species in &self.species {
            if !seen_ids.insert(species.id) {
                return Err(ValidationError(format!(
                    "duplicate species id {}",
                    species.id
                )));
            }
            if !seen_names.insert(species.species.as_str()) {
                return Err(ValidationError(format!(
                    "duplicate species name {}",
                    species.species
                )));
            }
            species.validate()?;
        }
        for key in self.pollution_sources.keys() {
            if !self.regions.contains_key(key) {
                return Err(ValidationError(format!(
                    "pollution sources reference unknown region {key}"
                )));
            }
        }
        for shares in self.pollution_sources.values() {
            for share in shares {
                if share.percentage > 100 {
                    return Err(ValidationError(format!(
                        "source share {} exceeds 100 percent",
                        share.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// One coastal zone: display label plus the four lookback snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub name: String,
    pub time_ranges: BTreeMap<TimeRange, TimeRangeSnapshot>,
}

/// Risk/concentration/species/monitoring-point figures for one region at one
/// time range, with the four display-formatted change fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeSnapshot {
    pub risk: RiskLevel,
    pub concentration: String,
    pub species: u32,
    pub points: u32,
    pub risk_change: String,
    pub conc_change: String,
    pub species_change: String,
    pub points_change: String,
}

/// Tracked marine species with impact score and population trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub id: u32,
    pub species: String,
    pub impact: u32,
    pub previous_population: u64,
    pub current_population: u64,
    pub population_change: f64,
    pub trend: Trend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl Species {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.species.trim().is_empty() {
            return Err(ValidationError("species name must not be empty".to_string()));
        }
        if self.impact > 100 {
            return Err(ValidationError(format!(
                "impact {} out of range 0-100",
                self.impact
            )));
        }
        Ok(())
    }
}

/// One pollution-origin category and its percentage share for a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceShare {
    pub name: String,
    pub percentage: u32,
}

/// One calendar-month sample of the base chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub concentration: f64,
    pub particles: u32,
    pub risk: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub version: String,
    pub last_updated: String,
    pub total_records: u32,
    pub auto_generated: bool,
}
