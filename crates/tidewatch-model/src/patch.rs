// SPDX-License-Identifier: Apache-2.0

use crate::dataset::{Species, TimeRangeSnapshot};
use crate::keys::{RiskLevel, Trend, ValidationError};
use serde::Deserialize;

/// Partial update for one region/time-range snapshot. Unknown fields are
/// rejected at deserialization; absent fields leave the target untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SnapshotPatch {
    pub risk: Option<RiskLevel>,
    pub concentration: Option<String>,
    pub species: Option<u32>,
    pub points: Option<u32>,
    pub risk_change: Option<String>,
    pub conc_change: Option<String>,
    pub species_change: Option<String>,
    pub points_change: Option<String>,
}

impl SnapshotPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.risk.is_none()
            && self.concentration.is_none()
            && self.species.is_none()
            && self.points.is_none()
            && self.risk_change.is_none()
            && self.conc_change.is_none()
            && self.species_change.is_none()
            && self.points_change.is_none()
    }

    pub fn apply(&self, target: &mut TimeRangeSnapshot) {
        if let Some(risk) = self.risk {
            target.risk = risk;
        }
        if let Some(concentration) = &self.concentration {
            target.concentration = concentration.clone();
        }
        if let Some(species) = self.species {
            target.species = species;
        }
        if let Some(points) = self.points {
            target.points = points;
        }
        if let Some(risk_change) = &self.risk_change {
            target.risk_change = risk_change.clone();
        }
        if let Some(conc_change) = &self.conc_change {
            target.conc_change = conc_change.clone();
        }
        if let Some(species_change) = &self.species_change {
            target.species_change = species_change.clone();
        }
        if let Some(points_change) = &self.points_change {
            target.points_change = points_change.clone();
        }
    }
}

/// Partial update for a species row. `id` and `lastUpdated` are not
/// patchable: ids are immutable and the timestamp is stamped server-side.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpeciesPatch {
    pub species: Option<String>,
    pub impact: Option<u32>,
    pub previous_population: Option<u64>,
    pub current_population: Option<u64>,
    pub population_change: Option<f64>,
    pub trend: Option<Trend>,
}

impl SpeciesPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.species.is_none()
            && self.impact.is_none()
            && self.previous_population.is_none()
            && self.current_population.is_none()
            && self.population_change.is_none()
            && self.trend.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.species {
            if name.trim().is_empty() {
                return Err(ValidationError("species name must not be empty".to_string()));
            }
        }
        if let Some(impact) = self.impact {
            if impact > 100 {
                return Err(ValidationError(format!(
                    "impact {impact} out of range 0-100"
                )));
            }
        }
        Ok(())
    }

    /// Folds present fields onto the target and stamps `lastUpdated`.
    pub fn apply(&self, target: &mut Species, now: &str) {
        if let Some(species) = &self.species {
            target.species = species.clone();
        }
        if let Some(impact) = self.impact {
            target.impact = impact;
        }
        if let Some(previous) = self.previous_population {
            target.previous_population = previous;
        }
        if let Some(current) = self.current_population {
            target.current_population = current;
        }
        if let Some(change) = self.population_change {
            target.population_change = change;
        }
        if let Some(trend) = self.trend {
            target.trend = trend;
        }
        target.last_updated = Some(now.to_string());
    }
}

/// Creation input: the fixed required-field set, nothing optional. Missing
/// fields fail deserialization, which callers map to a validation failure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewSpecies {
    pub species: String,
    pub impact: u32,
    pub previous_population: u64,
    pub current_population: u64,
    pub population_change: f64,
    pub trend: Trend,
}

impl NewSpecies {
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

    #[must_use]
    pub fn into_species(self, id: u32, now: &str) -> Species {
        Species {
            id,
            species: self.species,
            impact: self.impact,
            previous_population: self.previous_population,
            current_population: self.current_population,
            population_change: self.population_change,
            trend: self.trend,
            last_updated: Some(now.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_dataset;

    const NOW: &str = "2026-02-03T04:05:06.000Z";

    #[test]
    fn snapshot_patch_rejects_unknown_fields() {
        let err = serde_json::from_str::<SnapshotPatch>(r#"{"risk":"높음","bogus":1}"#);
        assert!(err.is_err());
    }

    #[test]
    fn snapshot_patch_applies_only_present_fields() {
        let mut dataset = seed_dataset(NOW);
        let all = crate::keys::RegionKey::parse("all").unwrap();
        let snapshot = dataset
            .regions
            .get_mut(&all)
            .unwrap()
            .time_ranges
            .get_mut(&crate::keys::TimeRange::OneYear)
            .unwrap();
        let patch: SnapshotPatch =
            serde_json::from_str(r#"{"risk":"매우높음","concentration":"3.0"}"#).unwrap();
        patch.apply(snapshot);
        assert_eq!(snapshot.risk, RiskLevel::VeryHigh);
        assert_eq!(snapshot.concentration, "3.0");
        assert_eq!(snapshot.species, 147);
        assert_eq!(snapshot.risk_change, "+12%");
    }

    #[test]
    fn species_patch_rejects_id_updates() {
        assert!(serde_json::from_str::<SpeciesPatch>(r#"{"id":99}"#).is_err());
        assert!(serde_json::from_str::<SpeciesPatch>(r#"{"lastUpdated":"x"}"#).is_err());
    }

    #[test]
    fn species_patch_stamps_last_updated() {
        let mut dataset = seed_dataset(NOW);
        let target = dataset.species_by_id_mut(5).unwrap();
        let patch: SpeciesPatch = serde_json::from_str(r#"{"impact":70}"#).unwrap();
        patch.apply(target, "2026-03-01T00:00:00.000Z");
        assert_eq!(target.impact, 70);
        assert_eq!(
            target.last_updated.as_deref(),
            Some("2026-03-01T00:00:00.000Z")
        );
        assert_eq!(target.species, "참조기");
    }

    #[test]
    fn species_patch_validates_impact_range() {
        let patch: SpeciesPatch = serde_json::from_str(r#"{"impact":101}"#).unwrap();
        assert!(patch.validate().is_err());
    }

    #[test]
    fn new_species_requires_every_field() {
        let err = serde_json::from_str::<NewSpecies>(
            r#"{"species":"청새치","impact":40,"previousPopulation":100}"#,
        );
        assert!(err.is_err());

        let ok: NewSpecies = serde_json::from_str(
            r#"{"species":"청새치","impact":40,"previousPopulation":100,
                "currentPopulation":90,"populationChange":-10.0,"trend":"악화"}"#,
        )
        .unwrap();
        ok.validate().unwrap();
        let created = ok.into_species(7, NOW);
        assert_eq!(created.id, 7);
        assert_eq!(created.last_updated.as_deref(), Some(NOW));
    }
}
