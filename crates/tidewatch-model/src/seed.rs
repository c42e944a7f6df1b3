// SPDX-License-Identifier: Apache-2.0

//! Canonical seed document.
//!
//! Pure constructor: every call builds a fresh value, `totalRecords` is
//! computed from the collections, and the only variability is the
//! caller-supplied timestamp.

use crate::dataset::{
    Dataset, DatasetMetadata, MonthlyPoint, Region, SourceShare, Species, TimeRangeSnapshot,
};
use crate::keys::{RegionKey, RiskLevel, TimeRange, Trend};
use std::collections::BTreeMap;

pub const SEED_VERSION: &str = "1.0.0";

fn key(raw: &str) -> RegionKey {
    // Seed keys are static and always pass validation.
    RegionKey::parse(raw).unwrap_or_else(|e| unreachable!("seed region key {raw}: {e}"))
}

#[allow(clippy::too_many_arguments)]
fn snapshot(
    risk: RiskLevel,
    concentration: &str,
    species: u32,
    points: u32,
    risk_change: &str,
    conc_change: &str,
    species_change: &str,
    points_change: &str,
) -> TimeRangeSnapshot {
    TimeRangeSnapshot {
        risk,
        concentration: concentration.to_string(),
        species,
        points,
        risk_change: risk_change.to_string(),
        conc_change: conc_change.to_string(),
        species_change: species_change.to_string(),
        points_change: points_change.to_string(),
    }
}

fn region(name: &str, ranges: [(TimeRange, TimeRangeSnapshot); 4]) -> Region {
    Region {
        name: name.to_string(),
        time_ranges: BTreeMap::from(ranges),
    }
}

fn seed_regions() -> BTreeMap<RegionKey, Region> {
    use RiskLevel::{High, Low, Moderate, VeryHigh, VeryLow};
    use TimeRange::{FiveYears, OneMonth, OneYear, ThreeMonths};

    BTreeMap::from([
        (
            key("all"),
            region(
                "전체 해역",
                [
                    (OneMonth, snapshot(High, "2.4", 147, 89, "+12%", "+8%", "+15%", "+5%")),
                    (ThreeMonths, snapshot(High, "2.3", 142, 87, "+10%", "+6%", "+12%", "+3%")),
                    (OneYear, snapshot(High, "2.4", 147, 89, "+12%", "+8%", "+15%", "+5%")),
                    (FiveYears, snapshot(Moderate, "2.1", 134, 82, "+18%", "+22%", "+28%", "+15%")),
                ],
            ),
        ),
        (
            key("west"),
            region(
                "서해",
                [
                    (OneMonth, snapshot(VeryHigh, "3.2", 67, 23, "+18%", "+15%", "+22%", "+8%")),
                    (ThreeMonths, snapshot(VeryHigh, "3.1", 65, 22, "+16%", "+12%", "+18%", "+6%")),
                    (OneYear, snapshot(VeryHigh, "3.1", 67, 23, "+18%", "+15%", "+22%", "+8%")),
                    (FiveYears, snapshot(High, "2.8", 58, 20, "+25%", "+35%", "+45%", "+25%")),
                ],
            ),
        ),
        (
            key("south"),
            region(
                "남해",
                [
                    (OneMonth, snapshot(Moderate, "2.4", 45, 28, "+8%", "+5%", "+12%", "+3%")),
                    (ThreeMonths, snapshot(Moderate, "2.3", 43, 27, "+6%", "+3%", "+8%", "+2%")),
                    (OneYear, snapshot(Moderate, "2.3", 45, 28, "+8%", "+5%", "+12%", "+3%")),
                    (FiveYears, snapshot(Low, "2.0", 38, 24, "+15%", "+18%", "+25%", "+12%")),
                ],
            ),
        ),
        (
            key("east"),
            region(
                "동해",
                [
                    (OneMonth, snapshot(Low, "1.9", 28, 18, "+3%", "+2%", "+5%", "+1%")),
                    (ThreeMonths, snapshot(Low, "1.8", 27, 18, "+2%", "+1%", "+3%", "0%")),
                    (OneYear, snapshot(Low, "1.8", 28, 18, "+3%", "+2%", "+5%", "+1%")),
                    (FiveYears, snapshot(VeryLow, "1.5", 22, 15, "+8%", "+12%", "+15%", "+8%")),
                ],
            ),
        ),
        (
            key("jeju"),
            region(
                "제주 근해",
                [
                    (OneMonth, snapshot(Moderate, "2.2", 32, 20, "+6%", "+4%", "+8%", "+2%")),
                    (ThreeMonths, snapshot(Moderate, "2.1", 31, 20, "+4%", "+2%", "+6%", "+1%")),
                    (OneYear, snapshot(Moderate, "2.1", 32, 20, "+6%", "+4%", "+8%", "+2%")),
                    (FiveYears, snapshot(Low, "1.8", 26, 17, "+12%", "+15%", "+18%", "+10%")),
                ],
            ),
        ),
    ])
}

fn seed_species(now: &str) -> Vec<Species> {
    let entry = |id, name: &str, impact, previous, current, change, trend| Species {
        id,
        species: name.to_string(),
        impact,
        previous_population: previous,
        current_population: current,
        population_change: change,
        trend,
        last_updated: Some(now.to_string()),
    };
    vec![
        entry(1, "고등어", 85, 12_500, 10_800, -13.6, Trend::Worsening),
        entry(2, "명태", 78, 8_900, 7_650, -14.0, Trend::Worsening),
        entry(3, "갈치", 72, 6_200, 6_180, -0.3, Trend::Steady),
        entry(4, "오징어", 68, 4_800, 4_320, -10.0, Trend::Worsening),
        entry(5, "참조기", 65, 3_400, 3_570, 5.0, Trend::Improving),
        entry(6, "멸치", 62, 15_600, 17_940, 15.0, Trend::Improving),
    ]
}

fn seed_pollution_sources() -> BTreeMap<RegionKey, Vec<SourceShare>> {
    let share = |name: &str, percentage| SourceShare {
        name: name.to_string(),
        percentage,
    };
    BTreeMap::from([
        (
            key("all"),
            vec![
                share("플라스틱 포장재", 35),
                share("어업용 도구", 28),
                share("생활용품", 22),
                share("산업폐기물", 15),
            ],
        ),
        (
            key("west"),
            vec![
                share("산업폐기물", 42),
                share("플라스틱 포장재", 31),
                share("어업용 도구", 18),
                share("생활용품", 9),
            ],
        ),
        (
            key("south"),
            vec![
                share("어업용 도구", 38),
                share("플라스틱 포장재", 29),
                share("관광 폐기물", 21),
                share("생활용품", 12),
            ],
        ),
        (
            key("east"),
            vec![
                share("어업용 도구", 45),
                share("플라스틱 포장재", 28),
                share("생활용품", 18),
                share("해상운송", 9),
            ],
        ),
        (
            key("jeju"),
            vec![
                share("관광 폐기물", 36),
                share("플라스틱 포장재", 32),
                share("어업용 도구", 22),
                share("생활용품", 10),
            ],
        ),
    ])
}

fn seed_chart_data() -> Vec<MonthlyPoint> {
    let point = |month: &str, concentration, particles, risk| MonthlyPoint {
        month: month.to_string(),
        concentration,
        particles,
        risk,
    };
    vec![
        point("1월", 1.8, 450, 65),
        point("2월", 2.1, 520, 72),
        point("3월", 2.4, 580, 78),
        point("4월", 2.8, 650, 85),
        point("5월", 3.2, 720, 90),
        point("6월", 2.9, 680, 87),
        point("7월", 2.6, 620, 82),
        point("8월", 2.3, 560, 75),
        point("9월", 2.0, 500, 70),
        point("10월", 2.2, 530, 73),
        point("11월", 2.5, 590, 80),
        point("12월", 2.7, 630, 83),
    ]
}

/// Builds the canonical default dataset with `now` as every timestamp.
#[must_use]
pub fn seed_dataset(now: &str) -> Dataset {
    let mut dataset = Dataset {
        regions: seed_regions(),
        species: seed_species(now),
        pollution_sources: seed_pollution_sources(),
        chart_data: seed_chart_data(),
        metadata: DatasetMetadata {
            version: SEED_VERSION.to_string(),
            last_updated: now.to_string(),
            total_records: 0,
            auto_generated: true,
        },
    };
    dataset.metadata.total_records = dataset.total_records();
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: &str = "2026-01-01T00:00:00.000Z";

    #[test]
    fn seed_is_deterministic_for_a_fixed_timestamp() {
        assert_eq!(seed_dataset(NOW), seed_dataset(NOW));
    }

    #[test]
    fn seed_has_five_regions_with_four_ranges_each() {
        let dataset = seed_dataset(NOW);
        assert_eq!(dataset.regions.len(), 5);
        for region in dataset.regions.values() {
            assert_eq!(region.time_ranges.len(), 4);
        }
        let names: Vec<&str> = dataset.regions.keys().map(RegionKey::as_str).collect();
        assert_eq!(names, vec!["all", "east", "jeju", "south", "west"]);
    }

    #[test]
    fn seed_figures_match_the_canonical_document() {
        let dataset = seed_dataset(NOW);
        let west = &dataset.regions[&key("west")];
        assert_eq!(west.name, "서해");
        let five_years = &west.time_ranges[&TimeRange::FiveYears];
        assert_eq!(five_years.risk, RiskLevel::High);
        assert_eq!(five_years.concentration, "2.8");
        assert_eq!(five_years.species, 58);
        assert_eq!(five_years.conc_change, "+35%");

        let east_3m = &dataset.regions[&key("east")].time_ranges[&TimeRange::ThreeMonths];
        assert_eq!(east_3m.points_change, "0%");

        assert_eq!(dataset.species.len(), 6);
        assert_eq!(dataset.species[0].species, "고등어");
        assert_eq!(dataset.species[0].impact, 85);
        assert_eq!(dataset.species[5].current_population, 17_940);

        assert_eq!(dataset.pollution_sources.len(), 5);
        assert_eq!(dataset.pollution_sources[&key("jeju")][0].name, "관광 폐기물");
        assert_eq!(dataset.pollution_sources[&key("jeju")][0].percentage, 36);

        assert_eq!(dataset.chart_data.len(), 12);
        assert_eq!(dataset.chart_data[4].month, "5월");
        assert_eq!(dataset.chart_data[4].concentration, 3.2);
        assert_eq!(dataset.chart_data[4].particles, 720);
        assert_eq!(dataset.chart_data[11].risk, 83);
    }

    #[test]
    fn seed_metadata_is_computed_not_stored() {
        let dataset = seed_dataset(NOW);
        assert_eq!(dataset.metadata.version, SEED_VERSION);
        assert_eq!(dataset.metadata.last_updated, NOW);
        assert_eq!(dataset.metadata.total_records, 43);
        assert!(dataset.metadata.auto_generated);
    }
}
