use super::*;
use tidewatch_model::{seed_dataset, Trend};

fn seed() -> Dataset {
    seed_dataset("2025-01-15T09:30:00.000Z")
}

fn species_names(rows: &[Species]) -> Vec<&str> {
    rows.iter().map(|s| s.species.as_str()).collect()
}

#[test]
fn all_region_chart_is_identity() {
    let dataset = seed();
    let key = RegionKey::parse("all").expect("key");
    assert_eq!(scale_factors(&key), IDENTITY_FACTORS);
    assert_eq!(scale_chart(&dataset.chart_data, &key), dataset.chart_data);
}

#[test]
fn unknown_region_scales_by_identity() {
    let key = RegionKey::parse("dokdo").expect("key");
    assert_eq!(scale_factors(&key), IDENTITY_FACTORS);
}

#[test]
fn west_scaling_rounds_each_series() {
    let dataset = seed();
    let key = RegionKey::parse("west").expect("key");
    let scaled = scale_chart(&dataset.chart_data, &key);
    assert_eq!(scaled.len(), 12);

    let january = &scaled[0];
    assert_eq!(january.month, "1월");
    assert_eq!(january.concentration, 2.3);
    assert_eq!(january.particles, 540);
    assert_eq!(january.risk, 72);

    let may = &scaled[4];
    assert_eq!(may.concentration, 4.2);
    assert_eq!(may.particles, 864);
    assert_eq!(may.risk, 99);
}

#[test]
fn east_scaling_rounds_each_series() {
    let dataset = seed();
    let key = RegionKey::parse("east").expect("key");
    let january = &scale_chart(&dataset.chart_data, &key)[0];
    assert_eq!(january.concentration, 1.3);
    assert_eq!(january.particles, 360);
    assert_eq!(january.risk, 52);
}

#[test]
fn scaled_risk_caps_at_one_hundred() {
    let points = vec![MonthlyPoint {
        month: "1월".to_string(),
        concentration: 3.5,
        particles: 800,
        risk: 95,
    }];
    let west = RegionKey::parse("west").expect("key");
    assert_eq!(scale_chart(&points, &west)[0].risk, 100);
    let south = RegionKey::parse("south").expect("key");
    assert_eq!(scale_chart(&points, &south)[0].risk, 86);
}

#[test]
fn impact_desc_orders_the_seed_listing() {
    let dataset = seed();
    let rows = sort_species(
        &dataset.species,
        SpeciesSortKey::Impact,
        SortOrder::Desc,
        0,
    );
    assert_eq!(
        species_names(&rows),
        vec!["고등어", "명태", "갈치", "오징어", "참조기", "멸치"]
    );
}

#[test]
fn limit_truncates_after_ordering() {
    let dataset = seed();
    let top = sort_species(
        &dataset.species,
        SpeciesSortKey::Impact,
        SortOrder::Desc,
        2,
    );
    assert_eq!(species_names(&top), vec!["고등어", "명태"]);
    let unlimited = sort_species(&dataset.species, SpeciesSortKey::Id, SortOrder::Asc, 0);
    assert_eq!(unlimited.len(), dataset.species.len());
}

#[test]
fn population_change_sorts_numerically() {
    let dataset = seed();
    let rows = sort_species(
        &dataset.species,
        SpeciesSortKey::PopulationChange,
        SortOrder::Asc,
        0,
    );
    assert_eq!(
        species_names(&rows),
        vec!["명태", "고등어", "오징어", "갈치", "참조기", "멸치"]
    );
}

#[test]
fn equal_keys_keep_input_order() {
    let mut dataset = seed();
    dataset.species.push(Species {
        id: 7,
        species: "전갱이".to_string(),
        impact: 85,
        previous_population: 2_000,
        current_population: 1_900,
        population_change: -5.0,
        trend: Trend::Worsening,
        last_updated: None,
    });

    let desc = sort_species(
        &dataset.species,
        SpeciesSortKey::Impact,
        SortOrder::Desc,
        0,
    );
    assert_eq!(desc[0].species, "고등어");
    assert_eq!(desc[1].species, "전갱이");

    let asc = sort_species(&dataset.species, SpeciesSortKey::Impact, SortOrder::Asc, 0);
    assert_eq!(asc[5].species, "고등어");
    assert_eq!(asc[6].species, "전갱이");
}

#[test]
fn sort_params_parse_wire_names() {
    for raw in [
        "id",
        "species",
        "impact",
        "previousPopulation",
        "currentPopulation",
        "populationChange",
        "trend",
        "lastUpdated",
    ] {
        let key = SpeciesSortKey::parse(raw).expect("sort key");
        assert_eq!(key.as_str(), raw);
    }
    let err = SpeciesSortKey::parse("magnitude").expect_err("unknown key");
    assert_eq!(err.code, QueryErrorCode::Validation);

    assert_eq!(SortOrder::parse("asc").expect("order"), SortOrder::Asc);
    assert_eq!(SortOrder::parse("desc").expect("order"), SortOrder::Desc);
    let err = SortOrder::parse("down").expect_err("unknown order");
    assert_eq!(err.code, QueryErrorCode::Validation);
}

#[test]
fn region_and_snapshot_lookups_resolve() {
    let dataset = seed();
    let west = RegionKey::parse("west").expect("key");
    assert_eq!(region(&dataset, &west).expect("region").name, "서해");
    let snap = snapshot(&dataset, &west, TimeRange::OneMonth).expect("snapshot");
    assert_eq!(snap.concentration, "3.2");
    assert_eq!(snap.risk, RiskLevel::VeryHigh);
}

#[test]
fn missing_region_reports_not_found() {
    let dataset = seed();
    let key = RegionKey::parse("dokdo").expect("key");
    let err = region(&dataset, &key).expect_err("missing region");
    assert_eq!(err.code, QueryErrorCode::NotFound);
    assert!(err.message.contains("dokdo"), "message: {}", err.message);

    let err = snapshot(&dataset, &key, TimeRange::OneYear).expect_err("missing region");
    assert_eq!(err.code, QueryErrorCode::NotFound);

    let err = pollution_sources(&dataset, &key).expect_err("missing region");
    assert_eq!(err.code, QueryErrorCode::NotFound);
}

#[test]
fn pollution_sources_resolve_per_region() {
    let dataset = seed();
    let all = RegionKey::parse("all").expect("key");
    let shares = pollution_sources(&dataset, &all).expect("shares");
    assert_eq!(shares.len(), 4);
    assert_eq!(shares[0].name, "플라스틱 포장재");
    assert_eq!(shares[0].percentage, 35);
}

#[test]
fn stats_count_every_collection() {
    let dataset = seed();
    let stats = dataset_stats(&dataset);
    assert_eq!(stats.regions, 5);
    assert_eq!(stats.species, 6);
    assert_eq!(stats.pollution_sources, 5);
    assert_eq!(stats.chart_data_points, 12);
    assert_eq!(stats.total_records, 43);
    assert_eq!(stats.version, "1.0.0");
    assert_eq!(stats.last_updated, "2025-01-15T09:30:00.000Z");
}

#[test]
fn recent_species_orders_newest_first() {
    let mut dataset = seed();
    dataset.species[2].last_updated = Some("2025-03-01T00:00:00.000Z".to_string());
    dataset.species[4].last_updated = None;

    let recent = recent_species(&dataset, 3);
    assert_eq!(recent[0].species, "갈치");
    assert_eq!(recent.len(), 3);

    let full = recent_species(&dataset, 0);
    assert_eq!(full.last().map(|s| s.species.as_str()), Some("참조기"));
}

#[test]
fn risk_histogram_covers_every_snapshot() {
    let dataset = seed();
    let histogram = risk_distribution(&dataset);
    let entries: Vec<(RiskLevel, u32)> = histogram.into_iter().collect();
    assert_eq!(
        entries,
        vec![
            (RiskLevel::VeryLow, 1),
            (RiskLevel::Low, 5),
            (RiskLevel::Moderate, 7),
            (RiskLevel::High, 4),
            (RiskLevel::VeryHigh, 3),
        ]
    );
}
