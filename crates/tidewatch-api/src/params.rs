// SPDX-License-Identifier: Apache-2.0

use crate::ApiError;
use std::collections::BTreeMap;
use tidewatch_model::{parse_region_key, parse_time_range, RegionKey, TimeRange};
use tidewatch_query::{SortOrder, SpeciesSortKey};

pub const DEFAULT_REGION: &str = "all";
pub const DEFAULT_TIME_RANGE: TimeRange = TimeRange::OneYear;
pub const MAX_SPECIES_LIMIT: usize = 500;

fn default_region() -> RegionKey {
    parse_region_key(DEFAULT_REGION).unwrap_or_else(|e| unreachable!("default region key: {e}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionQuery {
    pub region: RegionKey,
    pub time_range: TimeRange,
}

/// Read-side variant: both parameters optional, defaulting to `all`/`1year`.
pub fn parse_region_query(query: &BTreeMap<String, String>) -> Result<RegionQuery, ApiError> {
    let region = match query.get("region") {
        Some(raw) => parse_region_key(raw).map_err(|_| ApiError::invalid_param("region", raw))?,
        None => default_region(),
    };
    let time_range = match query.get("timeRange") {
        Some(raw) => parse_time_range(raw).map_err(|_| ApiError::invalid_param("timeRange", raw))?,
        None => DEFAULT_TIME_RANGE,
    };
    Ok(RegionQuery { region, time_range })
}

/// Write-side variant: both parameters must be present.
pub fn parse_region_query_required(
    query: &BTreeMap<String, String>,
) -> Result<RegionQuery, ApiError> {
    let raw_region = query
        .get("region")
        .ok_or_else(|| ApiError::missing_param("region"))?;
    let raw_range = query
        .get("timeRange")
        .ok_or_else(|| ApiError::missing_param("timeRange"))?;
    Ok(RegionQuery {
        region: parse_region_key(raw_region)
            .map_err(|_| ApiError::invalid_param("region", raw_region))?,
        time_range: parse_time_range(raw_range)
            .map_err(|_| ApiError::invalid_param("timeRange", raw_range))?,
    })
}

/// Region-only variant for routes that ignore the time axis.
pub fn parse_region_param(query: &BTreeMap<String, String>) -> Result<RegionKey, ApiError> {
    match query.get("region") {
        Some(raw) => parse_region_key(raw).map_err(|_| ApiError::invalid_param("region", raw)),
        None => Ok(default_region()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeciesListQuery {
    pub sort: SpeciesSortKey,
    pub order: SortOrder,
    pub limit: usize,
}

/// Listing parameters; `limit` 0 (the default) means the whole collection.
pub fn parse_species_list_params(
    query: &BTreeMap<String, String>,
) -> Result<SpeciesListQuery, ApiError> {
    let sort = match query.get("sortBy") {
        Some(raw) => {
            SpeciesSortKey::parse(raw).map_err(|_| ApiError::invalid_param("sortBy", raw))?
        }
        None => SpeciesSortKey::Impact,
    };
    let order = match query.get("order") {
        Some(raw) => SortOrder::parse(raw).map_err(|_| ApiError::invalid_param("order", raw))?,
        None => SortOrder::Desc,
    };
    let limit = match query.get("limit") {
        Some(raw) => {
            let value = raw
                .parse::<usize>()
                .map_err(|_| ApiError::invalid_param("limit", raw))?;
            if value > MAX_SPECIES_LIMIT {
                return Err(ApiError::invalid_param("limit", raw));
            }
            value
        }
        None => 0,
    };
    Ok(SpeciesListQuery { sort, order, limit })
}

/// Truthy query flag: `1` or any casing of `true`.
#[must_use]
pub fn bool_flag(query: &BTreeMap<String, String>, name: &str) -> bool {
    query
        .get(name)
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}
