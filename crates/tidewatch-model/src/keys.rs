// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

pub const REGION_KEY_MAX_LEN: usize = 32;

pub fn parse_region_key(input: &str) -> Result<RegionKey, ValidationError> {
    RegionKey::parse(input)
}

pub fn parse_time_range(input: &str) -> Result<TimeRange, ValidationError> {
    TimeRange::parse(input)
}

/// Partition key for regional views (`all`, `west`, `south`, `east`, `jeju`
/// in the seed; the document may carry additional keys).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct RegionKey(String);

impl RegionKey {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("region key must not be empty".to_string()));
        }
        if s.len() > REGION_KEY_MAX_LEN {
            return Err(ValidationError(format!(
                "region key exceeds max length {REGION_KEY_MAX_LEN}"
            )));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(ValidationError(
                "region key must match [a-z0-9]+".to_string(),
            ));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for RegionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lookback window selecting one snapshot of a region.
///
/// Declaration order is calendar order so `BTreeMap<TimeRange, _>` keys
/// serialize as `1month, 3months, 1year, 5years`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "1year")]
    OneYear,
    #[serde(rename = "5years")]
    FiveYears,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
        TimeRange::OneYear,
        TimeRange::FiveYears,
    ];

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input.trim() {
            "1month" => Ok(Self::OneMonth),
            "3months" => Ok(Self::ThreeMonths),
            "1year" => Ok(Self::OneYear),
            "5years" => Ok(Self::FiveYears),
            other => Err(ValidationError(format!(
                "unknown time range: {other} (expected 1month, 3months, 1year or 5years)"
            ))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMonth => "1month",
            Self::ThreeMonths => "3months",
            Self::OneYear => "1year",
            Self::FiveYears => "5years",
        }
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal risk grade carried by every snapshot. `Ord` follows severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "매우낮음")]
    VeryLow,
    #[serde(rename = "낮음")]
    Low,
    #[serde(rename = "중간")]
    Moderate,
    #[serde(rename = "높음")]
    High,
    #[serde(rename = "매우높음")]
    VeryHigh,
}

impl RiskLevel {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input.trim() {
            "매우낮음" => Ok(Self::VeryLow),
            "낮음" => Ok(Self::Low),
            "중간" => Ok(Self::Moderate),
            "높음" => Ok(Self::High),
            "매우높음" => Ok(Self::VeryHigh),
            other => Err(ValidationError(format!("unknown risk level: {other}"))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VeryLow => "매우낮음",
            Self::Low => "낮음",
            Self::Moderate => "중간",
            Self::High => "높음",
            Self::VeryHigh => "매우높음",
        }
    }
}

impl Display for RiskLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Population trend label on a species record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Trend {
    #[serde(rename = "악화")]
    Worsening,
    #[serde(rename = "유지")]
    Steady,
    #[serde(rename = "개선")]
    Improving,
}

impl Trend {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input.trim() {
            "악화" => Ok(Self::Worsening),
            "유지" => Ok(Self::Steady),
            "개선" => Ok(Self::Improving),
            other => Err(ValidationError(format!("unknown trend: {other}"))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Worsening => "악화",
            Self::Steady => "유지",
            Self::Improving => "개선",
        }
    }
}

impl Display for Trend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
