#![forbid(unsafe_code)]
//! tidewatch model SSOT: the persisted document shape, validated key types,
//! partial-update inputs and the canonical seed constructor.

mod dataset;
mod keys;
mod patch;
mod seed;
mod time;

pub use dataset::{
    Dataset, DatasetMetadata, MonthlyPoint, Region, SourceShare, Species, TimeRangeSnapshot,
};
pub use keys::{
    parse_region_key, parse_time_range, RegionKey, RiskLevel, TimeRange, Trend, ValidationError,
    REGION_KEY_MAX_LEN,
};
pub use patch::{NewSpecies, SnapshotPatch, SpeciesPatch};
pub use seed::{seed_dataset, SEED_VERSION};
pub use time::{filename_stamp, now_iso8601};

pub const CRATE_NAME: &str = "tidewatch-model";
