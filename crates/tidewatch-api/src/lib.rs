#![forbid(unsafe_code)]
//! HTTP contract for the tidewatch backend: the error taxonomy and its
//! status mapping, query-parameter parsing and the uniform response
//! envelope. Handlers depend on this crate instead of shaping JSON inline.

mod envelope;
mod error_mapping;
pub mod params;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::{Display, Formatter};
use tidewatch_ingest::IngestError;
use tidewatch_model::ValidationError;
use tidewatch_query::{QueryError, QueryErrorCode};
use tidewatch_store::{StoreError, StoreErrorCode};

pub use envelope::{error_envelope, success_envelope};
pub use error_mapping::map_error;

pub const CRATE_NAME: &str = "tidewatch-api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ApiErrorCode {
    NotFound,
    ValidationFailed,
    Conflict,
    StorageUnavailable,
    UpstreamUnavailable,
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::ValidationFailed => "validation_failed",
            Self::Conflict => "conflict",
            Self::StorageUnavailable => "storage_unavailable",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::NotFound, message, Value::Null)
    }

    #[must_use]
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::ValidationFailed, message, Value::Null)
    }

    #[must_use]
    pub fn invalid_param(name: &str, value: &str) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            format!("invalid query parameter: {name}"),
            json!({"parameter": name, "value": value}),
        )
    }

    #[must_use]
    pub fn missing_param(name: &str) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            format!("missing query parameter: {name}"),
            json!({"parameter": name}),
        )
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Conflict, message, Value::Null)
    }

    #[must_use]
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::StorageUnavailable, message, Value::Null)
    }

    #[must_use]
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::UpstreamUnavailable, message, Value::Null)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Internal, message, Value::Null)
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        let code = match error.code {
            StoreErrorCode::NotFound => ApiErrorCode::NotFound,
            StoreErrorCode::Validation => ApiErrorCode::ValidationFailed,
            StoreErrorCode::Conflict => ApiErrorCode::Conflict,
            StoreErrorCode::Corrupt | StoreErrorCode::Io => ApiErrorCode::StorageUnavailable,
            _ => ApiErrorCode::Internal,
        };
        Self::new(
            code,
            error.message,
            json!({"source": "store", "code": error.code.as_str()}),
        )
    }
}

impl From<QueryError> for ApiError {
    fn from(error: QueryError) -> Self {
        let code = match error.code {
            QueryErrorCode::NotFound => ApiErrorCode::NotFound,
            _ => ApiErrorCode::ValidationFailed,
        };
        Self::new(code, error.message, Value::Null)
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        Self::validation_failed(error.0)
    }
}

impl From<IngestError> for ApiError {
    fn from(error: IngestError) -> Self {
        Self::new(
            ApiErrorCode::UpstreamUnavailable,
            error.message,
            json!({"source": "ingest", "code": error.code.as_str()}),
        )
    }
}
