// SPDX-License-Identifier: Apache-2.0

use crate::{ApiError, ApiErrorCode};

/// HTTP status for an error. Kept in one place so handlers cannot drift.
#[must_use]
pub fn map_error(error: &ApiError) -> u16 {
    match error.code {
        ApiErrorCode::ValidationFailed => 400,
        ApiErrorCode::NotFound => 404,
        ApiErrorCode::Conflict => 409,
        ApiErrorCode::UpstreamUnavailable => 503,
        ApiErrorCode::StorageUnavailable | ApiErrorCode::Internal => 500,
    }
}
