// SPDX-License-Identifier: Apache-2.0

use chrono::{SecondsFormat, Utc};

/// Current instant in the wire format used throughout the document and the
/// response envelopes (`2026-01-02T03:04:05.678Z`).
#[must_use]
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// File-name-safe form of an ISO-8601 instant, used for backup names.
#[must_use]
pub fn filename_stamp(iso: &str) -> String {
    iso.replace([':', '.'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_uses_utc_millis_with_zulu_suffix() {
        let now = now_iso8601();
        assert!(now.ends_with('Z'), "{now}");
        assert_eq!(now.len(), "2026-01-02T03:04:05.678Z".len(), "{now}");
    }

    #[test]
    fn filename_stamp_strips_colon_and_dot() {
        assert_eq!(
            filename_stamp("2026-01-02T03:04:05.678Z"),
            "2026-01-02T03-04-05-678Z"
        );
    }
}
