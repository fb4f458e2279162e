//! Due date input normalization.
//!
//! # Responsibility
//! - Turn user-entered due dates into UTC instants or "no due date".
//! - Render stored instants back into `datetime-local` form values.
//!
//! # Invariants
//! - Empty or whitespace-only input means no due date, never an error.
//! - Input carrying an explicit offset keeps its instant.
//! - Offset-less input is read in the caller-provided local offset.

use crate::model::task::TaskValidationError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

const LOCAL_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];
const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";
const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Normalizes optional due date input.
///
/// Accepted shapes:
/// - RFC 3339 with offset (`2024-01-01T00:00:00Z`, `...+09:00`).
/// - `datetime-local` values (`YYYY-MM-DDTHH:MM[:SS]`) in `local_offset`.
/// - Date only (`YYYY-MM-DD`), read as local midnight.
///
/// # Errors
/// - `InvalidDatetime` when non-empty input matches none of the shapes.
pub fn normalize_datetime_input(
    input: Option<&str>,
    local_offset: &FixedOffset,
) -> Result<Option<DateTime<Utc>>, TaskValidationError> {
    let Some(raw) = input.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    let naive = LOCAL_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_ONLY_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| TaskValidationError::InvalidDatetime(raw.to_string()))?;

    local_offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| Some(local.with_timezone(&Utc)))
        .ok_or_else(|| TaskValidationError::InvalidDatetime(raw.to_string()))
}

/// Formats an instant as a `datetime-local` form value in `local_offset`.
pub fn to_datetime_local_input(instant: &DateTime<Utc>, local_offset: &FixedOffset) -> String {
    instant
        .with_timezone(local_offset)
        .format(DATETIME_LOCAL_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{normalize_datetime_input, to_datetime_local_input};
    use crate::model::task::TaskValidationError;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn plus_two() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    #[test]
    fn blank_input_means_no_due_date() {
        assert_eq!(normalize_datetime_input(None, &plus_two()).unwrap(), None);
        assert_eq!(normalize_datetime_input(Some("   "), &plus_two()).unwrap(), None);
    }

    #[test]
    fn rfc3339_input_keeps_its_instant() {
        let parsed = normalize_datetime_input(Some("2024-01-01T09:00:00.000+09:00"), &plus_two())
            .unwrap()
            .unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn datetime_local_input_uses_local_offset() {
        let parsed = normalize_datetime_input(Some("2024-06-02T14:30"), &plus_two())
            .unwrap()
            .unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 2, 12, 30, 0).unwrap());
    }

    #[test]
    fn date_only_input_is_local_midnight() {
        let parsed = normalize_datetime_input(Some("2024-06-02"), &plus_two())
            .unwrap()
            .unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap());
    }

    #[test]
    fn garbage_input_is_rejected() {
        let err = normalize_datetime_input(Some("next tuesday"), &plus_two()).unwrap_err();
        assert_eq!(
            err,
            TaskValidationError::InvalidDatetime("next tuesday".to_string())
        );
    }

    #[test]
    fn datetime_local_output_matches_form_shape() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 2, 12, 30, 45).unwrap();
        assert_eq!(to_datetime_local_input(&instant, &plus_two()), "2024-06-02T14:30");
    }
}
