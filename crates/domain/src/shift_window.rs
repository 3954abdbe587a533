// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shift window projection.
//!
//! A shift definition is an absolute UTC time window. Copy and bulk-update
//! operations project a window's wall-clock times (in the event timezone)
//! onto new calendar dates:
//!
//! - Each (source window, target date) pair yields a candidate window whose
//!   start is the source's local start time on the target date.
//! - If the computed end does not come after the start, the shift crosses
//!   midnight and the end advances one day.
//! - Ambiguous or non-existent local times (DST transitions) are an error.
//!
//! Windows are stored as UTC timestamps (RFC 3339); all projection math is
//! wall-clock in the declared event timezone.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::DomainError;

/// An absolute time window during which staffing is needed.
///
/// Shared across dots; uniquely identified within an event by its
/// (start, end) pair. A window carries no rate — pay lives on the
/// assignment linking a dot to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShiftWindow {
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
}

impl ShiftWindow {
    /// Creates a new shift window.
    ///
    /// # Errors
    ///
    /// Returns an error if `end_utc` does not come after `start_utc`.
    pub fn new(start_utc: DateTime<Utc>, end_utc: DateTime<Utc>) -> Result<Self, DomainError> {
        if end_utc <= start_utc {
            return Err(DomainError::InvalidShiftWindow {
                start: start_utc.to_rfc3339(),
                end: end_utc.to_rfc3339(),
            });
        }
        Ok(Self { start_utc, end_utc })
    }

    /// The window start (UTC).
    #[must_use]
    pub const fn start_utc(&self) -> DateTime<Utc> {
        self.start_utc
    }

    /// The window end (UTC).
    #[must_use]
    pub const fn end_utc(&self) -> DateTime<Utc> {
        self.end_utc
    }

    /// The window length in hours.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_hours(&self) -> f64 {
        (self.end_utc - self.start_utc).num_seconds() as f64 / 3600.0
    }

    /// The window's wall-clock start and end times in `tz`.
    #[must_use]
    pub fn local_times(&self, tz: Tz) -> (NaiveTime, NaiveTime) {
        (
            self.start_utc.with_timezone(&tz).time(),
            self.end_utc.with_timezone(&tz).time(),
        )
    }

    /// Generates the display name for this window, e.g.
    /// `2024-08-22 07:00 - 15:00`, using wall-clock times in `tz`.
    #[must_use]
    pub fn display_name(&self, tz: Tz) -> String {
        let start_local = self.start_utc.with_timezone(&tz);
        let end_local = self.end_utc.with_timezone(&tz);
        format!(
            "{} {} - {}",
            start_local.format("%Y-%m-%d"),
            start_local.format("%H:%M"),
            end_local.format("%H:%M")
        )
    }
}

/// Parses an IANA timezone name.
///
/// # Errors
///
/// Returns an error if the name is not a valid timezone.
pub fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.parse()
        .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
}

/// Converts a `time::Date` into a `chrono::NaiveDate`.
///
/// # Errors
///
/// Returns an error if the date cannot be represented.
pub fn to_naive_date(date: time::Date) -> Result<NaiveDate, DomainError> {
    NaiveDate::from_ymd_opt(date.year(), date.month() as u32, u32::from(date.day()))
        .ok_or(DomainError::DateOutOfRange { date })
}

/// Projects a source window's wall-clock times onto a target calendar date.
///
/// # Errors
///
/// Returns an error if a projected local time cannot be resolved in `tz`.
pub fn project_onto_date(
    source: &ShiftWindow,
    tz: Tz,
    date: NaiveDate,
) -> Result<ShiftWindow, DomainError> {
    let (start_time, end_time) = source.local_times(tz);
    project_times_onto_date(start_time, end_time, tz, date)
}

/// Builds the absolute window for wall-clock `start_time`/`end_time` on
/// `date` in `tz`. An end at or before the start crosses midnight and lands
/// on the following day.
///
/// # Errors
///
/// Returns an error if a local time is ambiguous or non-existent in `tz`.
pub fn project_times_onto_date(
    start_time: NaiveTime,
    end_time: NaiveTime,
    tz: Tz,
    date: NaiveDate,
) -> Result<ShiftWindow, DomainError> {
    let start = resolve_local(tz, date, start_time)?;
    let mut end = resolve_local(tz, date, end_time)?;
    if end <= start {
        end = resolve_local(tz, date + Duration::days(1), end_time)?;
    }

    ShiftWindow::new(start.with_timezone(&Utc), end.with_timezone(&Utc))
}

/// Resolves a wall-clock datetime in `tz` to an absolute instant.
fn resolve_local(tz: Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Tz>, DomainError> {
    tz.from_local_datetime(&date.and_time(time))
        .single()
        .ok_or(DomainError::UnresolvableLocalTime { date, time })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn window(start: &str, end: &str) -> ShiftWindow {
        ShiftWindow::new(utc(start), utc(end)).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_window() {
        let result = ShiftWindow::new(utc("2024-08-22T15:00:00Z"), utc("2024-08-22T07:00:00Z"));
        assert!(result.is_err());
    }

    #[test]
    fn test_duration_hours() {
        let w = window("2024-08-22T07:00:00Z", "2024-08-22T15:30:00Z");
        assert!((w.duration_hours() - 8.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_project_onto_date_keeps_wall_clock_times() {
        let tz: Tz = "Europe/London".parse().unwrap();
        // 07:00-15:00 London in August is 06:00-14:00 UTC.
        let source = window("2024-08-01T06:00:00Z", "2024-08-01T14:00:00Z");

        let projected =
            project_onto_date(&source, tz, NaiveDate::from_ymd_opt(2024, 8, 22).unwrap()).unwrap();

        assert_eq!(projected.start_utc(), utc("2024-08-22T06:00:00Z"));
        assert_eq!(projected.end_utc(), utc("2024-08-22T14:00:00Z"));
        let (start_local, end_local) = projected.local_times(tz);
        assert_eq!(start_local, NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        assert_eq!(end_local, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
    }

    #[test]
    fn test_projection_across_dst_boundary_keeps_wall_clock() {
        let tz: Tz = "Europe/London".parse().unwrap();
        // An August shift (BST, UTC+1) projected onto a December date (GMT).
        let source = window("2024-08-01T06:00:00Z", "2024-08-01T14:00:00Z");

        let projected =
            project_onto_date(&source, tz, NaiveDate::from_ymd_opt(2024, 12, 2).unwrap()).unwrap();

        // Wall-clock 07:00-15:00 is preserved; the UTC instants shift.
        assert_eq!(projected.start_utc(), utc("2024-12-02T07:00:00Z"));
        assert_eq!(projected.end_utc(), utc("2024-12-02T15:00:00Z"));
    }

    #[test]
    fn test_projection_crossing_midnight_advances_end_day() {
        let tz: Tz = "UTC".parse().unwrap();
        let projected = project_times_onto_date(
            NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            tz,
            NaiveDate::from_ymd_opt(2024, 8, 22).unwrap(),
        )
        .unwrap();

        assert_eq!(projected.start_utc(), utc("2024-08-22T22:00:00Z"));
        assert_eq!(projected.end_utc(), utc("2024-08-23T06:00:00Z"));
        assert!((projected.duration_hours() - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_nonexistent_local_time_is_an_error() {
        let tz: Tz = "Europe/London".parse().unwrap();
        // 2024-03-31 01:30 does not exist in London (clocks jump 01:00 -> 02:00).
        let result = project_times_onto_date(
            NaiveTime::from_hms_opt(1, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            tz,
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        );

        assert!(matches!(
            result,
            Err(DomainError::UnresolvableLocalTime { .. })
        ));
    }

    #[test]
    fn test_parse_timezone_rejects_unknown_name() {
        assert!(parse_timezone("Invalid/Timezone").is_err());
        assert!(parse_timezone("America/New_York").is_ok());
    }

    #[test]
    fn test_to_naive_date() {
        let date = time::Date::from_calendar_date(2024, time::Month::August, 22).unwrap();
        assert_eq!(
            to_naive_date(date).unwrap(),
            NaiveDate::from_ymd_opt(2024, 8, 22).unwrap()
        );
    }

    #[test]
    fn test_display_name_uses_local_wall_clock() {
        let tz: Tz = "Europe/London".parse().unwrap();
        let w = window("2024-08-22T06:00:00Z", "2024-08-22T14:00:00Z");
        assert_eq!(w.display_name(tz), "2024-08-22 07:00 - 15:00");
    }
}
