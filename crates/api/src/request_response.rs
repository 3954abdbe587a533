// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response payloads of the orchestration boundary.
//!
//! Timestamps arrive as RFC 3339 strings, calendar dates as ISO 8601
//! (`2024-08-22`), and wall-clock times as `HH:MM` or `HH:MM:SS`. All
//! parsing happens here, before any planning or persistence work.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use dotplan::{FieldChanges, Reschedule, ShiftTemplate, UploadShift};
use dotplan_domain::{DotFlags, GeoPoint, ShiftWindow};

use crate::error::{ApiError, translate_domain_error};

/// One uploaded staffing descriptor, with lookups by human-readable name.
#[derive(Debug, Clone, Deserialize)]
pub struct DotUploadRow {
    pub pos_id: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub position_name: Option<String>,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub base: bool,
    #[serde(default)]
    pub addition: bool,
    #[serde(default)]
    pub shifts: Vec<ShiftUpload>,
}

impl DotUploadRow {
    pub(crate) const fn flags(&self) -> DotFlags {
        DotFlags {
            placed: false,
            missing: false,
            priority: self.priority,
            base: self.base,
            addition: self.addition,
        }
    }
}

/// One shift demand of an uploaded row.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftUpload {
    /// Window start (UTC, RFC 3339).
    pub start: String,
    /// Window end (UTC, RFC 3339).
    pub end: String,
    pub rate: f64,
    pub staff: i32,
}

impl ShiftUpload {
    pub(crate) fn window(&self) -> Result<ShiftWindow, ApiError> {
        let start = parse_instant(&self.start, "shifts.start")?;
        let end = parse_instant(&self.end, "shifts.end")?;
        ShiftWindow::new(start, end).map_err(translate_domain_error)
    }

    pub(crate) fn to_upload_shift(&self) -> Result<UploadShift, ApiError> {
        Ok(UploadShift {
            window: self.window()?,
            rate: self.rate,
            staff: self.staff,
        })
    }
}

/// Upload: insert a batch of new dots.
#[derive(Debug, Clone, Deserialize)]
pub struct DotUploadRequest {
    pub rows: Vec<DotUploadRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub dot_ids: Vec<i64>,
    pub shifts_created: usize,
}

/// Clone: duplicate existing dots under fresh identifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct CloneRequest {
    pub dot_ids: Vec<i64>,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CloneResponse {
    pub dot_ids: Vec<i64>,
}

/// Copy: project a placed deployment's shift pattern onto new dates.
///
/// Omitting `dot_ids` targets every placed dot of the event.
#[derive(Debug, Clone, Deserialize)]
pub struct CopyRequest {
    #[serde(default)]
    pub dot_ids: Option<Vec<i64>>,
    /// Target calendar dates (ISO 8601).
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CopyResponse {
    pub shifts_created: usize,
    pub assignments_inserted: usize,
    pub staff_incremented: usize,
}

/// Swap: upload a fresh batch while reassigning one vendor's dots.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapRequest {
    /// The vendor whose pre-existing dots are reassigned.
    pub replace_vendor_id: i64,
    pub rows: Vec<DotUploadRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapResponse {
    pub dot_ids: Vec<i64>,
    pub dots_reassigned: usize,
}

/// Bulk update: shared field changes and an optional shared shift/date
/// replacement.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkUpdateRequest {
    pub dot_ids: Vec<i64>,
    #[serde(default)]
    pub vendor_id: Option<i64>,
    #[serde(default)]
    pub area_id: Option<i64>,
    #[serde(default)]
    pub position_id: Option<i64>,
    #[serde(default)]
    pub position_name_id: Option<i64>,
    #[serde(default)]
    pub shifts: Option<BulkShiftChange>,
}

impl BulkUpdateRequest {
    pub(crate) const fn field_changes(&self) -> FieldChanges {
        FieldChanges {
            vendor_id: self.vendor_id,
            area_id: self.area_id,
            position_id: self.position_id,
            position_name_id: self.position_name_id,
        }
    }
}

/// The shared shift/date replacement of a bulk update.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkShiftChange {
    pub templates: Vec<ShiftTemplateUpload>,
    /// Target calendar dates (ISO 8601).
    pub dates: Vec<String>,
}

impl BulkShiftChange {
    pub(crate) fn to_reschedule(&self) -> Result<Reschedule, ApiError> {
        let templates = self
            .templates
            .iter()
            .map(ShiftTemplateUpload::to_template)
            .collect::<Result<Vec<_>, _>>()?;
        let dates = self
            .dates
            .iter()
            .map(|d| parse_date(d))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Reschedule { templates, dates })
    }
}

/// A wall-clock shift template of a bulk update.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftTemplateUpload {
    /// Wall-clock start in the event timezone (`HH:MM` or `HH:MM:SS`).
    pub start_time: String,
    /// Wall-clock end in the event timezone.
    pub end_time: String,
    pub rate: f64,
    pub staff: i32,
}

impl ShiftTemplateUpload {
    pub(crate) fn to_template(&self) -> Result<ShiftTemplate, ApiError> {
        Ok(ShiftTemplate {
            start_time: parse_time_of_day(&self.start_time, "shifts.start_time")?,
            end_time: parse_time_of_day(&self.end_time, "shifts.end_time")?,
            rate: self.rate,
            staff: self.staff,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkUpdateResponse {
    pub dots_updated: usize,
    pub shifts_created: usize,
}

/// Update of a single dot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDotRequest {
    #[serde(default)]
    pub vendor_id: Option<i64>,
    #[serde(default)]
    pub area_id: Option<i64>,
    #[serde(default)]
    pub position_id: Option<i64>,
    #[serde(default)]
    pub position_name_id: Option<i64>,
    #[serde(default)]
    pub flags: Option<DotFlags>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub shifts: Vec<ShiftUpload>,
    #[serde(default)]
    pub remove_assignment_ids: Vec<i64>,
}

/// Reset: tear down an event's deployment, optionally one vendor's.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub vendor_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    pub dots_deleted: usize,
    pub assignments_deleted: usize,
    pub shifts_deleted: usize,
}

/// Parses an RFC 3339 timestamp into a UTC instant.
fn parse_instant(value: &str, field: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApiError::InvalidInput {
            field: field.to_string(),
            message: format!("Failed to parse timestamp '{value}': {e}"),
        })
}

/// Parses an ISO 8601 calendar date.
pub(crate) fn parse_date(value: &str) -> Result<time::Date, ApiError> {
    time::Date::parse(value, &time::format_description::well_known::Iso8601::DEFAULT).map_err(
        |e| ApiError::InvalidInput {
            field: String::from("dates"),
            message: format!("Failed to parse date '{value}': {e}"),
        },
    )
}

/// Parses a wall-clock time of day (`HH:MM` or `HH:MM:SS`).
pub(crate) fn parse_time_of_day(value: &str, field: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|e| ApiError::InvalidInput {
            field: field.to_string(),
            message: format!("Failed to parse time '{value}': {e}"),
        })
}
