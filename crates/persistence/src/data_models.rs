// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs and conversions between stored rows and domain values.
//!
//! Shift window timestamps are stored as UTC RFC 3339 text. All writes go
//! through [`format_utc`] so that equality on the stored strings matches
//! equality on the instants they encode.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use dotplan_domain::{Dot, DotFlags, DotTotals, GeoPoint, PosId, ShiftWindow};

use crate::error::PersistenceError;

/// Formats a UTC instant for storage.
#[must_use]
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339()
}

/// Parses a stored UTC timestamp.
///
/// # Errors
///
/// Returns an error if the stored text is not valid RFC 3339.
pub fn parse_utc(stored: &str) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::parse_from_rfc3339(stored)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            PersistenceError::ReconstructionError(format!(
                "Failed to parse stored timestamp '{stored}': {e}"
            ))
        })
}

/// A persisted dot row.
#[derive(Debug, Clone, Queryable)]
pub struct DotRow {
    pub dot_id: i64,
    pub event_id: i64,
    pub pos_id: String,
    pub vendor_id: Option<i64>,
    pub area_id: Option<i64>,
    pub position_id: Option<i64>,
    pub position_name_id: Option<i64>,
    pub total_rate: f64,
    pub avg_rate: f64,
    pub total_shift_hours: f64,
    pub placed: i32,
    pub missing: i32,
    pub priority: i32,
    pub base: i32,
    pub addition: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl DotRow {
    /// Converts the row into its domain representation.
    #[must_use]
    pub fn into_domain(self) -> Dot {
        let location = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        };
        Dot {
            dot_id: Some(self.dot_id),
            event_id: self.event_id,
            pos_id: PosId::new(self.pos_id),
            vendor_id: self.vendor_id,
            area_id: self.area_id,
            position_id: self.position_id,
            position_name_id: self.position_name_id,
            totals: DotTotals {
                total_rate: self.total_rate,
                avg_rate: self.avg_rate,
                total_shift_hours: self.total_shift_hours,
            },
            flags: DotFlags {
                placed: self.placed != 0,
                missing: self.missing != 0,
                priority: self.priority != 0,
                base: self.base != 0,
                addition: self.addition != 0,
            },
            location,
        }
    }
}

/// Insertable form of a new dot.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::diesel_schema::dots)]
pub struct NewDot {
    pub event_id: i64,
    pub pos_id: String,
    pub vendor_id: Option<i64>,
    pub area_id: Option<i64>,
    pub position_id: Option<i64>,
    pub position_name_id: Option<i64>,
    pub total_rate: f64,
    pub avg_rate: f64,
    pub total_shift_hours: f64,
    pub placed: i32,
    pub missing: i32,
    pub priority: i32,
    pub base: i32,
    pub addition: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl NewDot {
    /// Builds the insertable form of an unpersisted domain dot.
    #[must_use]
    pub fn from_domain(dot: &Dot) -> Self {
        Self {
            event_id: dot.event_id,
            pos_id: dot.pos_id.value().to_string(),
            vendor_id: dot.vendor_id,
            area_id: dot.area_id,
            position_id: dot.position_id,
            position_name_id: dot.position_name_id,
            total_rate: dot.totals.total_rate,
            avg_rate: dot.totals.avg_rate,
            total_shift_hours: dot.totals.total_shift_hours,
            placed: i32::from(dot.flags.placed),
            missing: i32::from(dot.flags.missing),
            priority: i32::from(dot.flags.priority),
            base: i32::from(dot.flags.base),
            addition: i32::from(dot.flags.addition),
            latitude: dot.location.map(|p| p.latitude),
            longitude: dot.location.map(|p| p.longitude),
        }
    }
}

/// A persisted shift definition row.
#[derive(Debug, Clone, Queryable)]
pub struct ShiftDefRow {
    pub shift_id: i64,
    pub event_id: i64,
    pub name: String,
    pub start_utc: String,
    pub end_utc: String,
}

impl ShiftDefRow {
    /// Reconstructs the absolute time window of this definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored timestamps cannot be parsed or do
    /// not form a valid window.
    pub fn window(&self) -> Result<ShiftWindow, PersistenceError> {
        let start = parse_utc(&self.start_utc)?;
        let end = parse_utc(&self.end_utc)?;
        ShiftWindow::new(start, end)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
    }
}

/// A persisted assignment row linking a dot to a shift definition.
#[derive(Debug, Clone, Copy, Queryable)]
pub struct DotShiftRow {
    pub dot_shift_id: i64,
    pub dot_id: i64,
    pub shift_id: i64,
    pub rate: f64,
    pub staff: i32,
}
