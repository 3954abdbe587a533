// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{NaiveDate, NaiveTime};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The same position identifier appears more than once in one batch.
    DuplicatePosId {
        /// The duplicated identifier.
        pos_id: String,
    },
    /// Position identifier is empty or invalid.
    InvalidPosId(String),
    /// Clone quantity must be at least 1.
    InvalidQuantity {
        /// The invalid quantity value.
        quantity: u32,
    },
    /// Staff count must be at least 1.
    InvalidStaff {
        /// The invalid staff value.
        staff: i32,
    },
    /// Rate must be a finite, non-negative value.
    InvalidRate {
        /// The invalid rate value.
        rate: f64,
    },
    /// The event timezone name is not a valid IANA timezone.
    InvalidTimezone(String),
    /// A projected wall-clock time does not exist or is ambiguous in the
    /// event timezone (DST transition).
    UnresolvableLocalTime {
        /// The calendar date being projected onto.
        date: NaiveDate,
        /// The wall-clock time that could not be resolved.
        time: NaiveTime,
    },
    /// A shift window's end does not come after its start.
    InvalidShiftWindow {
        /// The window start (UTC, RFC 3339).
        start: String,
        /// The window end (UTC, RFC 3339).
        end: String,
    },
    /// A calendar date could not be represented for projection.
    DateOutOfRange {
        /// The offending date.
        date: time::Date,
    },
    /// A swap upload must resolve every row to one single vendor.
    MixedVendorUpload,
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicatePosId { pos_id } => {
                write!(f, "Duplicate position identifier '{pos_id}' in batch")
            }
            Self::InvalidPosId(msg) => write!(f, "Invalid position identifier: {msg}"),
            Self::InvalidQuantity { quantity } => {
                write!(f, "Invalid quantity: {quantity}. Must be at least 1")
            }
            Self::InvalidStaff { staff } => {
                write!(f, "Invalid staff count: {staff}. Must be at least 1")
            }
            Self::InvalidRate { rate } => {
                write!(f, "Invalid rate: {rate}. Must be finite and non-negative")
            }
            Self::InvalidTimezone(name) => write!(f, "Invalid timezone: {name}"),
            Self::UnresolvableLocalTime { date, time } => {
                write!(
                    f,
                    "Could not resolve local time {time} on {date} (ambiguous or non-existent due to DST)"
                )
            }
            Self::InvalidShiftWindow { start, end } => {
                write!(f, "Shift window end '{end}' must come after start '{start}'")
            }
            Self::DateOutOfRange { date } => {
                write!(f, "Date {date} cannot be projected")
            }
            Self::MixedVendorUpload => {
                write!(f, "Swap upload rows must all resolve to the same vendor")
            }
        }
    }
}

impl std::error::Error for DomainError {}
