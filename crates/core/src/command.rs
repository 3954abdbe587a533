// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::NaiveTime;
use dotplan_domain::{DotFlags, PosId, ShiftWindow};

/// One staffing descriptor of an upload batch, with lookups already
/// resolved to canonical ids.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRow {
    pub pos_id: PosId,
    pub vendor_id: Option<i64>,
    pub area_id: Option<i64>,
    pub position_id: Option<i64>,
    pub position_name_id: Option<i64>,
    pub flags: DotFlags,
    pub shifts: Vec<UploadShift>,
}

/// One shift demand of an upload row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadShift {
    pub window: ShiftWindow,
    pub rate: f64,
    pub staff: i32,
}

/// Shared lookup-field changes of a bulk update. `None` leaves the field
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldChanges {
    pub vendor_id: Option<i64>,
    pub area_id: Option<i64>,
    pub position_id: Option<i64>,
    pub position_name_id: Option<i64>,
}

impl FieldChanges {
    /// Whether any field change is requested.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vendor_id.is_none()
            && self.area_id.is_none()
            && self.position_id.is_none()
            && self.position_name_id.is_none()
    }
}

/// A wall-clock shift template applied to every date of a reschedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftTemplate {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub rate: f64,
    pub staff: i32,
}

/// The shared shift/date replacement of a bulk update.
#[derive(Debug, Clone, PartialEq)]
pub struct Reschedule {
    pub templates: Vec<ShiftTemplate>,
    pub dates: Vec<time::Date>,
}

/// A command represents mutation intent as data only.
///
/// Commands are planned against a [`crate::DeploymentSnapshot`] into an
/// explicit [`crate::MutationPlan`] which the persistence layer executes
/// in one transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert a batch of new dots with their shift assignments.
    Upload {
        /// The staffing descriptors to insert.
        rows: Vec<UploadRow>,
    },
    /// Duplicate existing dots under freshly sequenced identifiers.
    Clone {
        /// The source dots.
        dot_ids: Vec<i64>,
        /// Number of copies per source dot.
        quantity: u32,
    },
    /// Project the source dots' shift pattern onto new calendar dates.
    Copy {
        /// The source dots.
        dot_ids: Vec<i64>,
        /// The target calendar dates.
        dates: Vec<time::Date>,
    },
    /// Upload a fresh batch while moving one vendor's pre-existing dots
    /// to the uploaded batch's vendor.
    Swap {
        /// The vendor whose existing dots are reassigned.
        replace_vendor_id: i64,
        /// The staffing descriptors to insert.
        rows: Vec<UploadRow>,
    },
    /// Apply shared field changes, and optionally a shared shift/date
    /// replacement, to a set of dots.
    BulkUpdate {
        /// The target dots.
        dot_ids: Vec<i64>,
        /// Shared lookup-field changes.
        changes: FieldChanges,
        /// Optional shift/date replacement.
        reschedule: Option<Reschedule>,
    },
}
