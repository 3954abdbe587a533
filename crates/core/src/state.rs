// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use dotplan_domain::{Dot, DotTotals, ShiftWindow};

use crate::command::FieldChanges;

/// A shift definition that already exists in the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingShift {
    pub shift_id: i64,
    pub window: ShiftWindow,
}

/// An assignment row that already exists in the event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExistingAssignment {
    pub dot_id: i64,
    pub shift_id: i64,
    pub window: ShiftWindow,
    pub rate: f64,
    pub staff: i32,
}

/// A persisted dot together with its current assignments, as fed to the
/// clone/copy/bulk-update planners.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDot {
    pub dot: Dot,
    pub assignments: Vec<ExistingAssignment>,
}

/// The slice of persisted state a planner needs to compute a mutation
/// plan: the event scope, its existing shift definitions, the source dots
/// a command targets, and (for clone) the identifiers already occupying
/// the involved clone sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentSnapshot {
    pub event_id: i64,
    /// The event's IANA timezone name.
    pub timezone: String,
    pub shifts: Vec<ExistingShift>,
    pub source_dots: Vec<SourceDot>,
    pub clone_pos_ids: Vec<String>,
}

impl DeploymentSnapshot {
    /// Creates an empty snapshot for an event scope.
    #[must_use]
    pub const fn new(event_id: i64, timezone: String) -> Self {
        Self {
            event_id,
            timezone,
            shifts: Vec::new(),
            source_dots: Vec::new(),
            clone_pos_ids: Vec::new(),
        }
    }

    /// Looks up the id of an existing shift definition by window.
    #[must_use]
    pub fn shift_id_for(&self, window: &ShiftWindow) -> Option<i64> {
        self.shifts
            .iter()
            .find(|s| s.window == *window)
            .map(|s| s.shift_id)
    }
}

/// Reference to a shift definition from a planned assignment: either an
/// existing definition or a window the executor is about to create.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShiftRef {
    Existing(i64),
    Window(ShiftWindow),
}

/// An assignment to write for a planned dot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedAssignment {
    pub shift: ShiftRef,
    pub rate: f64,
    pub staff: i32,
}

/// A new dot to insert, with derived totals already computed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDot {
    pub dot: Dot,
    pub assignments: Vec<PlannedAssignment>,
}

/// A staff increment onto an assignment row that already exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaffIncrement {
    pub dot_id: i64,
    pub shift_id: i64,
    pub rate: f64,
    pub staff: i32,
}

/// A new assignment row for a dot that already exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentInsert {
    pub dot_id: i64,
    pub shift: ShiftRef,
    pub rate: f64,
    pub staff: i32,
}

/// A per-dot field update, optionally carrying recomputed totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotUpdate {
    pub dot_id: i64,
    pub changes: FieldChanges,
    pub totals: Option<DotTotals>,
}

/// Moves every pre-existing dot of one vendor to another vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorReassign {
    pub from_vendor_id: i64,
    pub to_vendor_id: i64,
}

/// The full record set a mutation persists, computed up front so the
/// transactional executor is a straight-line sequence of writes:
///
/// 1. vendor reassignment (swap; runs before any insert so only
///    pre-existing dots move)
/// 2. destroy assignments of `clear_assignments_of`
/// 3. create `shifts_to_create` (resolving `ShiftRef::Window` references)
/// 4. insert `new_dots` with their assignments
/// 5. apply `staff_increments` and `assignment_inserts`
/// 6. apply `dot_updates` (field changes and derived totals last, so the
///    persisted totals are never stale relative to the assignments just
///    written)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MutationPlan {
    pub shifts_to_create: Vec<ShiftWindow>,
    pub new_dots: Vec<PlannedDot>,
    pub staff_increments: Vec<StaffIncrement>,
    pub assignment_inserts: Vec<AssignmentInsert>,
    pub clear_assignments_of: Vec<i64>,
    pub dot_updates: Vec<DotUpdate>,
    pub vendor_reassign: Option<VendorReassign>,
}

impl MutationPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derived totals shared by every dot update of this plan, if the
    /// plan carries uniform totals (bulk update).
    #[must_use]
    pub fn shared_totals(&self) -> Option<DotTotals> {
        let first = self.dot_updates.first().and_then(|u| u.totals)?;
        self.dot_updates
            .iter()
            .all(|u| u.totals == Some(first))
            .then_some(first)
    }
}
