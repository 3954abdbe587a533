// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutation plan execution.
//!
//! [`execute_plan`] persists a [`MutationPlan`] in a single transaction,
//! in plan order:
//!
//! 1. vendor reassignment (before any insert, so only pre-existing dots
//!    move)
//! 2. destruction of replaced assignments
//! 3. creation of new shift definitions
//! 4. insertion of new dots and their assignments
//! 5. assignment inserts and staff increments against existing dots
//! 6. per-dot field updates and derived totals
//!
//! Any error rolls back the entire plan; no partial state is ever
//! visible outside the transaction.

use std::collections::HashMap;

use chrono_tz::Tz;
use diesel::prelude::*;
use diesel::{Connection, SqliteConnection};
use dotplan::{DotUpdate, MutationPlan, ShiftRef};
use dotplan_domain::ShiftWindow;
use tracing::{debug, info};

use crate::backend;
use crate::data_models::{NewDot, format_utc};
use crate::diesel_schema::{dot_shifts, dots, shift_defs};
use crate::error::PersistenceError;

/// What a plan execution actually wrote.
#[derive(Debug, Clone, Default)]
pub struct ExecutionSummary {
    /// Ids of the dots inserted by the plan, in plan order.
    pub dot_ids: Vec<i64>,
    pub shifts_created: usize,
    pub assignments_inserted: usize,
    pub staff_incremented: usize,
    pub assignments_cleared: usize,
    pub dots_updated: usize,
    pub dots_reassigned: usize,
}

/// Per-dot changeset of a plan's field updates. `None` fields are left
/// untouched.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::diesel_schema::dots)]
struct DotRowChanges {
    vendor_id: Option<i64>,
    area_id: Option<i64>,
    position_id: Option<i64>,
    position_name_id: Option<i64>,
    total_rate: Option<f64>,
    avg_rate: Option<f64>,
    total_shift_hours: Option<f64>,
}

impl DotRowChanges {
    fn from_update(update: &DotUpdate) -> Self {
        Self {
            vendor_id: update.changes.vendor_id,
            area_id: update.changes.area_id,
            position_id: update.changes.position_id,
            position_name_id: update.changes.position_name_id,
            total_rate: update.totals.map(|t| t.total_rate),
            avg_rate: update.totals.map(|t| t.avg_rate),
            total_shift_hours: update.totals.map(|t| t.total_shift_hours),
        }
    }

    const fn has_changes(&self) -> bool {
        self.vendor_id.is_some()
            || self.area_id.is_some()
            || self.position_id.is_some()
            || self.position_name_id.is_some()
            || self.total_rate.is_some()
            || self.avg_rate.is_some()
            || self.total_shift_hours.is_some()
    }
}

/// Executes a mutation plan for an event in one transaction.
///
/// `tz` is the event timezone, used to generate display names for shift
/// definitions created by the plan.
///
/// # Errors
///
/// Returns an error (after rolling back every write) if any statement
/// fails, if an increment targets a missing assignment, or if a field
/// update targets a missing dot.
pub fn execute_plan(
    conn: &mut SqliteConnection,
    event_id: i64,
    tz: Tz,
    plan: &MutationPlan,
) -> Result<ExecutionSummary, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let mut summary = ExecutionSummary::default();

        if let Some(reassign) = plan.vendor_reassign {
            summary.dots_reassigned = diesel::update(
                dots::table
                    .filter(dots::event_id.eq(event_id))
                    .filter(dots::vendor_id.eq(reassign.from_vendor_id)),
            )
            .set(dots::vendor_id.eq(Some(reassign.to_vendor_id)))
            .execute(conn)?;
            debug!(
                from = reassign.from_vendor_id,
                to = reassign.to_vendor_id,
                count = summary.dots_reassigned,
                "Reassigned vendor dots"
            );
        }

        if !plan.clear_assignments_of.is_empty() {
            summary.assignments_cleared = diesel::delete(
                dot_shifts::table.filter(dot_shifts::dot_id.eq_any(&plan.clear_assignments_of)),
            )
            .execute(conn)?;
            debug!(
                count = summary.assignments_cleared,
                "Destroyed replaced assignments"
            );
        }

        let mut created: HashMap<ShiftWindow, i64> = HashMap::new();
        for window in &plan.shifts_to_create {
            diesel::insert_into(shift_defs::table)
                .values((
                    shift_defs::event_id.eq(event_id),
                    shift_defs::name.eq(window.display_name(tz)),
                    shift_defs::start_utc.eq(format_utc(window.start_utc())),
                    shift_defs::end_utc.eq(format_utc(window.end_utc())),
                ))
                .execute(conn)?;
            created.insert(*window, backend::get_last_insert_rowid(conn)?);
        }
        summary.shifts_created = created.len();

        for planned in &plan.new_dots {
            diesel::insert_into(dots::table)
                .values(NewDot::from_domain(&planned.dot))
                .execute(conn)?;
            let dot_id = backend::get_last_insert_rowid(conn)?;
            for assignment in &planned.assignments {
                let shift_id = resolve_shift(&created, assignment.shift)?;
                insert_assignment(conn, dot_id, shift_id, assignment.rate, assignment.staff)?;
                summary.assignments_inserted += 1;
            }
            summary.dot_ids.push(dot_id);
        }

        for insert in &plan.assignment_inserts {
            let shift_id = resolve_shift(&created, insert.shift)?;
            insert_assignment(conn, insert.dot_id, shift_id, insert.rate, insert.staff)?;
            summary.assignments_inserted += 1;
        }

        for increment in &plan.staff_increments {
            let affected = diesel::update(
                dot_shifts::table
                    .filter(dot_shifts::dot_id.eq(increment.dot_id))
                    .filter(dot_shifts::shift_id.eq(increment.shift_id))
                    .filter(dot_shifts::rate.eq(increment.rate)),
            )
            .set(dot_shifts::staff.eq(dot_shifts::staff + increment.staff))
            .execute(conn)?;
            if affected == 0 {
                return Err(PersistenceError::NotFound(format!(
                    "Assignment of dot {} to shift {} not found for staff increment",
                    increment.dot_id, increment.shift_id
                )));
            }
            summary.staff_incremented += 1;
        }

        for update in &plan.dot_updates {
            let changes = DotRowChanges::from_update(update);
            if !changes.has_changes() {
                continue;
            }
            let affected = diesel::update(
                dots::table
                    .filter(dots::dot_id.eq(update.dot_id))
                    .filter(dots::event_id.eq(event_id)),
            )
            .set(&changes)
            .execute(conn)?;
            if affected == 0 {
                return Err(PersistenceError::NotFound(format!(
                    "Dot {} not found",
                    update.dot_id
                )));
            }
            summary.dots_updated += 1;
        }

        info!(
            event_id,
            dots_created = summary.dot_ids.len(),
            shifts_created = summary.shifts_created,
            assignments_inserted = summary.assignments_inserted,
            staff_incremented = summary.staff_incremented,
            dots_updated = summary.dots_updated,
            "Executed mutation plan"
        );

        Ok(summary)
    })
}

/// Resolves a planned shift reference to a definition id.
fn resolve_shift(
    created: &HashMap<ShiftWindow, i64>,
    shift: ShiftRef,
) -> Result<i64, PersistenceError> {
    match shift {
        ShiftRef::Existing(shift_id) => Ok(shift_id),
        ShiftRef::Window(window) => created.get(&window).copied().ok_or_else(|| {
            PersistenceError::Other(String::from(
                "Planned shift window is missing from the created set",
            ))
        }),
    }
}

fn insert_assignment(
    conn: &mut SqliteConnection,
    dot_id: i64,
    shift_id: i64,
    rate: f64,
    staff: i32,
) -> Result<(), PersistenceError> {
    diesel::insert_into(dot_shifts::table)
        .values((
            dot_shifts::dot_id.eq(dot_id),
            dot_shifts::shift_id.eq(shift_id),
            dot_shifts::rate.eq(rate),
            dot_shifts::staff.eq(staff),
        ))
        .execute(conn)?;
    Ok(())
}
