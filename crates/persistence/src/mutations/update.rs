// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Single-dot edits and dot deletion.

use std::collections::HashMap;

use chrono_tz::Tz;
use diesel::prelude::*;
use diesel::{Connection, SqliteConnection};
use dotplan::FieldChanges;
use dotplan_domain::{
    AssignmentFigures, DotFlags, GeoPoint, ShiftWindow, compute_totals,
};
use tracing::debug;

use crate::backend;
use crate::data_models::{DotRow, format_utc};
use crate::diesel_schema::{dot_shifts, dots, shift_defs};
use crate::error::PersistenceError;
use crate::queries;

/// An explicit assignment edit of a single-dot update. If the dot already
/// has an assignment for this (window, rate) pair the staff count is set
/// to `staff`; otherwise a new assignment row is inserted. The shift
/// definition is resolved or created as needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentUpsert {
    pub window: ShiftWindow,
    pub rate: f64,
    pub staff: i32,
}

/// The full edit applied to one dot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DotEdit {
    /// Lookup-field changes; `None` leaves the field untouched.
    pub changes: FieldChanges,
    /// Replacement flags; `None` keeps the current flags.
    pub flags: Option<DotFlags>,
    /// New location. Setting a location marks the dot placed.
    pub location: Option<GeoPoint>,
    /// Assignment upserts.
    pub upserts: Vec<AssignmentUpsert>,
    /// Ids of assignment rows to destroy.
    pub remove_assignment_ids: Vec<i64>,
}

/// Applies an edit to one dot in a single transaction.
///
/// Ordering inside the transaction is explicit: destroy removed
/// assignments, apply upserts, recompute the derived totals from the
/// surviving assignment set, then persist the dot's own field update.
///
/// # Errors
///
/// Returns an error if the dot does not exist in the event or if any
/// statement fails; the transaction is rolled back.
#[allow(clippy::too_many_lines)]
pub fn update_dot(
    conn: &mut SqliteConnection,
    event_id: i64,
    tz: Tz,
    dot_id: i64,
    edit: &DotEdit,
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let row: DotRow = dots::table
            .filter(dots::dot_id.eq(dot_id))
            .filter(dots::event_id.eq(event_id))
            .first::<DotRow>(conn)
            .optional()?
            .ok_or_else(|| PersistenceError::NotFound(format!("Dot {dot_id} not found")))?;

        if !edit.remove_assignment_ids.is_empty() {
            let removed = diesel::delete(
                dot_shifts::table
                    .filter(dot_shifts::dot_id.eq(dot_id))
                    .filter(dot_shifts::dot_shift_id.eq_any(&edit.remove_assignment_ids)),
            )
            .execute(conn)?;
            debug!(dot_id, removed, "Destroyed assignments");
        }

        for upsert in &edit.upserts {
            let shift_id = find_or_create_shift(conn, event_id, tz, upsert.window)?;
            let affected = diesel::update(
                dot_shifts::table
                    .filter(dot_shifts::dot_id.eq(dot_id))
                    .filter(dot_shifts::shift_id.eq(shift_id))
                    .filter(dot_shifts::rate.eq(upsert.rate)),
            )
            .set(dot_shifts::staff.eq(upsert.staff))
            .execute(conn)?;
            if affected == 0 {
                diesel::insert_into(dot_shifts::table)
                    .values((
                        dot_shifts::dot_id.eq(dot_id),
                        dot_shifts::shift_id.eq(shift_id),
                        dot_shifts::rate.eq(upsert.rate),
                        dot_shifts::staff.eq(upsert.staff),
                    ))
                    .execute(conn)?;
            }
        }

        // Recompute totals over the surviving assignment set, inside the
        // same transaction, so the persisted fields are never stale.
        let assignments = queries::assignments_for_dots(conn, &[dot_id])?;
        let windows_by_id: HashMap<i64, ShiftWindow> =
            queries::shift_defs_for_event(conn, event_id)?
                .iter()
                .map(|def| Ok((def.shift_id, def.window()?)))
                .collect::<Result<_, PersistenceError>>()?;
        let figures: Vec<AssignmentFigures> = assignments
            .iter()
            .map(|a| AssignmentFigures {
                rate: a.rate,
                staff: a.staff,
            })
            .collect();
        let windows: Vec<ShiftWindow> = assignments
            .iter()
            .filter_map(|a| windows_by_id.get(&a.shift_id).copied())
            .collect();
        let totals = compute_totals(&figures, &windows);

        let flags = edit.flags.unwrap_or(DotFlags {
            placed: row.placed != 0,
            missing: row.missing != 0,
            priority: row.priority != 0,
            base: row.base != 0,
            addition: row.addition != 0,
        });
        let location = edit.location.or(match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        });
        // A located dot is always placed.
        let placed = flags.placed || edit.location.is_some();

        diesel::update(dots::table.filter(dots::dot_id.eq(dot_id)))
            .set((
                dots::vendor_id.eq(edit.changes.vendor_id.or(row.vendor_id)),
                dots::area_id.eq(edit.changes.area_id.or(row.area_id)),
                dots::position_id.eq(edit.changes.position_id.or(row.position_id)),
                dots::position_name_id
                    .eq(edit.changes.position_name_id.or(row.position_name_id)),
                dots::total_rate.eq(totals.total_rate),
                dots::avg_rate.eq(totals.avg_rate),
                dots::total_shift_hours.eq(totals.total_shift_hours),
                dots::placed.eq(i32::from(placed)),
                dots::missing.eq(i32::from(flags.missing)),
                dots::priority.eq(i32::from(flags.priority)),
                dots::base.eq(i32::from(flags.base)),
                dots::addition.eq(i32::from(flags.addition)),
                dots::latitude.eq(location.map(|p| p.latitude)),
                dots::longitude.eq(location.map(|p| p.longitude)),
            ))
            .execute(conn)?;

        debug!(dot_id, total_rate = totals.total_rate, "Updated dot");
        Ok(())
    })
}

/// Deletes dots and their assignments.
///
/// Shift definitions are deliberately left in place; they are only
/// garbage-collected by the reset cascade.
///
/// # Errors
///
/// Returns an error if any requested dot is missing from the event, or
/// if a statement fails; the transaction is rolled back.
pub fn delete_dots(
    conn: &mut SqliteConnection,
    event_id: i64,
    dot_ids: &[i64],
) -> Result<usize, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let found: Vec<i64> = dots::table
            .filter(dots::event_id.eq(event_id))
            .filter(dots::dot_id.eq_any(dot_ids))
            .select(dots::dot_id)
            .load::<i64>(conn)?;
        if found.len() != dot_ids.len() {
            return Err(PersistenceError::NotFound(format!(
                "{} of {} requested dots found in event {event_id}",
                found.len(),
                dot_ids.len()
            )));
        }

        diesel::delete(dot_shifts::table.filter(dot_shifts::dot_id.eq_any(&found)))
            .execute(conn)?;
        let deleted = diesel::delete(dots::table.filter(dots::dot_id.eq_any(&found)))
            .execute(conn)?;

        debug!(event_id, deleted, "Deleted dots");
        Ok(deleted)
    })
}

/// Looks up the event's shift definition for `window`, creating it if it
/// does not exist yet.
fn find_or_create_shift(
    conn: &mut SqliteConnection,
    event_id: i64,
    tz: Tz,
    window: ShiftWindow,
) -> Result<i64, PersistenceError> {
    let start = format_utc(window.start_utc());
    let end = format_utc(window.end_utc());

    let existing: Option<i64> = shift_defs::table
        .filter(shift_defs::event_id.eq(event_id))
        .filter(shift_defs::start_utc.eq(&start))
        .filter(shift_defs::end_utc.eq(&end))
        .select(shift_defs::shift_id)
        .first::<i64>(conn)
        .optional()?;
    if let Some(shift_id) = existing {
        return Ok(shift_id);
    }

    diesel::insert_into(shift_defs::table)
        .values((
            shift_defs::event_id.eq(event_id),
            shift_defs::name.eq(window.display_name(tz)),
            shift_defs::start_utc.eq(&start),
            shift_defs::end_utc.eq(&end),
        ))
        .execute(conn)?;
    backend::get_last_insert_rowid(conn)
}
