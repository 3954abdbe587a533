// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shift definition and assignment queries.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::{DotShiftRow, ShiftDefRow};
use crate::diesel_schema::{dot_shifts, shift_defs};
use crate::error::PersistenceError;

/// Loads every shift definition of an event.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn shift_defs_for_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<Vec<ShiftDefRow>, PersistenceError> {
    Ok(shift_defs::table
        .filter(shift_defs::event_id.eq(event_id))
        .order(shift_defs::shift_id.asc())
        .load::<ShiftDefRow>(conn)?)
}

/// Loads the assignment rows of the given dots.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn assignments_for_dots(
    conn: &mut SqliteConnection,
    dot_ids: &[i64],
) -> Result<Vec<DotShiftRow>, PersistenceError> {
    Ok(dot_shifts::table
        .filter(dot_shifts::dot_id.eq_any(dot_ids))
        .order(dot_shifts::dot_shift_id.asc())
        .load::<DotShiftRow>(conn)?)
}

/// Returns the distinct shift definition ids referenced by the given
/// dots' assignments.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn shift_ids_of_dots(
    conn: &mut SqliteConnection,
    dot_ids: &[i64],
) -> Result<Vec<i64>, PersistenceError> {
    Ok(dot_shifts::table
        .filter(dot_shifts::dot_id.eq_any(dot_ids))
        .select(dot_shifts::shift_id)
        .distinct()
        .load::<i64>(conn)?)
}

/// Returns the subset of `shift_ids` that still has at least one
/// assignment referencing it.
///
/// Orphan detection for the reset cascade runs this *after* the dot
/// deletion, within the same transaction, so it observes the post-delete
/// state.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn referenced_shift_ids(
    conn: &mut SqliteConnection,
    shift_ids: &[i64],
) -> Result<Vec<i64>, PersistenceError> {
    Ok(dot_shifts::table
        .filter(dot_shifts::shift_id.eq_any(shift_ids))
        .select(dot_shifts::shift_id)
        .distinct()
        .load::<i64>(conn)?)
}
