// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Dot queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use dotplan_domain::CLONE_TAG;

use crate::data_models::DotRow;
use crate::diesel_schema::dots;
use crate::error::PersistenceError;

/// Returns the subset of `candidates` that already exists as a `pos_id`
/// in the event.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn existing_pos_ids(
    conn: &mut SqliteConnection,
    event_id: i64,
    candidates: &[String],
) -> Result<Vec<String>, PersistenceError> {
    Ok(dots::table
        .filter(dots::event_id.eq(event_id))
        .filter(dots::pos_id.eq_any(candidates))
        .select(dots::pos_id)
        .load::<String>(conn)?)
}

/// Returns every `pos_id` in the event that continues the clone sequence
/// of `base` (i.e. matches `base-CL-%`).
///
/// The caller filters out tails that do not parse as a numeric suffix; a
/// coincidental `-CL-` in an unrelated identifier is accepted behavior.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn clone_pos_ids(
    conn: &mut SqliteConnection,
    event_id: i64,
    base: &str,
) -> Result<Vec<String>, PersistenceError> {
    let pattern = format!("{base}{CLONE_TAG}%");
    Ok(dots::table
        .filter(dots::event_id.eq(event_id))
        .filter(dots::pos_id.like(pattern))
        .select(dots::pos_id)
        .load::<String>(conn)?)
}

/// Fetches dot rows by id, scoped to an event.
///
/// Returns the rows that exist; callers comparing against the requested
/// id count are responsible for rejecting partial results.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn dots_by_ids(
    conn: &mut SqliteConnection,
    event_id: i64,
    dot_ids: &[i64],
) -> Result<Vec<DotRow>, PersistenceError> {
    Ok(dots::table
        .filter(dots::event_id.eq(event_id))
        .filter(dots::dot_id.eq_any(dot_ids))
        .order(dots::dot_id.asc())
        .load::<DotRow>(conn)?)
}

/// Fetches dot rows by id across events.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn dots_by_ids_unscoped(
    conn: &mut SqliteConnection,
    dot_ids: &[i64],
) -> Result<Vec<DotRow>, PersistenceError> {
    Ok(dots::table
        .filter(dots::dot_id.eq_any(dot_ids))
        .order(dots::dot_id.asc())
        .load::<DotRow>(conn)?)
}

/// Lists an event's dots, optionally restricted to one vendor.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_event_dots(
    conn: &mut SqliteConnection,
    event_id: i64,
    vendor_id: Option<i64>,
) -> Result<Vec<DotRow>, PersistenceError> {
    let mut query = dots::table
        .filter(dots::event_id.eq(event_id))
        .into_boxed();
    if let Some(vendor_id) = vendor_id {
        query = query.filter(dots::vendor_id.eq(vendor_id));
    }
    Ok(query.order(dots::pos_id.asc()).load::<DotRow>(conn)?)
}

/// Returns the ids of the event's placed dots.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn placed_dot_ids(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<Vec<i64>, PersistenceError> {
    Ok(dots::table
        .filter(dots::event_id.eq(event_id))
        .filter(dots::placed.eq(1))
        .select(dots::dot_id)
        .order(dots::dot_id.asc())
        .load::<i64>(conn)?)
}
