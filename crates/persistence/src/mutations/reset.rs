// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Deployment reset cascade.

use diesel::prelude::*;
use diesel::{Connection, SqliteConnection};
use tracing::info;

use crate::diesel_schema::{dot_shifts, dots, shift_defs};
use crate::error::PersistenceError;
use crate::queries;

/// What a reset removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetSummary {
    pub dots_deleted: usize,
    pub assignments_deleted: usize,
    pub shifts_deleted: usize,
}

/// Deletes an event's dots (optionally one vendor's) and cascades to
/// shift definitions, in one transaction:
///
/// 1. delete the matching dots' assignments
/// 2. delete the dots
/// 3. a full reset deletes every shift definition of the event; a
///    vendor-filtered reset re-queries assignment references *after* the
///    dot deletion and deletes only definitions no remaining assignment
///    references
///
/// # Errors
///
/// Returns an error if any statement fails; the transaction is rolled
/// back.
pub fn reset_deployment(
    conn: &mut SqliteConnection,
    event_id: i64,
    vendor_id: Option<i64>,
) -> Result<ResetSummary, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let dot_ids: Vec<i64> = match vendor_id {
            Some(vendor_id) => dots::table
                .filter(dots::event_id.eq(event_id))
                .filter(dots::vendor_id.eq(vendor_id))
                .select(dots::dot_id)
                .load::<i64>(conn)?,
            None => dots::table
                .filter(dots::event_id.eq(event_id))
                .select(dots::dot_id)
                .load::<i64>(conn)?,
        };

        let touched_shift_ids = queries::shift_ids_of_dots(conn, &dot_ids)?;

        let assignments_deleted =
            diesel::delete(dot_shifts::table.filter(dot_shifts::dot_id.eq_any(&dot_ids)))
                .execute(conn)?;
        let dots_deleted = diesel::delete(dots::table.filter(dots::dot_id.eq_any(&dot_ids)))
            .execute(conn)?;

        let shifts_deleted = if vendor_id.is_none() {
            // Nothing can still reference the event's definitions.
            diesel::delete(shift_defs::table.filter(shift_defs::event_id.eq(event_id)))
                .execute(conn)?
        } else {
            // Post-delete view: definitions still referenced by other
            // vendors' dots survive.
            let still_referenced = queries::referenced_shift_ids(conn, &touched_shift_ids)?;
            let orphaned: Vec<i64> = touched_shift_ids
                .iter()
                .copied()
                .filter(|shift_id| !still_referenced.contains(shift_id))
                .collect();
            if orphaned.is_empty() {
                0
            } else {
                diesel::delete(shift_defs::table.filter(shift_defs::shift_id.eq_any(&orphaned)))
                    .execute(conn)?
            }
        };

        info!(
            event_id,
            vendor_id,
            dots_deleted,
            assignments_deleted,
            shifts_deleted,
            "Reset deployment"
        );

        Ok(ResetSummary {
            dots_deleted,
            assignments_deleted,
            shifts_deleted,
        })
    })
}
