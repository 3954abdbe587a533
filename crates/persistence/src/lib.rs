// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Dotplan deployment engine.
//!
//! This crate stores dots, shift definitions, and their assignments in
//! `SQLite` via Diesel, and executes planned mutations transactionally.
//!
//! ## Consistency model
//!
//! - Every mutation (plan execution, single-dot update, delete, reset)
//!   runs inside one `conn.transaction(..)`; an error rolls the whole
//!   operation back and is returned unmodified.
//! - Uniqueness of `(event_id, pos_id)`, `(event_id, start, end)`, and
//!   `(dot_id, shift_id, rate)` is enforced by database constraints;
//!   violations surface as [`PersistenceError::UniqueViolation`],
//!   distinct from [`PersistenceError::NotFound`].
//! - There is no in-process locking. Callers perform existence checks
//!   before opening the transaction; the narrow race between check and
//!   insert is backstopped by the unique constraints.
//!
//! ## Testing
//!
//! Tests run against in-memory `SQLite` databases. Each test database
//! receives a unique name from an atomic counter, ensuring deterministic
//! isolation without time-based collisions.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono_tz::Tz;
use diesel::SqliteConnection;
use dotplan::{DeploymentSnapshot, ExistingAssignment, ExistingShift, MutationPlan, SourceDot};
use dotplan_domain::{Dot, ShiftWindow, base_prefix};

pub use data_models::{DotShiftRow, ShiftDefRow};
pub use error::PersistenceError;
pub use mutations::{AssignmentUpsert, DotEdit, ExecutionSummary, ResetSummary};

/// Atomic counter for generating unique in-memory database names.
///
/// This ensures deterministic test isolation by eliminating time-based
/// collisions. Each call to `new_in_memory()` receives a unique
/// sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for the deployment tables.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite`
    /// database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_test_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::initialize_database(&shared_memory_url)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite`
    /// database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError(String::from("Invalid database path"))
        })?;

        let mut conn: SqliteConnection = backend::initialize_database(path_str)?;
        backend::enable_wal_mode(&mut conn)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Snapshot reads (performed before the mutation transaction opens)
    // ========================================================================

    /// Builds the planner's view of existing state: the event's shift
    /// definitions, the requested source dots with their assignments (in
    /// request order), and the identifiers occupying the sources' clone
    /// sequences.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::NotFound`] if fewer source dots exist
    /// in the event than were requested, and an error if any read fails.
    pub fn deployment_snapshot(
        &mut self,
        event_id: i64,
        timezone: &str,
        source_dot_ids: &[i64],
    ) -> Result<DeploymentSnapshot, PersistenceError> {
        let conn = &mut self.conn;

        let defs = queries::shift_defs_for_event(conn, event_id)?;
        let mut windows_by_id: HashMap<i64, ShiftWindow> = HashMap::new();
        let mut shifts: Vec<ExistingShift> = Vec::with_capacity(defs.len());
        for def in &defs {
            let window = def.window()?;
            windows_by_id.insert(def.shift_id, window);
            shifts.push(ExistingShift {
                shift_id: def.shift_id,
                window,
            });
        }

        let rows = queries::dots_by_ids(conn, event_id, source_dot_ids)?;
        if rows.len() != source_dot_ids.len() {
            return Err(PersistenceError::NotFound(format!(
                "{} of {} requested dots found in event {event_id}",
                rows.len(),
                source_dot_ids.len()
            )));
        }
        let assignment_rows = queries::assignments_for_dots(conn, source_dot_ids)?;

        let mut rows_by_id: HashMap<i64, Dot> = rows
            .into_iter()
            .map(|row| (row.dot_id, row.into_domain()))
            .collect();

        let mut source_dots: Vec<SourceDot> = Vec::with_capacity(source_dot_ids.len());
        for &dot_id in source_dot_ids {
            let dot = rows_by_id.remove(&dot_id).ok_or_else(|| {
                PersistenceError::NotFound(format!("Dot {dot_id} not found in event {event_id}"))
            })?;
            let assignments = assignment_rows
                .iter()
                .filter(|a| a.dot_id == dot_id)
                .map(|a| {
                    let window = windows_by_id.get(&a.shift_id).copied().ok_or_else(|| {
                        PersistenceError::ReconstructionError(format!(
                            "Assignment {} references unknown shift {}",
                            a.dot_shift_id, a.shift_id
                        ))
                    })?;
                    Ok(ExistingAssignment {
                        dot_id: a.dot_id,
                        shift_id: a.shift_id,
                        window,
                        rate: a.rate,
                        staff: a.staff,
                    })
                })
                .collect::<Result<Vec<_>, PersistenceError>>()?;
            source_dots.push(SourceDot { dot, assignments });
        }

        let mut clone_pos_ids: Vec<String> = Vec::new();
        let mut seen_bases: Vec<String> = Vec::new();
        for source in &source_dots {
            let base = base_prefix(source.dot.pos_id.value()).to_string();
            if !seen_bases.contains(&base) {
                clone_pos_ids.extend(queries::clone_pos_ids(conn, event_id, &base)?);
                seen_bases.push(base);
            }
        }

        Ok(DeploymentSnapshot {
            event_id,
            timezone: timezone.to_string(),
            shifts,
            source_dots,
            clone_pos_ids,
        })
    }

    /// Returns the subset of `pos_ids` already present in the event.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn existing_pos_ids(
        &mut self,
        event_id: i64,
        pos_ids: &[String],
    ) -> Result<Vec<String>, PersistenceError> {
        queries::existing_pos_ids(&mut self.conn, event_id, pos_ids)
    }

    /// Returns the ids of the event's placed dots.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn placed_dot_ids(&mut self, event_id: i64) -> Result<Vec<i64>, PersistenceError> {
        queries::placed_dot_ids(&mut self.conn, event_id)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Executes a mutation plan in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error after full rollback if any statement fails.
    pub fn execute_plan(
        &mut self,
        event_id: i64,
        tz: Tz,
        plan: &MutationPlan,
    ) -> Result<ExecutionSummary, PersistenceError> {
        mutations::execute_plan(&mut self.conn, event_id, tz, plan)
    }

    /// Applies an edit to one dot in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error after full rollback if the dot is missing or any
    /// statement fails.
    pub fn update_dot(
        &mut self,
        event_id: i64,
        tz: Tz,
        dot_id: i64,
        edit: &DotEdit,
    ) -> Result<(), PersistenceError> {
        mutations::update_dot(&mut self.conn, event_id, tz, dot_id, edit)
    }

    /// Deletes dots and their assignments (shift definitions survive).
    ///
    /// # Errors
    ///
    /// Returns an error after full rollback if any requested dot is
    /// missing or any statement fails.
    pub fn delete_dots(
        &mut self,
        event_id: i64,
        dot_ids: &[i64],
    ) -> Result<usize, PersistenceError> {
        mutations::delete_dots(&mut self.conn, event_id, dot_ids)
    }

    /// Runs the deployment reset cascade.
    ///
    /// # Errors
    ///
    /// Returns an error after full rollback if any statement fails.
    pub fn reset_deployment(
        &mut self,
        event_id: i64,
        vendor_id: Option<i64>,
    ) -> Result<ResetSummary, PersistenceError> {
        mutations::reset_deployment(&mut self.conn, event_id, vendor_id)
    }

    // ========================================================================
    // Read-back queries
    // ========================================================================

    /// Retrieves a dot by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the dot does not exist.
    pub fn get_dot(&mut self, dot_id: i64) -> Result<Dot, PersistenceError> {
        let rows = queries::dots_by_ids_unscoped(&mut self.conn, &[dot_id])?;
        rows.into_iter()
            .next()
            .map(data_models::DotRow::into_domain)
            .ok_or_else(|| PersistenceError::NotFound(format!("Dot {dot_id} not found")))
    }

    /// Lists an event's dots, optionally restricted to one vendor.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_dots(
        &mut self,
        event_id: i64,
        vendor_id: Option<i64>,
    ) -> Result<Vec<Dot>, PersistenceError> {
        Ok(queries::list_event_dots(&mut self.conn, event_id, vendor_id)?
            .into_iter()
            .map(data_models::DotRow::into_domain)
            .collect())
    }

    /// Loads the assignment rows of one dot.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn dot_assignments(&mut self, dot_id: i64) -> Result<Vec<DotShiftRow>, PersistenceError> {
        queries::assignments_for_dots(&mut self.conn, &[dot_id])
    }

    /// Loads every shift definition of an event.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn shift_definitions(
        &mut self,
        event_id: i64,
    ) -> Result<Vec<ShiftDefRow>, PersistenceError> {
        queries::shift_defs_for_event(&mut self.conn, event_id)
    }
}
