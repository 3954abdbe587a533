// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The bulk mutation orchestrator.
//!
//! Every operation follows the same shape:
//!
//! 1. resolve the caller's event scope (forbidden callers never touch
//!    data)
//! 2. validate the input batch and perform existence pre-checks before
//!    any transaction opens
//! 3. read a snapshot, plan the mutation, execute the plan in one
//!    transaction
//! 4. on commit, fire the post-commit notification; its failure is
//!    logged and never rolls back the mutation
//!
//! A race between the existence pre-check and the commit is possible
//! when two requests run concurrently; the database's unique constraints
//! backstop it and surface as [`ApiError::Conflict`].

use std::collections::HashMap;

use serde_json::json;
use tracing::{info, warn};

use dotplan::{Command, FieldChanges, plan};
use dotplan_domain::{Dot, PosId, parse_timezone, validate_assignment, validate_pos_ids_unique};
use dotplan_persistence::{AssignmentUpsert, DotEdit, Persistence};

use crate::collab::{EventScope, LookupKind, LookupResolver, Notifier, ScopeResolver};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    BulkShiftChange, BulkUpdateRequest, BulkUpdateResponse, CloneRequest, CloneResponse,
    CopyRequest, CopyResponse, DotUploadRequest, DotUploadRow, ResetRequest, ResetResponse,
    ShiftUpload, SwapRequest, SwapResponse, UpdateDotRequest, UploadResponse, parse_date,
};

/// The deployment orchestrator.
///
/// Collaborators are injected at construction; the persistence adapter
/// is passed per call so callers control its lifecycle.
pub struct Deployments<S, L, N> {
    scope_resolver: S,
    lookups: L,
    notifier: N,
}

impl<S: ScopeResolver, L: LookupResolver, N: Notifier> Deployments<S, L, N> {
    /// Creates an orchestrator from its collaborators.
    pub const fn new(scope_resolver: S, lookups: L, notifier: N) -> Self {
        Self {
            scope_resolver,
            lookups,
            notifier,
        }
    }

    /// Uploads a batch of new dots.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Forbidden`] if the user may not operate on the event
    /// - [`ApiError::DuplicateIdentifier`] if a `pos_id` repeats within
    ///   the batch (rejected before any persistence attempt)
    /// - [`ApiError::Conflict`] if a `pos_id` already exists for the
    ///   event (rejected before the transaction opens)
    /// - [`ApiError::InvalidInput`] for malformed shifts or figures
    pub fn upload(
        &mut self,
        persistence: &mut Persistence,
        user: &str,
        event_id: i64,
        request: &DotUploadRequest,
    ) -> Result<UploadResponse, ApiError> {
        let scope = self.authorize(user, event_id)?;
        self.check_pos_ids(persistence, event_id, &request.rows)?;

        let rows = self.resolve_rows(&scope, &request.rows)?;
        let tz = parse_timezone(&scope.timezone).map_err(translate_domain_error)?;
        let snapshot = persistence
            .deployment_snapshot(event_id, &scope.timezone, &[])
            .map_err(translate_persistence_error)?;
        let mutation = plan(&snapshot, Command::Upload { rows }).map_err(translate_core_error)?;
        let summary = persistence
            .execute_plan(event_id, tz, &mutation)
            .map_err(translate_persistence_error)?;

        info!(event_id, dots = summary.dot_ids.len(), "Uploaded deployment");
        self.notify(
            event_id,
            "upload",
            json!({ "dots": summary.dot_ids.len(), "shifts_created": summary.shifts_created }),
        );
        Ok(UploadResponse {
            dot_ids: summary.dot_ids,
            shifts_created: summary.shifts_created,
        })
    }

    /// Clones existing dots under freshly sequenced identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ResourceNotFound`] unless every source dot
    /// exists in the event.
    pub fn clone_dots(
        &mut self,
        persistence: &mut Persistence,
        user: &str,
        event_id: i64,
        request: &CloneRequest,
    ) -> Result<CloneResponse, ApiError> {
        let scope = self.authorize(user, event_id)?;
        let tz = parse_timezone(&scope.timezone).map_err(translate_domain_error)?;
        let snapshot = persistence
            .deployment_snapshot(event_id, &scope.timezone, &request.dot_ids)
            .map_err(translate_persistence_error)?;
        let mutation = plan(
            &snapshot,
            Command::Clone {
                dot_ids: request.dot_ids.clone(),
                quantity: request.quantity,
            },
        )
        .map_err(translate_core_error)?;
        let summary = persistence
            .execute_plan(event_id, tz, &mutation)
            .map_err(translate_persistence_error)?;

        info!(
            event_id,
            sources = request.dot_ids.len(),
            quantity = request.quantity,
            created = summary.dot_ids.len(),
            "Cloned dots"
        );
        self.notify(event_id, "clone", json!({ "dots": summary.dot_ids.len() }));
        Ok(CloneResponse {
            dot_ids: summary.dot_ids,
        })
    }

    /// Projects a placed deployment's shift pattern onto new dates.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ResourceNotFound`] unless every source dot
    /// exists, and [`ApiError::InvalidInput`] for malformed dates.
    pub fn copy_shifts(
        &mut self,
        persistence: &mut Persistence,
        user: &str,
        event_id: i64,
        request: &CopyRequest,
    ) -> Result<CopyResponse, ApiError> {
        let scope = self.authorize(user, event_id)?;
        let dot_ids = match &request.dot_ids {
            Some(ids) => ids.clone(),
            None => persistence
                .placed_dot_ids(event_id)
                .map_err(translate_persistence_error)?,
        };
        let dates = request
            .dates
            .iter()
            .map(|d| parse_date(d))
            .collect::<Result<Vec<_>, _>>()?;

        let tz = parse_timezone(&scope.timezone).map_err(translate_domain_error)?;
        let snapshot = persistence
            .deployment_snapshot(event_id, &scope.timezone, &dot_ids)
            .map_err(translate_persistence_error)?;
        let mutation =
            plan(&snapshot, Command::Copy { dot_ids, dates }).map_err(translate_core_error)?;
        let summary = persistence
            .execute_plan(event_id, tz, &mutation)
            .map_err(translate_persistence_error)?;

        info!(
            event_id,
            shifts_created = summary.shifts_created,
            staff_incremented = summary.staff_incremented,
            "Copied deployment shifts"
        );
        self.notify(
            event_id,
            "copy",
            json!({ "shifts_created": summary.shifts_created }),
        );
        Ok(CopyResponse {
            shifts_created: summary.shifts_created,
            assignments_inserted: summary.assignments_inserted,
            staff_incremented: summary.staff_incremented,
        })
    }

    /// Uploads a fresh batch while reassigning one vendor's pre-existing
    /// dots to the uploaded batch's vendor.
    ///
    /// # Errors
    ///
    /// As [`Self::upload`], plus [`ApiError::InvalidInput`] if the rows
    /// do not all resolve to one vendor.
    pub fn swap(
        &mut self,
        persistence: &mut Persistence,
        user: &str,
        event_id: i64,
        request: &SwapRequest,
    ) -> Result<SwapResponse, ApiError> {
        let scope = self.authorize(user, event_id)?;
        self.check_pos_ids(persistence, event_id, &request.rows)?;

        let rows = self.resolve_rows(&scope, &request.rows)?;
        let tz = parse_timezone(&scope.timezone).map_err(translate_domain_error)?;
        let snapshot = persistence
            .deployment_snapshot(event_id, &scope.timezone, &[])
            .map_err(translate_persistence_error)?;
        let mutation = plan(
            &snapshot,
            Command::Swap {
                replace_vendor_id: request.replace_vendor_id,
                rows,
            },
        )
        .map_err(translate_core_error)?;
        let summary = persistence
            .execute_plan(event_id, tz, &mutation)
            .map_err(translate_persistence_error)?;

        info!(
            event_id,
            replaced_vendor = request.replace_vendor_id,
            reassigned = summary.dots_reassigned,
            created = summary.dot_ids.len(),
            "Swapped vendor deployment"
        );
        self.notify(
            event_id,
            "swap",
            json!({ "dots": summary.dot_ids.len(), "reassigned": summary.dots_reassigned }),
        );
        Ok(SwapResponse {
            dot_ids: summary.dot_ids,
            dots_reassigned: summary.dots_reassigned,
        })
    }

    /// Applies shared field changes, and optionally a shared shift/date
    /// replacement, to a set of dots.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ResourceNotFound`] unless every target dot
    /// exists, and [`ApiError::InvalidInput`] for an empty change set or
    /// malformed times/dates.
    pub fn bulk_update(
        &mut self,
        persistence: &mut Persistence,
        user: &str,
        event_id: i64,
        request: &BulkUpdateRequest,
    ) -> Result<BulkUpdateResponse, ApiError> {
        let scope = self.authorize(user, event_id)?;

        let changes = request.field_changes();
        let reschedule = request
            .shifts
            .as_ref()
            .map(BulkShiftChange::to_reschedule)
            .transpose()?;
        if changes.is_empty() && reschedule.is_none() {
            return Err(ApiError::InvalidInput {
                field: String::from("changes"),
                message: String::from("No changes requested"),
            });
        }

        let tz = parse_timezone(&scope.timezone).map_err(translate_domain_error)?;
        let snapshot = persistence
            .deployment_snapshot(event_id, &scope.timezone, &request.dot_ids)
            .map_err(translate_persistence_error)?;
        let mutation = plan(
            &snapshot,
            Command::BulkUpdate {
                dot_ids: request.dot_ids.clone(),
                changes,
                reschedule,
            },
        )
        .map_err(translate_core_error)?;
        let summary = persistence
            .execute_plan(event_id, tz, &mutation)
            .map_err(translate_persistence_error)?;

        info!(
            event_id,
            dots_updated = summary.dots_updated,
            "Bulk-updated dots"
        );
        self.notify(
            event_id,
            "bulk_update",
            json!({ "dots_updated": summary.dots_updated }),
        );
        Ok(BulkUpdateResponse {
            dots_updated: summary.dots_updated,
            shifts_created: summary.shifts_created,
        })
    }

    /// Applies an edit to one dot.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ResourceNotFound`] if the dot is missing and
    /// [`ApiError::InvalidInput`] for malformed shifts or figures.
    pub fn update_dot(
        &mut self,
        persistence: &mut Persistence,
        user: &str,
        event_id: i64,
        dot_id: i64,
        request: &UpdateDotRequest,
    ) -> Result<(), ApiError> {
        let scope = self.authorize(user, event_id)?;
        let tz = parse_timezone(&scope.timezone).map_err(translate_domain_error)?;

        let upserts = request
            .shifts
            .iter()
            .map(|shift: &ShiftUpload| {
                validate_assignment(shift.rate, shift.staff).map_err(translate_domain_error)?;
                Ok(AssignmentUpsert {
                    window: shift.window()?,
                    rate: shift.rate,
                    staff: shift.staff,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        let edit = DotEdit {
            changes: FieldChanges {
                vendor_id: request.vendor_id,
                area_id: request.area_id,
                position_id: request.position_id,
                position_name_id: request.position_name_id,
            },
            flags: request.flags,
            location: request.location,
            upserts,
            remove_assignment_ids: request.remove_assignment_ids.clone(),
        };

        persistence
            .update_dot(event_id, tz, dot_id, &edit)
            .map_err(translate_persistence_error)?;

        info!(event_id, dot_id, "Updated dot");
        self.notify(event_id, "update", json!({ "dot_id": dot_id }));
        Ok(())
    }

    /// Deletes dots and their assignments.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ResourceNotFound`] unless every requested dot
    /// exists in the event.
    pub fn delete_dots(
        &mut self,
        persistence: &mut Persistence,
        user: &str,
        event_id: i64,
        dot_ids: &[i64],
    ) -> Result<usize, ApiError> {
        self.authorize(user, event_id)?;
        let deleted = persistence
            .delete_dots(event_id, dot_ids)
            .map_err(translate_persistence_error)?;

        info!(event_id, deleted, "Deleted dots");
        self.notify(event_id, "delete", json!({ "dots_deleted": deleted }));
        Ok(deleted)
    }

    /// Tears down an event's deployment, optionally one vendor's.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not allowed or the cascade fails.
    pub fn reset(
        &mut self,
        persistence: &mut Persistence,
        user: &str,
        event_id: i64,
        request: &ResetRequest,
    ) -> Result<ResetResponse, ApiError> {
        self.authorize(user, event_id)?;
        let summary = persistence
            .reset_deployment(event_id, request.vendor_id)
            .map_err(translate_persistence_error)?;

        info!(
            event_id,
            vendor_id = request.vendor_id,
            dots_deleted = summary.dots_deleted,
            "Reset deployment"
        );
        self.notify(
            event_id,
            "reset",
            json!({
                "dots_deleted": summary.dots_deleted,
                "shifts_deleted": summary.shifts_deleted,
            }),
        );
        Ok(ResetResponse {
            dots_deleted: summary.dots_deleted,
            assignments_deleted: summary.assignments_deleted,
            shifts_deleted: summary.shifts_deleted,
        })
    }

    /// Lists an event's dots, optionally restricted to one vendor.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not allowed or the query fails.
    pub fn list_deployment(
        &mut self,
        persistence: &mut Persistence,
        user: &str,
        event_id: i64,
        vendor_id: Option<i64>,
    ) -> Result<Vec<Dot>, ApiError> {
        self.authorize(user, event_id)?;
        persistence
            .list_dots(event_id, vendor_id)
            .map_err(translate_persistence_error)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn authorize(&mut self, user: &str, event_id: i64) -> Result<EventScope, ApiError> {
        self.scope_resolver
            .resolve(user, event_id)
            .map_err(ApiError::from)
    }

    /// Rejects duplicate identifiers within the batch, then identifiers
    /// already present for the event. Both checks run before any
    /// transaction opens.
    fn check_pos_ids(
        &mut self,
        persistence: &mut Persistence,
        event_id: i64,
        rows: &[DotUploadRow],
    ) -> Result<(), ApiError> {
        let pos_ids: Vec<PosId> = rows.iter().map(|r| PosId::new(r.pos_id.clone())).collect();
        validate_pos_ids_unique(&pos_ids).map_err(translate_domain_error)?;

        let names: Vec<String> = rows.iter().map(|r| r.pos_id.clone()).collect();
        let existing = persistence
            .existing_pos_ids(event_id, &names)
            .map_err(translate_persistence_error)?;
        if let Some(first) = existing.first() {
            return Err(ApiError::Conflict {
                message: format!(
                    "Position identifier '{first}' already exists for event {event_id}"
                ),
            });
        }
        Ok(())
    }

    /// Resolves the rows' lookup names to canonical ids via the
    /// lookup-or-create collaborator, one batch per kind.
    fn resolve_rows(
        &mut self,
        scope: &EventScope,
        rows: &[DotUploadRow],
    ) -> Result<Vec<dotplan::UploadRow>, ApiError> {
        let vendors = self.resolve_kind(
            LookupKind::Vendor,
            scope.company_id,
            collect_names(rows, |r| r.vendor.as_ref()),
        )?;
        let areas = self.resolve_kind(
            LookupKind::Area,
            scope.company_id,
            collect_names(rows, |r| r.area.as_ref()),
        )?;
        let positions = self.resolve_kind(
            LookupKind::Position,
            scope.company_id,
            collect_names(rows, |r| r.position.as_ref()),
        )?;
        let position_names = self.resolve_kind(
            LookupKind::PositionName,
            scope.company_id,
            collect_names(rows, |r| r.position_name.as_ref()),
        )?;

        let mut upload_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let shifts = row
                .shifts
                .iter()
                .map(ShiftUpload::to_upload_shift)
                .collect::<Result<Vec<_>, _>>()?;
            upload_rows.push(dotplan::UploadRow {
                pos_id: PosId::new(row.pos_id.clone()),
                vendor_id: lookup_id(&vendors, row.vendor.as_ref())?,
                area_id: lookup_id(&areas, row.area.as_ref())?,
                position_id: lookup_id(&positions, row.position.as_ref())?,
                position_name_id: lookup_id(&position_names, row.position_name.as_ref())?,
                flags: row.flags(),
                shifts,
            });
        }
        Ok(upload_rows)
    }

    fn resolve_kind(
        &mut self,
        kind: LookupKind,
        company_id: i64,
        names: Vec<String>,
    ) -> Result<HashMap<String, i64>, ApiError> {
        if names.is_empty() {
            return Ok(HashMap::new());
        }
        self.lookups
            .resolve_or_create(kind, company_id, &names)
            .map_err(|e| ApiError::Internal {
                message: e.to_string(),
            })
    }

    /// Fire-and-forget post-commit notification.
    fn notify(&mut self, event_id: i64, operation: &str, payload: serde_json::Value) {
        if let Err(err) = self.notifier.notify(event_id, operation, &payload) {
            warn!(event_id, operation, error = %err, "Post-commit notification failed");
        }
    }
}

/// Collects the distinct lookup names of one kind, in row order.
fn collect_names<F>(rows: &[DotUploadRow], get: F) -> Vec<String>
where
    F: Fn(&DotUploadRow) -> Option<&String>,
{
    let mut names: Vec<String> = Vec::new();
    for row in rows {
        if let Some(name) = get(row) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
    }
    names
}

fn lookup_id(
    resolved: &HashMap<String, i64>,
    name: Option<&String>,
) -> Result<Option<i64>, ApiError> {
    match name {
        None => Ok(None),
        Some(name) => resolved.get(name).copied().map(Some).ok_or_else(|| {
            ApiError::Internal {
                message: format!("Lookup resolver omitted '{name}'"),
            }
        }),
    }
}
