// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutation planning.
//!
//! [`plan`] turns a [`Command`] plus a [`DeploymentSnapshot`] into an
//! explicit [`MutationPlan`]. Planning is pure: all reads happen through
//! the snapshot, all writes are described by the plan, and the ordering
//! "destroy old assignments → resolve shift definitions → compute new
//! aggregates → persist" is data the executor walks, not behavior implied
//! by model lifecycle hooks.
//!
//! ## Invariants upheld here
//!
//! - No shift window appears twice in `shifts_to_create`, and none of them
//!   already exists in the snapshot.
//! - Clone identifiers drawn for the same base prefix come from one
//!   running counter, so batches are monotonic and collision-free.
//! - Repeated (dot, window, rate) requests accumulate staff; they never
//!   produce a second assignment row.
//! - Every dot touched structurally receives recomputed totals in the
//!   same plan.

use std::collections::HashSet;

use chrono::NaiveDate;
use dotplan_domain::{
    AssignmentFigures, CloneSequencer, Dot, DomainError, PosId, ShiftWindow, base_prefix,
    compute_totals, parse_timezone, project_onto_date, project_times_onto_date, to_naive_date,
    validate_assignment, validate_pos_id, validate_pos_ids_unique, validate_quantity,
};

use crate::command::{Command, FieldChanges, Reschedule, UploadRow};
use crate::error::CoreError;
use crate::state::{
    AssignmentInsert, DeploymentSnapshot, DotUpdate, MutationPlan, PlannedAssignment, PlannedDot,
    ShiftRef, SourceDot, StaffIncrement, VendorReassign,
};

/// Plans a mutation command against a snapshot of existing state.
///
/// # Errors
///
/// Returns an error if the command violates a domain rule or if the
/// snapshot does not cover the dots the command targets.
pub fn plan(snapshot: &DeploymentSnapshot, command: Command) -> Result<MutationPlan, CoreError> {
    match command {
        Command::Upload { rows } => plan_upload(snapshot, &rows),
        Command::Clone { dot_ids, quantity } => plan_clone(snapshot, &dot_ids, quantity),
        Command::Copy { dot_ids, dates } => plan_copy(snapshot, &dot_ids, &dates),
        Command::Swap {
            replace_vendor_id,
            rows,
        } => plan_swap(snapshot, replace_vendor_id, &rows),
        Command::BulkUpdate {
            dot_ids,
            changes,
            reschedule,
        } => plan_bulk_update(snapshot, &dot_ids, changes, reschedule.as_ref()),
    }
}

/// Exact rate identity, as used by the assignment uniqueness key.
fn rates_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < f64::EPSILON
}

/// Tracks the ordered, deduplicated set of windows the plan will create.
#[derive(Default)]
struct PendingShifts {
    windows: Vec<ShiftWindow>,
    seen: HashSet<ShiftWindow>,
}

impl PendingShifts {
    /// Resolves a window to an existing definition or registers it for
    /// creation.
    fn resolve(&mut self, snapshot: &DeploymentSnapshot, window: ShiftWindow) -> ShiftRef {
        if let Some(shift_id) = snapshot.shift_id_for(&window) {
            return ShiftRef::Existing(shift_id);
        }
        if self.seen.insert(window) {
            self.windows.push(window);
        }
        ShiftRef::Window(window)
    }
}

fn plan_upload(
    snapshot: &DeploymentSnapshot,
    rows: &[UploadRow],
) -> Result<MutationPlan, CoreError> {
    validate_pos_ids_unique(rows.iter().map(|r| &r.pos_id))?;

    let mut plan = MutationPlan::new();
    let mut pending = PendingShifts::default();

    for row in rows {
        validate_pos_id(&row.pos_id)?;

        // Accumulate staff for repeated (window, rate) demands within the
        // row; counts add up, they never replace.
        let mut merged: Vec<(ShiftWindow, f64, i32)> = Vec::new();
        for shift in &row.shifts {
            validate_assignment(shift.rate, shift.staff)?;
            if let Some(entry) = merged
                .iter_mut()
                .find(|(w, rate, _)| *w == shift.window && rates_equal(*rate, shift.rate))
            {
                entry.2 += shift.staff;
            } else {
                merged.push((shift.window, shift.rate, shift.staff));
            }
        }

        let figures: Vec<AssignmentFigures> = merged
            .iter()
            .map(|&(_, rate, staff)| AssignmentFigures { rate, staff })
            .collect();
        let windows: Vec<ShiftWindow> = merged.iter().map(|&(w, _, _)| w).collect();

        let mut dot = Dot::new(snapshot.event_id, row.pos_id.clone());
        dot.vendor_id = row.vendor_id;
        dot.area_id = row.area_id;
        dot.position_id = row.position_id;
        dot.position_name_id = row.position_name_id;
        dot.flags = row.flags;
        dot.totals = compute_totals(&figures, &windows);

        let assignments: Vec<PlannedAssignment> = merged
            .iter()
            .map(|&(window, rate, staff)| PlannedAssignment {
                shift: pending.resolve(snapshot, window),
                rate,
                staff,
            })
            .collect();

        plan.new_dots.push(PlannedDot { dot, assignments });
    }

    plan.shifts_to_create = pending.windows;
    Ok(plan)
}

fn plan_clone(
    snapshot: &DeploymentSnapshot,
    dot_ids: &[i64],
    quantity: u32,
) -> Result<MutationPlan, CoreError> {
    validate_quantity(quantity)?;
    require_sources(snapshot, dot_ids)?;

    let mut sequencer = CloneSequencer::new();
    let mut plan = MutationPlan::new();

    for source in &snapshot.source_dots {
        let base = base_prefix(source.dot.pos_id.value()).to_string();
        if !sequencer.is_seeded(&base) {
            sequencer.seed(&base, snapshot.clone_pos_ids.iter().map(String::as_str));
        }

        for new_id in sequencer.allocate_many(&base, quantity)? {
            let dot = source.dot.duplicate_as(PosId::new(new_id));
            let assignments: Vec<PlannedAssignment> = source
                .assignments
                .iter()
                .map(|a| PlannedAssignment {
                    shift: ShiftRef::Existing(a.shift_id),
                    rate: a.rate,
                    staff: a.staff,
                })
                .collect();
            plan.new_dots.push(PlannedDot { dot, assignments });
        }
    }

    Ok(plan)
}

/// Post-mutation assignment state of one dot, used to derive totals.
struct PostAssignment {
    window: ShiftWindow,
    shift_id: Option<i64>,
    rate: f64,
    staff: i32,
}

fn plan_copy(
    snapshot: &DeploymentSnapshot,
    dot_ids: &[i64],
    dates: &[time::Date],
) -> Result<MutationPlan, CoreError> {
    let tz = parse_timezone(&snapshot.timezone)?;
    let target_dates: Vec<NaiveDate> = dates
        .iter()
        .map(|d| to_naive_date(*d))
        .collect::<Result<_, _>>()?;
    require_sources(snapshot, dot_ids)?;

    let mut plan = MutationPlan::new();
    let mut pending = PendingShifts::default();

    for source in &snapshot.source_dots {
        let dot_id = persisted_id(source)?;

        // Candidate windows deduplicate per dot; the first occurrence of
        // a (dot, start, end) key wins.
        let mut seen: HashSet<ShiftWindow> = HashSet::new();
        let mut post: Vec<PostAssignment> = source
            .assignments
            .iter()
            .map(|a| PostAssignment {
                window: a.window,
                shift_id: Some(a.shift_id),
                rate: a.rate,
                staff: a.staff,
            })
            .collect();

        for assignment in &source.assignments {
            for date in &target_dates {
                let window = project_onto_date(&assignment.window, tz, *date)?;
                if !seen.insert(window) {
                    continue;
                }

                let shift = pending.resolve(snapshot, window);
                let merge_target = post
                    .iter_mut()
                    .find(|p| p.window == window && rates_equal(p.rate, assignment.rate));

                if let Some(entry) = merge_target {
                    // The same window/rate is already assigned to this dot:
                    // the merge increments its staff instead of inserting a
                    // duplicate row.
                    entry.staff += assignment.staff;
                    let shift_id = entry.shift_id.ok_or_else(|| {
                        CoreError::Internal(String::from(
                            "merge target has no persisted shift id",
                        ))
                    })?;
                    plan.staff_increments.push(StaffIncrement {
                        dot_id,
                        shift_id,
                        rate: assignment.rate,
                        staff: assignment.staff,
                    });
                } else {
                    post.push(PostAssignment {
                        window,
                        shift_id: match shift {
                            ShiftRef::Existing(id) => Some(id),
                            ShiftRef::Window(_) => None,
                        },
                        rate: assignment.rate,
                        staff: assignment.staff,
                    });
                    plan.assignment_inserts.push(AssignmentInsert {
                        dot_id,
                        shift,
                        rate: assignment.rate,
                        staff: assignment.staff,
                    });
                }
            }
        }

        let figures: Vec<AssignmentFigures> = post
            .iter()
            .map(|p| AssignmentFigures {
                rate: p.rate,
                staff: p.staff,
            })
            .collect();
        let windows: Vec<ShiftWindow> = post.iter().map(|p| p.window).collect();
        plan.dot_updates.push(DotUpdate {
            dot_id,
            changes: FieldChanges::default(),
            totals: Some(compute_totals(&figures, &windows)),
        });
    }

    plan.shifts_to_create = pending.windows;
    Ok(plan)
}

fn plan_swap(
    snapshot: &DeploymentSnapshot,
    replace_vendor_id: i64,
    rows: &[UploadRow],
) -> Result<MutationPlan, CoreError> {
    let mut to_vendor: Option<i64> = None;
    for row in rows {
        match (to_vendor, row.vendor_id) {
            (_, None) => return Err(DomainError::MixedVendorUpload.into()),
            (None, Some(v)) => to_vendor = Some(v),
            (Some(current), Some(v)) if v != current => {
                return Err(DomainError::MixedVendorUpload.into());
            }
            _ => {}
        }
    }
    let to_vendor_id = to_vendor.ok_or(DomainError::MixedVendorUpload)?;

    let mut plan = plan_upload(snapshot, rows)?;
    plan.vendor_reassign = Some(VendorReassign {
        from_vendor_id: replace_vendor_id,
        to_vendor_id,
    });
    Ok(plan)
}

fn plan_bulk_update(
    snapshot: &DeploymentSnapshot,
    dot_ids: &[i64],
    changes: FieldChanges,
    reschedule: Option<&Reschedule>,
) -> Result<MutationPlan, CoreError> {
    let mut plan = MutationPlan::new();
    let mut totals = None;

    if let Some(reschedule) = reschedule {
        let tz = parse_timezone(&snapshot.timezone)?;
        let target_dates: Vec<NaiveDate> = reschedule
            .dates
            .iter()
            .map(|d| to_naive_date(*d))
            .collect::<Result<_, _>>()?;

        let mut pending = PendingShifts::default();
        let mut seen: HashSet<ShiftWindow> = HashSet::new();
        let mut merged: Vec<(ShiftWindow, f64, i32)> = Vec::new();

        // The replacement set is shared by every target dot, so the
        // candidate key is the bare (start, end) pair.
        for template in &reschedule.templates {
            validate_assignment(template.rate, template.staff)?;
            for date in &target_dates {
                let window =
                    project_times_onto_date(template.start_time, template.end_time, tz, *date)?;
                if seen.insert(window) {
                    merged.push((window, template.rate, template.staff));
                }
            }
        }

        let figures: Vec<AssignmentFigures> = merged
            .iter()
            .map(|&(_, rate, staff)| AssignmentFigures { rate, staff })
            .collect();
        let windows: Vec<ShiftWindow> = merged.iter().map(|&(w, _, _)| w).collect();
        // Computed once, applied to every target dot.
        totals = Some(compute_totals(&figures, &windows));

        for &(window, rate, staff) in &merged {
            let shift = pending.resolve(snapshot, window);
            for &dot_id in dot_ids {
                plan.assignment_inserts.push(AssignmentInsert {
                    dot_id,
                    shift,
                    rate,
                    staff,
                });
            }
        }

        plan.clear_assignments_of = dot_ids.to_vec();
        plan.shifts_to_create = pending.windows;
    }

    for &dot_id in dot_ids {
        plan.dot_updates.push(DotUpdate {
            dot_id,
            changes,
            totals,
        });
    }

    Ok(plan)
}

/// Verifies the snapshot carries a source dot for every requested id.
fn require_sources(snapshot: &DeploymentSnapshot, dot_ids: &[i64]) -> Result<(), CoreError> {
    for &dot_id in dot_ids {
        if !snapshot
            .source_dots
            .iter()
            .any(|s| s.dot.dot_id == Some(dot_id))
        {
            return Err(CoreError::Internal(format!(
                "source dot {dot_id} missing from snapshot"
            )));
        }
    }
    Ok(())
}

fn persisted_id(source: &SourceDot) -> Result<i64, CoreError> {
    source
        .dot
        .dot_id
        .ok_or_else(|| CoreError::Internal(String::from("snapshot source dot has no id")))
}
