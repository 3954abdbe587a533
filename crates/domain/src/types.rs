// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// A position identifier, unique within an event.
///
/// Clones of a position carry a `-CL-NNN` suffix on top of the base
/// identifier (see the `pos_id` module).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PosId(String);

impl PosId {
    /// Creates a new position identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PosId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A latitude/longitude pair marking where a dot has been placed on site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Boolean state flags carried by a dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DotFlags {
    pub placed: bool,
    pub missing: bool,
    pub priority: bool,
    pub base: bool,
    pub addition: bool,
}

/// Derived pay and hour totals for a dot.
///
/// These fields are never edited directly; they are recomputed from the
/// dot's assignments inside the same transaction as any structural change
/// (see `compute_totals`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DotTotals {
    pub total_rate: f64,
    pub avg_rate: f64,
    pub total_shift_hours: f64,
}

/// Rate and headcount figures of one assignment, as fed to the aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentFigures {
    pub rate: f64,
    pub staff: i32,
}

/// A staffing position to be filled at an event.
///
/// The vendor/area/position/position-name references are optional foreign
/// lookups resolved by the caller; `None` means the lookup has not been
/// assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    /// The canonical numeric identifier assigned by the database.
    /// `None` indicates the dot has not been persisted yet.
    pub dot_id: Option<i64>,
    pub event_id: i64,
    pub pos_id: PosId,
    pub vendor_id: Option<i64>,
    pub area_id: Option<i64>,
    pub position_id: Option<i64>,
    pub position_name_id: Option<i64>,
    pub totals: DotTotals,
    pub flags: DotFlags,
    pub location: Option<GeoPoint>,
}

impl Dot {
    /// Creates a new, unpersisted dot with default totals and flags.
    #[must_use]
    pub fn new(event_id: i64, pos_id: PosId) -> Self {
        Self {
            dot_id: None,
            event_id,
            pos_id,
            vendor_id: None,
            area_id: None,
            position_id: None,
            position_name_id: None,
            totals: DotTotals::default(),
            flags: DotFlags::default(),
            location: None,
        }
    }

    /// Sets the dot's location. A located dot is always `placed`.
    pub const fn set_location(&mut self, location: GeoPoint) {
        self.location = Some(location);
        self.flags.placed = true;
    }

    /// Produces an unpersisted copy of this dot under a new identifier,
    /// with identity-specific state (id, location, placed, missing)
    /// stripped.
    #[must_use]
    pub fn duplicate_as(&self, pos_id: PosId) -> Self {
        Self {
            dot_id: None,
            event_id: self.event_id,
            pos_id,
            vendor_id: self.vendor_id,
            area_id: self.area_id,
            position_id: self.position_id,
            position_name_id: self.position_name_id,
            totals: self.totals,
            flags: DotFlags {
                placed: false,
                missing: false,
                ..self.flags
            },
            location: None,
        }
    }
}
