// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Clone identifier sequencing.
//!
//! When a dot is cloned, the copy receives the source's base identifier
//! plus a `-CL-NNN` suffix. Sequencing rules:
//!
//! - The base prefix is the identifier with any existing `-CL-NNN` suffix
//!   stripped, so clones of clones stay in one sequence.
//! - The next suffix continues from the maximum existing suffix under the
//!   same prefix in the event, preserving its zero-padded width.
//! - Within one batch the counter advances in memory only; all source dots
//!   that collapse to the same base prefix share a single counter, so the
//!   generated set is monotonic and gap-free with no overlap.

use std::collections::HashMap;

use crate::error::DomainError;

/// Separator between a base identifier and its clone sequence number.
pub const CLONE_TAG: &str = "-CL-";

/// Strips a trailing `-CL-NNN` suffix, returning the base identifier.
///
/// Identifiers that merely contain `-CL-` followed by non-digits are left
/// untouched.
#[must_use]
pub fn base_prefix(pos_id: &str) -> &str {
    if let Some(idx) = pos_id.rfind(CLONE_TAG) {
        let suffix = &pos_id[idx + CLONE_TAG.len()..];
        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            return &pos_id[..idx];
        }
    }
    pos_id
}

/// Parses the numeric clone suffix of an identifier, if present.
///
/// Returns the numeric value and the zero-padded width of the suffix.
#[must_use]
pub fn clone_suffix(pos_id: &str) -> Option<(u32, usize)> {
    let idx = pos_id.rfind(CLONE_TAG)?;
    let suffix = &pos_id[idx + CLONE_TAG.len()..];
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse::<u32>().ok().map(|n| (n, suffix.len()))
}

/// Running counter state for one base prefix.
#[derive(Debug, Clone, Copy)]
struct Sequence {
    next: u32,
    width: usize,
}

impl Default for Sequence {
    fn default() -> Self {
        // No prior clones: sequences start at -CL-001.
        Self { next: 1, width: 3 }
    }
}

/// Allocates collision-free clone identifiers for a batch.
///
/// The sequencer holds one running counter per base prefix, seeded once
/// from the existing identifiers in the event and advanced in memory for
/// every allocation. Seeding is the caller's responsibility; allocating
/// from an unseeded prefix starts the sequence at `-CL-001`.
#[derive(Debug, Default)]
pub struct CloneSequencer {
    sequences: HashMap<String, Sequence>,
}

impl CloneSequencer {
    /// Creates an empty sequencer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the counter for `base` from the existing identifiers that
    /// share its prefix.
    ///
    /// Identifiers whose tail does not parse as `-CL-NNN` are ignored.
    /// The zero-padded width of the maximum existing suffix is preserved
    /// for all subsequent allocations under this prefix.
    pub fn seed<'a>(&mut self, base: &str, existing: impl IntoIterator<Item = &'a str>) {
        let max = existing
            .into_iter()
            .filter(|id| base_prefix(id) == base)
            .filter_map(clone_suffix)
            .max_by_key(|(n, _)| *n);

        let sequence = match max {
            Some((n, width)) => Sequence { next: n + 1, width },
            None => Sequence::default(),
        };
        self.sequences.insert(base.to_string(), sequence);
    }

    /// Returns whether a counter for `base` has been seeded.
    #[must_use]
    pub fn is_seeded(&self, base: &str) -> bool {
        self.sequences.contains_key(base)
    }

    /// Allocates the next identifier under `base`.
    #[must_use]
    pub fn allocate(&mut self, base: &str) -> String {
        let sequence = self.sequences.entry(base.to_string()).or_default();
        let id = format!("{base}{CLONE_TAG}{:0width$}", sequence.next, width = sequence.width);
        sequence.next += 1;
        id
    }

    /// Allocates `quantity` sequential identifiers under `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if `quantity` is zero.
    pub fn allocate_many(
        &mut self,
        base: &str,
        quantity: u32,
    ) -> Result<Vec<String>, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity { quantity });
        }
        Ok((0..quantity).map(|_| self.allocate(base)).collect())
    }
}
